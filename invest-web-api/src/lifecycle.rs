use crate::dto::InvestmentStatus;
use crate::error::EngineError;
use crate::{commission, payout};
use chrono::{DateTime, Months, Utc};
use invest_db_entity::db::account::Entity as Account;
use invest_db_entity::db::investment::{
    ActiveModel as InvestmentActiveModel, Column as InvestmentColumn, Entity as Investment,
    Model as InvestmentModel,
};
use sea_orm::prelude::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};
use std::str::FromStr;
use tracing::info;

pub const INVESTMENT_TERM_MONTHS: u32 = 40;

/// Legal moves of the investment state machine. Owners push proof and
/// cancellation, administrators decide, the scheduler completes;
/// rejected, cancelled and completed are terminal.
pub fn allowed_transitions(current: &InvestmentStatus) -> &'static [InvestmentStatus] {
    match current {
        InvestmentStatus::PendingProof => &[
            InvestmentStatus::PendingApproval,
            InvestmentStatus::Cancelled,
        ],
        InvestmentStatus::PendingApproval => &[
            InvestmentStatus::Active,
            InvestmentStatus::Rejected,
            InvestmentStatus::Cancelled,
        ],
        InvestmentStatus::Active => &[InvestmentStatus::Completed],
        _ => &[],
    }
}

pub fn validate_amount(amount: Decimal) -> Result<(), EngineError> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::Validation(
            "Investment amount must be greater than zero.".to_owned(),
        ));
    }
    Ok(())
}

pub fn term_end(start: DateTime<Utc>) -> Result<i64, EngineError> {
    start
        .checked_add_months(Months::new(INVESTMENT_TERM_MONTHS))
        .map(|end| end.timestamp())
        .ok_or_else(|| EngineError::Validation("Start date out of range.".to_owned()))
}

pub async fn create_investment(
    db: &DatabaseConnection,
    owner: &str,
    amount: Decimal,
) -> Result<InvestmentModel, EngineError> {
    validate_amount(amount)?;
    let account = Account::find_by_id(owner.to_owned()).one(db).await?;
    if account.is_none() {
        return Err(EngineError::Validation("Unknown account.".to_owned()));
    }

    let investment = InvestmentActiveModel {
        id: ActiveValue::NotSet,
        owner_account: ActiveValue::Set(owner.to_owned()),
        amount: ActiveValue::Set(amount),
        status: ActiveValue::Set(InvestmentStatus::PendingProof.to_string()),
        proof_reference: ActiveValue::Set(None),
        decision_notes: ActiveValue::Set(None),
        created_at: ActiveValue::Set(Utc::now().timestamp()),
        start_date: ActiveValue::Set(None),
        end_date: ActiveValue::Set(None),
    };
    let investment = investment.insert(db).await?;
    Ok(investment)
}

/// Owner attaches the opaque proof reference supplied by the external
/// document store. Only valid while the investment awaits proof.
pub async fn submit_proof(
    db: &DatabaseConnection,
    investment_id: i64,
    owner: &str,
    proof_reference: &str,
) -> Result<(), EngineError> {
    if proof_reference.trim().is_empty() {
        return Err(EngineError::Validation(
            "Proof reference must not be empty.".to_owned(),
        ));
    }
    let result = Investment::update_many()
        .col_expr(
            InvestmentColumn::Status,
            Expr::value(InvestmentStatus::PendingApproval.to_string()),
        )
        .col_expr(
            InvestmentColumn::ProofReference,
            Expr::value(Some(proof_reference.to_owned())),
        )
        .filter(InvestmentColumn::Id.eq(investment_id))
        .filter(InvestmentColumn::OwnerAccount.eq(owner))
        .filter(InvestmentColumn::Status.eq(InvestmentStatus::PendingProof.to_string()))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::StateConflict(
            "Investment is not awaiting proof.".to_owned(),
        ));
    }
    Ok(())
}

pub async fn cancel_investment(
    db: &DatabaseConnection,
    investment_id: i64,
    owner: &str,
) -> Result<(), EngineError> {
    let result = Investment::update_many()
        .col_expr(
            InvestmentColumn::Status,
            Expr::value(InvestmentStatus::Cancelled.to_string()),
        )
        .filter(InvestmentColumn::Id.eq(investment_id))
        .filter(InvestmentColumn::OwnerAccount.eq(owner))
        .filter(InvestmentColumn::Status.is_in([
            InvestmentStatus::PendingProof.to_string(),
            InvestmentStatus::PendingApproval.to_string(),
        ]))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::StateConflict(
            "Investment can no longer be cancelled.".to_owned(),
        ));
    }
    Ok(())
}

/// Administrator approval or rejection. The status flip is a conditional
/// update so only one of two racing decisions applies; the loser sees a
/// state conflict and must re-fetch. Approval generates the payout
/// schedule and runs commission fan-out inside the same transaction.
pub async fn decide(
    db: &DatabaseConnection,
    investment_id: i64,
    approved: bool,
    notes: Option<String>,
) -> Result<InvestmentModel, EngineError> {
    let txn = db.begin().await?;
    let now = Utc::now();

    let investment = Investment::find_by_id(investment_id)
        .one(&txn)
        .await?
        .ok_or_else(|| EngineError::Validation("Investment not found.".to_owned()))?;
    let current = InvestmentStatus::from_str(&investment.status).map_err(|_| {
        EngineError::Integrity(format!(
            "Investment {} carries unknown status {}.",
            investment.id, investment.status
        ))
    })?;
    let target = if approved {
        InvestmentStatus::Active
    } else {
        InvestmentStatus::Rejected
    };
    if !allowed_transitions(&current).contains(&target) {
        return Err(EngineError::StateConflict(
            "Investment has already been decided or is not awaiting approval.".to_owned(),
        ));
    }

    let update = if approved {
        let start = now.timestamp();
        let end = term_end(now)?;
        Investment::update_many()
            .col_expr(
                InvestmentColumn::Status,
                Expr::value(InvestmentStatus::Active.to_string()),
            )
            .col_expr(InvestmentColumn::DecisionNotes, Expr::value(notes))
            .col_expr(InvestmentColumn::StartDate, Expr::value(Some(start)))
            .col_expr(InvestmentColumn::EndDate, Expr::value(Some(end)))
    } else {
        Investment::update_many()
            .col_expr(
                InvestmentColumn::Status,
                Expr::value(InvestmentStatus::Rejected.to_string()),
            )
            .col_expr(InvestmentColumn::DecisionNotes, Expr::value(notes))
    };
    let result = update
        .filter(InvestmentColumn::Id.eq(investment_id))
        .filter(InvestmentColumn::Status.eq(InvestmentStatus::PendingApproval.to_string()))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::StateConflict(
            "Investment has already been decided or is not awaiting approval.".to_owned(),
        ));
    }

    let investment = Investment::find_by_id(investment_id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            EngineError::Integrity("Investment row disappeared mid-decision.".to_owned())
        })?;

    if approved {
        let earnings = payout::generate_schedule(&txn, &investment).await?;
        let commissions = commission::distribute(&txn, &investment).await?;
        info!(
            "investment {} activated: {} earnings scheduled, {} commission records",
            investment.id, earnings, commissions
        );
    } else {
        info!("investment {} rejected", investment.id);
    }

    txn.commit().await?;
    Ok(investment)
}

/// Moves active investments whose term has elapsed to completed. Invoked
/// by the external scheduler surface.
pub async fn complete_due_investments(
    db: &DatabaseConnection,
    now: i64,
) -> Result<u64, EngineError> {
    let result = Investment::update_many()
        .col_expr(
            InvestmentColumn::Status,
            Expr::value(InvestmentStatus::Completed.to_string()),
        )
        .filter(InvestmentColumn::Status.eq(InvestmentStatus::Active.to_string()))
        .filter(InvestmentColumn::EndDate.lte(now))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::from(-500)).is_err());
        assert!(validate_amount(Decimal::from(1)).is_ok());
    }

    #[test]
    fn term_runs_forty_months() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let end = term_end(start).unwrap();
        let expected = start.checked_add_months(Months::new(40)).unwrap();
        assert_eq!(end, expected.timestamp());
        assert!(end > start.timestamp());
    }

    #[test]
    fn awaiting_proof_can_only_gain_proof_or_be_cancelled() {
        let next = allowed_transitions(&InvestmentStatus::PendingProof);
        assert_eq!(
            next.to_vec(),
            vec![
                InvestmentStatus::PendingApproval,
                InvestmentStatus::Cancelled
            ]
        );
        // an investment cannot be activated before its proof is reviewed
        assert!(!next.contains(&InvestmentStatus::Active));
    }

    #[test]
    fn awaiting_approval_can_be_decided_or_cancelled() {
        let next = allowed_transitions(&InvestmentStatus::PendingApproval);
        assert!(next.contains(&InvestmentStatus::Active));
        assert!(next.contains(&InvestmentStatus::Rejected));
        assert!(next.contains(&InvestmentStatus::Cancelled));
        assert!(!next.contains(&InvestmentStatus::Completed));
    }

    #[test]
    fn active_investments_can_only_complete() {
        let next = allowed_transitions(&InvestmentStatus::Active);
        assert_eq!(next.to_vec(), vec![InvestmentStatus::Completed]);
        assert!(!next.contains(&InvestmentStatus::Rejected));
        assert!(!next.contains(&InvestmentStatus::Cancelled));
    }

    #[test]
    fn terminal_statuses_accept_no_transitions() {
        assert!(allowed_transitions(&InvestmentStatus::Rejected).is_empty());
        assert!(allowed_transitions(&InvestmentStatus::Completed).is_empty());
        assert!(allowed_transitions(&InvestmentStatus::Cancelled).is_empty());
    }

    #[test]
    fn status_strings_round_trip() {
        assert_eq!(InvestmentStatus::PendingProof.to_string(), "pending_proof");
        assert_eq!(
            InvestmentStatus::from_str("pending_approval").unwrap(),
            InvestmentStatus::PendingApproval
        );
        assert_eq!(InvestmentStatus::Active.to_string(), "active");
    }
}
