use crate::dto::WithdrawalStatus;
use crate::error::EngineError;
use crate::settings::WithdrawalLimits;
use crate::sql_stmt;
use chrono::Utc;
use invest_db_entity::db::account::Entity as Account;
use invest_db_entity::db::withdrawal::{
    ActiveModel as WithdrawalActiveModel, Column as WithdrawalColumn, Entity as Withdrawal,
    Model as WithdrawalModel,
};
use sea_orm::prelude::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QuerySelect, Statement, TransactionTrait,
};
use std::str::FromStr;
use tracing::info;

/// Balance available for withdrawal: settled earnings minus everything
/// already requested but not yet resolved.
pub async fn available_balance<C: ConnectionTrait>(
    db: &C,
    owner: &str,
) -> Result<Decimal, EngineError> {
    let paid = sum_statement(db, sql_stmt::PAID_EARNINGS_TOTAL, owner).await?;
    let held = sum_statement(db, sql_stmt::HELD_WITHDRAWALS_TOTAL, owner).await?;
    Ok(paid - held)
}

async fn sum_statement<C: ConnectionTrait>(
    db: &C,
    sql: &str,
    owner: &str,
) -> Result<Decimal, EngineError> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            sql_stmt::DB_BACKEND,
            sql,
            vec![owner.to_owned().into()],
        ))
        .await?;
    match row {
        Some(row) => Ok(row.try_get::<Decimal>("", "total").unwrap_or(Decimal::ZERO)),
        None => Ok(Decimal::ZERO),
    }
}

/// Pure limit check. Returns the first violated constraint as a
/// user-facing reason, in a fixed order.
pub fn evaluate(
    amount: Decimal,
    available: Decimal,
    limits: &WithdrawalLimits,
) -> Result<(), String> {
    if amount <= Decimal::ZERO {
        return Err("Withdrawal amount must be greater than zero.".to_owned());
    }
    if amount < limits.min_amount {
        return Err(format!("Minimum withdrawal amount is {}.", limits.min_amount));
    }
    if amount > limits.max_amount {
        return Err(format!("Maximum withdrawal amount is {}.", limits.max_amount));
    }
    if available - amount < limits.min_balance_required {
        return Err("Insufficient available balance for this withdrawal.".to_owned());
    }
    Ok(())
}

/// Fee withheld by the settlement side, quoted up front.
pub fn withdrawal_fee(amount: Decimal, fee_percent: Decimal) -> Decimal {
    (amount * fee_percent / Decimal::from(100)).round_dp(2)
}

pub struct Eligibility {
    pub eligible: bool,
    pub reason: String,
    pub available_balance: Decimal,
    pub fee: Decimal,
    pub processing_sla_hours: i32,
}

pub async fn check_eligibility(
    db: &DatabaseConnection,
    owner: &str,
    amount: Decimal,
) -> Result<Eligibility, EngineError> {
    let limits = WithdrawalLimits::load(db).await?;
    let available = available_balance(db, owner).await?;
    let fee = withdrawal_fee(amount, limits.fee_percent);
    let eligibility = match evaluate(amount, available, &limits) {
        Ok(()) => Eligibility {
            eligible: true,
            reason: "".to_owned(),
            available_balance: available,
            fee,
            processing_sla_hours: limits.processing_sla_hours,
        },
        Err(reason) => Eligibility {
            eligible: false,
            reason,
            available_balance: available,
            fee,
            processing_sla_hours: limits.processing_sla_hours,
        },
    };
    Ok(eligibility)
}

/// The balance check and the insert run in one transaction holding an
/// exclusive lock on the owner's account row, so two racing requests for
/// the same owner are serialized and the second sees the first as held.
pub async fn create_withdrawal(
    db: &DatabaseConnection,
    owner: &str,
    amount: Decimal,
) -> Result<WithdrawalModel, EngineError> {
    let txn = db.begin().await?;

    let account = Account::find_by_id(owner.to_owned())
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| EngineError::Validation("Unknown account.".to_owned()))?;
    let bank_destination = match (account.bank_verified, account.bank_destination) {
        (true, Some(destination)) => destination,
        _ => {
            return Err(EngineError::Validation(
                "A verified bank destination is required before withdrawing.".to_owned(),
            ))
        }
    };

    let limits = WithdrawalLimits::load(&txn).await?;
    let available = available_balance(&txn, owner).await?;
    if let Err(reason) = evaluate(amount, available, &limits) {
        return Err(EngineError::Validation(reason));
    }

    let withdrawal = WithdrawalActiveModel {
        id: ActiveValue::NotSet,
        owner_account: ActiveValue::Set(owner.to_owned()),
        amount: ActiveValue::Set(amount),
        bank_destination: ActiveValue::Set(bank_destination),
        status: ActiveValue::Set(WithdrawalStatus::Pending.to_string()),
        notes: ActiveValue::Set(None),
        created_at: ActiveValue::Set(Utc::now().timestamp()),
        processed_at: ActiveValue::Set(None),
    };
    let withdrawal = withdrawal.insert(&txn).await?;
    txn.commit().await?;
    info!(
        "withdrawal {} created for {} ({})",
        withdrawal.id, owner, withdrawal.amount
    );
    Ok(withdrawal)
}

pub async fn cancel_withdrawal(
    db: &DatabaseConnection,
    withdrawal_id: i64,
    owner: &str,
) -> Result<(), EngineError> {
    let result = Withdrawal::update_many()
        .col_expr(
            WithdrawalColumn::Status,
            Expr::value(WithdrawalStatus::Cancelled.to_string()),
        )
        .filter(WithdrawalColumn::Id.eq(withdrawal_id))
        .filter(WithdrawalColumn::OwnerAccount.eq(owner))
        .filter(WithdrawalColumn::Status.eq(WithdrawalStatus::Pending.to_string()))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::StateConflict(
            "Withdrawal is no longer pending.".to_owned(),
        ));
    }
    Ok(())
}

/// Administrator moves: pending requests can start processing or be
/// resolved outright; processing requests can only be resolved.
pub fn allowed_transitions(current: &WithdrawalStatus) -> &'static [WithdrawalStatus] {
    match current {
        WithdrawalStatus::Pending => &[
            WithdrawalStatus::Processing,
            WithdrawalStatus::Completed,
            WithdrawalStatus::Rejected,
        ],
        WithdrawalStatus::Processing => {
            &[WithdrawalStatus::Completed, WithdrawalStatus::Rejected]
        }
        _ => &[],
    }
}

pub async fn process_withdrawal(
    db: &DatabaseConnection,
    withdrawal_id: i64,
    new_status: WithdrawalStatus,
    notes: Option<String>,
) -> Result<WithdrawalModel, EngineError> {
    if matches!(
        new_status,
        WithdrawalStatus::Pending | WithdrawalStatus::Cancelled
    ) {
        return Err(EngineError::Validation(format!(
            "Withdrawals cannot be moved to {} by an administrator.",
            new_status
        )));
    }

    let withdrawal = Withdrawal::find_by_id(withdrawal_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::Validation("Withdrawal not found.".to_owned()))?;
    let current = WithdrawalStatus::from_str(&withdrawal.status).map_err(|_| {
        EngineError::Integrity(format!(
            "Withdrawal {} carries unknown status {}.",
            withdrawal.id, withdrawal.status
        ))
    })?;
    if !allowed_transitions(&current).contains(&new_status) {
        return Err(EngineError::StateConflict(format!(
            "Cannot move withdrawal from {} to {}.",
            current, new_status
        )));
    }

    let processed_at = match new_status {
        WithdrawalStatus::Completed | WithdrawalStatus::Rejected => {
            Some(Utc::now().timestamp())
        }
        _ => None,
    };
    let result = Withdrawal::update_many()
        .col_expr(
            WithdrawalColumn::Status,
            Expr::value(new_status.to_string()),
        )
        .col_expr(WithdrawalColumn::Notes, Expr::value(notes))
        .col_expr(WithdrawalColumn::ProcessedAt, Expr::value(processed_at))
        .filter(WithdrawalColumn::Id.eq(withdrawal_id))
        .filter(WithdrawalColumn::Status.eq(current.to_string()))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::StateConflict(
            "Withdrawal was updated concurrently.".to_owned(),
        ));
    }

    let withdrawal = Withdrawal::find_by_id(withdrawal_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            EngineError::Integrity("Withdrawal row disappeared mid-update.".to_owned())
        })?;
    Ok(withdrawal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> WithdrawalLimits {
        WithdrawalLimits {
            min_amount: Decimal::from(1_000),
            max_amount: Decimal::from(100_000),
            fee_percent: Decimal::ZERO,
            min_balance_required: Decimal::ZERO,
            processing_sla_hours: 72,
        }
    }

    #[test]
    fn overdrawing_paid_earnings_is_rejected() {
        // 10000 paid earnings, nothing held; asking for 12000
        let result = evaluate(Decimal::from(12_000), Decimal::from(10_000), &limits());
        assert_eq!(
            result.unwrap_err(),
            "Insufficient available balance for this withdrawal."
        );
    }

    #[test]
    fn request_within_limits_is_accepted() {
        assert!(evaluate(Decimal::from(5_000), Decimal::from(10_000), &limits()).is_ok());
    }

    #[test]
    fn below_minimum_is_rejected_with_its_own_reason() {
        let result = evaluate(Decimal::from(500), Decimal::from(10_000), &limits());
        assert_eq!(result.unwrap_err(), "Minimum withdrawal amount is 1000.");
    }

    #[test]
    fn above_maximum_is_rejected_with_its_own_reason() {
        let result = evaluate(
            Decimal::from(200_000),
            Decimal::from(500_000),
            &limits(),
        );
        assert_eq!(result.unwrap_err(), "Maximum withdrawal amount is 100000.");
    }

    #[test]
    fn retained_balance_floor_is_honoured() {
        let mut limits = limits();
        limits.min_balance_required = Decimal::from(2_000);
        // 10000 available, 9000 requested leaves 1000 < 2000 floor
        assert!(evaluate(Decimal::from(9_000), Decimal::from(10_000), &limits).is_err());
        assert!(evaluate(Decimal::from(8_000), Decimal::from(10_000), &limits).is_ok());
    }

    #[test]
    fn held_withdrawals_reduce_the_available_balance() {
        // 10000 paid, 6000 already pending: only 4000 left
        let available = Decimal::from(10_000) - Decimal::from(6_000);
        assert!(evaluate(Decimal::from(5_000), available, &limits()).is_err());
        assert!(evaluate(Decimal::from(4_000), available, &limits()).is_ok());
    }

    #[test]
    fn back_to_back_requests_cannot_overdraw() {
        // two requests of 6000 against 10000: the first is held by the
        // time the second is evaluated, so only the first passes
        let paid = Decimal::from(10_000);
        let first = Decimal::from(6_000);
        assert!(evaluate(first, paid, &limits()).is_ok());
        let available_after_first = paid - first;
        assert_eq!(
            evaluate(Decimal::from(6_000), available_after_first, &limits()).unwrap_err(),
            "Insufficient available balance for this withdrawal."
        );
    }

    #[test]
    fn terminal_statuses_accept_no_transitions() {
        assert!(allowed_transitions(&WithdrawalStatus::Completed).is_empty());
        assert!(allowed_transitions(&WithdrawalStatus::Rejected).is_empty());
        assert!(allowed_transitions(&WithdrawalStatus::Cancelled).is_empty());
    }

    #[test]
    fn pending_can_start_processing_or_resolve() {
        let next = allowed_transitions(&WithdrawalStatus::Pending);
        assert!(next.contains(&WithdrawalStatus::Processing));
        assert!(next.contains(&WithdrawalStatus::Completed));
        assert!(next.contains(&WithdrawalStatus::Rejected));
        assert!(!next.contains(&WithdrawalStatus::Pending));
    }

    #[test]
    fn processing_can_only_resolve() {
        let next = allowed_transitions(&WithdrawalStatus::Processing);
        assert_eq!(
            next.to_vec(),
            vec![WithdrawalStatus::Completed, WithdrawalStatus::Rejected]
        );
    }

    #[test]
    fn fee_is_a_rounded_percentage_of_the_amount() {
        assert_eq!(
            withdrawal_fee(Decimal::from(5_000), Decimal::from(2)),
            Decimal::from(100)
        );
        // 333.33 * 1.5% = 4.99995 -> 5.00
        assert_eq!(
            withdrawal_fee(
                Decimal::from_str_radix("333.33", 10).unwrap(),
                Decimal::from_str_radix("1.5", 10).unwrap()
            ),
            Decimal::from(5)
        );
    }
}
