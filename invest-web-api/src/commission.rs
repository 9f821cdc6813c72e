use crate::error::EngineError;
use crate::settings::RateTable;
use crate::sql_stmt;
use chrono::Utc;
use invest_db_entity::db::account::Entity as Account;
use invest_db_entity::db::commission_record::{
    ActiveModel as CommissionActiveModel, Column as CommissionColumn, Entity as CommissionRecord,
};
use invest_db_entity::db::investment::Model as InvestmentModel;
use invest_db_entity::db::referral_edge::{Column as EdgeColumn, Entity as ReferralEdge};
use sea_orm::prelude::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Statement,
};
use tracing::info;

/// Commission is computed against the principal investment amount.
pub fn commission_for(base_amount: Decimal, rate_percent: Decimal) -> Decimal {
    (base_amount * rate_percent / Decimal::from(100)).round_dp(2)
}

/// Fans one commission record out per ancestor level of the investment
/// owner. Triggers only for the owner's first-ever activated investment:
/// the first-activation field is claimed with a compare-and-set, and a
/// re-evaluation of the same qualifying investment is absorbed by the
/// uniqueness guard on (ancestor, descendant, investment, level).
pub async fn distribute<C: ConnectionTrait>(
    db: &C,
    investment: &InvestmentModel,
) -> Result<u64, EngineError> {
    let start = investment.start_date.ok_or_else(|| {
        EngineError::Integrity("Commission fan-out requires an activated investment.".to_owned())
    })?;

    let claim = db
        .execute(Statement::from_sql_and_values(
            sql_stmt::DB_BACKEND,
            sql_stmt::CLAIM_FIRST_ACTIVATION,
            vec![investment.owner_account.to_owned().into(), start.into()],
        ))
        .await?;
    if claim.rows_affected() == 0 {
        let account = Account::find_by_id(investment.owner_account.to_owned())
            .one(db)
            .await?;
        let same_activation =
            matches!(account, Some(ref account) if account.first_activated_at == Some(start));
        if !same_activation {
            info!(
                "commission fan-out skipped for {}: investment {} is not the first activation",
                investment.owner_account, investment.id
            );
            return Ok(0);
        }
    }

    let rates = RateTable::load(db).await?;
    let edges = ReferralEdge::find()
        .filter(EdgeColumn::DescendantAccount.eq(investment.owner_account.to_owned()))
        .order_by_asc(EdgeColumn::Level)
        .all(db)
        .await?;
    if edges.is_empty() {
        return Ok(0);
    }

    let now = Utc::now().timestamp();
    let mut records: Vec<CommissionActiveModel> = Vec::with_capacity(edges.len());
    for edge in &edges {
        let rate = rates.rate_for(edge.level).ok_or_else(|| {
            EngineError::Integrity(format!(
                "No commission rate configured for level {}.",
                edge.level
            ))
        })?;
        records.push(CommissionActiveModel {
            id: ActiveValue::NotSet,
            ancestor_account: ActiveValue::Set(edge.ancestor_account.to_owned()),
            descendant_account: ActiveValue::Set(edge.descendant_account.to_owned()),
            investment_id: ActiveValue::Set(investment.id),
            level: ActiveValue::Set(edge.level),
            base_amount: ActiveValue::Set(investment.amount),
            commission_amount: ActiveValue::Set(commission_for(investment.amount, rate)),
            created_at: ActiveValue::Set(now),
        });
    }

    let inserted = CommissionRecord::insert_many(records)
        .on_conflict(
            OnConflict::columns([
                CommissionColumn::AncestorAccount,
                CommissionColumn::DescendantAccount,
                CommissionColumn::InvestmentId,
                CommissionColumn::Level,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_rates() -> RateTable {
        RateTable::from_pairs(&[
            (1, Decimal::from(10)),
            (2, Decimal::from(8)),
            (3, Decimal::from(6)),
            (4, Decimal::from(4)),
            (5, Decimal::from(2)),
            (6, Decimal::from(2)),
            (7, Decimal::from(2)),
            (8, Decimal::from(2)),
            (9, Decimal::from(2)),
            (10, Decimal::from(2)),
        ])
    }

    #[test]
    fn level_one_pays_ten_percent_of_principal() {
        let rates = default_rates();
        let commission =
            commission_for(Decimal::from(10_000), rates.rate_for(1).unwrap());
        assert_eq!(commission, Decimal::from(1_000));
    }

    #[test]
    fn two_level_chain_scenario() {
        // A refers B, B refers C; C activates a 10000 investment.
        // B is C's level-1 ancestor, A the level-2 ancestor.
        let rates = default_rates();
        let amount = Decimal::from(10_000);
        let edges = vec![("B", 1i16), ("A", 2i16)];
        let payouts: Vec<(&str, Decimal)> = edges
            .iter()
            .map(|(ancestor, level)| {
                (
                    *ancestor,
                    commission_for(amount, rates.rate_for(*level).unwrap()),
                )
            })
            .collect();
        assert_eq!(payouts[0], ("B", Decimal::from(1_000)));
        assert_eq!(payouts[1], ("A", Decimal::from(800)));
    }

    #[test]
    fn deep_levels_pay_two_percent() {
        let rates = default_rates();
        for level in 5..=10 {
            let commission =
                commission_for(Decimal::from(10_000), rates.rate_for(level).unwrap());
            assert_eq!(commission, Decimal::from(200));
        }
    }

    #[test]
    fn commission_rounds_to_two_decimals() {
        // 33.33 * 2% = 0.6666 -> 0.67
        let commission = commission_for(
            Decimal::from_str_radix("33.33", 10).unwrap(),
            Decimal::from(2),
        );
        assert_eq!(commission, Decimal::from_str_radix("0.67", 10).unwrap());
    }

    #[test]
    fn unconfigured_level_has_no_rate() {
        let rates = RateTable::from_pairs(&[(1, Decimal::from(10))]);
        assert!(rates.rate_for(2).is_none());
    }
}
