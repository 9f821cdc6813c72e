use crate::error::EngineError;
use chrono::{DateTime, LocalResult, Months, TimeZone, Utc};
use invest_db_entity::db::earning::{ActiveModel as EarningActiveModel, Entity as Earning};
use invest_db_entity::db::investment::Model as InvestmentModel;
use sea_orm::prelude::Decimal;
use sea_orm::{ActiveValue, ConnectionTrait, EntityTrait};

pub const PAYOUT_MONTHS: u32 = 40;
const MONTHLY_ROI_PERCENT: i64 = 5;

pub const EARNING_PENDING: &str = "pending";

pub fn monthly_roi(amount: Decimal) -> Decimal {
    (amount * Decimal::from(MONTHLY_ROI_PERCENT) / Decimal::from(100)).round_dp(2)
}

/// One payout per calendar month after the start date, month 1 first.
pub fn schedule_dates(start: DateTime<Utc>) -> Result<Vec<i64>, EngineError> {
    let mut dates = Vec::with_capacity(PAYOUT_MONTHS as usize);
    for month in 1..=PAYOUT_MONTHS {
        let date = start
            .checked_add_months(Months::new(month))
            .ok_or_else(|| EngineError::Validation("Payout date out of range.".to_owned()))?;
        dates.push(date.timestamp());
    }
    Ok(dates)
}

/// Writes the full earning schedule for a freshly activated investment.
/// Runs inside the activation transaction so a failed insert rolls the
/// activation back with it.
pub async fn generate_schedule<C: ConnectionTrait>(
    db: &C,
    investment: &InvestmentModel,
) -> Result<u64, EngineError> {
    let start_ts = investment.start_date.ok_or_else(|| {
        EngineError::Integrity("Payout schedule requires an activated investment.".to_owned())
    })?;
    let start = match Utc.timestamp_opt(start_ts, 0) {
        LocalResult::Single(start) => start,
        _ => {
            return Err(EngineError::Validation(
                "Investment start date is not a valid timestamp.".to_owned(),
            ))
        }
    };

    let roi = monthly_roi(investment.amount);
    let earnings: Vec<EarningActiveModel> = schedule_dates(start)?
        .into_iter()
        .map(|payout_date| EarningActiveModel {
            id: ActiveValue::NotSet,
            investment_id: ActiveValue::Set(investment.id),
            owner_account: ActiveValue::Set(investment.owner_account.to_owned()),
            amount: ActiveValue::Set(roi),
            payout_date: ActiveValue::Set(payout_date),
            status: ActiveValue::Set(EARNING_PENDING.to_owned()),
            paid_at: ActiveValue::Set(None),
        })
        .collect();

    let inserted = Earning::insert_many(earnings)
        .exec_without_returning(db)
        .await?;
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_roi_is_five_percent() {
        assert_eq!(monthly_roi(Decimal::from(10_000)), Decimal::from(500));
        assert_eq!(monthly_roi(Decimal::from(1_000)), Decimal::from(50));
    }

    #[test]
    fn monthly_roi_rounds_to_two_decimals() {
        let amount = Decimal::from_str_radix("333.33", 10).unwrap();
        // 333.33 * 0.05 = 16.6665 -> 16.67
        assert_eq!(
            monthly_roi(amount),
            Decimal::from_str_radix("16.67", 10).unwrap()
        );
    }

    #[test]
    fn schedule_has_forty_monthly_dates() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let dates = schedule_dates(start).unwrap();
        assert_eq!(dates.len(), PAYOUT_MONTHS as usize);
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(dates[0] > start.timestamp());
    }

    #[test]
    fn schedule_spans_forty_calendar_months() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let dates = schedule_dates(start).unwrap();
        let last = start.checked_add_months(Months::new(PAYOUT_MONTHS)).unwrap();
        assert_eq!(*dates.last().unwrap(), last.timestamp());
    }
}
