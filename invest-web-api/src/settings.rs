use crate::error::EngineError;
use invest_db_entity::db::commission_rate::Entity as CommissionRate;
use invest_db_entity::db::withdrawal_settings::{
    Entity as WithdrawalSettings, Model as WithdrawalSettingsModel,
};
use sea_orm::prelude::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait};
use std::collections::HashMap;

/// Immutable snapshot of the level -> rate-percent table, loaded once per
/// operation so an administrative rate change cannot corrupt in-flight math.
#[derive(Clone, Debug)]
pub struct RateTable {
    rates: HashMap<i16, Decimal>,
}

impl RateTable {
    pub async fn load<C: ConnectionTrait>(db: &C) -> Result<RateTable, EngineError> {
        let rows = CommissionRate::find().all(db).await?;
        let rates = rows
            .into_iter()
            .map(|row| (row.level, row.rate_percent))
            .collect();
        Ok(RateTable { rates })
    }

    pub fn from_pairs(pairs: &[(i16, Decimal)]) -> RateTable {
        RateTable {
            rates: pairs.iter().cloned().collect(),
        }
    }

    pub fn rate_for(&self, level: i16) -> Option<Decimal> {
        self.rates.get(&level).copied()
    }
}

/// Per-operation snapshot of the singleton withdrawal settings row.
#[derive(Clone, Debug, PartialEq)]
pub struct WithdrawalLimits {
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub fee_percent: Decimal,
    pub min_balance_required: Decimal,
    pub processing_sla_hours: i32,
}

pub const WITHDRAWAL_SETTINGS_ROW: i16 = 1;

impl WithdrawalLimits {
    pub async fn load<C: ConnectionTrait>(db: &C) -> Result<WithdrawalLimits, EngineError> {
        let row: Option<WithdrawalSettingsModel> =
            WithdrawalSettings::find_by_id(WITHDRAWAL_SETTINGS_ROW)
                .one(db)
                .await?;
        match row {
            Some(row) => Ok(WithdrawalLimits {
                min_amount: row.min_amount,
                max_amount: row.max_amount,
                fee_percent: row.fee_percent,
                min_balance_required: row.min_balance_required,
                processing_sla_hours: row.processing_sla_hours,
            }),
            None => Err(EngineError::Integrity(
                "Withdrawal settings are not configured.".to_owned(),
            )),
        }
    }
}
