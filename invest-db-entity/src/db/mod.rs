pub mod account;
pub mod commission_rate;
pub mod commission_record;
pub mod earning;
pub mod investment;
pub mod referral_edge;
pub mod withdrawal;
pub mod withdrawal_settings;
