use crate::error::EngineError;
use crate::pool::InvestConfig;
use invest_db_entity::db::investment::Model as InvestmentModel;
use sea_orm::prelude::Decimal;
use invest_db_entity::db::withdrawal::Model as WithdrawalModel;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Display, EnumString)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvestmentStatus {
    PendingProof,
    PendingApproval,
    Active,
    Rejected,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Display, EnumString)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RegisterRequest {
    pub inviter_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RegisterResponse {
    pub referral_code: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AccountSummary {
    pub account_id: String,
    pub referral_code: String,
    pub direct_referrals: i16,
    pub first_activated_at: Option<i64>,
    pub network_size: i64,
    pub commission_earned: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CreateInvestmentRequest {
    pub amount: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SubmitProofRequest {
    pub proof_reference: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DecisionRequest {
    pub approved: bool,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct InvestmentDetails {
    pub id: i64,
    pub owner_account: String,
    pub amount: String,
    pub status: String,
    pub proof_reference: Option<String>,
    pub created_at: i64,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

impl InvestmentDetails {
    pub fn new(investment: &InvestmentModel) -> InvestmentDetails {
        InvestmentDetails {
            id: investment.id,
            owner_account: investment.owner_account.to_owned(),
            amount: investment.amount.to_string(),
            status: investment.status.to_owned(),
            proof_reference: investment.proof_reference.to_owned(),
            created_at: investment.created_at,
            start_date: investment.start_date,
            end_date: investment.end_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CreateWithdrawalRequest {
    pub amount: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ProcessWithdrawalRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WithdrawalDetails {
    pub id: i64,
    pub owner_account: String,
    pub amount: String,
    pub bank_destination: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub processed_at: Option<i64>,
}

impl WithdrawalDetails {
    pub fn new(withdrawal: &WithdrawalModel) -> WithdrawalDetails {
        WithdrawalDetails {
            id: withdrawal.id,
            owner_account: withdrawal.owner_account.to_owned(),
            amount: withdrawal.amount.to_string(),
            bank_destination: withdrawal.bank_destination.to_owned(),
            status: withdrawal.status.to_owned(),
            notes: withdrawal.notes.to_owned(),
            created_at: withdrawal.created_at,
            processed_at: withdrawal.processed_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct EligibilityDetails {
    pub eligible: bool,
    pub reason: String,
    pub available_balance: String,
    pub fee: String,
    pub processing_sla_hours: i32,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ResponseData<T> {
    pub code: Option<u16>,
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ResponseData<T> {
    pub fn new(code: u16, message: String, data: Option<T>) -> ResponseData<T> {
        ResponseData {
            code: Some(code),
            status_code: None,
            message,
            data,
        }
    }
}

pub fn parse_amount(raw: &str) -> Result<Decimal, EngineError> {
    Decimal::from_str_radix(raw.trim(), 10)
        .map_err(|_| EngineError::Validation(format!("Invalid amount: {}", raw)))
}

pub const RESPONSE_OK: u16 = 200;
pub const RESPONSE_BAD_REQUEST: u16 = 400;
pub const RESPONSE_CONFLICT: u16 = 409;
pub const RESPONSE_INTERNAL_ERROR: u16 = 500;

/// Authenticated account identity, resolved by the external session layer
/// and forwarded as a trusted header.
#[derive(Debug)]
pub struct AuthToken<'r>(&'r str);

#[derive(Debug)]
pub enum ApiKeyError {
    Missing,
    Invalid,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken<'r> {
    type Error = ApiKeyError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.headers().get_one("X-Account-Id") {
            None => Outcome::Failure((Status::BadRequest, ApiKeyError::Missing)),
            Some(account_id) => Outcome::Success(AuthToken(account_id)),
        }
    }
}

impl<'r> AuthToken<'r> {
    pub fn account_id(&self) -> &str {
        self.0
    }
}

impl<'r> fmt::Display for AuthToken<'r> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// Administrator key. Role resolution is external; this only checks the
/// shared key handed out to the admin surface.
#[derive(Debug)]
pub struct AdminToken<'r>(&'r str);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken<'r> {
    type Error = ApiKeyError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let key = match req.headers().get_one("X-Admin-Key") {
            None => return Outcome::Failure((Status::BadRequest, ApiKeyError::Missing)),
            Some(key) => key,
        };
        match req.rocket().state::<InvestConfig>() {
            Some(config) if config.admin_api_key == key => Outcome::Success(AdminToken(key)),
            _ => Outcome::Failure((Status::Forbidden, ApiKeyError::Invalid)),
        }
    }
}
