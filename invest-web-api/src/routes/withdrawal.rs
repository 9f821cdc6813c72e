use crate::dto::{
    parse_amount, AdminToken, AuthToken, CreateWithdrawalRequest, EligibilityDetails,
    ProcessWithdrawalRequest, ResponseData, WithdrawalDetails, WithdrawalStatus,
    RESPONSE_BAD_REQUEST, RESPONSE_OK,
};
use crate::pool::Db;
use crate::withdrawal;
use rocket::serde::json::Json;
use sea_orm_rocket::Connection;
use std::str::FromStr;
use tracing::warn;

#[get("/withdrawals/eligibility?<amount>", format = "application/json")]
pub async fn eligibility(
    conn: Connection<'_, Db>,
    auth_token: AuthToken<'_>,
    amount: String,
) -> Json<ResponseData<EligibilityDetails>> {
    let db = conn.into_inner();
    let amount = match parse_amount(&amount) {
        Ok(amount) => amount,
        Err(engine_error) => {
            return Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    };
    match withdrawal::check_eligibility(db, auth_token.account_id(), amount).await {
        Ok(eligibility) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(EligibilityDetails {
                eligible: eligibility.eligible,
                reason: eligibility.reason,
                available_balance: eligibility.available_balance.to_string(),
                fee: eligibility.fee.to_string(),
                processing_sla_hours: eligibility.processing_sla_hours,
            }),
        )),
        Err(engine_error) => {
            warn!("eligibility check failed: {}", engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}

#[post("/withdrawals", format = "application/json", data = "<create_request>")]
pub async fn create(
    conn: Connection<'_, Db>,
    auth_token: AuthToken<'_>,
    create_request: Json<CreateWithdrawalRequest>,
) -> Json<ResponseData<WithdrawalDetails>> {
    let db = conn.into_inner();
    let amount = match parse_amount(&create_request.amount) {
        Ok(amount) => amount,
        Err(engine_error) => {
            return Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    };
    match withdrawal::create_withdrawal(db, auth_token.account_id(), amount).await {
        Ok(created) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(WithdrawalDetails::new(&created)),
        )),
        Err(engine_error) => {
            warn!("create_withdrawal failed: {}", engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}

#[post("/withdrawals/<id>/cancel")]
pub async fn cancel(
    conn: Connection<'_, Db>,
    auth_token: AuthToken<'_>,
    id: i64,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    match withdrawal::cancel_withdrawal(db, id, auth_token.account_id()).await {
        Ok(()) => Json(ResponseData::new(RESPONSE_OK, "".to_owned(), None)),
        Err(engine_error) => {
            warn!("cancel_withdrawal failed for {}: {}", id, engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}

#[post(
    "/withdrawals/<id>/process",
    format = "application/json",
    data = "<process_request>"
)]
pub async fn process(
    conn: Connection<'_, Db>,
    _admin_token: AdminToken<'_>,
    id: i64,
    process_request: Json<ProcessWithdrawalRequest>,
) -> Json<ResponseData<WithdrawalDetails>> {
    let db = conn.into_inner();
    let new_status = match WithdrawalStatus::from_str(&process_request.status) {
        Ok(status) => status,
        Err(_) => {
            let message = format!("Unknown withdrawal status: {}", process_request.status);
            warn!("{}", message);
            return Json(ResponseData::new(RESPONSE_BAD_REQUEST, message, None));
        }
    };
    match withdrawal::process_withdrawal(db, id, new_status, process_request.notes.to_owned())
        .await
    {
        Ok(processed) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(WithdrawalDetails::new(&processed)),
        )),
        Err(engine_error) => {
            warn!("process_withdrawal failed for {}: {}", id, engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}
