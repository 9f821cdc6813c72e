use crate::dto::{
    parse_amount, AdminToken, AuthToken, CreateInvestmentRequest, DecisionRequest,
    InvestmentDetails, ResponseData, SubmitProofRequest, RESPONSE_OK,
};
use crate::lifecycle;
use crate::pool::Db;
use chrono::Utc;
use rocket::serde::json::Json;
use sea_orm_rocket::Connection;
use tracing::{info, warn};

#[post("/investments", format = "application/json", data = "<create_request>")]
pub async fn create(
    conn: Connection<'_, Db>,
    auth_token: AuthToken<'_>,
    create_request: Json<CreateInvestmentRequest>,
) -> Json<ResponseData<InvestmentDetails>> {
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
    match lifecycle::create_investment(db, auth_token.account_id(), amount).await {
        Ok(investment) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(InvestmentDetails::new(&investment)),
        )),
        Err(engine_error) => {
            warn!("create_investment failed: {}", engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}

#[post(
    "/investments/<id>/proof",
    format = "application/json",
    data = "<proof_request>"
)]
pub async fn submit_proof(
    conn: Connection<'_, Db>,
    auth_token: AuthToken<'_>,
    id: i64,
    proof_request: Json<SubmitProofRequest>,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    match lifecycle::submit_proof(
        db,
        id,
        auth_token.account_id(),
        &proof_request.proof_reference,
    )
    .await
    {
        Ok(()) => Json(ResponseData::new(RESPONSE_OK, "".to_owned(), None)),
        Err(engine_error) => {
            warn!("submit_proof failed for {}: {}", id, engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}

#[post("/investments/<id>/cancel")]
pub async fn cancel(
    conn: Connection<'_, Db>,
    auth_token: AuthToken<'_>,
    id: i64,
) -> Json<ResponseData<&'static str>> {
    let db = conn.into_inner();
    match lifecycle::cancel_investment(db, id, auth_token.account_id()).await {
        Ok(()) => Json(ResponseData::new(RESPONSE_OK, "".to_owned(), None)),
        Err(engine_error) => {
            warn!("cancel_investment failed for {}: {}", id, engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}

#[post(
    "/investments/<id>/decision",
    format = "application/json",
    data = "<decision_request>"
)]
pub async fn decide(
    conn: Connection<'_, Db>,
    _admin_token: AdminToken<'_>,
    id: i64,
    decision_request: Json<DecisionRequest>,
) -> Json<ResponseData<InvestmentDetails>> {
    let db = conn.into_inner();
    match lifecycle::decide(
        db,
        id,
        decision_request.approved,
        decision_request.notes.to_owned(),
    )
    .await
    {
        Ok(investment) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(InvestmentDetails::new(&investment)),
        )),
        Err(engine_error) => {
            warn!("decide failed for {}: {}", id, engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}

#[post("/investments/complete_due")]
pub async fn complete_due(
    conn: Connection<'_, Db>,
    _admin_token: AdminToken<'_>,
) -> Json<ResponseData<u64>> {
    let db = conn.into_inner();
    match lifecycle::complete_due_investments(db, Utc::now().timestamp()).await {
        Ok(completed) => {
            info!("{} investments completed", completed);
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some(completed)))
        }
        Err(engine_error) => {
            warn!("complete_due failed: {}", engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}
