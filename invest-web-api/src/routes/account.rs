use crate::dto::{
    AccountSummary, AuthToken, RegisterRequest, RegisterResponse, ResponseData,
    RESPONSE_BAD_REQUEST, RESPONSE_INTERNAL_ERROR, RESPONSE_OK,
};
use crate::pool::Db;
use crate::{referral, sql_stmt};
use invest_db_entity::db::account::Entity as Account;
use invest_db_entity::db::referral_edge::{Column as EdgeColumn, Entity as ReferralEdge};
use rocket::serde::json::Json;
use sea_orm::prelude::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Statement};
use sea_orm_rocket::Connection;
use tracing::{error, warn};

#[post("/register", format = "application/json", data = "<register_request>")]
pub async fn register(
    conn: Connection<'_, Db>,
    auth_token: AuthToken<'_>,
    register_request: Json<RegisterRequest>,
) -> Json<ResponseData<RegisterResponse>> {
    let db = conn.into_inner();
    match referral::register_account(
        db,
        auth_token.account_id(),
        register_request.inviter_code.as_deref(),
    )
    .await
    {
        Ok(referral_code) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(RegisterResponse { referral_code }),
        )),
        Err(engine_error) => {
            warn!("register failed: {}", engine_error);
            Json(ResponseData::new(
                engine_error.response_code(),
                engine_error.to_string(),
                None,
            ))
        }
    }
}

#[get("/account", format = "application/json")]
pub async fn summary(
    conn: Connection<'_, Db>,
    auth_token: AuthToken<'_>,
) -> Json<ResponseData<AccountSummary>> {
    let db = conn.into_inner();
    let account_id = auth_token.account_id().to_owned();

    let account = match Account::find_by_id(account_id.to_owned()).one(db).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            let message = format!("Account not found: {}.", account_id);
            warn!("{}", message);
            return Json(ResponseData::new(RESPONSE_BAD_REQUEST, message, None));
        }
        Err(db_error) => {
            error!("Error fetching account: {:?}", db_error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "System error. Please contact administrator!".to_owned(),
                None,
            ));
        }
    };

    let network_size = match ReferralEdge::find()
        .filter(EdgeColumn::AncestorAccount.eq(account_id.to_owned()))
        .count(db)
        .await
    {
        Ok(count) => count as i64,
        Err(db_error) => {
            warn!("Error counting referral network: {:?}", db_error);
            0
        }
    };

    let commission_earned = match db
        .query_one(Statement::from_sql_and_values(
            sql_stmt::DB_BACKEND,
            sql_stmt::COMMISSION_EARNED_TOTAL,
            vec![account_id.into()],
        ))
        .await
    {
        Ok(Some(row)) => row.try_get::<Decimal>("", "total").unwrap_or(Decimal::ZERO),
        Ok(None) => Decimal::ZERO,
        Err(db_error) => {
            warn!("Error summing commission: {:?}", db_error);
            Decimal::ZERO
        }
    };

    let summary = AccountSummary {
        account_id: account.account_id,
        referral_code: account.referral_code,
        direct_referrals: account.direct_referrals,
        first_activated_at: account.first_activated_at,
        network_size,
        commission_earned: commission_earned.to_string(),
    };
    Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some(summary)))
}
