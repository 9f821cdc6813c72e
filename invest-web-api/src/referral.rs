use crate::error::EngineError;
use crate::sql_stmt;
use chrono::Utc;
use invest_db_entity::db::account::{
    ActiveModel as AccountActiveModel, Column as AccountColumn, Entity as Account,
};
use invest_db_entity::db::referral_edge::{
    ActiveModel as EdgeActiveModel, Column as EdgeColumn, Entity as ReferralEdge,
};
use rand::Rng;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Statement, TransactionTrait,
};
use tracing::{info, warn};

pub const MAX_DIRECT_REFERRALS: i16 = 10;
pub const MAX_CHAIN_DEPTH: i16 = 10;

const REFERRAL_CODE_LEN: usize = 6;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_CODE_ATTEMPTS: usize = 8;
const REFERRAL_CODE_CONSTRAINT: &str = "account_referral_code_key";

/// A registration that loses a referral-code race to a concurrent insert
/// surfaces as a unique-violation on the account table's referral_code
/// constraint. Such a loss is retried with a fresh code, not reported.
fn is_referral_code_clash(error: &DbErr) -> bool {
    let message = error.to_string();
    message.contains("duplicate key") && message.contains(REFERRAL_CODE_CONSTRAINT)
}

pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Ancestor chain for a freshly invited account: the inviter sits at
/// level 1 and every ancestor of the inviter moves one level further out.
/// Anything past level 10 is dropped.
pub fn ancestor_levels(
    inviter_account: &str,
    inviter_edges: &[(String, i16)],
) -> Vec<(String, i16)> {
    let mut levels = vec![(inviter_account.to_owned(), 1)];
    for (ancestor, level) in inviter_edges {
        let lifted = level + 1;
        if lifted > MAX_CHAIN_DEPTH {
            continue;
        }
        levels.push((ancestor.to_owned(), lifted));
    }
    levels.sort_by_key(|(_, level)| *level);
    levels
}

/// Creates the account row, resolves the inviter code and materializes the
/// referral edges, all in one transaction. Referral failures (unknown code,
/// inviter at the cap) never fail the registration itself.
pub async fn register_account(
    db: &DatabaseConnection,
    account_id: &str,
    invited_by_code: Option<&str>,
) -> Result<String, EngineError> {
    if account_id.trim().is_empty() {
        return Err(EngineError::Validation(
            "Account id must not be empty.".to_owned(),
        ));
    }
    let existing = Account::find_by_id(account_id.to_owned()).one(db).await?;
    if existing.is_some() {
        return Err(EngineError::StateConflict(
            "Account is already registered.".to_owned(),
        ));
    }

    let invited_by_code = invited_by_code
        .map(|code| code.trim())
        .filter(|code| !code.is_empty());
    let now = Utc::now().timestamp();

    for _ in 0..MAX_CODE_ATTEMPTS {
        let referral_code = generate_referral_code();
        let clash = Account::find()
            .filter(AccountColumn::ReferralCode.eq(referral_code.to_owned()))
            .one(db)
            .await?;
        if clash.is_some() {
            continue;
        }

        let txn = db.begin().await?;

        let account = AccountActiveModel {
            account_id: ActiveValue::Set(account_id.to_owned()),
            referral_code: ActiveValue::Set(referral_code.to_owned()),
            invited_by_code: ActiveValue::Set(invited_by_code.map(|code| code.to_owned())),
            direct_referrals: ActiveValue::Set(0),
            first_activated_at: ActiveValue::Set(None),
            bank_destination: ActiveValue::Set(None),
            bank_verified: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
        };
        match Account::insert(account).exec(&txn).await {
            Ok(_) => {}
            Err(error) if is_referral_code_clash(&error) => {
                // Lost the code to a concurrent registration; redraw.
                txn.rollback().await?;
                continue;
            }
            Err(error) => return Err(error.into()),
        }

        if let Some(code) = invited_by_code {
            match attach_to_inviter(&txn, account_id, code, now).await {
                Ok(edges) => {
                    info!(
                        "account {} attached under inviter code {}: {} edges",
                        account_id, code, edges
                    );
                }
                Err(EngineError::Capacity(message)) => {
                    // Registration must not be blocked by referral failures
                    warn!("referral skipped for {}: {}", account_id, message);
                }
                Err(error) => return Err(error),
            }
        }

        txn.commit().await?;
        return Ok(referral_code);
    }

    Err(EngineError::Integrity(
        "Could not allocate a unique referral code.".to_owned(),
    ))
}

/// Claims a direct-referral slot with a single conditional update, then
/// copies the inviter's own chain one level further out. The slot claim is
/// the only guard against two registrations racing for slot number ten.
async fn attach_to_inviter<C: ConnectionTrait>(
    db: &C,
    account_id: &str,
    inviter_code: &str,
    now: i64,
) -> Result<usize, EngineError> {
    let claim = db
        .execute(Statement::from_sql_and_values(
            sql_stmt::DB_BACKEND,
            sql_stmt::CLAIM_REFERRAL_SLOT,
            vec![inviter_code.to_owned().into(), MAX_DIRECT_REFERRALS.into()],
        ))
        .await?;
    if claim.rows_affected() == 0 {
        return Err(EngineError::Capacity(format!(
            "Inviter code {} is unknown or already has {} direct referrals.",
            inviter_code, MAX_DIRECT_REFERRALS
        )));
    }

    let inviter = Account::find()
        .filter(AccountColumn::ReferralCode.eq(inviter_code.to_owned()))
        .one(db)
        .await?
        .ok_or_else(|| {
            EngineError::Integrity(format!(
                "Inviter code {} claimed a slot but has no account row.",
                inviter_code
            ))
        })?;

    let inviter_edges: Vec<(String, i16)> = ReferralEdge::find()
        .filter(EdgeColumn::DescendantAccount.eq(inviter.account_id.to_owned()))
        .order_by_asc(EdgeColumn::Level)
        .all(db)
        .await?
        .into_iter()
        .map(|edge| (edge.ancestor_account, edge.level))
        .collect();

    let chain = ancestor_levels(&inviter.account_id, &inviter_edges);
    let edges: Vec<EdgeActiveModel> = chain
        .iter()
        .map(|(ancestor, level)| EdgeActiveModel {
            id: ActiveValue::NotSet,
            ancestor_account: ActiveValue::Set(ancestor.to_owned()),
            descendant_account: ActiveValue::Set(account_id.to_owned()),
            level: ActiveValue::Set(*level),
            created_at: ActiveValue::Set(now),
        })
        .collect();
    ReferralEdge::insert_many(edges)
        .exec_without_returning(db)
        .await?;

    Ok(chain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(ancestor: &str, level: i16) -> (String, i16) {
        (ancestor.to_owned(), level)
    }

    #[test]
    fn referral_code_is_six_uppercase_alphanumerics() {
        for _ in 0..50 {
            let code = generate_referral_code();
            assert_eq!(code.len(), 6);
            assert!(code
                .bytes()
                .all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit()));
        }
    }

    #[test]
    fn a_lost_code_race_is_recognised_for_retry() {
        use sea_orm::RuntimeErr;
        let code_clash = DbErr::Exec(RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"account_referral_code_key\""
                .to_owned(),
        ));
        assert!(is_referral_code_clash(&code_clash));

        // a duplicate account id is a genuine conflict, not a redraw
        let pkey_clash = DbErr::Exec(RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"account_pkey\"".to_owned(),
        ));
        assert!(!is_referral_code_clash(&pkey_clash));

        let unrelated = DbErr::RecordNotFound("account".to_owned());
        assert!(!is_referral_code_clash(&unrelated));
    }

    #[test]
    fn inviter_without_ancestors_yields_single_edge() {
        let chain = ancestor_levels("alice", &[]);
        assert_eq!(chain, vec![edge("alice", 1)]);
    }

    #[test]
    fn three_deep_chain_yields_three_edges() {
        // carol was invited by bob, bob by alice
        let inviter_edges = vec![edge("bob", 1), edge("alice", 2)];
        let chain = ancestor_levels("carol", &inviter_edges);
        assert_eq!(
            chain,
            vec![edge("carol", 1), edge("bob", 2), edge("alice", 3)]
        );
    }

    #[test]
    fn chain_is_capped_at_level_ten() {
        let inviter_edges: Vec<(String, i16)> = (1..=10)
            .map(|level| edge(&format!("ancestor{}", level), level))
            .collect();
        let chain = ancestor_levels("inviter", &inviter_edges);
        assert_eq!(chain.len(), 10);
        assert_eq!(chain[0], edge("inviter", 1));
        assert_eq!(chain[9], edge("ancestor9", 10));
        assert!(chain.iter().all(|(_, level)| *level <= MAX_CHAIN_DEPTH));
    }

    #[test]
    fn levels_are_unique_and_ordered() {
        let inviter_edges = vec![edge("d", 3), edge("b", 1), edge("c", 2)];
        let chain = ancestor_levels("a", &inviter_edges);
        let levels: Vec<i16> = chain.iter().map(|(_, level)| *level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4]);
    }
}
