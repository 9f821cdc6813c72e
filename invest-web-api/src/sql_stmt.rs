use sea_orm::DbBackend;

pub const DB_BACKEND: DbBackend = DbBackend::Postgres;

/// Atomic check-and-increment of the inviter's direct-referral counter.
/// Zero rows affected means the code is unknown or the cap is reached.
pub const CLAIM_REFERRAL_SLOT: &str = r#"UPDATE public.account
    SET direct_referrals = direct_referrals + 1
    WHERE referral_code = $1 AND direct_referrals < $2"#;

/// Compare-and-set on the first-activation field. Only the activation
/// that wins this update fans commission out.
pub const CLAIM_FIRST_ACTIVATION: &str = r#"UPDATE public.account
    SET first_activated_at = $2
    WHERE account_id = $1 AND first_activated_at IS NULL"#;

pub const PAID_EARNINGS_TOTAL: &str = r#"SELECT COALESCE(SUM(amount), 0) AS total
    FROM public.earning
    WHERE owner_account = $1 AND status = 'paid'"#;

pub const HELD_WITHDRAWALS_TOTAL: &str = r#"SELECT COALESCE(SUM(amount), 0) AS total
    FROM public.withdrawal
    WHERE owner_account = $1 AND status IN ('pending', 'processing')"#;

pub const COMMISSION_EARNED_TOTAL: &str = r#"SELECT COALESCE(SUM(commission_amount), 0) AS total
    FROM public.commission_record
    WHERE ancestor_account = $1"#;
