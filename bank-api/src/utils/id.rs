//! External identifier generation.
//!
//! Generation alone carries no uniqueness guarantee: callers must run a
//! generate-and-existence-check loop against storage, capped at
//! [`MAX_ID_ATTEMPTS`], before persisting a candidate. The storage layer's
//! unique-key constraint remains the final arbiter under concurrency.

use rand::rngs::OsRng;
use rand::Rng;
use uuid::Uuid;

pub const USER_ID_PREFIX: &str = "usr-";
pub const TRANSACTION_ID_PREFIX: &str = "tan-";
/// Two-digit scheme code prefixed to every account number.
pub const ACCOUNT_NUMBER_PREFIX: &str = "01";

/// Cap on generate-and-check retries before giving up with a retryable
/// conflict. The uuid-based id spaces make even a second attempt unlikely;
/// the 10^6 account-number space is the one that occasionally collides.
pub const MAX_ID_ATTEMPTS: u32 = 10;

pub fn new_user_id() -> String {
    format!("{}{}", USER_ID_PREFIX, Uuid::new_v4().simple())
}

pub fn new_transaction_id() -> String {
    format!("{}{}", TRANSACTION_ID_PREFIX, Uuid::new_v4().simple())
}

/// Candidate account number: scheme prefix plus six zero-padded decimal
/// digits. Drawn from the OS CSPRNG; the keyspace is small enough that
/// guessability matters.
pub fn new_account_number() -> String {
    let suffix: u32 = OsRng.gen_range(0..1_000_000);
    format!("{}{:06}", ACCOUNT_NUMBER_PREFIX, suffix)
}
