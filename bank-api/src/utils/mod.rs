pub mod id;
pub mod password;
pub mod validation;

pub use id::{new_account_number, new_transaction_id, new_user_id, MAX_ID_ATTEMPTS};
pub use password::{hash_password, verify_password};
pub use validation::ValidatedJson;
