pub mod account;
pub mod transaction;
pub mod user;

pub use account::{AccountType, BankAccount, Currency, SORT_CODE};
pub use transaction::{Transaction, TransactionType};
pub use user::{Address, User};
