pub mod account;
pub mod auth;
pub mod transaction;
pub mod user;

pub use account::{
    BankAccountResponse, CreateBankAccountRequest, ListBankAccountsResponse,
    UpdateBankAccountRequest,
};
pub use auth::{LoginRequest, LoginResponse};
pub use transaction::{CreateTransactionRequest, ListTransactionsResponse, TransactionResponse};
pub use user::{AddressDto, CreateUserRequest, UpdateUserRequest, UserResponse};
