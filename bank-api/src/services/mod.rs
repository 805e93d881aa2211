pub mod account;
pub mod auth;
pub mod jwt;
pub mod repository;
pub mod transaction;
pub mod user;

pub use account::{AccountAccess, AccountPatch, AccountService};
pub use auth::{AuthService, AuthenticatedSession};
pub use jwt::{Claims, JwtService};
pub use transaction::{TransactionInput, TransactionService};
pub use user::{NewUser, UserPatch, UserService};
