//! User Service: validation, digesting and persistence of users

mod errors;
mod user;
mod validation;

pub use errors::UserError;
pub use user::{Health, UserService};
pub use validation::{MAX_PASSWORD_BYTES, validate_name, validate_password};
