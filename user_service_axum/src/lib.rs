mod error;
mod health;
mod router;
mod types;
mod user;

#[cfg(test)]
mod test_utils;

pub use error::{ErrorBody, ErrorDetail, ErrorResponse, IntoResponseError};
pub use router::{MAX_BODY_BYTES, user_service_router, user_service_router_no_trace};

// Re-export the core types so applications only need this crate
pub use user_service::{ConfigError, ServiceConfig, User, UserError, UserService};
