mod store;
mod types;

pub(crate) use store::UserStore;
pub use types::User;
