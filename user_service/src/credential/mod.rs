//! Credential Codec: salted, iterated password digests

mod codec;
mod errors;

pub use codec::{CredentialCodec, DIGEST_SCHEME};
pub use errors::CredentialError;
