//! Request tokens, access tokens, verifiers, and the redacted secret wrapper they share.

pub mod record;
pub mod secret;
pub mod verifier;
