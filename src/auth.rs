//! Auth-domain identifiers, realm sets, clients, and token models.

pub mod client;
pub mod id;
pub mod realm;
pub mod token;

pub use client::*;
pub use id::*;
pub use realm::*;
pub use token::{record::*, secret::*, verifier::*};
