//! Storage contracts required by the provider plus the in-memory implementation.
//!
//! The provider never persists anything itself: every record goes through a
//! [`CredentialStore`], and verifiers optionally through a [`VerifierStore`]. Stores are injected
//! as trait objects at build time.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Client, RequestToken, VerifierRecord},
	nonce::{NonceKey, NonceOutcome},
};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for clients, tokens, and nonces.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the client registered under `client_key`.
	fn get_client<'a>(&'a self, client_key: &'a str) -> StoreFuture<'a, Option<Client>>;

	/// Fetches a request token by its public value.
	fn get_request_token<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<RequestToken>>;

	/// Persists or replaces a request token.
	fn save_request_token(&self, token: RequestToken) -> StoreFuture<'_, ()>;

	/// Removes a request token once it has been exchanged.
	fn invalidate_request_token<'a>(
		&'a self,
		client_key: &'a str,
		token: &'a str,
	) -> StoreFuture<'a, ()>;

	/// Fetches an access token owned by `client_key`.
	fn get_access_token<'a>(
		&'a self,
		client_key: &'a str,
		token: &'a str,
	) -> StoreFuture<'a, Option<AccessToken>>;

	/// Persists or replaces an access token.
	fn save_access_token(&self, token: AccessToken) -> StoreFuture<'_, ()>;

	/// Returns the recorded nonce matching `key`, if any.
	fn get_nonce<'a>(&'a self, key: &'a NonceKey) -> StoreFuture<'a, Option<NonceKey>>;

	/// Records a nonce.
	fn save_nonce(&self, key: NonceKey) -> StoreFuture<'_, ()>;

	/// Records `key` unless it already exists.
	///
	/// The provided implementation is a lookup followed by a save and is therefore not atomic;
	/// backends shared between concurrent requests should override it with a single
	/// conditional insert.
	fn insert_nonce_if_absent(&self, key: NonceKey) -> StoreFuture<'_, NonceOutcome> {
		Box::pin(async move {
			if self.get_nonce(&key).await?.is_some() {
				return Ok(NonceOutcome::Replayed);
			}

			self.save_nonce(key).await?;

			Ok(NonceOutcome::Accepted)
		})
	}
}

/// Optional persistence for authorization verifiers.
pub trait VerifierStore
where
	Self: Send + Sync,
{
	/// Fetches the record for `verifier` issued against `token`.
	fn get_verifier<'a>(
		&'a self,
		verifier: &'a str,
		token: &'a str,
	) -> StoreFuture<'a, Option<VerifierRecord>>;

	/// Persists a verifier record, replacing any verifier previously bound to the same token.
	fn save_verifier(&self, record: VerifierRecord) -> StoreFuture<'_, ()>;
}

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde/bincode) surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
