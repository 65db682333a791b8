//! Thread-safe in-memory [`CredentialStore`] and [`VerifierStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Client, RequestToken, VerifierRecord},
	nonce::{NonceKey, NonceOutcome},
	store::{CredentialStore, StoreFuture, VerifierStore},
};

type StoreState = Arc<RwLock<MemoryState>>;

#[derive(Debug, Default)]
struct MemoryState {
	clients: HashMap<String, Client>,
	request_tokens: HashMap<String, RequestToken>,
	access_tokens: HashMap<String, AccessToken>,
	nonces: HashSet<NonceKey>,
	verifiers: HashMap<String, VerifierRecord>,
}

/// Thread-safe storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreState);
impl MemoryStore {
	/// Registers (or replaces) a client.
	pub fn insert_client(&self, client: Client) {
		self.0.write().clients.insert(client.client_key.to_string(), client);
	}

	/// Marks an access token revoked; returns the updated record when it exists.
	pub fn revoke_access_token(&self, token: &str, instant: OffsetDateTime) -> Option<AccessToken> {
		let mut state = self.0.write();
		let record = state.access_tokens.get_mut(token)?;

		record.revoke(instant);

		Some(record.clone())
	}

	/// Number of recorded nonces.
	pub fn nonce_count(&self) -> usize {
		self.0.read().nonces.len()
	}

	/// Drops nonces whose timestamp is older than `horizon` and verifiers whose request token is
	/// gone. Returns the number of nonces removed.
	///
	/// Pass [`NonceTracker::prune_horizon`](crate::nonce::NonceTracker::prune_horizon) so only
	/// nonces the timestamp window already rejects are discarded.
	pub fn prune(&self, horizon: i64) -> usize {
		let mut state = self.0.write();
		let before = state.nonces.len();

		state.nonces.retain(|key| key.timestamp >= horizon);

		let MemoryState { request_tokens, verifiers, .. } = &mut *state;

		verifiers.retain(|token, _| request_tokens.contains_key(token));

		before - state.nonces.len()
	}

	fn insert_nonce_now(state: StoreState, key: NonceKey) -> NonceOutcome {
		if state.write().nonces.insert(key) {
			NonceOutcome::Accepted
		} else {
			NonceOutcome::Replayed
		}
	}
}
impl CredentialStore for MemoryStore {
	fn get_client<'a>(&'a self, client_key: &'a str) -> StoreFuture<'a, Option<Client>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().clients.get(client_key).cloned()) })
	}

	fn get_request_token<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<RequestToken>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().request_tokens.get(token).cloned()) })
	}

	fn save_request_token(&self, token: RequestToken) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			state.write().request_tokens.insert(token.token.to_string(), token);

			Ok(())
		})
	}

	fn invalidate_request_token<'a>(
		&'a self,
		client_key: &'a str,
		token: &'a str,
	) -> StoreFuture<'a, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			let mut state = state.write();

			if state.request_tokens.get(token).is_some_and(|record| record.belongs_to(client_key)) {
				state.request_tokens.remove(token);
				state.verifiers.remove(token);
			}

			Ok(())
		})
	}

	fn get_access_token<'a>(
		&'a self,
		client_key: &'a str,
		token: &'a str,
	) -> StoreFuture<'a, Option<AccessToken>> {
		let state = self.0.clone();

		Box::pin(async move {
			Ok(state
				.read()
				.access_tokens
				.get(token)
				.filter(|record| record.belongs_to(client_key))
				.cloned())
		})
	}

	fn save_access_token(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			state.write().access_tokens.insert(token.token.to_string(), token);

			Ok(())
		})
	}

	fn get_nonce<'a>(&'a self, key: &'a NonceKey) -> StoreFuture<'a, Option<NonceKey>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().nonces.get(key).cloned()) })
	}

	fn save_nonce(&self, key: NonceKey) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			state.write().nonces.insert(key);

			Ok(())
		})
	}

	fn insert_nonce_if_absent(&self, key: NonceKey) -> StoreFuture<'_, NonceOutcome> {
		let state = self.0.clone();

		Box::pin(async move { Ok(Self::insert_nonce_now(state, key)) })
	}
}
impl VerifierStore for MemoryStore {
	fn get_verifier<'a>(
		&'a self,
		verifier: &'a str,
		token: &'a str,
	) -> StoreFuture<'a, Option<VerifierRecord>> {
		let state = self.0.clone();

		Box::pin(async move {
			Ok(state
				.read()
				.verifiers
				.get(token)
				.filter(|record| record.verifier.verify(verifier))
				.cloned())
		})
	}

	fn save_verifier(&self, record: VerifierRecord) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			state.write().verifiers.insert(record.token.to_string(), record);

			Ok(())
		})
	}
}
