//! Timestamp freshness and nonce replay protection.
//!
//! A nonce is unique per (client, timestamp, nonce, token) tuple. The tracker rejects timestamps
//! outside the tolerance window first, then asks the store to record the tuple atomically so that
//! exactly one of several concurrent identical requests is accepted.

// self
use crate::{_prelude::*, store::CredentialStore};

/// Default tolerance between `oauth_timestamp` and server time, in seconds.
pub const DEFAULT_TIMESTAMP_TOLERANCE: u64 = 600;

/// Identity of one signed request for replay detection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonceKey {
	/// Consumer key.
	pub client_key: String,
	/// `oauth_timestamp` in seconds since the epoch.
	pub timestamp: i64,
	/// `oauth_nonce`.
	pub nonce: String,
	/// Request token, when the request is an access-token exchange.
	pub request_token: Option<String>,
	/// Access token, when the request targets a protected resource.
	pub access_token: Option<String>,
}
impl NonceKey {
	/// Creates a key not bound to any token.
	pub fn new(client_key: impl Into<String>, timestamp: i64, nonce: impl Into<String>) -> Self {
		Self {
			client_key: client_key.into(),
			timestamp,
			nonce: nonce.into(),
			request_token: None,
			access_token: None,
		}
	}

	/// Binds the key to a request token.
	pub fn with_request_token(mut self, token: impl Into<String>) -> Self {
		self.request_token = Some(token.into());

		self
	}

	/// Binds the key to an access token.
	pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(token.into());

		self
	}
}

/// Result of an atomic check-and-record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NonceOutcome {
	/// First use; the key is now recorded.
	Accepted,
	/// The key was recorded earlier.
	Replayed,
}

/// Enforces the timestamp window and nonce uniqueness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NonceTracker {
	tolerance: Option<Duration>,
}
impl NonceTracker {
	/// Creates a tracker; `None` disables the timestamp window.
	pub fn new(tolerance_secs: Option<u64>) -> Self {
		let tolerance = tolerance_secs
			.map(|secs| Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));

		Self { tolerance }
	}

	/// Configured tolerance, if any.
	pub fn tolerance(&self) -> Option<Duration> {
		self.tolerance
	}

	/// Oldest timestamp the window still accepts at `now`.
	///
	/// Nonces recorded with an earlier timestamp can never be replayed successfully, so stores
	/// may discard them. `None` when the window is disabled.
	pub fn prune_horizon(&self, now: OffsetDateTime) -> Option<i64> {
		self.tolerance
			.map(|tolerance| now.unix_timestamp().saturating_sub(tolerance.whole_seconds()))
	}

	/// Rejects timestamps further than the tolerance from `now`.
	pub fn check_timestamp(&self, timestamp: i64, now: OffsetDateTime) -> Result<()> {
		let Some(tolerance) = self.tolerance else {
			return Ok(());
		};
		let skew = now.unix_timestamp().abs_diff(timestamp);

		if !i64::try_from(skew).is_ok_and(|skew| skew <= tolerance.whole_seconds()) {
			return Err(Error::StaleTimestamp);
		}

		Ok(())
	}

	/// Atomically records `key`, reporting whether it had been seen before.
	pub async fn check(&self, store: &dyn CredentialStore, key: NonceKey) -> Result<NonceOutcome> {
		Ok(store.insert_nonce_if_absent(key).await?)
	}

	/// Timestamp window plus check-and-record; a replay becomes [`Error::ReplayedNonce`].
	pub async fn check_and_record(
		&self,
		store: &dyn CredentialStore,
		key: NonceKey,
		now: OffsetDateTime,
	) -> Result<()> {
		self.check_timestamp(key.timestamp, now)?;

		match self.check(store, key).await? {
			NonceOutcome::Accepted => Ok(()),
			NonceOutcome::Replayed => Err(Error::ReplayedNonce),
		}
	}
}
impl Default for NonceTracker {
	fn default() -> Self {
		Self::new(Some(DEFAULT_TIMESTAMP_TOLERANCE))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::store::MemoryStore;

	const NOW: OffsetDateTime = macros::datetime!(2025-06-01 12:00 UTC);

	#[test]
	fn prune_horizon_follows_the_window() {
		assert_eq!(NonceTracker::default().prune_horizon(NOW), Some(NOW.unix_timestamp() - 600));
		assert_eq!(NonceTracker::new(None).prune_horizon(NOW), None);
	}

	#[test]
	fn timestamp_window_is_symmetric() {
		let tracker = NonceTracker::default();
		let now = NOW.unix_timestamp();

		assert!(tracker.check_timestamp(now - 600, NOW).is_ok());
		assert!(tracker.check_timestamp(now + 600, NOW).is_ok());
		assert!(matches!(tracker.check_timestamp(now - 601, NOW), Err(Error::StaleTimestamp)));
		assert!(matches!(tracker.check_timestamp(now + 601, NOW), Err(Error::StaleTimestamp)));
	}

	#[test]
	fn disabled_window_accepts_any_timestamp() {
		let tracker = NonceTracker::new(None);

		assert!(tracker.check_timestamp(1, NOW).is_ok());
		assert_eq!(tracker.tolerance(), None);
	}

	#[tokio::test]
	async fn second_use_is_a_replay() {
		let tracker = NonceTracker::default();
		let store = MemoryStore::default();
		let key = NonceKey::new("ck1", NOW.unix_timestamp(), "n1");

		tracker
			.check_and_record(&store, key.clone(), NOW)
			.await
			.expect("First nonce use should be accepted.");

		let err = tracker
			.check_and_record(&store, key, NOW)
			.await
			.expect_err("Second nonce use must be rejected.");

		assert!(matches!(err, Error::ReplayedNonce));
	}

	#[tokio::test]
	async fn token_binding_separates_nonces() {
		let tracker = NonceTracker::default();
		let store = MemoryStore::default();
		let base = NonceKey::new("ck1", NOW.unix_timestamp(), "n1");

		assert_eq!(
			tracker.check(&store, base.clone()).await.expect("Unbound nonce should record."),
			NonceOutcome::Accepted
		);
		assert_eq!(
			tracker
				.check(&store, base.clone().with_access_token("at1"))
				.await
				.expect("Token-bound nonce should record."),
			NonceOutcome::Accepted
		);
		assert_eq!(
			tracker.check(&store, base).await.expect("Replay lookup should succeed."),
			NonceOutcome::Replayed
		);
	}

	#[tokio::test]
	async fn stale_requests_do_not_consume_the_nonce() {
		let tracker = NonceTracker::default();
		let store = MemoryStore::default();
		let key = NonceKey::new("ck1", NOW.unix_timestamp() - 3_600, "n1");

		assert!(matches!(
			tracker.check_and_record(&store, key.clone(), NOW).await,
			Err(Error::StaleTimestamp)
		));
		assert_eq!(
			store.get_nonce(&key).await.expect("Nonce lookup should succeed."),
			None
		);
	}
}
