//! Framework-agnostic OAuth 1.0a provider core: signature validation, replay protection, and the
//! three-legged request-token, authorization, and access-token flows behind a pluggable
//! credential store.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod nonce;
pub mod obs;
pub mod request;
pub mod response;
pub mod signature;
pub mod store;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and adapter demos.

	pub use crate::_prelude::*;

	// crates.io
	use rand::{Rng, distr::Alphanumeric};
	// self
	use crate::{
		auth::{Client, ClientKey, RealmSet},
		config::ProviderConfig,
		endpoints::Provider,
		request::OAuthRequest,
		signature::{self, SignatureMethod, SigningKey},
		store::{CredentialStore, MemoryStore, VerifierStore},
	};

	/// Consumer key shared by the integration test fixtures.
	pub const TEST_CLIENT_KEY: &str = "ck1";
	/// Consumer secret shared by the integration test fixtures.
	pub const TEST_CLIENT_SECRET: &str = "cs1";
	/// Callback registered for the fixture client.
	pub const TEST_REDIRECT_URI: &str = "https://client.example.com/callback";

	/// Configuration used across integration tests; key lengths are relaxed so short fixture
	/// identifiers such as `ck1` pass the format checks.
	pub fn test_config() -> ProviderConfig {
		ProviderConfig::builder()
			.key_length(2, 64)
			.realms(["email", "profile", "photos"])
			.build()
			.expect("Test provider configuration should be valid.")
	}

	/// Builds the fixture client with `email` and `profile` default realms.
	pub fn test_client() -> Client {
		Client::new(
			ClientKey::new(TEST_CLIENT_KEY).expect("Fixture client key should be valid."),
			TEST_CLIENT_SECRET,
		)
		.with_redirect_uris([TEST_REDIRECT_URI])
		.with_default_realms(
			RealmSet::new(["email", "profile"]).expect("Fixture realms should be valid."),
		)
	}

	/// Constructs a [`Provider`] backed by an in-memory store seeded with [`test_client`].
	pub fn build_test_provider(config: ProviderConfig) -> (Provider, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());

		store_backend.insert_client(test_client());

		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let provider = Provider::builder()
			.config(config)
			.store(store)
			.build()
			.expect("Test provider should build with a wired store.");

		(provider, store_backend)
	}

	/// Same as [`build_test_provider`] but also wires the in-memory store as verifier store.
	pub fn build_test_provider_with_verifiers(
		config: ProviderConfig,
	) -> (Provider, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());

		store_backend.insert_client(test_client());

		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let verifiers: Arc<dyn VerifierStore> = store_backend.clone();
		let provider = Provider::builder()
			.config(config)
			.store(store)
			.verifier_store(verifiers)
			.build()
			.expect("Test provider should build with wired stores.");

		(provider, store_backend)
	}

	/// Client-side request signer used to drive the provider from tests.
	///
	/// Produces an `Authorization: OAuth ...` header carrying every protocol parameter.
	#[derive(Clone, Debug)]
	pub struct TestSigner {
		client_key: String,
		client_secret: String,
		token: Option<(String, String)>,
		method: SignatureMethod,
		rsa_private_key: Option<String>,
		nonce: Option<String>,
		timestamp: Option<i64>,
		realm: Option<String>,
		params: Vec<(String, String)>,
		body: Option<String>,
	}
	impl TestSigner {
		/// Creates a signer for the provided consumer credentials using HMAC-SHA1.
		pub fn new(client_key: impl Into<String>, client_secret: impl Into<String>) -> Self {
			Self {
				client_key: client_key.into(),
				client_secret: client_secret.into(),
				token: None,
				method: SignatureMethod::HmacSha1,
				rsa_private_key: None,
				nonce: None,
				timestamp: None,
				realm: None,
				params: Vec::new(),
				body: None,
			}
		}

		/// Signer for the fixture client.
		pub fn fixture() -> Self {
			Self::new(TEST_CLIENT_KEY, TEST_CLIENT_SECRET)
		}

		/// Attaches a request or access token and its secret.
		pub fn token(mut self, token: impl Into<String>, secret: impl Into<String>) -> Self {
			self.token = Some((token.into(), secret.into()));

			self
		}

		/// Overrides the signature method.
		pub fn method(mut self, method: SignatureMethod) -> Self {
			self.method = method;

			self
		}

		/// Signs with RSA using the provided PKCS#8 or PKCS#1 private key.
		pub fn rsa_private_key(mut self, pem: impl Into<String>) -> Self {
			self.rsa_private_key = Some(pem.into());

			self
		}

		/// Pins the nonce (random by default).
		pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
			self.nonce = Some(nonce.into());

			self
		}

		/// Pins the timestamp (current time by default).
		pub fn timestamp(mut self, timestamp: i64) -> Self {
			self.timestamp = Some(timestamp);

			self
		}

		/// Sets the `realm` header parameter.
		pub fn realm(mut self, realm: impl Into<String>) -> Self {
			self.realm = Some(realm.into());

			self
		}

		/// Adds an extra protocol parameter such as `oauth_callback` or `oauth_verifier`.
		pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
			self.params.push((name.into(), value.into()));

			self
		}

		/// Sends a form-encoded body alongside the signed header.
		pub fn form_body(mut self, body: impl Into<String>) -> Self {
			self.body = Some(body.into());

			self
		}

		/// Produces a signed request for `method` + `uri`.
		pub fn sign(&self, method: &str, uri: &str) -> OAuthRequest {
			let nonce = self.nonce.clone().unwrap_or_else(|| {
				rand::rng().sample_iter(Alphanumeric).take(24).map(char::from).collect()
			});
			let timestamp =
				self.timestamp.unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp());
			let mut oauth = vec![
				("oauth_consumer_key".to_owned(), self.client_key.clone()),
				("oauth_signature_method".to_owned(), self.method.as_str().to_owned()),
				("oauth_timestamp".to_owned(), timestamp.to_string()),
				("oauth_nonce".to_owned(), nonce),
				("oauth_version".to_owned(), "1.0".to_owned()),
			];

			if let Some((token, _)) = &self.token {
				oauth.push(("oauth_token".to_owned(), token.clone()));
			}

			oauth.extend(self.params.iter().cloned());

			let mut request =
				OAuthRequest::new(method, uri).expect("Test request URI should parse.");

			if let Some(body) = &self.body {
				request = request
					.with_header("Content-Type", "application/x-www-form-urlencoded")
					.with_body(body.clone());
			}

			let mut signed_params = request.query_pairs();

			signed_params.extend(request.form_pairs());
			signed_params.extend(oauth.iter().cloned());

			let base = signature::signature_base_string(method, &request.uri, &signed_params);
			let key = match &self.rsa_private_key {
				Some(pem) => SigningKey::RsaPrivate(pem),
				None => SigningKey::Shared {
					client_secret: &self.client_secret,
					token_secret: self.token.as_ref().map(|(_, secret)| secret.as_str()),
				},
			};
			let signature = signature::sign(self.method, &base, key)
				.expect("Test signer should produce a signature.");

			oauth.push(("oauth_signature".to_owned(), signature));

			let mut header = String::from("OAuth ");

			if let Some(realm) = &self.realm {
				header.push_str(&format!("realm=\"{}\", ", signature::percent_encode(realm)));
			}

			let rendered = oauth
				.iter()
				.map(|(name, value)| format!("{name}=\"{}\"", signature::percent_encode(value)))
				.collect::<Vec<_>>()
				.join(", ");

			header.push_str(&rendered);

			request.with_header("Authorization", header)
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, HashSet},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use {serde_json as _, tokio as _};
