//! The OAuth 1.0a provider and its endpoint state machines.
//!
//! [`Provider`] owns the configuration, the injected stores, the signature validator, and the
//! nonce tracker. Each flow lives in its own module and adds methods to the provider:
//!
//! - [`request_token`]: temporary credential issuance.
//! - [`authorization`]: resource-owner presentation and confirmation.
//! - [`access_token`]: token credential issuance.
//! - [`resource`]: protected-resource validation and the `require_oauth` guard.
//!
//! Every call runs from "received" to "accepted" or "rejected" exactly once; nothing retries.

pub mod access_token;
pub mod authorization;
pub mod context;
pub mod request_token;
pub mod resource;

mod common;

pub use authorization::*;
pub use context::*;

// self
use crate::{
	_prelude::*,
	config::{DEFAULT_ERROR_URI, ProviderConfig},
	error::ConfigError,
	nonce::NonceTracker,
	signature::SignatureValidator,
	store::{CredentialStore, VerifierStore},
};

/// Host callback that turns a named endpoint into a URI.
pub type EndpointResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// OAuth 1.0a provider bound to a configuration and a set of stores.
///
/// Cloning is cheap; clones share the same stores and configuration.
#[derive(Clone)]
pub struct Provider {
	config: Arc<ProviderConfig>,
	store: Arc<dyn CredentialStore>,
	verifier_store: Option<Arc<dyn VerifierStore>>,
	signatures: SignatureValidator,
	nonces: NonceTracker,
	error_uri: String,
}
impl Provider {
	/// Starts a builder.
	pub fn builder() -> ProviderBuilder {
		ProviderBuilder::default()
	}

	/// Effective configuration.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Error page that authorization failures redirect to.
	pub fn error_uri(&self) -> &str {
		&self.error_uri
	}

	/// Signature validator shared by all flows.
	pub fn signatures(&self) -> &SignatureValidator {
		&self.signatures
	}
}
impl Debug for Provider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Provider")
			.field("config", &self.config)
			.field("verifier_store", &self.verifier_store.is_some())
			.field("error_uri", &self.error_uri)
			.finish()
	}
}

/// Builder wiring a [`Provider`]; fails instead of producing a half-configured provider.
#[derive(Default)]
pub struct ProviderBuilder {
	config: Option<ProviderConfig>,
	store: Option<Arc<dyn CredentialStore>>,
	verifier_store: Option<Arc<dyn VerifierStore>>,
	endpoint_resolver: Option<EndpointResolver>,
}
impl ProviderBuilder {
	/// Sets the configuration; defaults apply otherwise.
	pub fn config(mut self, config: ProviderConfig) -> Self {
		self.config = Some(config);

		self
	}

	/// Sets the required credential store.
	pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = Some(store);

		self
	}

	/// Sets the optional verifier store.
	pub fn verifier_store(mut self, store: Arc<dyn VerifierStore>) -> Self {
		self.verifier_store = Some(store);

		self
	}

	/// Sets the resolver used for `error_endpoint`.
	pub fn endpoint_resolver<F>(mut self, resolver: F) -> Self
	where
		F: Fn(&str) -> Option<String> + Send + Sync + 'static,
	{
		self.endpoint_resolver = Some(Arc::new(resolver));

		self
	}

	/// Validates the wiring and builds the provider.
	pub fn build(self) -> Result<Provider, ConfigError> {
		let config = self.config.unwrap_or_default();

		config.validate()?;

		let store = self.store.ok_or(ConfigError::MissingStore { capability: "credential store" })?;
		let error_uri = match (&config.error_uri, &config.error_endpoint) {
			(Some(uri), _) => uri.clone(),
			(None, Some(endpoint)) => self
				.endpoint_resolver
				.as_ref()
				.and_then(|resolve| resolve(endpoint))
				.filter(|uri| !uri.trim().is_empty())
				.ok_or_else(|| ConfigError::UnresolvedErrorEndpoint {
					endpoint: endpoint.clone(),
				})?,
			(None, None) => DEFAULT_ERROR_URI.to_owned(),
		};

		Ok(Provider {
			signatures: SignatureValidator::new(config.signature_methods.iter().copied()),
			nonces: NonceTracker::new(config.timestamp_tolerance),
			config: Arc::new(config),
			store,
			verifier_store: self.verifier_store,
			error_uri,
		})
	}
}
impl Debug for ProviderBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderBuilder")
			.field("config", &self.config)
			.field("store", &self.store.is_some())
			.field("verifier_store", &self.verifier_store.is_some())
			.field("endpoint_resolver", &self.endpoint_resolver.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	fn store() -> Arc<dyn CredentialStore> {
		Arc::new(MemoryStore::default())
	}

	#[test]
	fn build_requires_a_credential_store() {
		let err = Provider::builder().build().expect_err("Missing store must fail the build.");

		assert_eq!(err, ConfigError::MissingStore { capability: "credential store" });
	}

	#[test]
	fn error_uri_prefers_explicit_value() {
		let config = ProviderConfig::builder()
			.error_uri("https://idp.example/errors")
			.error_endpoint("errors")
			.build()
			.expect("Configuration should be valid.");
		let provider = Provider::builder()
			.config(config)
			.store(store())
			.endpoint_resolver(|_| Some("/ignored".into()))
			.build()
			.expect("Provider should build.");

		assert_eq!(provider.error_uri(), "https://idp.example/errors");
	}

	#[test]
	fn error_endpoint_is_resolved_at_build_time() {
		let config = ProviderConfig::builder()
			.error_endpoint("oauth.errors")
			.build()
			.expect("Configuration should be valid.");
		let provider = Provider::builder()
			.config(config.clone())
			.store(store())
			.endpoint_resolver(|name| (name == "oauth.errors").then(|| "/e/oauth".to_owned()))
			.build()
			.expect("Provider should build.");

		assert_eq!(provider.error_uri(), "/e/oauth");

		let err = Provider::builder()
			.config(config)
			.store(store())
			.build()
			.expect_err("Unresolvable endpoint must fail the build.");

		assert_eq!(err, ConfigError::UnresolvedErrorEndpoint { endpoint: "oauth.errors".into() });
	}

	#[test]
	fn default_error_uri_applies_without_configuration() {
		let provider =
			Provider::builder().store(store()).build().expect("Default provider should build.");

		assert_eq!(provider.error_uri(), DEFAULT_ERROR_URI);
		assert_eq!(provider.signatures().allowed().len(), 2);
	}
}
