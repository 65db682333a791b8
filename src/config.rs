//! Provider configuration: signature allow-list, credential formats, transport policy, realms,
//! error page location, and the timestamp window.

// self
use crate::{
	_prelude::*,
	auth::{IDENTIFIER_MAX_LEN, RealmSet},
	error::ConfigError,
	nonce::DEFAULT_TIMESTAMP_TOLERANCE,
	signature::{DEFAULT_SIGNATURE_METHODS, SignatureMethod},
};

/// Error page used when neither an explicit URI nor a resolvable endpoint is configured.
pub const DEFAULT_ERROR_URI: &str = "/oauth/errors";

/// Inclusive length range for client keys, tokens, nonces, and verifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLength {
	/// Shortest accepted value.
	pub min: usize,
	/// Longest accepted value; also the length of generated tokens and secrets.
	pub max: usize,
}
impl KeyLength {
	/// Returns `true` when `len` falls inside the range.
	pub fn contains(&self, len: usize) -> bool {
		(self.min..=self.max).contains(&len)
	}
}
impl Default for KeyLength {
	fn default() -> Self {
		Self { min: 20, max: 30 }
	}
}

/// Runtime options consumed by [`Provider`](crate::endpoints::Provider).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
	/// Signature methods accepted by every flow.
	pub signature_methods: Vec<SignatureMethod>,
	/// Length range for protocol identifiers.
	pub key_length: KeyLength,
	/// Rejects plaintext requests when enabled.
	pub enforce_ssl: bool,
	/// Realms the provider knows about; empty means unrestricted.
	pub realms: RealmSet,
	/// Explicit error page URI.
	pub error_uri: Option<String>,
	/// Named error endpoint resolved by the host when no explicit URI is set.
	pub error_endpoint: Option<String>,
	/// Accepted clock skew for `oauth_timestamp` in seconds; `None` disables the check.
	pub timestamp_tolerance: Option<u64>,
}
impl ProviderConfig {
	/// Starts a builder seeded with defaults.
	pub fn builder() -> ProviderConfigBuilder {
		ProviderConfigBuilder::default()
	}

	/// Checks the configuration invariants.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.signature_methods.is_empty() {
			return Err(ConfigError::NoSignatureMethods);
		}
		if self.key_length.min == 0
			|| self.key_length.min > self.key_length.max
			|| self.key_length.max > IDENTIFIER_MAX_LEN
		{
			return Err(ConfigError::InvalidKeyLength {
				min: self.key_length.min,
				max: self.key_length.max,
			});
		}
		if self.error_uri.as_deref().is_some_and(|uri| uri.trim().is_empty()) {
			return Err(ConfigError::EmptyErrorUri);
		}

		Ok(())
	}

	/// Returns `true` when `method` is on the allow-list.
	pub fn allows(&self, method: SignatureMethod) -> bool {
		self.signature_methods.contains(&method)
	}

	/// Validates the length and character set of a protocol identifier named `param`.
	pub fn check_key(&self, param: &str, value: &str) -> Result<()> {
		if self.key_length.contains(value.chars().count())
			&& value.chars().all(|c| c.is_ascii_alphanumeric())
		{
			Ok(())
		} else {
			Err(Error::invalid_request(format!("Parameter {param} has an invalid format.")))
		}
	}

	/// Returns `true` when every requested realm is known to the provider.
	pub fn knows_realms(&self, requested: &RealmSet) -> bool {
		self.realms.is_empty() || self.realms.is_superset_of(requested)
	}
}
impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			signature_methods: DEFAULT_SIGNATURE_METHODS.to_vec(),
			key_length: KeyLength::default(),
			enforce_ssl: true,
			realms: RealmSet::default(),
			error_uri: None,
			error_endpoint: None,
			timestamp_tolerance: Some(DEFAULT_TIMESTAMP_TOLERANCE),
		}
	}
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
	config: ProviderConfig,
	realms: Option<Vec<String>>,
}
impl ProviderConfigBuilder {
	/// Replaces the signature allow-list.
	pub fn signature_methods<I>(mut self, methods: I) -> Self
	where
		I: IntoIterator<Item = SignatureMethod>,
	{
		self.config.signature_methods = methods.into_iter().collect();

		self
	}

	/// Sets the identifier length range.
	pub fn key_length(mut self, min: usize, max: usize) -> Self {
		self.config.key_length = KeyLength { min, max };

		self
	}

	/// Toggles HTTPS enforcement.
	pub fn enforce_ssl(mut self, enforce: bool) -> Self {
		self.config.enforce_ssl = enforce;

		self
	}

	/// Sets the realms known to the provider; validated on [`build`](Self::build).
	pub fn realms<I, S>(mut self, realms: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.realms = Some(realms.into_iter().map(Into::into).collect());

		self
	}

	/// Sets an explicit error page URI.
	pub fn error_uri(mut self, uri: impl Into<String>) -> Self {
		self.config.error_uri = Some(uri.into());

		self
	}

	/// Names an error endpoint the host resolves into a URI.
	pub fn error_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.config.error_endpoint = Some(endpoint.into());

		self
	}

	/// Sets the timestamp tolerance in seconds; `None` disables the check.
	pub fn timestamp_tolerance(mut self, seconds: Option<u64>) -> Self {
		self.config.timestamp_tolerance = seconds;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		let mut config = self.config;

		if let Some(realms) = self.realms {
			config.realms = RealmSet::new(realms)?;
		}

		config.validate()?;

		Ok(config)
	}
}
