//! Registered client (consumer) model.

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, RealmSet, TokenSecret},
};

/// Callback value marking an out-of-band client that cannot receive redirects.
pub const OUT_OF_BAND: &str = "oob";

/// Client registration as returned by the credential store; read-only to the provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct Client {
	/// Consumer key; unique per client.
	pub client_key: ClientKey,
	/// Shared secret used for HMAC signatures.
	pub client_secret: TokenSecret,
	/// Registered callback URIs; the first entry doubles as the default.
	#[serde(default)]
	pub redirect_uris: Vec<String>,
	/// Realms the client may request.
	#[serde(default)]
	pub default_realms: RealmSet,
	/// PEM encoded RSA public key used for `RSA-SHA*` signatures.
	#[serde(default)]
	pub rsa_key: Option<String>,
}
impl Client {
	/// Creates a client with no registered callbacks or realms.
	pub fn new(client_key: ClientKey, client_secret: impl Into<String>) -> Self {
		Self {
			client_key,
			client_secret: TokenSecret::new(client_secret),
			redirect_uris: Vec::new(),
			default_realms: RealmSet::default(),
			rsa_key: None,
		}
	}

	/// Replaces the registered callback URIs.
	pub fn with_redirect_uris<I, S>(mut self, uris: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.redirect_uris = uris.into_iter().map(Into::into).collect();

		self
	}

	/// Replaces the default realms.
	pub fn with_default_realms(mut self, realms: RealmSet) -> Self {
		self.default_realms = realms;

		self
	}

	/// Attaches an RSA public key (SPKI or PKCS#1 PEM).
	pub fn with_rsa_key(mut self, pem: impl Into<String>) -> Self {
		self.rsa_key = Some(pem.into());

		self
	}

	/// First registered callback URI, if any.
	pub fn default_redirect_uri(&self) -> Option<&str> {
		self.redirect_uris.first().map(String::as_str)
	}

	/// Returns `true` when `uri` exactly matches a registered callback.
	pub fn has_redirect_uri(&self, uri: &str) -> bool {
		self.redirect_uris.iter().any(|registered| registered == uri)
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("client_key", &self.client_key)
			.field("client_secret", &"<redacted>")
			.field("redirect_uris", &self.redirect_uris)
			.field("default_realms", &self.default_realms)
			.field("rsa_key_set", &self.rsa_key.is_some())
			.finish()
	}
}
