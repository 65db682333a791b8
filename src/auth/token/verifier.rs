//! Verifier records binding an authorization decision to a request token.

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, TokenKey, TokenSecret},
};

/// One-time verifier issued when the resource owner approves a request token.
#[derive(Clone, Serialize, Deserialize)]
pub struct VerifierRecord {
	/// Verifier value (`oauth_verifier`).
	pub verifier: TokenSecret,
	/// Request token the verifier is bound to.
	pub token: TokenKey,
	/// Client that owns the request token.
	pub client_key: ClientKey,
	/// Credentials supplied by the authorization decision.
	#[serde(default)]
	pub credentials: BTreeMap<String, String>,
}
impl VerifierRecord {
	/// Returns `true` when the record was issued for `token` and `client_key`.
	pub fn binds(&self, token: &str, client_key: &str) -> bool {
		self.token.as_ref() == token && self.client_key.as_ref() == client_key
	}
}
impl Debug for VerifierRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("VerifierRecord")
			.field("verifier", &"<redacted>")
			.field("token", &self.token)
			.field("client_key", &self.client_key)
			.field("credentials", &self.credentials)
			.finish()
	}
}
