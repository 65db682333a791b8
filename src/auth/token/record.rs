//! Request-token and access-token records.

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, RealmSet, TokenKey, token::secret::TokenSecret},
};

/// Which leg of the protocol a token belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
	/// Temporary credential used during the authorization handshake.
	Request,
	/// Token credential used to sign protected-resource requests.
	Access,
}
impl TokenKind {
	/// Returns a stable label suitable for messages and log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenKind::Request => "request",
			TokenKind::Access => "access",
		}
	}
}
impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Current lifecycle status for an access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is usable.
	Active,
	/// Token has been revoked and must not be accepted.
	Revoked,
}

/// Temporary credential ("grant") issued by the request-token endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct RequestToken {
	/// Public token identifier (`oauth_token`).
	pub token: TokenKey,
	/// Token secret combined with the client secret when signing.
	pub secret: TokenSecret,
	/// Owning client.
	pub client_key: ClientKey,
	/// Callback confirmed for this token, `oob` for out-of-band clients.
	pub redirect_uri: Option<String>,
	/// Realms requested when the token was issued.
	#[serde(default)]
	pub realms: RealmSet,
	/// Verifier bound to this token once the user approved it.
	pub verifier: Option<TokenSecret>,
	/// Credentials supplied by the authorization decision (e.g. the approving user).
	#[serde(default)]
	pub credentials: BTreeMap<String, String>,
}
impl RequestToken {
	/// Creates an unauthorized request token.
	pub fn new(token: TokenKey, secret: TokenSecret, client_key: ClientKey) -> Self {
		Self {
			token,
			secret,
			client_key,
			redirect_uri: None,
			realms: RealmSet::default(),
			verifier: None,
			credentials: BTreeMap::new(),
		}
	}

	/// Sets the confirmed callback URI.
	pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(uri.into());

		self
	}

	/// Sets the requested realms.
	pub fn with_realms(mut self, realms: RealmSet) -> Self {
		self.realms = realms;

		self
	}

	/// Returns `true` when the token belongs to `client_key`.
	pub fn belongs_to(&self, client_key: &str) -> bool {
		self.client_key.as_ref() == client_key
	}

	/// Returns `true` once a verifier has been bound to the token.
	pub fn is_authorized(&self) -> bool {
		self.verifier.is_some()
	}
}
impl Debug for RequestToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestToken")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.field("client_key", &self.client_key)
			.field("redirect_uri", &self.redirect_uri)
			.field("realms", &self.realms)
			.field("verifier", &self.verifier.as_ref().map(|_| "<redacted>"))
			.field("credentials", &self.credentials)
			.finish()
	}
}

/// Token credential issued by the access-token endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
	/// Public token identifier (`oauth_token`).
	pub token: TokenKey,
	/// Token secret combined with the client secret when signing.
	pub secret: TokenSecret,
	/// Owning client.
	pub client_key: ClientKey,
	/// Realms granted to the token.
	#[serde(default)]
	pub realms: RealmSet,
	/// Credentials carried over from the authorization decision.
	#[serde(default)]
	pub credentials: BTreeMap<String, String>,
	/// Issue instant.
	pub issued_at: OffsetDateTime,
	/// Revocation instant if the token has been revoked.
	pub revoked_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Creates an active access token issued now.
	pub fn new(token: TokenKey, secret: TokenSecret, client_key: ClientKey) -> Self {
		Self {
			token,
			secret,
			client_key,
			realms: RealmSet::default(),
			credentials: BTreeMap::new(),
			issued_at: OffsetDateTime::now_utc(),
			revoked_at: None,
		}
	}

	/// Sets the granted realms.
	pub fn with_realms(mut self, realms: RealmSet) -> Self {
		self.realms = realms;

		self
	}

	/// Sets the authorization credentials.
	pub fn with_credentials(mut self, credentials: BTreeMap<String, String>) -> Self {
		self.credentials = credentials;

		self
	}

	/// Overrides the issue instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = instant;

		self
	}

	/// Computes the lifecycle status.
	pub fn status(&self) -> TokenStatus {
		if self.revoked_at.is_some() { TokenStatus::Revoked } else { TokenStatus::Active }
	}

	/// Returns `true` if the token has been revoked.
	pub fn is_revoked(&self) -> bool {
		self.revoked_at.is_some()
	}

	/// Marks the token as revoked.
	pub fn revoke(&mut self, instant: OffsetDateTime) {
		self.revoked_at = Some(instant);
	}

	/// Returns `true` when the token belongs to `client_key`.
	pub fn belongs_to(&self, client_key: &str) -> bool {
		self.client_key.as_ref() == client_key
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.field("client_key", &self.client_key)
			.field("realms", &self.realms)
			.field("credentials", &self.credentials)
			.field("issued_at", &self.issued_at)
			.field("revoked_at", &self.revoked_at)
			.finish()
	}
}
