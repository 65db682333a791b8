//! Provider-level error types shared across endpoints, validators, and stores.

// self
use crate::{_prelude::*, auth::TokenKind, response, signature::SignatureError};

/// Provider-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical per-request error produced while validating an OAuth 1.0a request.
///
/// Every variant maps onto a stable OAuth error code and HTTP status so adapters can render
/// the `application/x-www-form-urlencoded` error body (or the error-page redirect) without
/// inspecting the variant themselves.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure; the request is rejected, never retried.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),

	/// Plaintext request received while SSL is enforced.
	#[error("Only HTTPS connections are permitted.")]
	InsecureTransport,
	/// Missing, duplicated, or malformed protocol parameters.
	#[error("{reason}")]
	InvalidRequest {
		/// Human-readable reason string.
		reason: String,
	},
	/// Unknown client key.
	#[error("Client credentials are invalid.")]
	InvalidClient,
	/// Unknown, foreign, revoked, or already exchanged token.
	#[error("The {kind} token is invalid.")]
	InvalidToken {
		/// Which token leg failed.
		kind: TokenKind,
	},
	/// Signature did not verify.
	#[error("Invalid signature.")]
	InvalidSignature(#[source] SignatureError),
	/// Signature method is unknown or not on the allow-list.
	#[error("Signature method `{method}` is not allowed.")]
	InvalidSignatureMethod {
		/// Method string presented by the client.
		method: String,
	},
	/// The (client, timestamp, nonce, token) tuple was already used.
	#[error("Nonce has already been used.")]
	ReplayedNonce,
	/// The timestamp falls outside the configured tolerance window.
	#[error("Timestamp is outside the accepted window.")]
	StaleTimestamp,
	/// Callback URI is missing or not registered for the client.
	#[error("Redirect URI is not registered for this client.")]
	InvalidRedirectUri,
	/// Requested realms exceed what is permitted.
	#[error("Requested realms are not permitted.")]
	InvalidRealm,
	/// Verifier does not match the request token and client.
	#[error("Verifier is invalid.")]
	InvalidVerifier,
}
impl Error {
	/// Builds an [`Error::InvalidRequest`] with the provided reason.
	pub fn invalid_request(reason: impl Into<String>) -> Self {
		Self::InvalidRequest { reason: reason.into() }
	}

	/// Stable OAuth error code rendered in the `error` field.
	pub const fn error_code(&self) -> &'static str {
		match self {
			Self::Storage(_) => "server_error",
			Self::InsecureTransport => "insecure_transport_protocol",
			Self::InvalidRequest { .. } => "invalid_request",
			Self::InvalidClient => "invalid_client",
			Self::InvalidToken { .. } => "invalid_token",
			Self::InvalidSignature(_) => "invalid_signature",
			Self::InvalidSignatureMethod { .. } => "invalid_signature_method",
			Self::ReplayedNonce => "replayed_nonce",
			Self::StaleTimestamp => "stale_timestamp",
			Self::InvalidRedirectUri => "invalid_redirect_uri",
			Self::InvalidRealm => "invalid_realm",
			Self::InvalidVerifier => "invalid_verifier",
		}
	}

	/// HTTP status used when the error is rendered as a token-endpoint response.
	pub const fn status_code(&self) -> u16 {
		match self {
			Self::Storage(_) => 500,
			Self::InvalidClient
			| Self::InvalidToken { .. }
			| Self::InvalidSignature(_)
			| Self::InvalidVerifier => 401,
			_ => 400,
		}
	}

	/// `error` + `error_description` pairs in rendering order.
	pub fn twotuples(&self) -> Vec<(&'static str, String)> {
		vec![("error", self.error_code().to_owned()), ("error_description", self.to_string())]
	}

	/// Form-encoded error body.
	pub fn urlencoded(&self) -> String {
		response::urlencode(self.twotuples())
	}

	/// Appends the error pairs to `uri`, preserving any existing query and fragment.
	pub fn in_uri(&self, uri: &str) -> String {
		response::add_params_to_uri(uri, self.twotuples())
	}
}
impl From<SignatureError> for Error {
	fn from(e: SignatureError) -> Self {
		match e {
			SignatureError::InvalidSignatureMethod { method } =>
				Self::InvalidSignatureMethod { method },
			other => Self::InvalidSignature(other),
		}
	}
}

/// Wiring and configuration failures raised while constructing a provider.
///
/// These are fatal at startup; a provider never exists in a half-configured state.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A required store capability was not supplied.
	#[error("Provider is missing the required {capability}.")]
	MissingStore {
		/// Name of the missing capability.
		capability: &'static str,
	},
	/// The signature method allow-list is empty.
	#[error("At least one signature method must be allowed.")]
	NoSignatureMethods,
	/// The key length range is empty or starts at zero.
	#[error("Key length range {min}..={max} is invalid.")]
	InvalidKeyLength {
		/// Lower bound supplied.
		min: usize,
		/// Upper bound supplied.
		max: usize,
	},
	/// A configured realm is empty or contains whitespace.
	#[error("Configured realms are invalid.")]
	InvalidRealm(#[from] crate::auth::RealmValidationError),
	/// The error page location is empty.
	#[error("Error page URI cannot be empty.")]
	EmptyErrorUri,
	/// A named error endpoint was configured but could not be resolved.
	#[error("Error endpoint `{endpoint}` could not be resolved.")]
	UnresolvedErrorEndpoint {
		/// Endpoint name that failed to resolve.
		endpoint: String,
	},
}
