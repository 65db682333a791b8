//! Signature methods, verification, and the matching client-side signer.
//!
//! Verification rebuilds the base string from the normalized request and checks it against the
//! presented `oauth_signature`. HMAC tags are compared in constant time; RSA signatures use
//! PKCS#1 v1.5 against the client's registered public key. Verification is pure: the same
//! inputs always yield the same verdict.

pub mod base_string;

pub use base_string::{base_string_uri, normalize_parameters, percent_encode, signature_base_string};

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rsa::{
	RsaPrivateKey, RsaPublicKey,
	pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
	pkcs1v15::{Signature as RsaSignature, SigningKey as RsaSigningKey, VerifyingKey},
	pkcs8::{DecodePrivateKey, DecodePublicKey},
	signature::{SignatureEncoding, Signer, Verifier},
};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, request::OAuthRequest};

/// Methods accepted when the configuration does not override the allow-list.
pub const DEFAULT_SIGNATURE_METHODS: [SignatureMethod; 2] =
	[SignatureMethod::HmacSha1, SignatureMethod::RsaSha1];

/// Signature method named by `oauth_signature_method`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// `HMAC-SHA1`.
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// `HMAC-SHA256`.
	#[serde(rename = "HMAC-SHA256")]
	HmacSha256,
	/// `RSA-SHA1`.
	#[serde(rename = "RSA-SHA1")]
	RsaSha1,
	/// `RSA-SHA256`.
	#[serde(rename = "RSA-SHA256")]
	RsaSha256,
}
impl SignatureMethod {
	/// Wire name of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::HmacSha1 => "HMAC-SHA1",
			Self::HmacSha256 => "HMAC-SHA256",
			Self::RsaSha1 => "RSA-SHA1",
			Self::RsaSha256 => "RSA-SHA256",
		}
	}

	/// Returns `true` for the RSA family, which verifies against the client's public key.
	pub const fn is_rsa(self) -> bool {
		matches!(self, Self::RsaSha1 | Self::RsaSha256)
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SignatureMethod {
	type Err = SignatureError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"HMAC-SHA1" => Ok(Self::HmacSha1),
			"HMAC-SHA256" => Ok(Self::HmacSha256),
			"RSA-SHA1" => Ok(Self::RsaSha1),
			"RSA-SHA256" => Ok(Self::RsaSha256),
			other => Err(SignatureError::InvalidSignatureMethod { method: other.to_owned() }),
		}
	}
}

/// Failures raised while producing or checking a signature.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SignatureError {
	/// Method is unknown or not on the allow-list.
	#[error("Signature method `{method}` is not allowed.")]
	InvalidSignatureMethod {
		/// Method string presented.
		method: String,
	},
	/// The presented signature does not match the request.
	#[error("Signature does not match the request.")]
	SignatureMismatch,
	/// The key material required by the method is unavailable.
	#[error("No key material is available for the signature method.")]
	MissingSecret,
	/// The stored RSA key could not be parsed.
	#[error("RSA key is invalid: {reason}.")]
	InvalidRsaKey {
		/// Parser error message.
		reason: String,
	},
}

/// Key material used to verify a signature.
#[derive(Clone, Copy)]
pub enum VerificationKey<'a> {
	/// HMAC shared secrets.
	Shared {
		/// Client secret.
		client_secret: &'a str,
		/// Request or access token secret, when a token takes part.
		token_secret: Option<&'a str>,
	},
	/// PEM encoded RSA public key (SPKI or PKCS#1).
	RsaPublic(&'a str),
}
impl Debug for VerificationKey<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Shared { token_secret, .. } => f
				.debug_struct("Shared")
				.field("client_secret", &"<redacted>")
				.field("token_secret", &token_secret.map(|_| "<redacted>"))
				.finish(),
			Self::RsaPublic(_) => f.debug_tuple("RsaPublic").finish(),
		}
	}
}

/// Key material used to produce a signature.
#[derive(Clone, Copy)]
pub enum SigningKey<'a> {
	/// HMAC shared secrets.
	Shared {
		/// Client secret.
		client_secret: &'a str,
		/// Request or access token secret, when a token takes part.
		token_secret: Option<&'a str>,
	},
	/// PEM encoded RSA private key (PKCS#8 or PKCS#1).
	RsaPrivate(&'a str),
}
impl Debug for SigningKey<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Shared { .. } => f.write_str("Shared(<redacted>)"),
			Self::RsaPrivate(_) => f.write_str("RsaPrivate(<redacted>)"),
		}
	}
}

/// Allow-list aware signature verifier shared by every flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureValidator {
	allowed: Vec<SignatureMethod>,
}
impl SignatureValidator {
	/// Creates a validator accepting only `allowed`.
	pub fn new(allowed: impl IntoIterator<Item = SignatureMethod>) -> Self {
		Self { allowed: allowed.into_iter().collect() }
	}

	/// Methods on the allow-list.
	pub fn allowed(&self) -> &[SignatureMethod] {
		&self.allowed
	}

	/// Parses `raw` and checks it against the allow-list.
	pub fn resolve_method(&self, raw: &str) -> Result<SignatureMethod, SignatureError> {
		let method = raw.parse::<SignatureMethod>()?;

		if !self.allowed.contains(&method) {
			return Err(SignatureError::InvalidSignatureMethod { method: raw.to_owned() });
		}

		Ok(method)
	}

	/// Verifies `signature` for `request` with the resolved `method` and `key`.
	pub fn verify(
		&self,
		request: &OAuthRequest,
		method: SignatureMethod,
		signature: &str,
		key: VerificationKey<'_>,
	) -> Result<()> {
		if !self.allowed.contains(&method) {
			return Err(
				SignatureError::InvalidSignatureMethod { method: method.to_string() }.into()
			);
		}

		let params = request.signature_params()?;
		let base = signature_base_string(&request.method, &request.uri, &params);

		verify(method, &base, signature, key)?;

		Ok(())
	}
}
impl Default for SignatureValidator {
	fn default() -> Self {
		Self::new(DEFAULT_SIGNATURE_METHODS)
	}
}

/// Checks `signature` (base64) over `base` without consulting an allow-list.
pub fn verify(
	method: SignatureMethod,
	base: &str,
	signature: &str,
	key: VerificationKey<'_>,
) -> Result<(), SignatureError> {
	let presented = STANDARD.decode(signature).map_err(|_| SignatureError::SignatureMismatch)?;

	match (method, key) {
		(SignatureMethod::HmacSha1 | SignatureMethod::HmacSha256, VerificationKey::Shared {
			client_secret,
			token_secret,
		}) => {
			let expected = hmac_tag(method, &hmac_key(client_secret, token_secret), base)?;

			if bool::from(expected.as_slice().ct_eq(&presented)) {
				Ok(())
			} else {
				Err(SignatureError::SignatureMismatch)
			}
		},
		(SignatureMethod::RsaSha1, VerificationKey::RsaPublic(pem)) => {
			let key = VerifyingKey::<Sha1>::new(parse_public_key(pem)?);

			key.verify(base.as_bytes(), &rsa_signature(&presented)?)
				.map_err(|_| SignatureError::SignatureMismatch)
		},
		(SignatureMethod::RsaSha256, VerificationKey::RsaPublic(pem)) => {
			let key = VerifyingKey::<Sha256>::new(parse_public_key(pem)?);

			key.verify(base.as_bytes(), &rsa_signature(&presented)?)
				.map_err(|_| SignatureError::SignatureMismatch)
		},
		_ => Err(SignatureError::MissingSecret),
	}
}

/// Produces the base64 signature of `base`; the client-side counterpart of [`verify`].
pub fn sign(
	method: SignatureMethod,
	base: &str,
	key: SigningKey<'_>,
) -> Result<String, SignatureError> {
	let raw = match (method, key) {
		(SignatureMethod::HmacSha1 | SignatureMethod::HmacSha256, SigningKey::Shared {
			client_secret,
			token_secret,
		}) => hmac_tag(method, &hmac_key(client_secret, token_secret), base)?,
		(SignatureMethod::RsaSha1, SigningKey::RsaPrivate(pem)) =>
			RsaSigningKey::<Sha1>::new(parse_private_key(pem)?).sign(base.as_bytes()).to_vec(),
		(SignatureMethod::RsaSha256, SigningKey::RsaPrivate(pem)) =>
			RsaSigningKey::<Sha256>::new(parse_private_key(pem)?).sign(base.as_bytes()).to_vec(),
		_ => return Err(SignatureError::MissingSecret),
	};

	Ok(STANDARD.encode(raw))
}

fn hmac_key(client_secret: &str, token_secret: Option<&str>) -> String {
	let token_secret = token_secret.unwrap_or_default();

	format!("{}&{}", percent_encode(client_secret), percent_encode(token_secret))
}

fn hmac_tag(method: SignatureMethod, key: &str, base: &str) -> Result<Vec<u8>, SignatureError> {
	match method {
		SignatureMethod::HmacSha1 => {
			let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
				.map_err(|_| SignatureError::MissingSecret)?;

			mac.update(base.as_bytes());

			Ok(mac.finalize().into_bytes().to_vec())
		},
		SignatureMethod::HmacSha256 => {
			let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes())
				.map_err(|_| SignatureError::MissingSecret)?;

			mac.update(base.as_bytes());

			Ok(mac.finalize().into_bytes().to_vec())
		},
		other => Err(SignatureError::InvalidSignatureMethod { method: other.to_string() }),
	}
}

fn rsa_signature(bytes: &[u8]) -> Result<RsaSignature, SignatureError> {
	RsaSignature::try_from(bytes).map_err(|_| SignatureError::SignatureMismatch)
}

fn parse_public_key(pem: &str) -> Result<RsaPublicKey, SignatureError> {
	RsaPublicKey::from_public_key_pem(pem)
		.or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
		.map_err(|e| SignatureError::InvalidRsaKey { reason: e.to_string() })
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, SignatureError> {
	RsaPrivateKey::from_pkcs8_pem(pem)
		.or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
		.map_err(|e| SignatureError::InvalidRsaKey { reason: e.to_string() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const PHOTOS_URI: &str = "http://photos.example.net/photos?file=vacation.jpg&size=original";
	const PHOTOS_BASE: &str = concat!(
		"GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg",
		"%26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh",
		"%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096",
		"%26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
	);
	const RSA_PUBLIC: &str = include_str!("../tests/fixtures/rsa_public.pem");
	const RSA_PRIVATE: &str = include_str!("../tests/fixtures/rsa_private.pem");
	const RSA_PHOTOS_SIGNATURE: &str = include_str!("../tests/fixtures/rsa_sha1_photos.sig");

	fn photos_key() -> VerificationKey<'static> {
		VerificationKey::Shared {
			client_secret: "kd94hf93k423kf44",
			token_secret: Some("pfkkdhi9sl3r4s00"),
		}
	}

	fn photos_request(signature: &str) -> OAuthRequest {
		OAuthRequest::new("GET", PHOTOS_URI).expect("Photos fixture should parse.").with_header(
			"Authorization",
			format!(
				concat!(
					"OAuth realm=\"http://photos.example.net/\", ",
					"oauth_consumer_key=\"dpf43f3p2l4k3l03\", oauth_token=\"nnch734d00sl2jdk\", ",
					"oauth_signature_method=\"HMAC-SHA1\", oauth_signature=\"{}\", ",
					"oauth_timestamp=\"1191242096\", oauth_nonce=\"kllo9940pd9333jh\", ",
					"oauth_version=\"1.0\""
				),
				percent_encode(signature)
			),
		)
	}

	#[test]
	fn method_names_round_trip_through_wire_strings() {
		for method in [
			SignatureMethod::HmacSha1,
			SignatureMethod::HmacSha256,
			SignatureMethod::RsaSha1,
			SignatureMethod::RsaSha256,
		] {
			assert_eq!(method.as_str().parse::<SignatureMethod>(), Ok(method));
		}

		assert_eq!(
			"PLAINTEXT".parse::<SignatureMethod>(),
			Err(SignatureError::InvalidSignatureMethod { method: "PLAINTEXT".into() })
		);
		assert_eq!(
			serde_json::to_string(&SignatureMethod::RsaSha1).expect("Method should serialize."),
			"\"RSA-SHA1\""
		);
	}

	#[test]
	fn hmac_sha1_matches_reference_vector() {
		let signature = sign(SignatureMethod::HmacSha1, PHOTOS_BASE, SigningKey::Shared {
			client_secret: "kd94hf93k423kf44",
			token_secret: Some("pfkkdhi9sl3r4s00"),
		})
		.expect("HMAC signing should succeed.");

		assert_eq!(signature, "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");
		assert_eq!(
			verify(SignatureMethod::HmacSha1, PHOTOS_BASE, &signature, photos_key()),
			Ok(())
		);
	}

	#[test]
	fn hmac_sha256_signs_the_same_base_string() {
		let signature = sign(SignatureMethod::HmacSha256, PHOTOS_BASE, SigningKey::Shared {
			client_secret: "kd94hf93k423kf44",
			token_secret: Some("pfkkdhi9sl3r4s00"),
		})
		.expect("HMAC signing should succeed.");

		assert_eq!(signature, "0gCtTYQAxqCKhIE0sltgx7UgHkAs10vrpuYE7xpRBnE=");
	}

	#[test]
	fn validator_rebuilds_base_string_from_request() {
		let validator = SignatureValidator::default();
		let signature = "tR3+Ty81lMeYAr/Fid0kMTYa/WM=";
		let request = photos_request(signature);

		validator
			.verify(&request, SignatureMethod::HmacSha1, signature, photos_key())
			.expect("Reference request should verify.");

		let tampered = OAuthRequest { method: "POST".into(), ..photos_request(signature) };
		let err = validator
			.verify(&tampered, SignatureMethod::HmacSha1, signature, photos_key())
			.expect_err("A different method must change the base string.");

		assert!(matches!(err, Error::InvalidSignature(SignatureError::SignatureMismatch)));
	}

	#[test]
	fn wrong_token_secret_is_a_mismatch() {
		let key = VerificationKey::Shared {
			client_secret: "kd94hf93k423kf44",
			token_secret: Some("wrong"),
		};

		assert_eq!(
			verify(SignatureMethod::HmacSha1, PHOTOS_BASE, "tR3+Ty81lMeYAr/Fid0kMTYa/WM=", key),
			Err(SignatureError::SignatureMismatch)
		);
		assert_eq!(
			verify(SignatureMethod::HmacSha1, PHOTOS_BASE, "not base64!", photos_key()),
			Err(SignatureError::SignatureMismatch)
		);
	}

	#[test]
	fn allow_list_rejects_unlisted_methods() {
		let validator = SignatureValidator::new([SignatureMethod::HmacSha1]);

		assert_eq!(validator.resolve_method("HMAC-SHA1"), Ok(SignatureMethod::HmacSha1));
		assert_eq!(
			validator.resolve_method("RSA-SHA1"),
			Err(SignatureError::InvalidSignatureMethod { method: "RSA-SHA1".into() })
		);
	}

	#[test]
	fn rsa_sha1_verifies_externally_produced_signature() {
		let key = VerificationKey::RsaPublic(RSA_PUBLIC);
		let signature = RSA_PHOTOS_SIGNATURE.trim();
		let tampered = PHOTOS_BASE.replace("GET", "PUT");

		assert_eq!(verify(SignatureMethod::RsaSha1, PHOTOS_BASE, signature, key), Ok(()));
		assert_eq!(
			verify(SignatureMethod::RsaSha1, &tampered, signature, key),
			Err(SignatureError::SignatureMismatch)
		);
	}

	#[test]
	fn rsa_signer_matches_verifier() {
		let signature =
			sign(SignatureMethod::RsaSha256, PHOTOS_BASE, SigningKey::RsaPrivate(RSA_PRIVATE))
				.expect("RSA signing should succeed.");
		let key = VerificationKey::RsaPublic(RSA_PUBLIC);

		assert_eq!(verify(SignatureMethod::RsaSha256, PHOTOS_BASE, &signature, key), Ok(()));
	}

	#[test]
	fn mismatched_key_material_fails_closed() {
		assert_eq!(
			verify(SignatureMethod::RsaSha1, PHOTOS_BASE, "AAAA", photos_key()),
			Err(SignatureError::MissingSecret)
		);
		assert!(matches!(
			verify(
				SignatureMethod::RsaSha1,
				PHOTOS_BASE,
				"AAAA",
				VerificationKey::RsaPublic("junk")
			),
			Err(SignatureError::InvalidRsaKey { .. })
		));
	}
}
