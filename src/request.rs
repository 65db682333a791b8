//! Normalized inbound requests and OAuth protocol parameter collection.
//!
//! Adapters translate their framework's request into an [`OAuthRequest`] (method, absolute URI,
//! headers, and raw body). Protocol parameters are then collected from exactly one of the
//! `Authorization` header, a form-encoded body, or the query string, following RFC 5849 §3.5.

// std
use std::borrow::Cow;
// crates.io
use percent_encoding::percent_decode_str;
use url::form_urlencoded;
// self
use crate::{_prelude::*, response::FORM_CONTENT_TYPE};

const OAUTH_PREFIX: &str = "oauth_";

/// Location the protocol parameters were read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamSource {
	/// `Authorization: OAuth ...` header.
	Header,
	/// `application/x-www-form-urlencoded` body.
	Body,
	/// URI query string.
	Query,
}

/// Framework-independent view of an inbound HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthRequest {
	/// Upper-case HTTP method.
	pub method: String,
	/// Absolute request URI as seen by the client (scheme, host, path, query).
	pub uri: Url,
	/// Header pairs; names compare case-insensitively.
	pub headers: Vec<(String, String)>,
	/// Raw body, if any.
	pub body: Option<String>,
}
impl OAuthRequest {
	/// Creates a request without headers or body.
	pub fn new(method: impl AsRef<str>, uri: &str) -> Result<Self> {
		let uri = Url::parse(uri)
			.map_err(|e| Error::invalid_request(format!("Request URI is invalid: {e}.")))?;

		Ok(Self::from_parts(method, uri, Vec::new(), None))
	}

	/// Creates a request from already parsed parts.
	pub fn from_parts(
		method: impl AsRef<str>,
		uri: Url,
		headers: Vec<(String, String)>,
		body: Option<String>,
	) -> Self {
		Self { method: method.as_ref().to_ascii_uppercase(), uri, headers, body }
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets the raw body.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// First header value matching `name`, ignoring ASCII case.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Returns `true` when the request arrived over HTTPS.
	pub fn is_secure(&self) -> bool {
		self.uri.scheme().eq_ignore_ascii_case("https")
	}

	/// Returns `true` when the body is `application/x-www-form-urlencoded`.
	pub fn is_form_encoded(&self) -> bool {
		self.header("Content-Type")
			.and_then(|value| value.split(';').next())
			.is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
	}

	/// Decoded query pairs in request order.
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		self.uri
			.query_pairs()
			.map(|(name, value)| (name.into_owned(), value.into_owned()))
			.collect()
	}

	/// Decoded form body pairs; empty unless the body is form-encoded.
	pub fn form_pairs(&self) -> Vec<(String, String)> {
		match (&self.body, self.is_form_encoded()) {
			(Some(body), true) => form_urlencoded::parse(body.as_bytes())
				.map(|(name, value)| (name.into_owned(), value.into_owned()))
				.collect(),
			_ => Vec::new(),
		}
	}

	/// Decoded `Authorization: OAuth` parameters, including `realm`.
	pub fn authorization_pairs(&self) -> Result<Vec<(String, String)>> {
		match self.header("Authorization") {
			Some(value) => Ok(parse_authorization(value)?.unwrap_or_default()),
			None => Ok(Vec::new()),
		}
	}

	/// Collects the protocol parameters, enforcing the single-source and no-duplicate rules.
	///
	/// `realm` is read from the same source as the protocol parameters.
	pub fn oauth_params(&self) -> Result<OAuthParams> {
		let sources = [
			(ParamSource::Header, self.authorization_pairs()?),
			(ParamSource::Body, self.form_pairs()),
			(ParamSource::Query, self.query_pairs()),
		];
		let mut collected = Vec::new();

		for (source, pairs) in sources {
			let params = collect_oauth(&pairs)?;

			if !params.is_empty() {
				collected.push((source, pairs, params));
			}
		}

		if collected.len() > 1 {
			return Err(Error::invalid_request("OAuth parameters may only appear in one location."));
		}

		let Some((source, pairs, params)) = collected.pop() else {
			return Ok(OAuthParams::default());
		};
		let realm = pairs.into_iter().find(|(name, _)| name == "realm").map(|(_, value)| value);

		Ok(OAuthParams { params, realm, source: Some(source) })
	}

	/// Every parameter that takes part in the signature base string.
	///
	/// Query pairs, form body pairs, and `Authorization` header parameters except `realm`, with
	/// `oauth_signature` removed.
	pub fn signature_params(&self) -> Result<Vec<(String, String)>> {
		let mut params = self.query_pairs();

		params.extend(self.form_pairs());
		params.extend(self.authorization_pairs()?.into_iter().filter(|(name, _)| name != "realm"));
		params.retain(|(name, _)| name != "oauth_signature");

		Ok(params)
	}
}

/// Protocol parameters collected from a single source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OAuthParams {
	params: BTreeMap<String, String>,
	realm: Option<String>,
	source: Option<ParamSource>,
}
impl OAuthParams {
	/// Looks up any `oauth_*` parameter.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Looks up a parameter that must be present and non-empty.
	pub fn require(&self, name: &str) -> Result<&str> {
		self.get(name)
			.filter(|value| !value.is_empty())
			.ok_or_else(|| Error::invalid_request(format!("Missing mandatory parameter {name}.")))
	}

	/// `oauth_consumer_key`.
	pub fn consumer_key(&self) -> Option<&str> {
		self.get("oauth_consumer_key")
	}

	/// `oauth_signature`.
	pub fn signature(&self) -> Option<&str> {
		self.get("oauth_signature")
	}

	/// `oauth_signature_method`.
	pub fn signature_method(&self) -> Option<&str> {
		self.get("oauth_signature_method")
	}

	/// `oauth_timestamp`.
	pub fn timestamp(&self) -> Option<&str> {
		self.get("oauth_timestamp")
	}

	/// `oauth_nonce`.
	pub fn nonce(&self) -> Option<&str> {
		self.get("oauth_nonce")
	}

	/// `oauth_token`.
	pub fn token(&self) -> Option<&str> {
		self.get("oauth_token")
	}

	/// `oauth_verifier`.
	pub fn verifier(&self) -> Option<&str> {
		self.get("oauth_verifier")
	}

	/// `oauth_callback`.
	pub fn callback(&self) -> Option<&str> {
		self.get("oauth_callback")
	}

	/// `oauth_version`.
	pub fn version(&self) -> Option<&str> {
		self.get("oauth_version")
	}

	/// `realm` from the `Authorization` header.
	pub fn realm(&self) -> Option<&str> {
		self.realm.as_deref()
	}

	/// Where the parameters were found, `None` when the request carried none.
	pub fn source(&self) -> Option<ParamSource> {
		self.source
	}

	/// Returns `true` when no protocol parameter was present.
	pub fn is_empty(&self) -> bool {
		self.params.is_empty()
	}
}

fn collect_oauth(pairs: &[(String, String)]) -> Result<BTreeMap<String, String>> {
	let mut params = BTreeMap::new();

	for (name, value) in pairs.iter().filter(|(name, _)| name.starts_with(OAUTH_PREFIX)) {
		if params.insert(name.clone(), value.clone()).is_some() {
			return Err(Error::invalid_request(format!("Duplicate OAuth parameter {name}.")));
		}
	}

	Ok(params)
}

fn parse_authorization(value: &str) -> Result<Option<Vec<(String, String)>>> {
	let value = value.trim();
	let (scheme, rest) = value.split_once(char::is_whitespace).unwrap_or((value, ""));

	if !scheme.eq_ignore_ascii_case("OAuth") {
		return Ok(None);
	}

	let mut pairs = Vec::new();

	for item in rest.split(',').map(str::trim).filter(|item| !item.is_empty()) {
		let (name, raw) = item
			.split_once('=')
			.ok_or_else(|| Error::invalid_request("Malformed Authorization header."))?;
		let raw = raw.trim();
		let unquoted = raw.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(raw);

		pairs.push((decode(name.trim())?, decode(unquoted)?));
	}

	Ok(Some(pairs))
}

fn decode(value: &str) -> Result<String> {
	percent_decode_str(value)
		.decode_utf8()
		.map(Cow::into_owned)
		.map_err(|_| Error::invalid_request("Authorization header is not valid UTF-8."))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request(uri: &str) -> OAuthRequest {
		OAuthRequest::new("post", uri).expect("Request fixture should parse.")
	}

	#[test]
	fn header_parameters_are_decoded_and_realm_is_split_out() {
		let request = request("https://api.example.com/request").with_header(
			"authorization",
			concat!(
				"OAuth realm=\"photos%20email\", oauth_consumer_key=\"ck1\", ",
				"oauth_callback=\"https%3A%2F%2Fc.example%2Fcb\"",
			),
		);
		let params = request.oauth_params().expect("Header parameters should parse.");

		assert_eq!(request.method, "POST");
		assert_eq!(params.source(), Some(ParamSource::Header));
		assert_eq!(params.realm(), Some("photos email"));
		assert_eq!(params.consumer_key(), Some("ck1"));
		assert_eq!(params.callback(), Some("https://c.example/cb"));
		assert!(params.get("realm").is_none());
	}

	#[test]
	fn parameters_must_come_from_a_single_source() {
		let request = request("https://api.example.com/request?oauth_nonce=abc")
			.with_header("Authorization", "OAuth oauth_consumer_key=\"ck1\"");
		let err = request.oauth_params().expect_err("Mixed sources must be rejected.");

		assert!(matches!(err, Error::InvalidRequest { .. }));
	}

	#[test]
	fn duplicate_parameters_are_rejected() {
		let request = request("https://api.example.com/r?oauth_token=a&oauth_token=b");

		assert!(matches!(request.oauth_params(), Err(Error::InvalidRequest { .. })));
	}

	#[test]
	fn form_body_is_read_only_when_form_encoded() {
		let plain = request("https://api.example.com/r").with_body("oauth_token=abc");

		assert!(plain.form_pairs().is_empty());

		let form = plain
			.clone()
			.with_header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8");
		let params = form.oauth_params().expect("Body parameters should parse.");

		assert_eq!(params.source(), Some(ParamSource::Body));
		assert_eq!(params.token(), Some("abc"));
	}

	#[test]
	fn realm_follows_the_parameter_source() {
		let form = request("https://api.example.com/r")
			.with_header("Content-Type", "application/x-www-form-urlencoded")
			.with_body("realm=photos&oauth_consumer_key=ck1");
		let params = form.oauth_params().expect("Body parameters should parse.");

		assert_eq!(params.source(), Some(ParamSource::Body));
		assert_eq!(params.realm(), Some("photos"));

		let query = request("https://api.example.com/r?oauth_consumer_key=ck1&realm=email")
			.with_header("Authorization", "OAuth realm=\"photos\"");
		let params = query.oauth_params().expect("Query parameters should parse.");

		assert_eq!(params.source(), Some(ParamSource::Query));
		assert_eq!(params.realm(), Some("email"));
	}

	#[test]
	fn non_oauth_authorization_schemes_are_ignored() {
		let request =
			request("https://api.example.com/r").with_header("Authorization", "Bearer abc");
		let params = request.oauth_params().expect("Bearer header should be ignored.");

		assert!(params.is_empty());
		assert_eq!(params.source(), None);
	}

	#[test]
	fn signature_params_exclude_realm_and_signature() {
		let request = request("https://api.example.com/r?a=1")
			.with_header("Content-Type", "application/x-www-form-urlencoded")
			.with_body("b=2")
			.with_header(
				"Authorization",
				"OAuth realm=\"x\", oauth_signature=\"sig\", oauth_nonce=\"n\"",
			);
		let mut params = request.signature_params().expect("Signature parameters should parse.");

		params.sort();

		assert_eq!(
			params,
			vec![
				("a".to_owned(), "1".to_owned()),
				("b".to_owned(), "2".to_owned()),
				("oauth_nonce".to_owned(), "n".to_owned()),
			]
		);
	}

	#[test]
	fn require_reports_missing_parameters() {
		let params = OAuthParams::default();
		let err = params.require("oauth_nonce").expect_err("Missing nonce must be reported.");

		assert_eq!(err.to_string(), "Missing mandatory parameter oauth_nonce.");
	}
}
