//! Framework-independent HTTP responses produced by the provider endpoints.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Content type of every token and error body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Status, headers, and body an adapter writes back to the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: Vec<(String, String)>,
	/// Response body; empty for redirects and 403 rejections.
	pub body: String,
}
impl ProviderResponse {
	/// Form-encoded body with the given status.
	pub fn form<I, K, V>(status: u16, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		Self {
			status,
			headers: vec![("Content-Type".into(), FORM_CONTENT_TYPE.into())],
			body: urlencode(pairs),
		}
	}

	/// `302 Found` pointing at `location`.
	pub fn redirect(location: impl Into<String>) -> Self {
		Self {
			status: 302,
			headers: vec![("Location".into(), location.into())],
			body: String::new(),
		}
	}

	/// Empty `403 Forbidden`, used when a protected resource request is rejected.
	pub fn forbidden() -> Self {
		Self { status: 403, headers: Vec::new(), body: String::new() }
	}

	/// Form-encoded error body carrying the error's status, code, and description.
	pub fn from_error(error: &Error) -> Self {
		Self::form(error.status_code(), error.twotuples())
	}

	/// First header value matching `name`, ignoring ASCII case.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// `Location` header of a redirect.
	pub fn location(&self) -> Option<&str> {
		self.header("Location")
	}

	/// Decodes a form-encoded body into a map.
	pub fn form_body(&self) -> BTreeMap<String, String> {
		form_urlencoded::parse(self.body.as_bytes())
			.map(|(name, value)| (name.into_owned(), value.into_owned()))
			.collect()
	}
}

/// Serializes pairs as `application/x-www-form-urlencoded`.
pub fn urlencode<I, K, V>(pairs: I) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish()
}

/// Appends form-encoded pairs to the query of `uri`, keeping any existing query and fragment.
pub fn add_params_to_uri<I, K, V>(uri: &str, pairs: I) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let (base, fragment) = match uri.split_once('#') {
		Some((base, fragment)) => (base, Some(fragment)),
		None => (uri, None),
	};
	let query = urlencode(pairs);
	let separator = if !base.contains('?') {
		"?"
	} else if base.ends_with(['?', '&']) {
		""
	} else {
		"&"
	};
	let mut out = String::from(base);

	if !query.is_empty() {
		out.push_str(separator);
		out.push_str(&query);
	}
	if let Some(fragment) = fragment {
		out.push('#');
		out.push_str(fragment);
	}

	out
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn add_params_respects_existing_query_and_fragment() {
		assert_eq!(
			add_params_to_uri("https://c.example/cb", [("oauth_token", "t1")]),
			"https://c.example/cb?oauth_token=t1"
		);
		assert_eq!(
			add_params_to_uri("https://c.example/cb?x=1#top", [("a", "b c")]),
			"https://c.example/cb?x=1&a=b+c#top"
		);
		assert_eq!(add_params_to_uri("/errors?", [("error", "denied")]), "/errors?error=denied");
		assert_eq!(add_params_to_uri("/errors", Vec::<(&str, &str)>::new()), "/errors");
	}

	#[test]
	fn error_responses_are_form_encoded() {
		let response = ProviderResponse::from_error(&Error::InvalidClient);

		assert_eq!(response.status, 401);
		assert_eq!(response.header("content-type"), Some(FORM_CONTENT_TYPE));
		assert_eq!(response.form_body().get("error").map(String::as_str), Some("invalid_client"));
	}

	#[test]
	fn redirect_and_forbidden_have_empty_bodies() {
		let redirect = ProviderResponse::redirect("/oauth/errors?error=denied");
		let forbidden = ProviderResponse::forbidden();

		assert_eq!(redirect.status, 302);
		assert_eq!(redirect.location(), Some("/oauth/errors?error=denied"));
		assert!(redirect.body.is_empty());
		assert_eq!(forbidden.status, 403);
		assert!(forbidden.body.is_empty());
	}
}
