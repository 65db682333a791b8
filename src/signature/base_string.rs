//! RFC 5849 §3.4.1 signature base string construction.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::_prelude::*;

// RFC 3986 unreserved characters stay literal; everything else is `%XX` encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `value` with the RFC 3986 unreserved set.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Base string URI: lowercase scheme and host, non-default port, path; no query or fragment.
pub fn base_string_uri(uri: &Url) -> String {
	let scheme = uri.scheme().to_ascii_lowercase();
	let host = uri.host_str().unwrap_or_default().to_ascii_lowercase();
	let path = match uri.path() {
		"" => "/",
		path => path,
	};

	match uri.port() {
		Some(port) => format!("{scheme}://{host}:{port}{path}"),
		None => format!("{scheme}://{host}{path}"),
	}
}

/// Encodes, sorts (by name, then value), and joins the parameters.
pub fn normalize_parameters(params: &[(String, String)]) -> String {
	let mut encoded = params
		.iter()
		.map(|(name, value)| (percent_encode(name), percent_encode(value)))
		.collect::<Vec<_>>();

	encoded.sort();

	encoded.into_iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join("&")
}

/// Builds `METHOD&enc(base_uri)&enc(normalized_params)`.
///
/// `params` must already exclude `realm` and `oauth_signature`.
pub fn signature_base_string(method: &str, uri: &Url, params: &[(String, String)]) -> String {
	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(&base_string_uri(uri)),
		percent_encode(&normalize_parameters(params))
	)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::request::OAuthRequest;

	#[test]
	fn percent_encode_keeps_only_unreserved_characters() {
		assert_eq!(percent_encode("Ab9-._~"), "Ab9-._~");
		assert_eq!(percent_encode("a b+c/=&"), "a%20b%2Bc%2F%3D%26");
		assert_eq!(percent_encode("é"), "%C3%A9");
	}

	#[test]
	fn base_string_uri_normalizes_scheme_host_and_port() {
		let uri = Url::parse("HTTP://Example.COM:80/r%20v/X?id=123#frag")
			.expect("URI fixture should parse.");

		assert_eq!(base_string_uri(&uri), "http://example.com/r%20v/X");

		let uri =
			Url::parse("https://www.example.net:8080/?q=1").expect("URI fixture should parse.");

		assert_eq!(base_string_uri(&uri), "https://www.example.net:8080/");
	}

	#[test]
	fn base_string_matches_rfc_5849_example() {
		let request = OAuthRequest::new(
			"POST",
			"http://example.com/request?b5=%3D%253D&a3=a&c%40=&a2=r%20b",
		)
		.expect("RFC request should parse.")
		.with_header("Content-Type", "application/x-www-form-urlencoded")
		.with_body("c2&a3=2+q")
		.with_header(
			"Authorization",
			"OAuth realm=\"Example\", oauth_consumer_key=\"9djdj82h48djs9d2\", \
			 oauth_token=\"kkk9d7dh3k39sjv7\", oauth_signature_method=\"HMAC-SHA1\", \
			 oauth_timestamp=\"137131201\", oauth_nonce=\"7d8f3e4a\", \
			 oauth_signature=\"djosJKDKJSD8743243%2Fjdk33klY%3D\"",
		);
		let params = request.signature_params().expect("RFC parameters should parse.");

		assert_eq!(
			signature_base_string(&request.method, &request.uri, &params),
			"POST&http%3A%2F%2Fexample.com%2Frequest&a2%3Dr%2520b%26a3%3D2%2520q%26a3%3Da%26b5%3D%253D%25253D%26c%2540%3D%26c2%3D%26oauth_consumer_key%3D9djdj82h48djs9d2%26oauth_nonce%3D7d8f3e4a%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D137131201%26oauth_token%3Dkkk9d7dh3k39sjv7"
		);
	}
}
