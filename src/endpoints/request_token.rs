//! Temporary credential (request token) issuance.
//!
//! The client signs with its consumer secret alone. The signature is verified before any realm
//! or callback check, so unauthenticated callers learn nothing about registered clients.
//! Requested realms come from the `realm` parameter (space separated) or default to the
//! client's realms, and must stay within both the provider's known realms and the client's
//! defaults. The callback is resolved against the client's registered URIs, with `oob` always
//! accepted.

// self
use crate::{
	_prelude::*,
	auth::{Client, OUT_OF_BAND, RealmSet, RequestToken},
	endpoints::{Provider, RequestContext, common},
	obs::{self, FlowKind},
	request::OAuthRequest,
	response::ProviderResponse,
};

const KIND: FlowKind = FlowKind::RequestToken;

impl Provider {
	/// Validates a request-token request without issuing anything beyond the nonce record.
	pub async fn validate_request_token_request(
		&self,
		request: &OAuthRequest,
	) -> Result<RequestContext> {
		let signed = self.check_mandatory(request)?;
		let client = self.resolve_client(&signed.client_key).await?;

		self.verify_signature(request, &signed, &client, None)?;

		let realms = requested_realms(&client, signed.params.realm())?;

		if !self.config.knows_realms(&realms) || !client.default_realms.is_superset_of(&realms) {
			return Err(Error::InvalidRealm);
		}

		common::trace_realms(&realms);

		let redirect_uri = resolve_callback(&client, signed.params.callback())?;

		self.check_nonce(signed.nonce_key()).await?;

		Ok(RequestContext {
			signature_method: Some(signed.method),
			params: signed.params,
			client: Some(client),
			redirect_uri: Some(redirect_uri),
			realms,
			..Default::default()
		})
	}

	/// Runs the request-token flow and renders the wire response.
	///
	/// `credentials` are appended to the success body. Failures render the form-encoded error
	/// body with the error's status.
	pub async fn create_request_token_response(
		&self,
		request: &OAuthRequest,
		credentials: &BTreeMap<String, String>,
	) -> ProviderResponse {
		let result = common::observe(KIND, "create_request_token_response", async {
			let context = self.validate_request_token_request(request).await?;
			let client = context.client.ok_or(Error::InvalidClient)?;
			let mut token =
				RequestToken::new(self.generate_token()?, self.generate_secret(), client.client_key)
					.with_realms(context.realms);

			token.redirect_uri = context.redirect_uri;

			self.store.save_request_token(token.clone()).await?;

			obs::trace_issued(KIND, &token.client_key, &token.token);

			let mut pairs = vec![
				("oauth_token".to_owned(), token.token.to_string()),
				("oauth_token_secret".to_owned(), token.secret.expose().to_owned()),
				("oauth_callback_confirmed".to_owned(), "true".to_owned()),
			];

			pairs.extend(credentials.iter().map(|(name, value)| (name.clone(), value.clone())));

			Ok(ProviderResponse::form(200, pairs))
		})
		.await;

		result.unwrap_or_else(|e| ProviderResponse::from_error(&e))
	}
}

fn requested_realms(client: &Client, header_realm: Option<&str>) -> Result<RealmSet> {
	match header_realm.filter(|realm| !realm.trim().is_empty()) {
		Some(raw) => raw.parse::<RealmSet>().map_err(|_| Error::InvalidRealm),
		None => Ok(client.default_realms.clone()),
	}
}

fn resolve_callback(client: &Client, callback: Option<&str>) -> Result<String> {
	match callback {
		Some(OUT_OF_BAND) => Ok(OUT_OF_BAND.to_owned()),
		Some(uri) if client.has_redirect_uri(uri) => Ok(uri.to_owned()),
		Some(_) => Err(Error::InvalidRedirectUri),
		None => client.default_redirect_uri().map(str::to_owned).ok_or(Error::InvalidRedirectUri),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::ClientKey;

	fn client(redirects: &[&str]) -> Client {
		Client::new(ClientKey::new("ck1").expect("Client key fixture should be valid."), "cs1")
			.with_redirect_uris(redirects.iter().copied())
			.with_default_realms(RealmSet::new(["email"]).expect("Realm fixture should be valid."))
	}

	#[test]
	fn callback_resolution_rules() {
		let registered = client(&["https://c.example/cb", "https://c.example/alt"]);
		let bare = client(&[]);

		assert_eq!(
			resolve_callback(&registered, None).expect("Default callback should apply."),
			"https://c.example/cb"
		);
		assert_eq!(
			resolve_callback(&registered, Some("https://c.example/alt"))
				.expect("Registered callback should be accepted."),
			"https://c.example/alt"
		);
		assert!(matches!(
			resolve_callback(&registered, Some("https://evil.example/cb")),
			Err(Error::InvalidRedirectUri)
		));
		assert_eq!(resolve_callback(&bare, Some("oob")).expect("oob is always accepted."), "oob");
		assert!(matches!(resolve_callback(&bare, None), Err(Error::InvalidRedirectUri)));
	}

	#[test]
	fn realms_default_to_client_realms() {
		let client = client(&[]);

		assert_eq!(
			requested_realms(&client, None).expect("Default realms should apply."),
			client.default_realms
		);
		assert_eq!(
			requested_realms(&client, Some(" ")).expect("Blank realm should fall back."),
			client.default_realms
		);
		assert_eq!(
			requested_realms(&client, Some("photos email"))
				.expect("Space separated realms should parse.")
				.normalized(),
			"email photos"
		);
	}
}
