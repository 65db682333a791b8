//! Token credential (access token) issuance.
//!
//! The client signs with its consumer secret plus the request-token secret and presents the
//! verifier from the authorization step. On success the request token is exchanged for an access
//! token carrying the same realms, and the request token is invalidated.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RequestToken, TokenKind},
	endpoints::{Provider, RequestContext, common},
	obs::{self, FlowKind},
	request::OAuthRequest,
	response::ProviderResponse,
};

const KIND: FlowKind = FlowKind::AccessToken;

impl Provider {
	/// Validates an access-token request: token ownership, signature, nonce, and verifier.
	pub async fn validate_access_token_request(
		&self,
		request: &OAuthRequest,
	) -> Result<RequestContext> {
		let signed = self.check_mandatory(request)?;
		let token_value = signed.params.require("oauth_token")?.to_owned();
		let verifier = signed.params.require("oauth_verifier")?.to_owned();

		self.config.check_key("oauth_token", &token_value)?;
		self.config.check_key("oauth_verifier", &verifier)?;

		let client = self.resolve_client(&signed.client_key).await?;
		let token = self
			.store
			.get_request_token(&token_value)
			.await?
			.filter(|token| token.belongs_to(&signed.client_key))
			.ok_or(Error::InvalidToken { kind: TokenKind::Request })?;

		obs::trace_step("request_token", &token_value);
		self.verify_signature(request, &signed, &client, Some(&token.secret))?;
		self.check_nonce(signed.nonce_key().with_request_token(token_value)).await?;

		let credentials = self.check_verifier(&token, &verifier).await?;

		Ok(RequestContext {
			signature_method: Some(signed.method),
			params: signed.params,
			client: Some(client),
			realms: token.realms.clone(),
			request_token: Some(token),
			credentials,
			..Default::default()
		})
	}

	/// Runs the access-token flow and renders the wire response.
	///
	/// `credentials` are appended to the success body. Failures render the form-encoded error
	/// body with the error's status.
	pub async fn create_access_token_response(
		&self,
		request: &OAuthRequest,
		credentials: &BTreeMap<String, String>,
	) -> ProviderResponse {
		let result = common::observe(KIND, "create_access_token_response", async {
			let context = self.validate_access_token_request(request).await?;
			let request_token = context
				.request_token
				.ok_or(Error::InvalidToken { kind: TokenKind::Request })?;
			let token = AccessToken::new(
				self.generate_token()?,
				self.generate_secret(),
				request_token.client_key.clone(),
			)
			.with_realms(context.realms)
			.with_credentials(context.credentials);

			self.store.save_access_token(token.clone()).await?;
			self.store
				.invalidate_request_token(&request_token.client_key, &request_token.token)
				.await?;

			obs::trace_issued(KIND, &token.client_key, &token.token);

			let mut pairs = vec![
				("oauth_token".to_owned(), token.token.to_string()),
				("oauth_token_secret".to_owned(), token.secret.expose().to_owned()),
			];

			pairs.extend(credentials.iter().map(|(name, value)| (name.clone(), value.clone())));

			Ok(ProviderResponse::form(200, pairs))
		})
		.await;

		result.unwrap_or_else(|e| ProviderResponse::from_error(&e))
	}

	/// Matches the presented verifier against the verifier store, or against the verifier bound
	/// to the request token when no store is wired. Returns the authorization credentials.
	async fn check_verifier(
		&self,
		token: &RequestToken,
		verifier: &str,
	) -> Result<BTreeMap<String, String>> {
		match &self.verifier_store {
			Some(store) => store
				.get_verifier(verifier, &token.token)
				.await?
				.filter(|record| record.binds(&token.token, &token.client_key))
				.map(|record| record.credentials)
				.ok_or(Error::InvalidVerifier),
			None => match &token.verifier {
				Some(stored) if stored.verify(verifier) => Ok(token.credentials.clone()),
				_ => Err(Error::InvalidVerifier),
			},
		}
	}
}
