//! Resource-owner authorization: presentation of a request token and confirmation of the
//! owner's decision.
//!
//! Neither step is signed by the client. Presentation reads `oauth_token` and returns what the
//! host needs to render a consent page. Confirmation binds a fresh verifier to the token and
//! redirects back to the client; denials and protocol errors redirect to the error page instead.

// self
use crate::{
	_prelude::*,
	auth::{ClientKey, OUT_OF_BAND, RealmSet, RequestToken, TokenKey, TokenKind, VerifierRecord},
	endpoints::{Provider, common},
	obs::{self, FlowKind},
	request::OAuthRequest,
	response::{self, ProviderResponse},
};

const KIND: FlowKind = FlowKind::Authorization;

/// Data shown to the resource owner before they decide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationPrompt {
	/// Realms the request token asked for.
	pub realms: RealmSet,
	/// Client requesting access.
	pub client_key: ClientKey,
	/// Request token under review.
	pub resource_owner_key: TokenKey,
	/// Callback the decision will be delivered to; `oob` for out-of-band clients.
	pub redirect_uri: Option<String>,
}

impl Provider {
	/// Presentation step: resolves the request token named by `oauth_token`.
	pub async fn get_realms_and_credentials(
		&self,
		request: &OAuthRequest,
	) -> Result<AuthorizationPrompt> {
		common::observe(KIND, "get_realms_and_credentials", async {
			let token = self.load_authorization_token(request).await?;

			Ok(AuthorizationPrompt {
				realms: token.realms,
				client_key: token.client_key,
				resource_owner_key: token.token,
				redirect_uri: token.redirect_uri,
			})
		})
		.await
	}

	/// Applies the resource owner's decision.
	///
	/// A denial redirects to `<error_uri>?error=denied`. An approval grants exactly the token's
	/// requested realms and continues with [`Provider::confirm_authorization_request`].
	pub async fn authorize(
		&self,
		request: &OAuthRequest,
		approved: bool,
		credentials: BTreeMap<String, String>,
	) -> ProviderResponse {
		if !approved {
			return ProviderResponse::redirect(response::add_params_to_uri(&self.error_uri, [(
				"error", "denied",
			)]));
		}

		self.confirm_authorization_request(request, None, credentials).await
	}

	/// Confirmation step: binds a verifier to the request token and redirects to the client.
	///
	/// `realms` are the realms the owner granted; `None` grants the token's requested realms.
	/// They must equal the requested realms. Out-of-band tokens get a 200 form body with the
	/// verifier instead of a redirect. Errors redirect to the error page with `error` and
	/// `error_description` appended.
	pub async fn confirm_authorization_request(
		&self,
		request: &OAuthRequest,
		realms: Option<RealmSet>,
		credentials: BTreeMap<String, String>,
	) -> ProviderResponse {
		let result = common::observe(KIND, "confirm_authorization_request", async {
			let mut token = self.load_authorization_token(request).await?;

			if realms.is_some_and(|granted| granted != token.realms) {
				return Err(Error::InvalidRealm);
			}

			let redirect_uri = match token.redirect_uri.clone() {
				Some(uri) => uri,
				None => self
					.load_client(&token.client_key)
					.await?
					.default_redirect_uri()
					.map(str::to_owned)
					.ok_or(Error::InvalidRedirectUri)?,
			};
			let verifier = self.generate_secret();

			match &self.verifier_store {
				Some(store) => {
					store
						.save_verifier(VerifierRecord {
							verifier: verifier.clone(),
							token: token.token.clone(),
							client_key: token.client_key.clone(),
							credentials,
						})
						.await?;
				},
				None => {
					token.verifier = Some(verifier.clone());
					token.credentials = credentials;

					self.store.save_request_token(token.clone()).await?;
				},
			}

			obs::trace_issued(KIND, &token.client_key, &token.token);

			let pairs =
				[("oauth_token", token.token.as_ref()), ("oauth_verifier", verifier.expose())];

			if redirect_uri == OUT_OF_BAND {
				return Ok(ProviderResponse::form(200, pairs));
			}

			Ok(ProviderResponse::redirect(response::add_params_to_uri(&redirect_uri, pairs)))
		})
		.await;

		result.unwrap_or_else(|e| ProviderResponse::redirect(e.in_uri(&self.error_uri)))
	}

	async fn load_authorization_token(&self, request: &OAuthRequest) -> Result<RequestToken> {
		let params = request.oauth_params()?;
		let token = params.require("oauth_token")?;

		self.config.check_key("oauth_token", token)?;

		self.store
			.get_request_token(token)
			.await?
			.ok_or(Error::InvalidToken { kind: TokenKind::Request })
	}
}
