//! Protected-resource validation and the `require_oauth` guard.

// self
use crate::{
	_prelude::*,
	auth::{RealmSet, TokenKind},
	endpoints::{Provider, RequestContext, common},
	obs::{self, FlowKind},
	request::OAuthRequest,
	response::ProviderResponse,
};

const KIND: FlowKind = FlowKind::ProtectedResource;

impl Provider {
	/// Validates a signed resource request against the realms the resource requires.
	///
	/// On success the returned context names the authenticated client and access token. Any
	/// error means the request must be rejected before the resource handler runs.
	pub async fn validate_protected_resource_request(
		&self,
		request: &OAuthRequest,
		realms: &RealmSet,
	) -> Result<RequestContext> {
		common::observe(KIND, "validate_protected_resource_request", async {
			let signed = self.check_mandatory(request)?;
			let token_value = signed.params.require("oauth_token")?.to_owned();

			self.config.check_key("oauth_token", &token_value)?;

			let client = self.resolve_client(&signed.client_key).await?;
			let token = self
				.store
				.get_access_token(&signed.client_key, &token_value)
				.await?
				.filter(|token| token.belongs_to(&signed.client_key) && !token.is_revoked())
				.ok_or(Error::InvalidToken { kind: TokenKind::Access })?;

			obs::trace_step("access_token", &token_value);
			self.verify_signature(request, &signed, &client, Some(&token.secret))?;
			self.check_nonce(signed.nonce_key().with_access_token(token_value)).await?;

			if !token.realms.is_superset_of(realms) {
				return Err(Error::InvalidRealm);
			}

			common::trace_realms(&token.realms);

			Ok(RequestContext {
				signature_method: Some(signed.method),
				params: signed.params,
				client: Some(client),
				realms: token.realms.clone(),
				credentials: token.credentials.clone(),
				access_token: Some(token),
				..Default::default()
			})
		})
		.await
	}

	/// Runs `handler` only when the request validates; otherwise answers `403 Forbidden`.
	pub async fn require_oauth<F, Fut>(
		&self,
		request: &OAuthRequest,
		realms: &RealmSet,
		handler: F,
	) -> ProviderResponse
	where
		F: FnOnce(RequestContext) -> Fut,
		Fut: Future<Output = ProviderResponse>,
	{
		match self.validate_protected_resource_request(request, realms).await {
			Ok(context) => handler(context).await,
			Err(_) => ProviderResponse::forbidden(),
		}
	}
}
