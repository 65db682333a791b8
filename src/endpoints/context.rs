//! Per-call validation state.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Client, RealmSet, RequestToken},
	request::OAuthParams,
	signature::SignatureMethod,
};

/// Records resolved while validating a single request.
///
/// Owned by one validation call. The protected-resource flow hands it back so the caller can see
/// which client and token authenticated the request.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
	/// Protocol parameters as presented.
	pub params: OAuthParams,
	/// Signature method the request was verified with.
	pub signature_method: Option<SignatureMethod>,
	/// Client identified by `oauth_consumer_key`.
	pub client: Option<Client>,
	/// Request token involved in the flow.
	pub request_token: Option<RequestToken>,
	/// Access token involved in the flow.
	pub access_token: Option<AccessToken>,
	/// Callback confirmed for the request-token flow.
	pub redirect_uri: Option<String>,
	/// Realms requested or granted.
	pub realms: RealmSet,
	/// Credentials recorded by the authorization decision.
	pub credentials: BTreeMap<String, String>,
}
impl RequestContext {
	/// Consumer key of the authenticated client.
	pub fn client_key(&self) -> Option<&str> {
		self.client.as_ref().map(|client| client.client_key.as_ref())
	}
}
