//! Checks shared by the signed endpoints: transport, mandatory parameters, client lookup,
//! signature verification, nonce recording, and credential generation.

// self
use crate::{
	_prelude::*,
	auth::{Client, ClientKey, RealmSet, TokenKey, TokenSecret},
	endpoints::Provider,
	nonce::NonceKey,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	request::{OAuthParams, OAuthRequest},
	signature::{SignatureError, SignatureMethod, VerificationKey},
};

/// Mandatory protocol parameters after format validation.
#[derive(Clone, Debug)]
pub(crate) struct SignedParams {
	pub(crate) params: OAuthParams,
	pub(crate) client_key: String,
	pub(crate) method: SignatureMethod,
	pub(crate) signature: String,
	pub(crate) timestamp: i64,
	pub(crate) nonce: String,
}
impl SignedParams {
	/// Nonce key not yet bound to a token.
	pub(crate) fn nonce_key(&self) -> NonceKey {
		NonceKey::new(self.client_key.clone(), self.timestamp, self.nonce.clone())
	}
}

impl Provider {
	/// Transport policy, parameter collection, and mandatory parameter checks.
	pub(crate) fn check_mandatory(&self, request: &OAuthRequest) -> Result<SignedParams> {
		if self.config.enforce_ssl && !request.is_secure() {
			return Err(Error::InsecureTransport);
		}

		let params = request.oauth_params()?;
		let client_key = params.require("oauth_consumer_key")?.to_owned();
		let signature = params.require("oauth_signature")?.to_owned();
		let raw_method = params.require("oauth_signature_method")?;
		let raw_timestamp = params.require("oauth_timestamp")?;
		let nonce = params.require("oauth_nonce")?.to_owned();

		if params.version().is_some_and(|version| version != "1.0") {
			return Err(Error::invalid_request("Parameter oauth_version must be 1.0."));
		}

		let timestamp = parse_timestamp(raw_timestamp)?;

		self.config.check_key("oauth_consumer_key", &client_key)?;
		self.config.check_key("oauth_nonce", &nonce)?;

		let method = self.signatures.resolve_method(raw_method)?;

		self.nonces.check_timestamp(timestamp, OffsetDateTime::now_utc())?;

		Ok(SignedParams { params, client_key, method, signature, timestamp, nonce })
	}

	/// Fetches the client or fails with [`Error::InvalidClient`].
	pub(crate) async fn load_client(&self, client_key: &str) -> Result<Client> {
		let client = self.store.get_client(client_key).await?.ok_or(Error::InvalidClient)?;

		obs::trace_step("client", client_key);

		Ok(client)
	}

	/// Fetches the client for a signed request.
	///
	/// An unknown key resolves to a placeholder holding a fresh random secret and no RSA key. The
	/// placeholder never verifies a signature, so an unknown client is rejected at the signature
	/// step with the same error as a known client presenting a bad signature.
	pub(crate) async fn resolve_client(&self, client_key: &str) -> Result<Client> {
		if let Some(client) = self.store.get_client(client_key).await? {
			obs::trace_step("client", client_key);

			return Ok(client);
		}

		obs::trace_step("unknown_client", client_key);

		let key = ClientKey::new(client_key).map_err(|_| Error::InvalidClient)?;

		Ok(Client::new(key, self.generate_secret().expose()))
	}

	/// Verifies the request signature with the client's key material.
	pub(crate) fn verify_signature(
		&self,
		request: &OAuthRequest,
		signed: &SignedParams,
		client: &Client,
		token_secret: Option<&TokenSecret>,
	) -> Result<()> {
		let key = if signed.method.is_rsa() {
			let pem = client.rsa_key.as_deref().ok_or(SignatureError::MissingSecret)?;

			VerificationKey::RsaPublic(pem)
		} else {
			VerificationKey::Shared {
				client_secret: client.client_secret.expose(),
				token_secret: token_secret.map(TokenSecret::expose),
			}
		};

		self.signatures.verify(request, signed.method, &signed.signature, key)
	}

	/// Records the nonce, failing on replays and stale timestamps.
	pub(crate) async fn check_nonce(&self, key: NonceKey) -> Result<()> {
		let nonce = key.nonce.clone();

		self.nonces.check_and_record(self.store.as_ref(), key, OffsetDateTime::now_utc()).await?;

		obs::trace_step("nonce", &nonce);

		Ok(())
	}

	/// Random token identifier sized to the configured maximum key length.
	pub(crate) fn generate_token(&self) -> Result<TokenKey> {
		TokenKey::new(TokenSecret::generate(self.config.key_length.max).expose())
			.map_err(|e| Error::invalid_request(e.to_string()))
	}

	/// Random secret or verifier sized to the configured maximum key length.
	pub(crate) fn generate_secret(&self) -> TokenSecret {
		TokenSecret::generate(self.config.key_length.max)
	}
}

/// Logs the realms a flow resolved.
pub(crate) fn trace_realms(realms: &RealmSet) {
	obs::trace_step("realms", &realms.normalized());
}

/// Wraps a flow future in its span and records attempt/success/failure.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(e) => {
			obs::trace_rejection(kind, e);
			obs::record_flow_outcome(kind, FlowOutcome::Failure);
		},
	}

	result
}

fn parse_timestamp(raw: &str) -> Result<i64> {
	raw.parse::<i64>()
		.ok()
		.filter(|timestamp| *timestamp > 0 && raw.bytes().all(|b| b.is_ascii_digit()))
		.ok_or_else(|| {
			Error::invalid_request("Parameter oauth_timestamp must be a positive integer.")
		})
}
