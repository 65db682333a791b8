// self
use oauth1_provider::{
	_preludet::*,
	auth::{Client, ClientKey},
	endpoints::Provider,
	request::OAuthRequest,
	store::CredentialStore,
};

const REQUEST_TOKEN_URI: &str = "https://api.example.com/oauth/request_token";
const AUTHORIZE_URI: &str = "https://api.example.com/oauth/authorize";
const ACCESS_TOKEN_URI: &str = "https://api.example.com/oauth/access_token";

struct Grant {
	token: String,
	secret: String,
	verifier: String,
}

async fn authorized_grant(provider: &Provider, credentials: BTreeMap<String, String>) -> Grant {
	let request =
		TestSigner::fixture().param("oauth_callback", "oob").sign("POST", REQUEST_TOKEN_URI);
	let mut issued =
		provider.create_request_token_response(&request, &BTreeMap::new()).await.form_body();
	let token = issued.remove("oauth_token").expect("Request token should be issued.");
	let secret =
		issued.remove("oauth_token_secret").expect("Request token secret should be issued.");
	let authorize = OAuthRequest::new("GET", &format!("{AUTHORIZE_URI}?oauth_token={token}"))
		.expect("Authorization URI should parse.");
	let verifier = provider
		.authorize(&authorize, true, credentials)
		.await
		.form_body()
		.remove("oauth_verifier")
		.expect("Out-of-band approval should return the verifier.");

	Grant { token, secret, verifier }
}

fn exchange_signer(grant: &Grant) -> TestSigner {
	TestSigner::fixture()
		.token(grant.token.clone(), grant.secret.clone())
		.param("oauth_verifier", grant.verifier.clone())
}

#[tokio::test]
async fn exchange_issues_access_token_with_request_realms() {
	let (provider, store) = build_test_provider(test_config());
	let grant = authorized_grant(&provider, BTreeMap::new()).await;
	let request_realms = store
		.get_request_token(&grant.token)
		.await
		.expect("Request token lookup should succeed.")
		.expect("Request token should exist before the exchange.")
		.realms;
	let response = provider
		.create_access_token_response(
			&exchange_signer(&grant).sign("POST", ACCESS_TOKEN_URI),
			&BTreeMap::new(),
		)
		.await;

	assert_eq!(response.status, 200, "Unexpected body: {}", response.body);

	let body = response.form_body();
	let access_token = body.get("oauth_token").expect("Response should carry oauth_token.");

	assert!(body.contains_key("oauth_token_secret"));
	assert!(!body.contains_key("oauth_callback_confirmed"));

	let stored = store
		.get_access_token(TEST_CLIENT_KEY, access_token)
		.await
		.expect("Access token lookup should succeed.")
		.expect("Issued access token should be persisted.");

	assert_eq!(stored.realms, request_realms);
	assert!(!stored.is_revoked());
	assert!(
		store
			.get_request_token(&grant.token)
			.await
			.expect("Request token lookup should succeed.")
			.is_none(),
		"Exchanged request token must be invalidated."
	);
}

#[tokio::test]
async fn exchanged_request_token_cannot_be_reused() {
	let (provider, _) = build_test_provider(test_config());
	let grant = authorized_grant(&provider, BTreeMap::new()).await;
	let first = provider
		.create_access_token_response(
			&exchange_signer(&grant).sign("POST", ACCESS_TOKEN_URI),
			&BTreeMap::new(),
		)
		.await;

	assert_eq!(first.status, 200);

	let second = provider
		.create_access_token_response(
			&exchange_signer(&grant).sign("POST", ACCESS_TOKEN_URI),
			&BTreeMap::new(),
		)
		.await;

	assert_eq!(second.status, 401);
	assert_eq!(second.form_body().get("error").map(String::as_str), Some("invalid_token"));
}

#[tokio::test]
async fn wrong_or_missing_verifier_is_rejected() {
	let (provider, _) = build_test_provider(test_config());
	let grant = authorized_grant(&provider, BTreeMap::new()).await;
	let wrong = TestSigner::fixture()
		.token(grant.token.clone(), grant.secret.clone())
		.param("oauth_verifier", "notTheVerifier")
		.sign("POST", ACCESS_TOKEN_URI);
	let response = provider.create_access_token_response(&wrong, &BTreeMap::new()).await;

	assert_eq!(response.status, 401);
	assert_eq!(response.form_body().get("error").map(String::as_str), Some("invalid_verifier"));

	let missing = TestSigner::fixture()
		.token(grant.token.clone(), grant.secret.clone())
		.sign("POST", ACCESS_TOKEN_URI);
	let response = provider.create_access_token_response(&missing, &BTreeMap::new()).await;

	assert_eq!(response.status, 400);
	assert_eq!(response.form_body().get("error").map(String::as_str), Some("invalid_request"));
}

#[tokio::test]
async fn unauthorized_request_token_is_rejected() {
	let (provider, _) = build_test_provider(test_config());
	let request = TestSigner::fixture().sign("POST", REQUEST_TOKEN_URI);
	let mut issued =
		provider.create_request_token_response(&request, &BTreeMap::new()).await.form_body();
	let token = issued.remove("oauth_token").expect("Request token should be issued.");
	let secret =
		issued.remove("oauth_token_secret").expect("Request token secret should be issued.");
	let response = provider
		.create_access_token_response(
			&TestSigner::fixture()
				.token(token, secret)
				.param("oauth_verifier", "guessedVerifier")
				.sign("POST", ACCESS_TOKEN_URI),
			&BTreeMap::new(),
		)
		.await;

	assert_eq!(response.status, 401);
	assert_eq!(response.form_body().get("error").map(String::as_str), Some("invalid_verifier"));
}

#[tokio::test]
async fn request_token_of_another_client_is_rejected() {
	let (provider, store) = build_test_provider(test_config());
	let grant = authorized_grant(&provider, BTreeMap::new()).await;

	store.insert_client(Client::new(
		ClientKey::new("ck2").expect("Second client key should be valid."),
		"cs2",
	));

	let response = provider
		.create_access_token_response(
			&TestSigner::new("ck2", "cs2")
				.token(grant.token.clone(), grant.secret.clone())
				.param("oauth_verifier", grant.verifier.clone())
				.sign("POST", ACCESS_TOKEN_URI),
			&BTreeMap::new(),
		)
		.await;

	assert_eq!(response.status, 401);
	assert_eq!(response.form_body().get("error").map(String::as_str), Some("invalid_token"));
}

#[tokio::test]
async fn signature_requires_the_request_token_secret() {
	let (provider, _) = build_test_provider(test_config());
	let grant = authorized_grant(&provider, BTreeMap::new()).await;
	let response = provider
		.create_access_token_response(
			&TestSigner::fixture()
				.token(grant.token.clone(), "wrongsecret")
				.param("oauth_verifier", grant.verifier.clone())
				.sign("POST", ACCESS_TOKEN_URI),
			&BTreeMap::new(),
		)
		.await;

	assert_eq!(response.status, 401);
	assert_eq!(response.form_body().get("error").map(String::as_str), Some("invalid_signature"));
}

#[tokio::test]
async fn verifier_store_credentials_flow_into_the_access_token() {
	let (provider, store) = build_test_provider_with_verifiers(test_config());
	let credentials = BTreeMap::from([("user".to_owned(), "alice".to_owned())]);
	let grant = authorized_grant(&provider, credentials).await;
	let extra = BTreeMap::from([("screen_name".to_owned(), "alice".to_owned())]);
	let response = provider
		.create_access_token_response(
			&exchange_signer(&grant).sign("POST", ACCESS_TOKEN_URI),
			&extra,
		)
		.await;

	assert_eq!(response.status, 200, "Unexpected body: {}", response.body);

	let body = response.form_body();
	let access_token = body.get("oauth_token").expect("Response should carry oauth_token.");

	assert_eq!(body.get("screen_name").map(String::as_str), Some("alice"));

	let stored = store
		.get_access_token(TEST_CLIENT_KEY, access_token)
		.await
		.expect("Access token lookup should succeed.")
		.expect("Issued access token should be persisted.");

	assert_eq!(stored.credentials.get("user").map(String::as_str), Some("alice"));
}
