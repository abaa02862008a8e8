//! Demonstrates driving the whole handshake through a custom [`Transport`] that
//! replays scripted responses instead of touching the network.
//!
//! 1. Implement [`Transport`] for your HTTP stack, returning [`TransportResponse`]
//!    values (or [`TransportError`]s) from `send`.
//! 2. Pass the transport to [`FlowClient::with_transport`].
//! 3. Run the usual request-token → authorize → access-token sequence.

// std
use std::{
	collections::VecDeque,
	io::{Error as IoError, ErrorKind},
	sync::{Arc, Mutex},
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth1_handshake::{
	error::TransportError,
	flow::{AccessTokenExchange, FlowClient},
	http::{OutboundRequest, ParsedCallback, Transport, TransportFuture, TransportResponse},
	provider::{ProviderDescriptor, ProviderId},
	store::{MemoryStateStore, StateStore},
	token::ConsumerCredentials,
};

struct ScriptedTransport {
	responses: Mutex<VecDeque<TransportResponse>>,
}
impl ScriptedTransport {
	fn new(responses: impl IntoIterator<Item = TransportResponse>) -> Self {
		Self { responses: Mutex::new(responses.into_iter().collect()) }
	}
}
impl Transport for ScriptedTransport {
	fn send(&self, request: OutboundRequest) -> TransportFuture<'_, TransportResponse> {
		println!("-> {} {}", request.method(), request.url());

		let next = self.responses.lock().expect("Script lock should not be poisoned.").pop_front();

		Box::pin(async move {
			next.ok_or_else(|| {
				TransportError::Io(IoError::new(
					ErrorKind::UnexpectedEof,
					"scripted transport ran out of responses",
				))
			})
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::default());
	let descriptor = ProviderDescriptor::builder(ProviderId::new("scripted-provider")?)
		.request_token_endpoint(Url::parse("https://provider.example.com/oauth/request_token")?)
		.authorization_endpoint(Url::parse("https://provider.example.com/oauth/authorize")?)
		.access_token_endpoint(Url::parse("https://provider.example.com/oauth/access_token")?)
		.build()?;
	let transport = ScriptedTransport::new([
		TransportResponse::new(
			200,
			"oauth_token=scripted-request&oauth_token_secret=scripted-request-secret&oauth_callback_confirmed=true",
		),
		TransportResponse::new(
			200,
			"oauth_token=scripted-access&oauth_token_secret=scripted-access-secret",
		),
	]);
	let client = FlowClient::with_transport(
		store,
		descriptor,
		ConsumerCredentials::new("demo-key", "demo-secret"),
		transport,
	)
	.with_callback_url(Url::parse("https://app.example.com/oauth/callback")?);
	let request_token = client.fetch_request_token(&[]).await?;

	println!("Obtained request token `{}`.", request_token.token);

	let authorize_url = client.build_authorization_url(None, &[]).await?;

	println!("Send your user to {authorize_url}.");

	// Simulate the provider redirecting back after the user approved the request.
	let redirect = Url::parse(&format!(
		"https://app.example.com/oauth/callback?oauth_token={}&oauth_verifier=scripted-verifier",
		request_token.token,
	))?;
	let callback = ParsedCallback::from_url(&redirect);
	let access_token =
		client.fetch_access_token(AccessTokenExchange::from_callback(&callback)).await?;

	println!("Obtained access token `{}`; flow stage is {:?}.", access_token.token, client.stage());

	Ok(())
}
