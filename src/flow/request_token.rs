//! Request-token acquisition and authorization URL construction.
//!
//! [`FlowClient::fetch_request_token`] opens the handshake: it invalidates any prior
//! access token, sends a signed request-token call announcing the callback, and
//! persists the short-lived token it receives. [`FlowClient::build_authorization_url`]
//! then produces the URL the end user must visit to approve the request token.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flow::{FlowClient, FlowStage},
	http::Transport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::OAuthToken,
};

/// Out-of-band callback value used when no callback URL is configured (RFC 5849 §2.1).
const OOB_CALLBACK: &str = "oob";

impl<T> FlowClient<T>
where
	T: ?Sized + Transport,
{
	/// Fetches a fresh request token and persists it in the state store.
	///
	/// Any existing access token is cleared first: a new handshake invalidates the
	/// previous authorization. Exactly one request token is in flight per provider
	/// namespace afterwards.
	pub async fn fetch_request_token(
		&self,
		extra_params: &[(String, String)],
	) -> Result<OAuthToken> {
		const KIND: FlowKind = FlowKind::RequestToken;

		let span = FlowSpan::new(KIND, "fetch_request_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.clear_access_token().await?;

				let callback = self
					.callback_url
					.as_ref()
					.map(Url::to_string)
					.unwrap_or_else(|| OOB_CALLBACK.to_owned());
				let mut params: Vec<(String, String)> = vec![
					("oauth_consumer_key".into(), self.consumer.key.clone()),
					("oauth_callback".into(), callback),
				];

				if let Some(scope) = &self.scope {
					params.push(("scope".into(), scope.clone()));
				}

				params.extend(extra_params.iter().cloned());

				let request = self.transport.build(
					self.descriptor.quirks.request_token_method,
					self.descriptor.endpoints.request_token.clone(),
				);
				let mut pairs = request.query_pairs();

				pairs.extend(params);

				let request = request.with_query_pairs(pairs);
				let signed = self.signer.sign(request, &self.consumer, None)?;
				let response = self.transport.send(signed).await?;
				let token = OAuthToken::from_response_body(response.require_success()?)?;

				self.store.set(&self.request_token_state_key(), token.clone()).await?;
				self.set_stage(FlowStage::RequestTokenObtained);

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => {
				self.set_stage(FlowStage::Failed);
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	/// Composes the user-facing authorization URL for a request token.
	///
	/// The token comes from the explicit argument or, when absent, from the state
	/// store; without either the flow cannot continue and the caller must restart at
	/// [`FlowClient::fetch_request_token`].
	pub async fn build_authorization_url(
		&self,
		request_token: Option<&OAuthToken>,
		extra_params: &[(String, String)],
	) -> Result<Url> {
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, "build_authorization_url");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = match request_token {
					Some(token) => token.clone(),
					None => self
						.store
						.get(&self.request_token_state_key())
						.await?
						.ok_or(ConfigError::MissingRequestToken)?,
				};
				let mut url = self.descriptor.endpoints.authorization.clone();

				{
					let mut pairs = url.query_pairs_mut();

					for (key, value) in extra_params {
						pairs.append_pair(key, value);
					}

					pairs.append_pair("oauth_token", &token.token);
				}

				Ok(url)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
