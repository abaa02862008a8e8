//! Access-token exchange closing the handshake.
//!
//! [`FlowClient::fetch_access_token`] upgrades the approved request token to an access
//! token. The supplied `oauth_token` must match the stored request token exactly; the
//! mismatch check guards against cross-site request forgery and stale authorization
//! links. The request token is removed from the state store on success—it is single
//! use by protocol design.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flow::{FlowClient, FlowStage},
	http::{CallbackReader, Transport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::OAuthToken,
};

/// Parameters for [`FlowClient::fetch_access_token`].
///
/// Values left unset resolve from the incoming callback request when a
/// [`CallbackReader`] is attached, or from the state store for the request token.
#[derive(Default)]
pub struct AccessTokenExchange<'a> {
	oauth_token: Option<String>,
	verifier: Option<String>,
	request_token: Option<OAuthToken>,
	extra_params: Vec<(String, String)>,
	callback: Option<&'a dyn CallbackReader>,
}
impl<'a> AccessTokenExchange<'a> {
	/// Creates an exchange with every value resolved implicitly.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an exchange resolving `oauth_token`, `oauth_verifier`, and `denied`
	/// from the incoming callback request.
	pub fn from_callback(reader: &'a dyn CallbackReader) -> Self {
		Self { callback: Some(reader), ..Self::default() }
	}

	/// Supplies the `oauth_token` echoed by the authorization server explicitly.
	pub fn with_oauth_token(mut self, token: impl Into<String>) -> Self {
		self.oauth_token = Some(token.into());

		self
	}

	/// Supplies the `oauth_verifier` explicitly (OAuth 1.0a).
	pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
		self.verifier = Some(verifier.into());

		self
	}

	/// Supplies the request token explicitly instead of reading the state store.
	pub fn with_request_token(mut self, token: OAuthToken) -> Self {
		self.request_token = Some(token);

		self
	}

	/// Appends an extra parameter to the access-token request.
	pub fn with_extra_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.push((name.into(), value.into()));

		self
	}
}
impl Debug for AccessTokenExchange<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessTokenExchange")
			.field("oauth_token", &self.oauth_token)
			.field("verifier", &self.verifier)
			.field("request_token", &self.request_token)
			.field("extra_params", &self.extra_params)
			.field("callback", &self.callback.map(|_| "<reader>"))
			.finish()
	}
}

impl<T> FlowClient<T>
where
	T: ?Sized + Transport,
{
	/// Exchanges the approved request token for an access token.
	///
	/// Fails with [`Error::StateMismatch`] when the resolved `oauth_token` does not
	/// exactly match the stored request token, with [`Error::AccessDenied`] when the
	/// callback carries a `denied` parameter, and with
	/// [`crate::error::ConfigError::MissingRequestToken`] when no request token is
	/// available. On success the request token entry is removed from the state store
	/// and the access token becomes the client's current token.
	pub async fn fetch_access_token(
		&self,
		exchange: AccessTokenExchange<'_>,
	) -> Result<OAuthToken> {
		const KIND: FlowKind = FlowKind::AccessToken;

		let span = FlowSpan::new(KIND, "fetch_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let AccessTokenExchange {
					oauth_token,
					verifier,
					request_token,
					extra_params,
					callback,
				} = exchange;

				if let Some(denied) = callback.and_then(|reader| reader.param("denied")) {
					self.set_stage(FlowStage::Cancelled);

					return Err(Error::AccessDenied {
						token: (!denied.is_empty()).then_some(denied),
					});
				}

				let oauth_token = oauth_token
					.or_else(|| callback.and_then(|reader| reader.param("oauth_token")));
				let verifier = verifier
					.or_else(|| callback.and_then(|reader| reader.param("oauth_verifier")));
				let state_key = self.request_token_state_key();
				let request_token = match request_token {
					Some(token) => token,
					None => self
						.store
						.get(&state_key)
						.await?
						.ok_or(ConfigError::MissingRequestToken)?,
				};

				match oauth_token.as_deref() {
					Some(supplied) if supplied == request_token.token => {},
					Some(_) => {
						return Err(Error::StateMismatch {
							reason: "the oauth_token parameter does not match the stored request \
							         token"
								.into(),
						});
					},
					None => {
						return Err(Error::StateMismatch {
							reason: "no oauth_token parameter was supplied or found on the \
							         callback"
								.into(),
						});
					},
				}

				// Single use: the request token cannot open a second exchange.
				self.store.remove(&state_key).await?;

				let mut params: Vec<(String, String)> = vec![
					("oauth_consumer_key".into(), self.consumer.key.clone()),
					("oauth_token".into(), request_token.token.clone()),
				];

				if let Some(verifier) = verifier {
					params.push(("oauth_verifier".into(), verifier));
				}

				params.extend(extra_params);

				let request = self.transport.build(
					self.descriptor.quirks.access_token_method,
					self.descriptor.endpoints.access_token.clone(),
				);
				let mut pairs = request.query_pairs();

				pairs.extend(params);

				let request = request.with_query_pairs(pairs);
				// Signed exactly once, with the request token's secret.
				let signed = self.signer.sign(request, &self.consumer, Some(&request_token))?;
				let response = self.transport.send(signed).await?;
				let token = OAuthToken::from_response_body(response.require_success()?)?;

				self.store_access_token(token.clone()).await?;
				self.set_stage(FlowStage::Authenticated);

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(e) => {
				if !matches!(e, Error::AccessDenied { .. }) {
					self.set_stage(FlowStage::Failed);
				}

				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	/// OAuth 1.0 defines no refresh operation; returns `Ok(None)` without touching
	/// any state.
	pub async fn refresh_access_token(&self) -> Result<Option<OAuthToken>> {
		Ok(None)
	}
}
