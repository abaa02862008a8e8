//! High-level OAuth 1.0a flow orchestration.

pub mod access_token;
pub mod request_token;

pub use access_token::*;

// self
use crate::{
	_prelude::*,
	http::{OutboundRequest, Transport},
	provider::ProviderDescriptor,
	signature::{HmacSha1, SignatureMethod},
	signer::RequestSigner,
	store::StateStore,
	token::{ConsumerCredentials, OAuthToken},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Flow client specialized for the crate's default reqwest transport.
pub type ReqwestFlowClient = FlowClient<ReqwestTransport>;

/// Lifecycle stage of one authorization attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowStage {
	/// No handshake is in progress.
	Unauthenticated,
	/// A request token was obtained and awaits user authorization.
	RequestTokenObtained,
	/// The access token was obtained; terminal success.
	Authenticated,
	/// The end user declined authorization; terminal failure.
	Cancelled,
	/// The handshake failed; restart from the request-token step.
	Failed,
}

/// Coordinates the OAuth 1.0a handshake against a single provider descriptor.
///
/// The client owns the transport, state store, descriptor, consumer credentials, and
/// request signer so the individual flow steps can focus on protocol logic. One
/// request-token-to-access-token exchange may be in flight at a time per stored state
/// namespace; callers serialize concurrent attempts.
pub struct FlowClient<T>
where
	T: ?Sized + Transport,
{
	/// Transport used for every outbound provider request.
	pub transport: Arc<T>,
	/// Session-scoped state store holding the in-flight request token.
	pub store: Arc<dyn StateStore>,
	/// Provider descriptor that defines endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Consumer credentials identifying the client application.
	pub consumer: ConsumerCredentials,
	/// Signer applied to every flow request.
	pub signer: RequestSigner,
	/// Callback URL sent as `oauth_callback`; `"oob"` when unset.
	pub callback_url: Option<Url>,
	/// Optional `scope` parameter sent with the request-token call.
	pub scope: Option<String>,
	current_access_token: Arc<RwLock<Option<OAuthToken>>>,
	stage: Arc<RwLock<FlowStage>>,
}
impl<T> FlowClient<T>
where
	T: ?Sized + Transport,
{
	/// Creates a flow client that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn StateStore>,
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredentials,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			descriptor,
			consumer,
			signer: RequestSigner::new(HmacSha1),
			callback_url: None,
			scope: None,
			current_access_token: Default::default(),
			stage: Arc::new(RwLock::new(FlowStage::Unauthenticated)),
		}
	}

	/// Replaces the signature method, resetting placement and realm to defaults.
	pub fn with_signature_method(mut self, method: impl 'static + SignatureMethod) -> Self {
		self.signer = RequestSigner::new(method);

		self
	}

	/// Replaces the whole request signer (method, placement, realm).
	pub fn with_signer(mut self, signer: RequestSigner) -> Self {
		self.signer = signer;

		self
	}

	/// Sets the callback URL announced during the request-token call.
	pub fn with_callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Sets the `scope` parameter sent with the request-token call.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Returns the current lifecycle stage of the authorization attempt.
	pub fn stage(&self) -> FlowStage {
		*self.stage.read()
	}

	/// Returns the current access token, falling back to the state store so a rebuilt
	/// client resumes where the previous one stopped.
	pub async fn access_token(&self) -> Result<Option<OAuthToken>> {
		let cached = self.current_access_token.read().clone();

		if let Some(token) = cached {
			return Ok(Some(token));
		}

		match self.store.get(&self.access_token_state_key()).await? {
			Some(token) => {
				*self.current_access_token.write() = Some(token.clone());

				Ok(Some(token))
			},
			None => Ok(None),
		}
	}

	/// Signs an arbitrary API request.
	///
	/// A `None` token falls back to the client's current access token; when no access
	/// token is held either, the signing key uses an empty token secret.
	pub async fn sign_request(
		&self,
		request: OutboundRequest,
		token: Option<&OAuthToken>,
	) -> Result<OutboundRequest> {
		let fallback;
		let token = match token {
			Some(token) => Some(token),
			None => {
				fallback = self.access_token().await?;

				fallback.as_ref()
			},
		};

		Ok(self.signer.sign(request, &self.consumer, token)?)
	}

	/// Adds `oauth_consumer_key` and `oauth_token` as plain request parameters.
	///
	/// This is not a signature; use [`FlowClient::sign_request`] for endpoints that
	/// verify signed requests.
	pub fn apply_access_token_to_request(
		&self,
		request: OutboundRequest,
		access_token: &OAuthToken,
	) -> OutboundRequest {
		let mut pairs = request.query_pairs();

		pairs.push(("oauth_consumer_key".into(), self.consumer.key.clone()));
		pairs.push(("oauth_token".into(), access_token.token.clone()));

		request.with_query_pairs(pairs)
	}

	pub(crate) fn set_stage(&self, stage: FlowStage) {
		*self.stage.write() = stage;
	}

	pub(crate) fn request_token_state_key(&self) -> String {
		format!("oauth1.{}.request_token", self.descriptor.id)
	}

	pub(crate) fn access_token_state_key(&self) -> String {
		format!("oauth1.{}.access_token", self.descriptor.id)
	}

	pub(crate) async fn store_access_token(&self, token: OAuthToken) -> Result<()> {
		*self.current_access_token.write() = Some(token.clone());
		self.store.set(&self.access_token_state_key(), token).await?;

		Ok(())
	}

	pub(crate) async fn clear_access_token(&self) -> Result<()> {
		*self.current_access_token.write() = None;
		self.store.remove(&self.access_token_state_key()).await?;

		Ok(())
	}
}
#[cfg(feature = "reqwest")]
impl FlowClient<ReqwestTransport> {
	/// Creates a new flow client for the provided descriptor and consumer credentials.
	///
	/// The client provisions its own reqwest-backed transport so callers do not need to
	/// pass HTTP handles explicitly.
	pub fn new(
		store: Arc<dyn StateStore>,
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredentials,
	) -> Self {
		Self::with_transport(store, descriptor, consumer, ReqwestTransport::default())
	}
}
impl<T> Clone for FlowClient<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			consumer: self.consumer.clone(),
			signer: self.signer.clone(),
			callback_url: self.callback_url.clone(),
			scope: self.scope.clone(),
			current_access_token: self.current_access_token.clone(),
			stage: self.stage.clone(),
		}
	}
}
impl<T> Debug for FlowClient<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FlowClient")
			.field("descriptor", &self.descriptor)
			.field("consumer", &self.consumer)
			.field("signer", &self.signer)
			.field("stage", &self.stage())
			.finish()
	}
}
