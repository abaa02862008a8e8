//! Crate-level error types shared across the flow, signer, transports, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StateError,
	),
	/// Local configuration problem; restart the flow from the request-token step.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Signature computation failed for the configured method.
	#[error(transparent)]
	Signature(#[from] crate::signature::SignatureError),
	/// Transport failure (DNS, TCP, TLS, unexpected status).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint body could not be parsed into a token.
	#[error(transparent)]
	TokenResponse(#[from] crate::token::TokenParseError),

	/// The `oauth_token` returned by the callback does not match the stored request token.
	/// Indicates tampering or a stale authorization link; never retried.
	#[error("Invalid auth state parameter: {reason}.")]
	StateMismatch {
		/// Human-readable mismatch description.
		reason: String,
	},
	/// The end user declined the authorization request.
	#[error("Authorization was denied by the user.")]
	AccessDenied {
		/// The `denied` token echoed by the authorization server, when supplied.
		token: Option<String>,
	},
}

/// Configuration and validation failures raised by the flow client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A request token is required but neither supplied nor present in the state store.
	#[error("Request token is required; call fetch_request_token first.")]
	MissingRequestToken,
}

/// Transport-level failures (network, IO, unexpected endpoint responses).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Token endpoint answered outside the 2xx range.
	#[error("Token endpoint returned HTTP {status}: {body_preview}.")]
	UnexpectedStatus {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Truncated response body for diagnostics.
		body_preview: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
