// self
use crate::{_prelude::*, http::RequestMethod};

/// Provider-specific quirks that influence how the handshake requests are built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// HTTP method used when fetching the request token.
	pub request_token_method: RequestMethod,
	/// HTTP method used when exchanging the request token for an access token.
	pub access_token_method: RequestMethod,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			request_token_method: RequestMethod::Get,
			access_token_method: RequestMethod::Get,
		}
	}
}
