//! Provider descriptor data structures shared by the flow client.
//!
//! The module exposes validated endpoint metadata and supporting builder utilities so
//! providers can be described once, immutably, at client construction time.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Validated provider identifiers.
pub mod id;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use id::*;
pub use quirks::*;

// self
use crate::_prelude::*;

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Request-token endpoint opening the handshake.
	pub request_token: Url,
	/// Authorization endpoint the end user is redirected to.
	pub authorization: Url,
	/// Access-token endpoint closing the handshake.
	pub access_token: Url,
}

/// Immutable provider descriptor consumed by the flow client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier; also namespaces state-store keys.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}
}
