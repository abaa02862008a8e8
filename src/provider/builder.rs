// self
use crate::{
	_prelude::*,
	provider::{ProviderDescriptor, ProviderEndpoints, ProviderId, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Request-token endpoint is mandatory.
	#[error("Missing request token endpoint.")]
	MissingRequestTokenEndpoint,
	/// Authorization endpoint is mandatory.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Access-token endpoint is mandatory.
	#[error("Missing access token endpoint.")]
	MissingAccessTokenEndpoint,
	/// Endpoints must use HTTPS; token secrets travel in the clear otherwise.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Request-token endpoint opening the handshake.
	pub request_token_endpoint: Option<Url>,
	/// Authorization endpoint the end user is redirected to.
	pub authorization_endpoint: Option<Url>,
	/// Access-token endpoint closing the handshake.
	pub access_token_endpoint: Option<Url>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			request_token_endpoint: None,
			authorization_endpoint: None,
			access_token_endpoint: None,
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the request-token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the access-token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let request_token = self
			.request_token_endpoint
			.ok_or(ProviderDescriptorError::MissingRequestTokenEndpoint)?;
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let access_token =
			self.access_token_endpoint.ok_or(ProviderDescriptorError::MissingAccessTokenEndpoint)?;
		let endpoints = ProviderEndpoints { request_token, authorization, access_token };
		let descriptor = ProviderDescriptor { id: self.id, endpoints, quirks: self.quirks };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("request token", &self.endpoints.request_token)?;
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("access token", &self.endpoints.access_token)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
