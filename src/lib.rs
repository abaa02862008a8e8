//! OAuth 1.0a client flows for Rust—request-token handshakes, HMAC-SHA1 request signing,
//! and pluggable transports and stores in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod flow;
pub mod http;
pub mod obs;
pub mod provider;
pub mod signature;
pub mod signer;
pub mod store;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flow::FlowClient,
		http::ReqwestTransport,
		provider::ProviderDescriptor,
		store::{MemoryStateStore, StateStore},
		token::ConsumerCredentials,
	};

	/// Flow client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestFlow = FlowClient<ReqwestTransport>;

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs a [`FlowClient`] backed by an in-memory state store and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_flow(
		descriptor: ProviderDescriptor,
		consumer_key: &str,
		consumer_secret: &str,
	) -> (ReqwestTestFlow, Arc<MemoryStateStore>) {
		let store_backend = Arc::new(MemoryStateStore::default());
		let store: Arc<dyn StateStore> = store_backend.clone();
		let consumer = ConsumerCredentials::new(consumer_key, consumer_secret);
		let client =
			FlowClient::with_transport(store, descriptor, consumer, test_reqwest_transport());

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
