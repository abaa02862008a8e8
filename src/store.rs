//! Session-state contracts and built-in store implementations for flow tokens.
//!
//! The flow persists the in-flight request token (and the final access token) through
//! [`StateStore`], scoped per end-user session. The store provides whatever
//! consistency the caller's session mechanism guarantees; the flow performs no
//! locking of its own.

pub mod file;
pub mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

// self
use crate::{_prelude::*, token::OAuthToken};

/// Boxed future returned by [`StateStore`] implementations.
pub type StateFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StateError>> + 'a + Send>>;

/// Session-scoped persistence contract for flow tokens.
pub trait StateStore
where
	Self: Send + Sync,
{
	/// Fetches the token stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> StateFuture<'a, Option<OAuthToken>>;

	/// Persists or replaces the token stored under `key`.
	fn set<'a>(&'a self, key: &'a str, token: OAuthToken) -> StateFuture<'a, ()>;

	/// Removes the token stored under `key`, returning it when one was present.
	fn remove<'a>(&'a self, key: &'a str) -> StateFuture<'a, Option<OAuthToken>>;
}

/// Error type produced by [`StateStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StateError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
