//! Thread-safe in-memory [`StateStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{StateError, StateFuture, StateStore},
	token::OAuthToken,
};

type StateMap = Arc<RwLock<HashMap<String, OAuthToken>>>;

/// Thread-safe storage backend that keeps tokens in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateStore(StateMap);
impl MemoryStateStore {
	fn get_now(map: StateMap, key: String) -> Option<OAuthToken> {
		map.read().get(&key).cloned()
	}

	fn set_now(map: StateMap, key: String, token: OAuthToken) -> Result<(), StateError> {
		map.write().insert(key, token);

		Ok(())
	}

	fn remove_now(map: StateMap, key: String) -> Option<OAuthToken> {
		map.write().remove(&key)
	}
}
impl StateStore for MemoryStateStore {
	fn get<'a>(&'a self, key: &'a str) -> StateFuture<'a, Option<OAuthToken>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn set<'a>(&'a self, key: &'a str, token: OAuthToken) -> StateFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Self::set_now(map, key, token) })
	}

	fn remove<'a>(&'a self, key: &'a str) -> StateFuture<'a, Option<OAuthToken>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::remove_now(map, key)) })
	}
}
