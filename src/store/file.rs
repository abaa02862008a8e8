//! Simple file-backed [`StateStore`] for single-user tools and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{StateError, StateFuture, StateStore},
	token::OAuthToken,
};

/// Persists session tokens to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStateStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<String, OAuthToken>>>,
}
impl FileStateStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StateError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, OAuthToken>, StateError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let metadata = path.metadata().map_err(|e| StateError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StateError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		let entries: Vec<(String, OAuthToken)> =
			serde_json::from_slice(&bytes).map_err(|e| StateError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StateError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StateError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, OAuthToken>) -> Result<(), StateError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StateError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StateError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StateError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StateError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StateError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl StateStore for FileStateStore {
	fn get<'a>(&'a self, key: &'a str) -> StateFuture<'a, Option<OAuthToken>> {
		Box::pin(async move { Ok(self.inner.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a str, token: OAuthToken) -> StateFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(key.to_owned(), token);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a str) -> StateFuture<'a, Option<OAuthToken>> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let removed = guard.remove(key);

			if removed.is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(removed)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"oauth1_handshake_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStateStore::open(&path).expect("Failed to open file store snapshot.");
		let mut token = OAuthToken::new("request-token", "request-secret");

		token.params.insert("oauth_callback_confirmed".into(), "true".into());

		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set("oauth1.request_token", token.clone()))
			.expect("Failed to save fixture token to file store.");
		drop(store);

		let reopened = FileStateStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.get("oauth1.request_token"))
			.expect("Failed to fetch fixture token from file store.")
			.expect("File store lost token after reopen.");

		assert_eq!(fetched.token, token.token);
		assert_eq!(fetched.token_secret.expose(), token.token_secret.expose());
		assert_eq!(fetched.param("oauth_callback_confirmed"), Some("true"));

		let removed = rt
			.block_on(reopened.remove("oauth1.request_token"))
			.expect("Failed to remove fixture token from file store.");

		assert!(removed.is_some());

		let emptied = FileStateStore::open(&path).expect("Failed to reopen emptied store.");
		let missing = rt
			.block_on(emptied.get("oauth1.request_token"))
			.expect("Failed to query emptied store.");

		assert!(missing.is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
