/* src/loader/source/file.rs */

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::super::{FetchError, Loader};

/// A directory-backed store: the payload for `key` is the file `<root>/<key>`.
pub struct FileLoader {
	root: PathBuf,
}

impl FileLoader {
	/// Create a new FileLoader rooted at the given path.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Resolves the path safely, ensuring it is within the root directory.
	///
	/// Returns `Ok(None)` when the file does not exist.
	async fn resolve_secure(&self, key: &str) -> Result<Option<PathBuf>, FetchError> {
		if Path::new(key)
			.components()
			.any(|c| matches!(c, Component::ParentDir | Component::RootDir))
		{
			return Err(FetchError::SandboxViolation);
		}

		let canonical_root = fs::canonicalize(&self.root).await?;

		match fs::canonicalize(self.root.join(key)).await {
			Ok(canonical_path) if canonical_path.starts_with(&canonical_root) => {
				Ok(Some(canonical_path))
			}
			Ok(_) => Err(FetchError::SandboxViolation),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}
}

#[async_trait]
impl Loader for FileLoader {
	async fn fetch(&self, key: &str) -> Result<Option<String>, FetchError> {
		match self.resolve_secure(key).await? {
			Some(path) => Ok(Some(fs::read_to_string(path).await?)),
			None => Ok(None),
		}
	}
}
