use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Overrides the artifact root directory
pub const HOME_ENV: &str = "CHURNSCOPE_HOME";
/// Overrides the reference dataset path
pub const DATA_ENV: &str = "CHURNSCOPE_DATA";
/// Overrides the model path
pub const MODEL_ENV: &str = "CHURNSCOPE_MODEL";

pub const DATASET_FILE_NAME: &str = "churn_data.csv";
pub const MODEL_FILE_NAME: &str = "churn_model.onnx";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Resolves where the reference dataset and the model live, and verifies
/// their integrity.
///
/// Layout under the artifact root:
/// - `data/churn_data.csv`
/// - `models/churn_model.onnx`
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    home_dir: PathBuf,
}

impl ArtifactManager {
    /// Creates a manager rooted at the default artifact directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_home_dir())
    }

    /// Returns the default artifact directory path
    pub fn get_default_home_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(HOME_ENV) {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("churnscope");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".local").join("share").join("churnscope");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("churnscope")
    }

    pub fn new<P: AsRef<Path>>(home_dir: P) -> Self {
        Self {
            home_dir: home_dir.as_ref().to_path_buf(),
        }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Reference dataset location: `$CHURNSCOPE_DATA`, else `<home>/data/churn_data.csv`
    pub fn dataset_path(&self) -> PathBuf {
        if let Ok(path) = env::var(DATA_ENV) {
            return PathBuf::from(path);
        }
        self.home_dir.join("data").join(DATASET_FILE_NAME)
    }

    /// Model location: `$CHURNSCOPE_MODEL`, else `<home>/models/churn_model.onnx`
    pub fn model_path(&self) -> PathBuf {
        if let Ok(path) = env::var(MODEL_ENV) {
            return PathBuf::from(path);
        }
        self.home_dir.join("models").join(MODEL_FILE_NAME)
    }

    /// Fails with `HashMismatch` unless the file's SHA-256 equals `expected_hash`.
    pub fn ensure_checksum(
        &self,
        path: &Path,
        expected_hash: &str,
        file_type: &str,
    ) -> Result<(), ArtifactError> {
        log::info!("Verifying {} file: {:?}", file_type, path);
        let actual = sha256_file(path)?;
        if !actual.eq_ignore_ascii_case(expected_hash.trim()) {
            log::error!("{} hash mismatch: expected {}, got {}", file_type, expected_hash, actual);
            return Err(ArtifactError::HashMismatch {
                file_type: file_type.to_string(),
                expected: expected_hash.to_string(),
                actual,
            });
        }
        log::info!("{} file verified successfully", file_type);
        Ok(())
    }
}

/// Lower-case hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String, ArtifactError> {
    let bytes = fs::read(path)?;
    log::debug!("Read {} bytes from {:?}", bytes.len(), path);
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn temp_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn test_sha256_of_empty_file() {
        let file = temp_file(b"");
        assert_eq!(sha256_file(file.path()).unwrap(), EMPTY_SHA256);
    }

    #[test]
    fn test_ensure_checksum_ignores_case() {
        let file = temp_file(b"abc");
        let manager = ArtifactManager::new("/tmp/churnscope-test");
        assert!(manager.ensure_checksum(file.path(), ABC_SHA256, "model").is_ok());
        assert!(manager
            .ensure_checksum(file.path(), &ABC_SHA256.to_uppercase(), "model")
            .is_ok());
    }

    #[test]
    fn test_ensure_checksum_mismatch() {
        let file = temp_file(b"abc");
        let manager = ArtifactManager::new("/tmp/churnscope-test");
        let err = manager
            .ensure_checksum(file.path(), EMPTY_SHA256, "model")
            .unwrap_err();
        match err {
            ArtifactError::HashMismatch { file_type, actual, .. } => {
                assert_eq!(file_type, "model");
                assert!(actual.starts_with("ba7816bf"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let manager = ArtifactManager::new("/tmp/churnscope-test");
        let result = manager.ensure_checksum(
            Path::new("/nonexistent/churn_model.onnx"),
            EMPTY_SHA256,
            "model",
        );
        assert!(matches!(result, Err(ArtifactError::IoError(_))));
    }

    #[test]
    fn test_layout_and_env_overrides() {
        let manager = ArtifactManager::new("/tmp/churnscope-home");
        env::remove_var(DATA_ENV);
        env::remove_var(MODEL_ENV);
        assert_eq!(
            manager.dataset_path(),
            PathBuf::from("/tmp/churnscope-home/data/churn_data.csv")
        );
        assert_eq!(
            manager.model_path(),
            PathBuf::from("/tmp/churnscope-home/models/churn_model.onnx")
        );

        env::set_var(DATA_ENV, "/srv/churn/reference.csv");
        env::set_var(MODEL_ENV, "/srv/churn/model.onnx");
        assert_eq!(manager.dataset_path(), PathBuf::from("/srv/churn/reference.csv"));
        assert_eq!(manager.model_path(), PathBuf::from("/srv/churn/model.onnx"));
        env::remove_var(DATA_ENV);
        env::remove_var(MODEL_ENV);

        env::set_var(HOME_ENV, "/tmp/churnscope-env-home");
        let path = ArtifactManager::get_default_home_dir();
        assert_eq!(path, PathBuf::from("/tmp/churnscope-env-home"));
        env::remove_var(HOME_ENV);

        let path = ArtifactManager::get_default_home_dir();
        assert!(path.to_str().unwrap().contains("churnscope"));
    }
}
