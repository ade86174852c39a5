//! # Decode Configuration
//!
//! Limits and worker-pool settings for decoding. Configuration is a plain
//! value; there is no configuration file.

use crate::error::{Result, UnpackError};
use serde::{Deserialize, Serialize};

/// Decoder and batch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Largest tensor, in bytes at the declared sample width, a single item
    /// may decode to. Checked right after probing.
    ///
    /// Default: 2 GiB.
    #[serde(default = "default_max_tensor_bytes")]
    pub max_tensor_bytes: usize,

    /// Worker count used by `BatchDecoder::unpack_all`.
    ///
    /// Default: available parallelism.
    #[serde(default = "default_workers")]
    pub default_workers: usize,

    /// Prefix for batch worker thread names (`{prefix}-{index}`).
    ///
    /// Default: `"unpack-worker"`.
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_tensor_bytes: default_max_tensor_bytes(),
            default_workers: default_workers(),
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}

impl DecodeConfig {
    /// Configuration for memory-constrained hosts.
    ///
    /// - 256 MiB tensor ceiling
    /// - 2 workers
    pub fn low_memory() -> Self {
        Self {
            max_tensor_bytes: 256 * 1024 * 1024,
            default_workers: 2,
            ..Default::default()
        }
    }

    /// Set the tensor size ceiling.
    pub fn with_max_tensor_bytes(mut self, bytes: usize) -> Self {
        self.max_tensor_bytes = bytes;
        self
    }

    /// Set the default batch worker count.
    pub fn with_default_workers(mut self, workers: usize) -> Self {
        self.default_workers = workers;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_tensor_bytes == 0 {
            return Err(UnpackError::InvalidConfig(
                "max_tensor_bytes must be > 0".to_string(),
            ));
        }

        if self.default_workers == 0 {
            return Err(UnpackError::InvalidConfig(
                "default_workers must be > 0".to_string(),
            ));
        }

        if self.thread_name_prefix.trim().is_empty() {
            return Err(UnpackError::InvalidConfig(
                "thread_name_prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_max_tensor_bytes() -> usize {
    2 * 1024 * 1024 * 1024 // 2 GiB
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_thread_name_prefix() -> String {
    "unpack-worker".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DecodeConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.default_workers >= 1);
        assert_eq!(config.thread_name_prefix, "unpack-worker");
    }

    #[test]
    fn test_low_memory_preset() {
        let config = DecodeConfig::low_memory();
        assert_eq!(config.max_tensor_bytes, 256 * 1024 * 1024);
        assert_eq!(config.default_workers, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        assert!(DecodeConfig::default()
            .with_max_tensor_bytes(0)
            .validate()
            .is_err());
        assert!(DecodeConfig::default()
            .with_default_workers(0)
            .validate()
            .is_err());

        let config = DecodeConfig {
            thread_name_prefix: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: DecodeConfig =
            serde_json::from_str(r#"{"max_tensor_bytes": 1024}"#).unwrap();
        assert_eq!(config.max_tensor_bytes, 1024);
        assert_eq!(config.thread_name_prefix, "unpack-worker");
        assert!(config.default_workers >= 1);
    }
}
