use crate::*;
use std::env::var;
use std::path::Path;
use std::str::FromStr;

/// How strictly the tally decoder treats the padding bytes of each slot
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaddingPolicy {
    /// Read the low byte of each slot and ignore the rest
    Lenient,

    /// Require all padding bytes to be zero and the bundle to be exactly sized
    Strict,
}

impl Default for PaddingPolicy {
    fn default() -> Self {
        PaddingPolicy::Lenient
    }
}

/// Error loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("sealedpoll config: IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sealedpoll config: failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("sealedpoll config: invalid {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Poll book configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PollConfig {
    /// The poll book's own address.
    ///
    /// Granted view access on every ballot handle and bound into inclusion proofs.
    pub address: Principal,

    #[serde(default)]
    pub padding: PaddingPolicy,
}

impl PollConfig {
    pub fn new(address: Principal) -> Self {
        PollConfig {
            address,
            padding: PaddingPolicy::default(),
        }
    }

    /// Read configuration from `SEALEDPOLL_ADDRESS` and `SEALEDPOLL_STRICT_PADDING`
    pub fn from_env() -> Result<Self, ConfigError> {
        let address = match var("SEALEDPOLL_ADDRESS") {
            Ok(val) => Principal::from_str(&val)
                .map_err(|e| ConfigError::InvalidVar("SEALEDPOLL_ADDRESS", e.to_string()))?,
            Err(_e) => Principal::default(),
        };

        let padding = match var("SEALEDPOLL_STRICT_PADDING") {
            Ok(val) => match val.as_str() {
                "1" | "true" => PaddingPolicy::Strict,
                "0" | "false" => PaddingPolicy::Lenient,
                other => {
                    return Err(ConfigError::InvalidVar(
                        "SEALEDPOLL_STRICT_PADDING",
                        other.to_owned(),
                    ))
                }
            },
            Err(_e) => PaddingPolicy::default(),
        };

        Ok(PollConfig { address, padding })
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
