use ed25519_dalek::SecretKey;
use sealedpoll::{generate_keypair, ConfigError, PollConfig};
use std::env::var;
use std::path::Path;

pub struct CliConfig {
    pub poll: PollConfig,
    pub kms_secret_key: SecretKey,
    pub input_secret_key: SecretKey,
}

#[derive(Debug, thiserror::Error)]
pub enum CliConfigError {
    #[error("{0}")]
    Poll(#[from] ConfigError),

    #[error("invalid {0}: {1}")]
    BadKey(&'static str, String),
}

impl CliConfig {
    /// Load from flags, falling back to environment variables, then defaults.
    ///
    /// Keys left unset are generated fresh, which is only useful for
    /// simulations that do not need to be reproduced.
    pub fn load(matches: &clap::ArgMatches) -> Result<Self, CliConfigError> {
        let config_path = matches
            .value_of("config")
            .map(|s| s.to_owned())
            .or_else(|| var("SEALEDPOLL_CONFIG").ok());

        let poll = match config_path {
            Some(path) => PollConfig::load_from_file(Path::new(&path))?,
            None => PollConfig::from_env()?,
        };

        let kms_secret_key = secret_key(
            matches.value_of("kms-secret-key"),
            "SEALEDPOLL_KMS_SECRET_KEY",
        )?;
        let input_secret_key = secret_key(
            matches.value_of("input-secret-key"),
            "SEALEDPOLL_INPUT_SECRET_KEY",
        )?;

        Ok(CliConfig {
            poll,
            kms_secret_key,
            input_secret_key,
        })
    }
}

fn secret_key(flag: Option<&str>, env_var: &'static str) -> Result<SecretKey, CliConfigError> {
    let value = match flag {
        Some(val) => Some(val.to_owned()),
        None => var(env_var).ok(),
    };

    match value {
        Some(val) => {
            let bytes = hex::decode(val).map_err(|e| CliConfigError::BadKey(env_var, e.to_string()))?;
            SecretKey::from_bytes(&bytes).map_err(|e| CliConfigError::BadKey(env_var, e.to_string()))
        }
        None => {
            log::debug!("{} not set, generating a key", env_var);
            let (secret, _public) = generate_keypair();
            Ok(secret)
        }
    }
}
