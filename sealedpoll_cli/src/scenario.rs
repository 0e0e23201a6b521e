use content_inspector::ContentType;
use digest::Digest;
use sealedpoll::Principal;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::convert::TryInto;

/// A scripted poll: schedule, ballots and the time the reveal is requested
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Scenario {
    pub question: String,
    pub options: Vec<String>,

    /// Time at which the poll is created
    #[serde(default)]
    pub created_at: u64,
    pub start_time: u64,
    pub end_time: u64,

    pub ballots: Vec<ScriptedBallot>,

    /// Defaults to the poll's end time
    #[serde(default)]
    pub reveal_time: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScriptedBallot {
    /// Voter label, hashed into a principal
    pub voter: String,
    pub choice: u8,
    pub time: u64,
}

impl Scenario {
    /// Parse a JSON or CBOR scenario
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        match content_inspector::inspect(bytes) {
            ContentType::UTF_8 | ContentType::UTF_8_BOM => {
                serde_json::from_slice(bytes).map_err(|e| e.to_string())
            }
            ContentType::BINARY => serde_cbor::from_slice(bytes).map_err(|e| e.to_string()),
            _ => Err("unknown scenario format".to_owned()),
        }
    }
}

pub fn voter_principal(label: &str) -> Principal {
    let digest = Sha512::digest(label.as_bytes());
    // Sha512 output is 64 bytes
    let bytes: [u8; 32] = digest[..32].try_into().unwrap();
    Principal(bytes)
}
