use crate::*;
use num_enum::TryFromPrimitive;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryFrom;
use std::convert::TryInto;
use std::str::FromStr;

/// Poll identifier, assigned sequentially starting at 1
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PollId(pub u64);

/// Vote identifier, sequential within a poll starting at 1
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct VoteId(pub u64);

impl std::fmt::Display for PollId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for VoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error parsing a 32-byte value from hex
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseBytesError {
    #[error("sealedpoll: invalid hexidecimal")]
    BadHex,

    #[error("sealedpoll: wrong length - expected 32 bytes, found {0}")]
    BadLen(usize),
}

// 32-byte values that travel as hex strings
macro_rules! bytes32 {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            pub fn to_array(&self) -> [u8; 32] {
                self.0
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                $name(bytes)
            }
        }

        impl FromStr for $name {
            type Err = ParseBytesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(s).map_err(|_| ParseBytesError::BadHex)?;
                let array: [u8; 32] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| ParseBytesError::BadLen(bytes.len()))?;
                Ok($name(array))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                FromStr::from_str(&s).map_err(de::Error::custom)
            }
        }
    };
}

bytes32!(
    /// An account that calls into the poll book, or the poll book's own address
    Principal
);

bytes32!(
    /// Opaque reference to an encrypted value held by the coprocessor
    ///
    /// Layout: bytes 0..30 are coprocessor-assigned, byte 30 is the
    /// encrypted value type, byte 31 is the handle version.
    Handle
);

bytes32!(
    /// Stable external name of a ciphertext, as used in reveal identifier lists
    CiphertextId
);

impl Handle {
    pub const VERSION: u8 = 0;

    /// Build a handle from coprocessor-assigned bytes and a value type
    pub fn new(prefix: &[u8], value_type: ValueType) -> Self {
        let mut bytes: [u8; 32] = [0; 32];
        let len = prefix.len().min(30);
        bytes[..len].copy_from_slice(&prefix[..len]);
        bytes[30] = value_type as u8;
        bytes[31] = Self::VERSION;
        Handle(bytes)
    }

    /// The type of the encrypted value behind this handle
    pub fn value_type(&self) -> Option<ValueType> {
        ValueType::try_from_primitive(self.0[30]).ok()
    }
}

/// Type tag of an encrypted value
#[derive(Serialize, Deserialize, TryFromPrimitive, Copy, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ValueType {
    Bool = 0,
    Uint8 = 2,
    Uint16 = 3,
    Uint32 = 4,
    Uint64 = 5,
}

impl TryFrom<&[u8]> for ValueType {
    type Error = CoprocessorError;

    /// Read the type tag that prefixes an external ciphertext input
    fn try_from(input: &[u8]) -> Result<Self, Self::Error> {
        let tag = *input.first().ok_or(CoprocessorError::EmptyInput)?;
        ValueType::try_from_primitive(tag).map_err(|_| CoprocessorError::UnknownValueType(tag))
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ValueType::Bool => "ebool",
            ValueType::Uint8 => "euint8",
            ValueType::Uint16 => "euint16",
            ValueType::Uint32 => "euint32",
            ValueType::Uint64 => "euint64",
        };
        write!(f, "{}", name)
    }
}
