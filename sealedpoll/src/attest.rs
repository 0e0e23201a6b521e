//! Signed attestations produced outside the poll book.
//!
//! Two kinds of signer stand behind the coprocessor: the input signer, which
//! binds an external ciphertext to the contract and user submitting it, and
//! the KMS signers, which attest that a cleartext bundle is the decryption of
//! an exact, ordered list of ciphertexts. `LocalCoprocessor` checks both.

use crate::*;
use digest::Digest;
use ed25519_dalek::Keypair;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use ed25519_dalek::Signature;
use ed25519_dalek::Signer;
use sha2::Sha512;

const INPUT_DOMAIN: &[u8] = b"sealedpoll/input";
const DECRYPTION_DOMAIN: &[u8] = b"sealedpoll/decryption";

/// Message signed by the input signer for a ciphertext input
pub fn input_digest(contract: &Principal, user: &Principal, input: &[u8]) -> Vec<u8> {
    let mut sha = Sha512::new();
    sha.update(INPUT_DOMAIN);
    sha.update(contract.as_bytes());
    sha.update(user.as_bytes());
    sha.update(input);
    sha.finalize().to_vec()
}

/// Message signed by KMS signers for a decryption result
///
/// The identifier count is hashed first so that no two distinct
/// (identifiers, cleartext) pairs share a digest.
pub fn decryption_digest(ids: &[CiphertextId], clear_bytes: &[u8]) -> Vec<u8> {
    let mut sha = Sha512::new();
    sha.update(DECRYPTION_DOMAIN);
    sha.update(&(ids.len() as u64).to_be_bytes());
    for id in ids {
        sha.update(id.as_bytes());
    }
    sha.update(clear_bytes);
    sha.finalize().to_vec()
}

/// A single KMS signature over a decryption result
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct KmsSignature {
    #[serde(with = "EdPublicKeyHex")]
    pub signer: PublicKey,

    #[serde(with = "EdSignatureHex")]
    pub sig: Signature,
}

/// Proof that a cleartext bundle is an authentic decryption of an identifier list
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DecryptionProof {
    pub signatures: Vec<KmsSignature>,
}

impl DecryptionProof {
    /// Pack into bytes
    pub fn as_bytes(&self) -> Vec<u8> {
        serde_cbor::to_vec(self).expect("sealedpoll: Unexpected error packing decryption proof")
    }

    /// Unpack from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoprocessorError> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}

/// Signing key of the off-system decryption service
pub struct KmsSigner {
    keypair: Keypair,
}

impl KmsSigner {
    pub fn new(secret: &SecretKey) -> Self {
        KmsSigner {
            keypair: keypair_from_secret(secret),
        }
    }

    pub fn generate() -> Self {
        let (secret, _public) = generate_keypair();
        KmsSigner::new(&secret)
    }

    pub fn public(&self) -> PublicKey {
        self.keypair.public
    }

    pub fn sign(&self, ids: &[CiphertextId], clear_bytes: &[u8]) -> KmsSignature {
        let digest = decryption_digest(ids, clear_bytes);
        KmsSignature {
            signer: self.keypair.public,
            sig: self.keypair.sign(&digest),
        }
    }
}

/// Produce a serialized decryption proof signed by every given signer
pub fn attest(signers: &[KmsSigner], ids: &[CiphertextId], clear_bytes: &[u8]) -> Vec<u8> {
    let proof = DecryptionProof {
        signatures: signers.iter().map(|s| s.sign(ids, clear_bytes)).collect(),
    };
    proof.as_bytes()
}

/// Signing key of the input verifier
pub struct InputSigner {
    keypair: Keypair,
}

impl InputSigner {
    pub fn new(secret: &SecretKey) -> Self {
        InputSigner {
            keypair: keypair_from_secret(secret),
        }
    }

    pub fn generate() -> Self {
        let (secret, _public) = generate_keypair();
        InputSigner::new(&secret)
    }

    pub fn public(&self) -> PublicKey {
        self.keypair.public
    }

    /// Produce the inclusion proof for `input` submitted by `user` to `contract`
    pub fn prove(&self, contract: &Principal, user: &Principal, input: &[u8]) -> Vec<u8> {
        let digest = input_digest(contract, user, input);
        self.keypair.sign(&digest).to_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Verifier;

    #[test]
    fn decryption_digest_binds_order_and_membership() {
        let a = CiphertextId([1; 32]);
        let b = CiphertextId([2; 32]);
        let clear = [0u8; 64];

        let ab = decryption_digest(&[a, b], &clear);
        assert_eq!(ab, decryption_digest(&[a, b], &clear));
        assert_ne!(ab, decryption_digest(&[b, a], &clear));
        assert_ne!(ab, decryption_digest(&[a], &clear));
        assert_ne!(ab, decryption_digest(&[a, b], &clear[..32]));
    }

    #[test]
    fn kms_signature_verifies() {
        let signer = KmsSigner::generate();
        let ids = vec![CiphertextId([3; 32])];
        let sig = signer.sign(&ids, b"clear");

        assert_eq!(sig.signer, signer.public());
        sig.signer
            .verify(&decryption_digest(&ids, b"clear"), &sig.sig)
            .unwrap();
        assert!(sig
            .signer
            .verify(&decryption_digest(&ids, b"forged"), &sig.sig)
            .is_err());

        let proof = DecryptionProof::from_bytes(&attest(&[signer], &ids, b"clear")).unwrap();
        assert_eq!(proof.signatures.len(), 1);
        assert!(DecryptionProof::from_bytes(b"not cbor").is_err());
    }
}
