use crate::*;
use digest::Digest;
use ed25519_dalek::PublicKey;
use ed25519_dalek::Signature;
use ed25519_dalek::Verifier;
use sha2::Sha512;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::convert::TryFrom;

/// The encryption coprocessor a poll book delegates ciphertext handling to
///
/// The poll book never sees plaintext. It asks the coprocessor to ingest
/// ballots, to grant view capabilities on them, to make them publicly
/// decryptable once a poll closes, and to check that a returned cleartext
/// bundle is an authentic decryption of an exact, ordered identifier list.
pub trait Coprocessor {
    /// Validate an external ciphertext against its inclusion proof and return an internal handle
    fn ingest(
        &mut self,
        input: &[u8],
        inclusion_proof: &[u8],
        contract: &Principal,
        user: &Principal,
    ) -> Result<Handle, CoprocessorError>;

    /// Let `principal` view the value behind `handle`
    fn grant_view(&mut self, handle: &Handle, principal: &Principal)
        -> Result<(), CoprocessorError>;

    /// Allow anyone to request decryption of `handle`. This cannot be undone.
    fn mark_publicly_decryptable(&mut self, handle: &Handle) -> Result<(), CoprocessorError>;

    /// Stable external name for a handle
    fn canonical_identifier(&self, handle: &Handle) -> Result<CiphertextId, CoprocessorError>;

    /// Fail unless `clear_bytes` + `proof` is an authentic decryption of exactly `ids`, in order
    fn verify_decryption(
        &self,
        ids: &[CiphertextId],
        clear_bytes: &[u8],
        proof: &[u8],
    ) -> Result<(), CoprocessorError>;
}

#[derive(Debug, Clone)]
struct HandleRecord {
    ciphertext: Vec<u8>,
    viewers: BTreeSet<Principal>,
    public: bool,
}

/// An in-memory coprocessor
///
/// Inclusion proofs are ed25519 signatures by the input signer over
/// [`input_digest`]. Decryption proofs are CBOR [`DecryptionProof`]s that
/// need valid signatures from at least `threshold` distinct KMS signers.
pub struct LocalCoprocessor {
    input_signer: PublicKey,
    kms_signers: Vec<PublicKey>,
    threshold: usize,
    handles: HashMap<Handle, HandleRecord>,
    nonce: u64,
}

impl LocalCoprocessor {
    pub fn new(input_signer: PublicKey, kms_signers: Vec<PublicKey>, threshold: usize) -> Self {
        LocalCoprocessor {
            input_signer,
            kms_signers,
            threshold,
            handles: HashMap::new(),
            nonce: 0,
        }
    }

    pub fn can_view(&self, handle: &Handle, principal: &Principal) -> bool {
        self.handles
            .get(handle)
            .map(|record| record.viewers.contains(principal))
            .unwrap_or(false)
    }

    pub fn is_publicly_decryptable(&self, handle: &Handle) -> bool {
        self.handles
            .get(handle)
            .map(|record| record.public)
            .unwrap_or(false)
    }

    /// The stored ciphertext, released only once the handle is publicly decryptable
    pub fn public_ciphertext(&self, id: &CiphertextId) -> Result<&[u8], CoprocessorError> {
        let handle = Handle(id.to_array());
        let record = self
            .handles
            .get(&handle)
            .ok_or(CoprocessorError::UnknownHandle(handle))?;
        if !record.public {
            return Err(CoprocessorError::NotPubliclyDecryptable(handle));
        }
        Ok(&record.ciphertext)
    }

    fn record_mut(&mut self, handle: &Handle) -> Result<&mut HandleRecord, CoprocessorError> {
        self.handles
            .get_mut(handle)
            .ok_or(CoprocessorError::UnknownHandle(*handle))
    }
}

impl Coprocessor for LocalCoprocessor {
    fn ingest(
        &mut self,
        input: &[u8],
        inclusion_proof: &[u8],
        contract: &Principal,
        user: &Principal,
    ) -> Result<Handle, CoprocessorError> {
        let value_type = ValueType::try_from(input)?;

        let sig = Signature::try_from(inclusion_proof)
            .map_err(|_| CoprocessorError::InvalidInclusionProof)?;
        self.input_signer
            .verify(&input_digest(contract, user, input), &sig)
            .map_err(|_| CoprocessorError::InvalidInclusionProof)?;

        self.nonce += 1;
        let mut sha = Sha512::new();
        sha.update(input);
        sha.update(&self.nonce.to_be_bytes());
        let handle = Handle::new(&sha.finalize(), value_type);

        self.handles.insert(
            handle,
            HandleRecord {
                ciphertext: input[1..].to_vec(),
                viewers: BTreeSet::new(),
                public: false,
            },
        );

        Ok(handle)
    }

    fn grant_view(
        &mut self,
        handle: &Handle,
        principal: &Principal,
    ) -> Result<(), CoprocessorError> {
        self.record_mut(handle)?.viewers.insert(*principal);
        Ok(())
    }

    fn mark_publicly_decryptable(&mut self, handle: &Handle) -> Result<(), CoprocessorError> {
        self.record_mut(handle)?.public = true;
        Ok(())
    }

    fn canonical_identifier(&self, handle: &Handle) -> Result<CiphertextId, CoprocessorError> {
        if !self.handles.contains_key(handle) {
            return Err(CoprocessorError::UnknownHandle(*handle));
        }
        Ok(CiphertextId(handle.to_array()))
    }

    fn verify_decryption(
        &self,
        ids: &[CiphertextId],
        clear_bytes: &[u8],
        proof: &[u8],
    ) -> Result<(), CoprocessorError> {
        if self.kms_signers.is_empty() || self.threshold == 0 {
            return Err(CoprocessorError::NoSigners);
        }

        for id in ids {
            let handle = Handle(id.to_array());
            if !self.is_publicly_decryptable(&handle) {
                return Err(CoprocessorError::NotPubliclyDecryptable(handle));
            }
        }

        let proof = DecryptionProof::from_bytes(proof)?;
        let digest = decryption_digest(ids, clear_bytes);

        // Count each configured signer at most once
        let mut seen = vec![false; self.kms_signers.len()];
        for signature in &proof.signatures {
            let index = match self.kms_signers.iter().position(|k| *k == signature.signer) {
                Some(index) => index,
                None => continue,
            };
            if seen[index] {
                continue;
            }
            if signature.signer.verify(&digest, &signature.sig).is_ok() {
                seen[index] = true;
            }
        }

        let valid = seen.iter().filter(|s| **s).count();
        if valid < self.threshold {
            return Err(CoprocessorError::NotEnoughSignatures(self.threshold, valid));
        }

        Ok(())
    }
}
