use crate::*;

use thiserror::Error;

/// Errors returned by poll book operations
#[derive(Debug, Error)]
pub enum PollError {
    #[error("sealedpoll: a poll needs at least 2 options, found {0}")]
    InvalidOptionCount(usize),

    #[error("sealedpoll: invalid schedule - end time must be after start time and in the future")]
    InvalidSchedule,

    #[error("sealedpoll: poll {0} does not exist")]
    InvalidPoll(PollId),

    #[error("sealedpoll: poll {0} is not accepting votes")]
    PollNotActive(PollId),

    #[error("sealedpoll: voter {1} already voted in poll {0}")]
    AlreadyVoted(PollId, Principal),

    #[error("sealedpoll: poll {0} has not closed yet")]
    PollNotClosed(PollId),

    #[error("sealedpoll: poll {0} is already finalized")]
    AlreadyFinalized(PollId),

    #[error("sealedpoll: reveal already requested for poll {0}")]
    AlreadyRequested(PollId),

    #[error("sealedpoll: poll {0} has no votes to reveal")]
    IncompleteVotes(PollId),

    #[error("sealedpoll: reveal was never requested for poll {0}")]
    NotRequested(PollId),

    #[error("sealedpoll: decryption proof failed to verify for poll {0}: {1}")]
    ProofVerificationFailed(PollId, CoprocessorError),

    #[error("sealedpoll: slot {slot} holds choice {choice} but there are only {options} options")]
    ChoiceOutOfBounds {
        slot: usize,
        choice: u8,
        options: usize,
    },

    #[error("sealedpoll: malformed cleartext bundle - expected {expected} bytes, found {found}")]
    MalformedBundle { expected: usize, found: usize },

    #[error("sealedpoll: slot {slot} has non-zero padding")]
    NonZeroPadding { slot: usize },

    #[error("sealedpoll: tally for poll {0} is not available until the poll is finalized")]
    TallyNotAvailable(PollId),

    #[error("sealedpoll: vote {1} does not exist in poll {0}")]
    VoteNotFound(PollId, VoteId),

    #[error("sealedpoll: ballot input rejected: {0}")]
    InputRejected(CoprocessorError),

    #[error("sealedpoll: ciphertext identifiers for poll {0} no longer match the reveal request")]
    RevealListChanged(PollId),

    #[error("sealedpoll: coprocessor error: {0}")]
    Coprocessor(#[from] CoprocessorError),
}

/// Broad classes of failure
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed caller input
    Validation,

    /// Call made in the wrong poll state
    StateConflict,

    /// Externally supplied cryptographic evidence did not match
    Integrity,

    /// The coprocessor failed for a reason unrelated to caller input
    Collaborator,
}

impl PollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PollError::InvalidOptionCount(_)
            | PollError::InvalidSchedule
            | PollError::InvalidPoll(_)
            | PollError::ChoiceOutOfBounds { .. }
            | PollError::MalformedBundle { .. }
            | PollError::NonZeroPadding { .. }
            | PollError::VoteNotFound(..)
            | PollError::InputRejected(_) => ErrorKind::Validation,

            PollError::PollNotActive(_)
            | PollError::AlreadyVoted(..)
            | PollError::PollNotClosed(_)
            | PollError::AlreadyFinalized(_)
            | PollError::AlreadyRequested(_)
            | PollError::IncompleteVotes(_)
            | PollError::NotRequested(_)
            | PollError::TallyNotAvailable(_) => ErrorKind::StateConflict,

            PollError::ProofVerificationFailed(..) => ErrorKind::Integrity,

            PollError::RevealListChanged(_) | PollError::Coprocessor(_) => ErrorKind::Collaborator,
        }
    }
}

/// Errors raised by a coprocessor
#[derive(Debug, Error)]
pub enum CoprocessorError {
    #[error("sealedpoll coprocessor: unknown handle {0}")]
    UnknownHandle(Handle),

    #[error("sealedpoll coprocessor: empty ciphertext input")]
    EmptyInput,

    #[error("sealedpoll coprocessor: unknown value type {0}")]
    UnknownValueType(u8),

    #[error("sealedpoll coprocessor: expected a {expected} ciphertext, found {found}")]
    WrongValueType { expected: ValueType, found: ValueType },

    #[error("sealedpoll coprocessor: inclusion proof does not match input")]
    InvalidInclusionProof,

    #[error("sealedpoll coprocessor: handle {0} is not publicly decryptable")]
    NotPubliclyDecryptable(Handle),

    #[error("sealedpoll coprocessor: not enough valid KMS signatures: need {0}, found {1}")]
    NotEnoughSignatures(usize, usize),

    #[error("sealedpoll coprocessor: no KMS signers configured")]
    NoSigners,

    #[error("sealedpoll coprocessor: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    #[error("sealedpoll coprocessor: CBOR error decoding proof: {0}")]
    CBORDeserialization(#[from] serde_cbor::Error),
}
