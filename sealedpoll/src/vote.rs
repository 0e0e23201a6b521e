use crate::*;
use std::collections::BTreeMap;
use std::collections::HashSet;

/// A cast ballot
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub voter: Principal,
    pub handle: Handle,
}

/// Per-poll, append-only record of ballots
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    votes: BTreeMap<PollId, Vec<Vote>>,
    has_voted: HashSet<(PollId, Principal)>,
}

impl VoteLedger {
    /// Cast an encrypted ballot
    ///
    /// `address` is the ledger's own principal. It is bound into the
    /// inclusion proof and granted view access alongside the voter. Any
    /// coprocessor failure aborts the call before the ledger changes.
    #[allow(clippy::too_many_arguments)]
    pub fn cast<C: Coprocessor + ?Sized>(
        &mut self,
        polls: &mut PollStore,
        coprocessor: &mut C,
        address: &Principal,
        poll_id: PollId,
        voter: Principal,
        input: &[u8],
        inclusion_proof: &[u8],
        now: u64,
    ) -> Result<VoteId, PollError> {
        let poll = polls.require(poll_id)?;
        if !poll.is_active(now) || poll.reveal_requested || poll.finalized {
            return Err(PollError::PollNotActive(poll_id));
        }
        if self.has_voted(poll_id, &voter) {
            return Err(PollError::AlreadyVoted(poll_id, voter));
        }

        let handle = coprocessor
            .ingest(input, inclusion_proof, address, &voter)
            .map_err(PollError::InputRejected)?;
        match handle.value_type() {
            Some(ValueType::Uint8) => {}
            Some(found) => {
                return Err(PollError::InputRejected(CoprocessorError::WrongValueType {
                    expected: ValueType::Uint8,
                    found,
                }))
            }
            None => {
                return Err(PollError::InputRejected(
                    CoprocessorError::UnknownValueType(handle.0[30]),
                ))
            }
        }
        coprocessor.grant_view(&handle, &voter)?;
        coprocessor.grant_view(&handle, address)?;

        let vote_id = polls.increment_vote_count(poll_id)?;
        self.votes.entry(poll_id).or_default().push(Vote {
            id: vote_id,
            voter,
            handle,
        });
        self.has_voted.insert((poll_id, voter));

        Ok(vote_id)
    }

    pub fn has_voted(&self, poll_id: PollId, voter: &Principal) -> bool {
        self.has_voted.contains(&(poll_id, *voter))
    }

    pub fn get(&self, poll_id: PollId, vote_id: VoteId) -> Option<&Vote> {
        let index = vote_id.0.checked_sub(1)?;
        self.votes.get(&poll_id)?.get(index as usize)
    }

    /// All votes of a poll in ascending vote id order
    pub fn votes(&self, poll_id: PollId) -> &[Vote] {
        self.votes
            .get(&poll_id)
            .map(|votes| votes.as_slice())
            .unwrap_or(&[])
    }
}
