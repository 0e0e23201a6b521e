use crate::*;
use std::collections::BTreeMap;

/// Drives the two-phase public reveal of a closed poll.
///
/// Phase one freezes the ordered ciphertext identifier list and makes every
/// ballot publicly decryptable. Phase two accepts a cleartext bundle from
/// anyone, but only after the coprocessor has verified it against the same
/// list, recomputed from the ledger. Verification always comes before the
/// bundle is interpreted.
#[derive(Debug, Clone, Default)]
pub struct RevealCoordinator {
    reveal_lists: BTreeMap<PollId, Vec<CiphertextId>>,
    tallies: BTreeMap<PollId, Tally>,
}

impl RevealCoordinator {
    /// Canonical identifiers of `votes`, in the order given
    fn identifiers<C: Coprocessor + ?Sized>(
        coprocessor: &C,
        votes: &[Vote],
    ) -> Result<Vec<CiphertextId>, PollError> {
        votes
            .iter()
            .map(|vote| {
                coprocessor
                    .canonical_identifier(&vote.handle)
                    .map_err(PollError::from)
            })
            .collect()
    }

    /// Phase one: mark every ballot publicly decryptable and return the ordered identifier list
    pub fn request<C: Coprocessor + ?Sized>(
        &mut self,
        polls: &mut PollStore,
        ledger: &VoteLedger,
        coprocessor: &mut C,
        poll_id: PollId,
        now: u64,
    ) -> Result<Vec<CiphertextId>, PollError> {
        let poll = polls.require(poll_id)?;
        if !poll.is_closed(now) {
            return Err(PollError::PollNotClosed(poll_id));
        }
        if poll.finalized {
            return Err(PollError::AlreadyFinalized(poll_id));
        }
        if poll.reveal_requested {
            return Err(PollError::AlreadyRequested(poll_id));
        }
        if poll.vote_count == 0 {
            return Err(PollError::IncompleteVotes(poll_id));
        }

        let votes = ledger.votes(poll_id);
        debug_assert_eq!(votes.len() as u64, poll.vote_count);

        let ids = Self::identifiers(coprocessor, votes)?;

        // Marking is idempotent, so a failure part way leaves a retryable state
        for vote in votes {
            coprocessor.mark_publicly_decryptable(&vote.handle)?;
        }

        polls.mark_reveal_requested(poll_id)?;
        self.reveal_lists.insert(poll_id, ids.clone());

        Ok(ids)
    }

    /// Phase two: verify a decryption of the frozen list, then decode and finalize
    #[allow(clippy::too_many_arguments)]
    pub fn resolve<C: Coprocessor + ?Sized>(
        &mut self,
        polls: &mut PollStore,
        ledger: &VoteLedger,
        coprocessor: &C,
        decoder: &TallyDecoder,
        poll_id: PollId,
        clear_bytes: &[u8],
        proof: &[u8],
    ) -> Result<&Tally, PollError> {
        let poll = polls.require(poll_id)?;
        if !poll.reveal_requested {
            return Err(PollError::NotRequested(poll_id));
        }
        if poll.finalized {
            return Err(PollError::AlreadyFinalized(poll_id));
        }
        let vote_count = poll.vote_count;
        let option_count = poll.option_count();

        // No vote can be admitted after the request, so this must be the list it emitted
        let ids = Self::identifiers(coprocessor, ledger.votes(poll_id))?;
        if self.reveal_lists.get(&poll_id) != Some(&ids) {
            log::error!("identifier list for poll {} changed since the reveal request", poll_id);
            return Err(PollError::RevealListChanged(poll_id));
        }

        coprocessor
            .verify_decryption(&ids, clear_bytes, proof)
            .map_err(|e| {
                log::warn!("rejected decryption for poll {}: {}", poll_id, e);
                PollError::ProofVerificationFailed(poll_id, e)
            })?;

        let counts = decoder.decode(clear_bytes, vote_count, option_count)?;

        polls.mark_finalized(poll_id)?;
        let tally = self.tallies.entry(poll_id).or_insert(Tally {
            counts,
            proof: proof.to_vec(),
        });

        Ok(tally)
    }

    pub fn reveal_list(&self, poll_id: PollId) -> Option<&[CiphertextId]> {
        self.reveal_lists.get(&poll_id).map(|ids| ids.as_slice())
    }

    pub fn tally(&self, poll_id: PollId) -> Option<&Tally> {
        self.tallies.get(&poll_id)
    }
}
