use crate::*;

/// A set of polls sharing one coprocessor
///
/// Every mutating operation either applies all of its effects, including its
/// event, or fails and applies none.
pub struct PollBook<C: Coprocessor> {
    config: PollConfig,
    polls: PollStore,
    ledger: VoteLedger,
    reveal: RevealCoordinator,
    decoder: TallyDecoder,
    coprocessor: C,
    events: EventLog,
}

impl<C: Coprocessor> PollBook<C> {
    pub fn new(config: PollConfig, coprocessor: C) -> Self {
        PollBook {
            decoder: TallyDecoder::new(config.padding),
            config,
            polls: PollStore::default(),
            ledger: VoteLedger::default(),
            reveal: RevealCoordinator::default(),
            coprocessor,
            events: EventLog::default(),
        }
    }

    /// The poll book's own principal
    pub fn address(&self) -> &Principal {
        &self.config.address
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn coprocessor(&self) -> &C {
        &self.coprocessor
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    pub fn create_poll(
        &mut self,
        creator: Principal,
        question: &str,
        options: &[String],
        start_time: u64,
        end_time: u64,
        now: u64,
    ) -> Result<PollId, PollError> {
        let poll = self
            .polls
            .create(creator, question, options, start_time, end_time, now)?;

        log::info!(
            "poll {} created by {} with {} options, open {}..={}",
            poll.id,
            creator,
            poll.option_count(),
            start_time,
            end_time
        );
        let event = Event::PollCreated {
            poll_id: poll.id,
            creator,
            option_count: poll.option_count(),
            start_time,
            end_time,
        };
        let poll_id = poll.id;
        self.events.emit(event);

        Ok(poll_id)
    }

    pub fn cast_vote(
        &mut self,
        poll_id: PollId,
        voter: Principal,
        input: &[u8],
        inclusion_proof: &[u8],
        now: u64,
    ) -> Result<VoteId, PollError> {
        let vote_id = self.ledger.cast(
            &mut self.polls,
            &mut self.coprocessor,
            &self.config.address,
            poll_id,
            voter,
            input,
            inclusion_proof,
            now,
        )?;

        log::info!("vote {} cast in poll {}", vote_id, poll_id);
        self.events.emit(Event::VoteCast { poll_id, vote_id });

        Ok(vote_id)
    }

    /// Start the reveal of a closed poll. Anyone may call this.
    pub fn request_poll_reveal(
        &mut self,
        poll_id: PollId,
        now: u64,
    ) -> Result<Vec<CiphertextId>, PollError> {
        let ids = self.reveal.request(
            &mut self.polls,
            &self.ledger,
            &mut self.coprocessor,
            poll_id,
            now,
        )?;

        log::info!(
            "reveal requested for poll {} over {} ciphertexts",
            poll_id,
            ids.len()
        );
        self.events.emit(Event::RevealRequested {
            poll_id,
            ids: ids.clone(),
        });

        Ok(ids)
    }

    /// Submit a decryption of a requested reveal. Anyone may call this, at any time.
    pub fn resolve_poll_callback(
        &mut self,
        poll_id: PollId,
        clear_bytes: &[u8],
        proof: &[u8],
    ) -> Result<&Tally, PollError> {
        let tally = self.reveal.resolve(
            &mut self.polls,
            &self.ledger,
            &self.coprocessor,
            &self.decoder,
            poll_id,
            clear_bytes,
            proof,
        )?;

        log::info!("poll {} finalized with counts {:?}", poll_id, tally.counts);
        self.events.emit(Event::PollFinalized {
            poll_id,
            counts: tally.counts.clone(),
            total: tally.total(),
        });

        Ok(tally)
    }

    pub fn get_poll(&self, poll_id: PollId) -> Option<&Poll> {
        self.polls.get(poll_id)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.len()
    }

    pub fn poll_phase(&self, poll_id: PollId, now: u64) -> Result<PollPhase, PollError> {
        Ok(self.polls.require(poll_id)?.phase(now))
    }

    /// The final tally. Fails until the poll is finalized.
    pub fn get_tally(&self, poll_id: PollId) -> Result<&Tally, PollError> {
        self.polls.require(poll_id)?;
        self.reveal
            .tally(poll_id)
            .ok_or(PollError::TallyNotAvailable(poll_id))
    }

    pub fn has_user_voted(&self, poll_id: PollId, voter: &Principal) -> bool {
        self.ledger.has_voted(poll_id, voter)
    }

    pub fn get_vote_ciphertext(
        &self,
        poll_id: PollId,
        vote_id: VoteId,
    ) -> Result<Handle, PollError> {
        self.polls.require(poll_id)?;
        self.ledger
            .get(poll_id, vote_id)
            .map(|vote| vote.handle)
            .ok_or(PollError::VoteNotFound(poll_id, vote_id))
    }

    /// The identifier list frozen by `request_poll_reveal`
    pub fn get_reveal_list(&self, poll_id: PollId) -> Option<&[CiphertextId]> {
        self.reveal.reveal_list(poll_id)
    }
}
