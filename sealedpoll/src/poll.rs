use crate::*;

/// A poll record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: PollId,
    pub creator: Principal,
    pub question: String,

    /// Option labels, fixed at creation
    pub options: Vec<String>,

    /// First second (inclusive) at which votes are accepted
    pub start_time: u64,

    /// Last second (inclusive) at which votes are accepted
    pub end_time: u64,

    pub vote_count: u64,
    pub reveal_requested: bool,
    pub finalized: bool,
}

/// Lifecycle phase of a poll
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    Open,

    /// Past the voting window, or at its last second.
    ///
    /// At `now == end_time` a poll is already `Closed` yet still admits a
    /// ballot, until a reveal request freezes voting.
    Closed,
    RevealRequested,
    Finalized,
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            PollPhase::Open => "open",
            PollPhase::Closed => "closed",
            PollPhase::RevealRequested => "reveal_requested",
            PollPhase::Finalized => "finalized",
        };
        write!(f, "{}", name)
    }
}

impl Poll {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Whether a ballot may be cast at `now`
    pub fn is_active(&self, now: u64) -> bool {
        now >= self.start_time && now <= self.end_time
    }

    pub fn is_closed(&self, now: u64) -> bool {
        now >= self.end_time
    }

    pub fn phase(&self, now: u64) -> PollPhase {
        if self.finalized {
            PollPhase::Finalized
        } else if self.reveal_requested {
            PollPhase::RevealRequested
        } else if self.is_closed(now) {
            PollPhase::Closed
        } else {
            PollPhase::Open
        }
    }
}

/// Append-only arena of polls, indexed by id
#[derive(Debug, Clone, Default)]
pub struct PollStore {
    polls: Vec<Poll>,
}

impl PollStore {
    /// Create a poll and return its id
    ///
    /// Rejects fewer than two options and schedules where the end does not
    /// come after both the start and `now`.
    pub fn create(
        &mut self,
        creator: Principal,
        question: &str,
        options: &[String],
        start_time: u64,
        end_time: u64,
        now: u64,
    ) -> Result<&Poll, PollError> {
        if options.len() < 2 {
            return Err(PollError::InvalidOptionCount(options.len()));
        }
        if end_time <= start_time || end_time <= now {
            return Err(PollError::InvalidSchedule);
        }

        let id = PollId(self.polls.len() as u64 + 1);
        self.polls.push(Poll {
            id,
            creator,
            question: question.to_owned(),
            options: options.to_vec(),
            start_time,
            end_time,
            vote_count: 0,
            reveal_requested: false,
            finalized: false,
        });

        Ok(&self.polls[self.polls.len() - 1])
    }

    pub fn get(&self, id: PollId) -> Option<&Poll> {
        let index = id.0.checked_sub(1)?;
        self.polls.get(index as usize)
    }

    /// Like `get`, but fails with `InvalidPoll`
    pub fn require(&self, id: PollId) -> Result<&Poll, PollError> {
        self.get(id).ok_or(PollError::InvalidPoll(id))
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }

    fn require_mut(&mut self, id: PollId) -> Result<&mut Poll, PollError> {
        let index = id.0.checked_sub(1).ok_or(PollError::InvalidPoll(id))?;
        self.polls
            .get_mut(index as usize)
            .ok_or(PollError::InvalidPoll(id))
    }

    pub(crate) fn increment_vote_count(&mut self, id: PollId) -> Result<VoteId, PollError> {
        let poll = self.require_mut(id)?;
        poll.vote_count += 1;
        Ok(VoteId(poll.vote_count))
    }

    pub(crate) fn mark_reveal_requested(&mut self, id: PollId) -> Result<(), PollError> {
        self.require_mut(id)?.reveal_requested = true;
        Ok(())
    }

    pub(crate) fn mark_finalized(&mut self, id: PollId) -> Result<(), PollError> {
        self.require_mut(id)?.finalized = true;
        Ok(())
    }
}
