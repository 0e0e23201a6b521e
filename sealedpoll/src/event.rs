use crate::*;

/// Notification emitted when a poll book operation commits
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Event {
    PollCreated {
        poll_id: PollId,
        creator: Principal,
        option_count: usize,
        start_time: u64,
        end_time: u64,
    },
    VoteCast {
        poll_id: PollId,
        vote_id: VoteId,
    },
    RevealRequested {
        poll_id: PollId,
        ids: Vec<CiphertextId>,
    },
    PollFinalized {
        poll_id: PollId,
        counts: Vec<u64>,
        total: u64,
    },
}

/// Ordered log of emitted events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Hand all pending events to the caller, leaving the log empty
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
