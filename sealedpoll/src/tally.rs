use crate::*;
use indexmap::IndexMap;
use std::convert::TryFrom;

/// Width in bytes of one slot of a cleartext bundle
pub const SLOT_WIDTH: usize = 32;

/// Final per-option counts of a poll, with the proof that justified them
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub counts: Vec<u64>,

    #[serde(with = "hex_serde")]
    pub proof: Vec<u8>,
}

impl Tally {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Counts keyed by option label, in option order
    pub fn labelled(&self, options: &[String]) -> IndexMap<String, u64> {
        options
            .iter()
            .cloned()
            .zip(self.counts.iter().copied())
            .collect()
    }

    /// Indices of the options with the highest count. Ties return all of them.
    pub fn leaders(&self) -> Vec<usize> {
        let max = match self.counts.iter().max() {
            Some(max) => *max,
            None => return vec![],
        };
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == max)
            .map(|(index, _)| index)
            .collect()
    }
}

/// Turns a raw cleartext bundle into per-option vote counts
///
/// The bundle is a tuple of fixed 32-byte slots, one per vote in ascending
/// vote id order. Slot `i` starts at byte `i * SLOT_WIDTH`; there is no length
/// header. The choice sits in the low (last) byte of its slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TallyDecoder {
    padding: PaddingPolicy,
}

impl TallyDecoder {
    pub fn new(padding: PaddingPolicy) -> Self {
        TallyDecoder { padding }
    }

    /// Decode `vote_count` slots into `option_count` counts.
    ///
    /// Either every slot is counted or an error is returned; no partial
    /// counts escape.
    pub fn decode(
        &self,
        bundle: &[u8],
        vote_count: u64,
        option_count: usize,
    ) -> Result<Vec<u64>, PollError> {
        let expected = usize::try_from(vote_count)
            .ok()
            .and_then(|count| count.checked_mul(SLOT_WIDTH))
            .ok_or(PollError::MalformedBundle {
                expected: usize::MAX,
                found: bundle.len(),
            })?;
        let length_ok = match self.padding {
            PaddingPolicy::Lenient => bundle.len() >= expected,
            PaddingPolicy::Strict => bundle.len() == expected,
        };
        if !length_ok {
            return Err(PollError::MalformedBundle {
                expected,
                found: bundle.len(),
            });
        }

        let mut counts = vec![0u64; option_count];
        for (slot, chunk) in bundle[..expected].chunks_exact(SLOT_WIDTH).enumerate() {
            let (padding, low) = chunk.split_at(SLOT_WIDTH - 1);
            let choice = low[0];

            if self.padding == PaddingPolicy::Strict && padding.iter().any(|b| *b != 0) {
                return Err(PollError::NonZeroPadding { slot });
            }

            if choice as usize >= option_count {
                return Err(PollError::ChoiceOutOfBounds {
                    slot,
                    choice,
                    options: option_count,
                });
            }

            log::debug!("slot {}: choice {}", slot, choice);
            counts[choice as usize] += 1;
        }

        Ok(counts)
    }
}

/// Encode choices as a cleartext bundle, one right-aligned slot per choice
pub fn encode_bundle(choices: &[u8]) -> Vec<u8> {
    let mut bundle = vec![0u8; choices.len() * SLOT_WIDTH];
    for (i, choice) in choices.iter().enumerate() {
        bundle[(i + 1) * SLOT_WIDTH - 1] = *choice;
    }
    bundle
}
