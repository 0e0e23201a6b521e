use super::*;

// Stand-in ballot "encryption": the coprocessor never looks inside, and the
// test decryption service reads the choice back from the first body byte.
fn ballot(choice: u8) -> Vec<u8> {
    let noise: [u8; 8] = rand::random();
    let mut input = vec![ValueType::Uint8 as u8, choice];
    input.extend_from_slice(&noise);
    input
}

struct Harness {
    book: PollBook<LocalCoprocessor>,
    input_signer: InputSigner,
    kms: Vec<KmsSigner>,
}

impl Harness {
    fn new(padding: PaddingPolicy) -> Self {
        let input_signer = InputSigner::generate();
        let kms = vec![KmsSigner::generate(), KmsSigner::generate()];
        let coprocessor = LocalCoprocessor::new(
            input_signer.public(),
            kms.iter().map(|k| k.public()).collect(),
            2,
        );
        let mut config = PollConfig::new(Principal([0xcc; 32]));
        config.padding = padding;

        Harness {
            book: PollBook::new(config, coprocessor),
            input_signer,
            kms,
        }
    }

    fn vote(&mut self, poll_id: PollId, voter: Principal, choice: u8, now: u64) -> Result<VoteId, PollError> {
        let input = ballot(choice);
        let proof = self
            .input_signer
            .prove(self.book.address(), &voter, &input);
        self.book.cast_vote(poll_id, voter, &input, &proof, now)
    }

    // The off-system decryption service
    fn decrypt(&self, ids: &[CiphertextId]) -> (Vec<u8>, Vec<u8>) {
        let choices: Vec<u8> = ids
            .iter()
            .map(|id| self.book.coprocessor().public_ciphertext(id).unwrap()[0])
            .collect();
        let clear = encode_bundle(&choices);
        let proof = attest(&self.kms, ids, &clear);
        (clear, proof)
    }
}

fn labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

#[test]
fn end_to_end_poll() {
    let t = 1_000;
    let mut h = Harness::new(PaddingPolicy::Lenient);
    let creator = Principal([1; 32]);
    let voter_1 = Principal([2; 32]);
    let voter_2 = Principal([3; 32]);

    let poll_id = h
        .book
        .create_poll(creator, "Q", &labels(&["A", "B"]), t + 5, t + 65, t)
        .unwrap();
    assert_eq!(poll_id, PollId(1));
    assert_eq!(h.book.poll_phase(poll_id, t).unwrap(), PollPhase::Open);

    h.vote(poll_id, voter_1, 0, t + 10).unwrap();
    h.vote(poll_id, voter_2, 1, t + 20).unwrap();
    assert!(h.book.has_user_voted(poll_id, &voter_1));

    // Too early
    assert!(matches!(
        h.book.request_poll_reveal(poll_id, t + 64),
        Err(PollError::PollNotClosed(_))
    ));
    assert!(matches!(
        h.book.get_tally(poll_id),
        Err(PollError::TallyNotAvailable(_))
    ));

    let ids = h.book.request_poll_reveal(poll_id, t + 65).unwrap();
    assert_eq!(ids.len(), 2);
    for (i, id) in ids.iter().enumerate() {
        let handle = h.book.get_vote_ciphertext(poll_id, VoteId(i as u64 + 1)).unwrap();
        assert_eq!(*id, h.book.coprocessor().canonical_identifier(&handle).unwrap());
        assert!(h.book.coprocessor().is_publicly_decryptable(&handle));
    }
    assert_eq!(h.book.get_reveal_list(poll_id).unwrap(), ids.as_slice());
    assert_eq!(
        h.book.poll_phase(poll_id, t + 65).unwrap(),
        PollPhase::RevealRequested
    );

    // Decryption happens off-system, then anyone can resolve
    let (clear, proof) = h.decrypt(&ids);
    let tally = h.book.resolve_poll_callback(poll_id, &clear, &proof).unwrap();
    assert_eq!(tally.counts, vec![1, 1]);
    assert_eq!(tally.proof, proof);

    let poll = h.book.get_poll(poll_id).unwrap();
    assert_eq!(poll.vote_count, 2);
    assert!(poll.finalized);
    assert_eq!(h.book.get_tally(poll_id).unwrap().total(), poll.vote_count);
    assert_eq!(
        h.book.poll_phase(poll_id, t + 65).unwrap(),
        PollPhase::Finalized
    );

    assert!(matches!(
        h.book.resolve_poll_callback(poll_id, &clear, &proof),
        Err(PollError::AlreadyFinalized(_))
    ));
    assert!(matches!(
        h.book.request_poll_reveal(poll_id, t + 100),
        Err(PollError::AlreadyFinalized(_))
    ));

    let events = h.book.events_mut().drain();
    let kinds: Vec<String> = events
        .iter()
        .map(|e| serde_json::to_value(e).unwrap()["type"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "poll_created",
            "vote_cast",
            "vote_cast",
            "reveal_requested",
            "poll_finalized"
        ]
    );
    assert_eq!(
        events[4],
        Event::PollFinalized {
            poll_id,
            counts: vec![1, 1],
            total: 2
        }
    );
}

#[test]
fn forged_bundle_changes_nothing() {
    let mut h = Harness::new(PaddingPolicy::Lenient);
    let poll_id = h
        .book
        .create_poll(Principal([1; 32]), "Q", &labels(&["A", "B", "C"]), 0, 10, 0)
        .unwrap();
    h.vote(poll_id, Principal([2; 32]), 2, 1).unwrap();
    h.vote(poll_id, Principal([3; 32]), 2, 2).unwrap();
    let ids = h.book.request_poll_reveal(poll_id, 10).unwrap();
    let (clear, proof) = h.decrypt(&ids);
    let events_before = h.book.events().events().len();

    // Someone rewrites the results
    let forged = encode_bundle(&[0, 0]);
    assert!(matches!(
        h.book.resolve_poll_callback(poll_id, &forged, &proof),
        Err(PollError::ProofVerificationFailed(..))
    ));

    // A valid proof for a different (reordered) identifier list
    let reordered = vec![ids[1], ids[0]];
    let wrong_list = attest(&h.kms, &reordered, &clear);
    let err = h
        .book
        .resolve_poll_callback(poll_id, &clear, &wrong_list)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);

    // Only one of two KMS signers
    let half = attest(&h.kms[..1], &ids, &clear);
    assert!(matches!(
        h.book.resolve_poll_callback(poll_id, &clear, &half),
        Err(PollError::ProofVerificationFailed(
            _,
            CoprocessorError::NotEnoughSignatures(2, 1)
        ))
    ));

    assert!(!h.book.get_poll(poll_id).unwrap().finalized);
    assert!(h.book.get_tally(poll_id).is_err());
    assert_eq!(h.book.events().events().len(), events_before);

    // The genuine result still goes through afterwards
    let tally = h.book.resolve_poll_callback(poll_id, &clear, &proof).unwrap();
    assert_eq!(tally.counts, vec![0, 0, 2]);
}

#[test]
fn verification_precedes_decoding() {
    let mut h = Harness::new(PaddingPolicy::Lenient);
    let poll_id = h
        .book
        .create_poll(Principal([1; 32]), "Q", &labels(&["A", "B"]), 0, 10, 0)
        .unwrap();
    h.vote(poll_id, Principal([2; 32]), 1, 1).unwrap();
    let ids = h.book.request_poll_reveal(poll_id, 10).unwrap();

    // Out-of-range choice with a bad proof reports the proof failure
    let bogus = encode_bundle(&[9]);
    assert!(matches!(
        h.book.resolve_poll_callback(poll_id, &bogus, b"junk"),
        Err(PollError::ProofVerificationFailed(..))
    ));

    // Correctly signed but undecodable input is rejected by the decoder, atomically
    let signed_bogus = attest(&h.kms, &ids, &bogus);
    assert!(matches!(
        h.book.resolve_poll_callback(poll_id, &bogus, &signed_bogus),
        Err(PollError::ChoiceOutOfBounds { choice: 9, .. })
    ));
    assert!(!h.book.get_poll(poll_id).unwrap().finalized);
    assert!(h.book.get_tally(poll_id).is_err());
}

#[test]
fn reveal_state_conflicts() {
    let mut h = Harness::new(PaddingPolicy::Lenient);
    let poll_id = h
        .book
        .create_poll(Principal([1; 32]), "Q", &labels(&["A", "B"]), 0, 10, 0)
        .unwrap();

    assert!(matches!(
        h.book.resolve_poll_callback(poll_id, &[], &[]),
        Err(PollError::NotRequested(_))
    ));
    assert!(matches!(
        h.book.request_poll_reveal(poll_id, 11),
        Err(PollError::IncompleteVotes(_))
    ));
    assert!(matches!(
        h.book.request_poll_reveal(PollId(42), 11),
        Err(PollError::InvalidPoll(_))
    ));

    let second = h
        .book
        .create_poll(Principal([1; 32]), "Q2", &labels(&["A", "B"]), 0, 10, 0)
        .unwrap();
    h.vote(second, Principal([2; 32]), 0, 5).unwrap();
    let ids = h.book.request_poll_reveal(second, 10).unwrap();
    let events_before = h.book.events().events().len();

    assert!(matches!(
        h.book.request_poll_reveal(second, 12),
        Err(PollError::AlreadyRequested(_))
    ));
    assert_eq!(h.book.events().events().len(), events_before);
    assert_eq!(h.book.get_reveal_list(second).unwrap(), ids.as_slice());

    // Voting at the end second after the reveal is frozen
    assert!(matches!(
        h.vote(second, Principal([3; 32]), 1, 10),
        Err(PollError::PollNotActive(_))
    ));
    assert_eq!(h.book.get_poll(second).unwrap().vote_count, 1);
    assert_eq!(h.book.poll_count(), 2);
}

#[test]
fn lookups_of_missing_polls_and_votes() {
    let mut h = Harness::new(PaddingPolicy::Lenient);
    let poll_id = h
        .book
        .create_poll(Principal([1; 32]), "Q", &labels(&["A", "B"]), 0, 10, 0)
        .unwrap();
    h.vote(poll_id, Principal([2; 32]), 0, 3).unwrap();

    let missing = PollId(9);
    assert!(matches!(
        h.book.resolve_poll_callback(missing, &[], &[]),
        Err(PollError::InvalidPoll(PollId(9)))
    ));
    assert!(matches!(
        h.book.get_tally(missing),
        Err(PollError::InvalidPoll(PollId(9)))
    ));
    assert!(matches!(
        h.book.get_vote_ciphertext(missing, VoteId(1)),
        Err(PollError::InvalidPoll(PollId(9)))
    ));

    let err = h.book.get_vote_ciphertext(poll_id, VoteId(5)).unwrap_err();
    assert!(matches!(err, PollError::VoteNotFound(PollId(1), VoteId(5))));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "sealedpoll: vote 5 does not exist in poll 1");
    assert!(h.book.get_vote_ciphertext(poll_id, VoteId(1)).is_ok());
}

#[test]
fn closed_poll_admits_votes_in_its_last_second() {
    let mut h = Harness::new(PaddingPolicy::Lenient);
    let poll_id = h
        .book
        .create_poll(Principal([1; 32]), "Q", &labels(&["A", "B"]), 0, 10, 0)
        .unwrap();

    assert_eq!(h.book.poll_phase(poll_id, 10).unwrap(), PollPhase::Closed);
    h.vote(poll_id, Principal([2; 32]), 1, 10).unwrap();
    assert!(matches!(
        h.vote(poll_id, Principal([3; 32]), 1, 11),
        Err(PollError::PollNotActive(_))
    ));

    h.book.request_poll_reveal(poll_id, 10).unwrap();
    assert!(matches!(
        h.vote(poll_id, Principal([4; 32]), 0, 10),
        Err(PollError::PollNotActive(_))
    ));
    assert_eq!(h.book.get_poll(poll_id).unwrap().vote_count, 1);
}

#[test]
fn strict_padding_policy_applies_to_resolution() {
    let mut h = Harness::new(PaddingPolicy::Strict);
    let poll_id = h
        .book
        .create_poll(Principal([1; 32]), "Q", &labels(&["A", "B"]), 0, 10, 0)
        .unwrap();
    h.vote(poll_id, Principal([2; 32]), 1, 1).unwrap();
    let ids = h.book.request_poll_reveal(poll_id, 10).unwrap();

    let mut dirty = encode_bundle(&[1]);
    dirty[0] = 0x80;
    let proof = attest(&h.kms, &ids, &dirty);
    assert!(matches!(
        h.book.resolve_poll_callback(poll_id, &dirty, &proof),
        Err(PollError::NonZeroPadding { slot: 0 })
    ));

    let (clear, proof) = h.decrypt(&ids);
    assert_eq!(
        h.book
            .resolve_poll_callback(poll_id, &clear, &proof)
            .unwrap()
            .counts,
        vec![0, 1]
    );
}
