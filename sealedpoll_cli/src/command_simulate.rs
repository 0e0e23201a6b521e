use crate::config::CliConfig;
use crate::scenario::{voter_principal, Scenario};
use indexmap::IndexMap;
use sealedpoll::*;
use serde::Serialize;

#[derive(Serialize)]
struct Rejection {
    voter: String,
    time: u64,
    error: String,
}

#[derive(Serialize)]
struct Report {
    poll: Poll,
    rejected: Vec<Rejection>,
    events: Vec<Event>,
    tally: IndexMap<String, u64>,
    leaders: Vec<String>,
}

pub fn command_simulate(matches: &clap::ArgMatches, config: CliConfig) {
    let filename = match matches.value_of("SCENARIO") {
        Some(filename) => filename,
        None => {
            eprintln!("sealedpoll simulate: scenario filename required");
            std::process::exit(1);
        }
    };

    let file_bytes = match std::fs::read(filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("sealedpoll simulate: unable to read {}: {}", filename, e);
            std::process::exit(1);
        }
    };

    let scenario = Scenario::from_bytes(&file_bytes).unwrap_or_else(|e| {
        eprintln!("sealedpoll simulate: unable to parse {}: {}", filename, e);
        std::process::exit(1);
    });

    match simulate(&scenario, config) {
        Ok(report) => {
            let json = serde_json::to_string_pretty(&report)
                .expect("sealedpoll: Unexpected error serializing report");
            println!("{}", json);
        }
        Err(e) => {
            eprintln!("sealedpoll simulate: {}", e);
            std::process::exit(1);
        }
    }
}

fn simulate(scenario: &Scenario, config: CliConfig) -> Result<Report, PollError> {
    let input_signer = InputSigner::new(&config.input_secret_key);
    let kms = KmsSigner::new(&config.kms_secret_key);
    let coprocessor = LocalCoprocessor::new(input_signer.public(), vec![kms.public()], 1);
    let mut book = PollBook::new(config.poll, coprocessor);

    let creator = voter_principal("creator");
    let poll_id = book.create_poll(
        creator,
        &scenario.question,
        &scenario.options,
        scenario.start_time,
        scenario.end_time,
        scenario.created_at,
    )?;

    let mut rejected = Vec::new();
    let mut ballots = scenario.ballots.clone();
    ballots.sort_by_key(|b| b.time);
    for ballot in &ballots {
        let voter = voter_principal(&ballot.voter);
        let input = [ValueType::Uint8 as u8, ballot.choice];
        let proof = input_signer.prove(book.address(), &voter, &input);

        if let Err(e) = book.cast_vote(poll_id, voter, &input, &proof, ballot.time) {
            log::warn!("ballot from {} rejected: {}", ballot.voter, e);
            rejected.push(Rejection {
                voter: ballot.voter.clone(),
                time: ballot.time,
                error: e.to_string(),
            });
        }
    }

    let reveal_time = scenario.reveal_time.unwrap_or(scenario.end_time);
    let ids = book.request_poll_reveal(poll_id, reveal_time)?;

    // Act as the off-system decryption service
    let choices = ids
        .iter()
        .map(|id| {
            book.coprocessor()
                .public_ciphertext(id)
                .map(|body| body.first().copied().unwrap_or(0))
        })
        .collect::<Result<Vec<u8>, CoprocessorError>>()?;
    let clear = encode_bundle(&choices);
    let proof = attest(std::slice::from_ref(&kms), &ids, &clear);

    let tally = book.resolve_poll_callback(poll_id, &clear, &proof)?.clone();
    let poll = book.get_poll(poll_id).cloned().ok_or(PollError::InvalidPoll(poll_id))?;

    Ok(Report {
        tally: tally.labelled(&poll.options),
        leaders: tally
            .leaders()
            .into_iter()
            .map(|i| poll.options[i].clone())
            .collect(),
        events: book.events_mut().drain(),
        rejected,
        poll,
    })
}
