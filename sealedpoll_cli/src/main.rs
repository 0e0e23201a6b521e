use clap::{App, Arg, SubCommand};

mod command_keygen;
mod command_simulate;
mod config;
mod scenario;

use command_keygen::command_keygen;
use command_simulate::command_simulate;

fn main() {
    let matches = App::new("sealedpoll")
        .version("0.1")
        .about("Runs encrypted polls with a verifiable public reveal")
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .global(true)
                .help("Poll book config file (JSON) - can also be set with SEALEDPOLL_CONFIG"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate an ed25519 keypair"))
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Run a scripted poll through creation, voting and reveal")
                .arg(
                    Arg::with_name("SCENARIO")
                        .index(1)
                        .required(true)
                        .help("Scenario file in JSON or CBOR format"),
                )
                .arg(
                    Arg::with_name("kms-secret-key")
                        .long("kms-secret-key")
                        .takes_value(true)
                        .help("Hex KMS signing key - can also be set with SEALEDPOLL_KMS_SECRET_KEY"),
                )
                .arg(
                    Arg::with_name("input-secret-key")
                        .long("input-secret-key")
                        .takes_value(true)
                        .help("Hex input signing key - can also be set with SEALEDPOLL_INPUT_SECRET_KEY"),
                ),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Subcommands
    if let Some(matches) = matches.subcommand_matches("keygen") {
        command_keygen(matches);
        std::process::exit(0);
    }

    if let Some(matches) = matches.subcommand_matches("simulate") {
        let config = config::CliConfig::load(matches).unwrap_or_else(|e| {
            eprintln!("sealedpoll: {}", e);
            std::process::exit(1);
        });
        command_simulate(matches, config);
        std::process::exit(0);
    }

    eprintln!("{}", matches.usage());
    std::process::exit(1);
}
