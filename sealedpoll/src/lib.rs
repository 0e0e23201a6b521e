#[macro_use]
extern crate serde;

mod attest;
mod book;
mod config;
mod coprocessor;
mod error;
mod event;
mod poll;
mod reveal;
mod serde_hex;
mod tally;
mod types;
mod util;
mod vote;

pub use attest::*;
pub use book::*;
pub use config::*;
pub use coprocessor::*;
pub use error::*;
pub use event::*;
pub use poll::*;
pub use reveal::*;
pub use serde_hex::*;
pub use tally::*;
pub use types::*;
pub use util::*;
pub use vote::*;

#[cfg(test)]
mod tests;
