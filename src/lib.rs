//! Rotating small-group assignment.
//!
//! Splits a roster into small groups each round while avoiding repeated
//! pairings from recent rounds and rotating who leads each group.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Grouping`, `Permutation`
//! - **`similarity`**: Repeat-pairing scores between groups and rounds
//! - **`validation`**: Roster and round integrity checks
//! - **`partition`**: Random partitioning into groups of a target size
//! - **`search`**: Best-of-N and target-score searches over history
//! - **`leader`**: Leader rotation by least leadership score
//! - **`round`**: Search plus leader rotation in one call
//! - **`store`**, **`roster`**, **`render`**, **`config`**: I/O and CLI glue
//!
//! # Randomness
//!
//! Every randomized operation takes `&mut R where R: rand::Rng`, so runs
//! are reproducible with a seeded generator.

pub mod config;
pub mod error;
pub mod leader;
pub mod models;
pub mod partition;
pub mod render;
pub mod roster;
pub mod round;
pub mod search;
pub mod similarity;
pub mod store;
pub mod validation;

pub use error::{GroupingError, GroupingResult};
