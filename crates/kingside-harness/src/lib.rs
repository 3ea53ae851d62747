//! Deterministic simulation harness for Kingside.
//!
//! Runs several clients against an in-memory relay with a virtual clock and a
//! seeded RNG, so any interleaving of player actions and frame deliveries can
//! be replayed exactly from its seed.
//!
//! # Components
//!
//! - [`SimEnv`]: seeded `Environment` with a manually advanced clock
//! - [`SimRelay`]: room server that seats two players and forwards moves
//! - [`SimWorld`]: clients, relay and the byte-level wire between them
//! - [`Operation`]: what proptest and the fuzzer throw at a world
//! - [`script`]: two-player games driven from a move list

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod operation;
pub mod relay;
pub mod script;
mod sim_env;
pub mod world;

pub use error::HarnessError;
pub use operation::{ClientId, Operation, OperationError, OperationResult};
pub use relay::{Seat, SimRelay};
pub use sim_env::SimEnv;
pub use world::{ClientState, ObservableState, SimClient, SimWorld};
