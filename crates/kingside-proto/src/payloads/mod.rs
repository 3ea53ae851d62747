//! Payload types, one module per concern.

pub mod game;
pub mod session;
