//! Kingside rules
//!
//! Production [`Oracle`](kingside_core::Oracle) over the `shakmaty` move
//! generator. The client never reimplements chess rules; it only drives this
//! adapter.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod convert;
mod oracle;
mod repetition;

pub use oracle::ShakmatyOracle;
