//! Fuzz target for inbound frames
//!
//! Feeds arbitrary bytes to the frame decoder and, when they parse, to a
//! client in every session state.
//!
//! # Invariants
//!
//! - Decoding NEVER panics
//! - A frame that decodes is either handled or refused with an error; the
//!   client never panics on it
//! - A refused frame leaves the board untouched

#![no_main]

use std::time::Instant;

use arbitrary::Arbitrary;
use kingside_client::{Client, ClientConfig, ClientEvent, Environment};
use kingside_core::{Color, Oracle};
use kingside_proto::{Ack, Frame};
use kingside_rules::ShakmatyOracle;
use libfuzzer_sys::fuzz_target;

#[derive(Clone)]
struct FuzzEnv;

impl Environment for FuzzEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(0);
    }
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Setup {
    Sandbox,
    Hosting,
    Joining,
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    setup: Setup,
    frames: Vec<Vec<u8>>,
}

fuzz_target!(|input: FuzzInput| {
    let mut client = Client::new(FuzzEnv, ShakmatyOracle::new(), &ClientConfig::default());
    let _ = client.handle(ClientEvent::Connected);

    match input.setup {
        Setup::Sandbox => {},
        Setup::Hosting => {
            let _ = client.handle(ClientEvent::CreateGame { color: Color::White, name: "fuzz".into() });
            let reply = Frame::reply(0, &Ack::ok("FUZZ22".to_string())).expect("reply");
            let _ = client.handle(ClientEvent::FrameReceived(reply));
        },
        Setup::Joining => {
            let _ = client.handle(ClientEvent::JoinGame { room_id: "FUZZ22".into(), name: "fuzz".into() });
        },
    }

    for bytes in input.frames {
        let Ok(frame) = Frame::decode(&bytes) else {
            continue;
        };
        let before = client.oracle().snapshot();
        if client.handle(ClientEvent::FrameReceived(frame)).is_err() {
            assert_eq!(client.oracle().snapshot(), before);
        }
    }
});
