//! Fuzz target for whole-world operation sequences
//!
//! Drives several simulated clients and the in-memory relay with arbitrary
//! player actions and delivery points.
//!
//! # Invariants
//!
//! - NEVER a harness failure: every refusal is an expected operation error
//! - Clients seated together in a room always agree on the position
//! - Every request is answered once the network is quiet

#![no_main]

use arbitrary::Arbitrary;
use kingside_core::Oracle;
use kingside_harness::{Operation, SimWorld};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    seed: u64,
    clients: u8,
    operations: Vec<Operation>,
}

fuzz_target!(|input: FuzzInput| {
    let clients = input.clients % 4 + 1;
    let mut world = SimWorld::new(clients, input.seed).expect("world");

    for op in &input.operations {
        // Keep ids mostly in range so sessions actually form.
        let op = match *op {
            Operation::CreateGame { client_id, white } => {
                Operation::CreateGame { client_id: client_id % (clients + 1), white }
            },
            Operation::JoinGame { client_id, host_id } => Operation::JoinGame {
                client_id: client_id % (clients + 1),
                host_id: host_id % (clients + 1),
            },
            Operation::PlayMove { client_id, choice } => {
                Operation::PlayMove { client_id: client_id % (clients + 1), choice }
            },
            Operation::DragMove { client_id, choice } => {
                Operation::DragMove { client_id: client_id % (clients + 1), choice }
            },
            Operation::LeaveGame { client_id } => {
                Operation::LeaveGame { client_id: client_id % (clients + 1) }
            },
            ref other => other.clone(),
        };
        world.apply(&op).expect("harness failure");
    }
    world.deliver_all().expect("delivery did not settle");

    for (a, b) in world.paired_clients() {
        let board_a = world.client(a).expect("client").oracle().snapshot();
        let board_b = world.client(b).expect("client").oracle().snapshot();
        assert_eq!(board_a, board_b);
    }
    for id in 0..clients {
        assert_eq!(world.client(id).expect("client").session().pending_request(), None);
    }
});
