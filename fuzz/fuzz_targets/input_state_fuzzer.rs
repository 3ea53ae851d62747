//! Fuzz target for the drag-and-drop [`InputController`]
//!
//! Nothing the pointer does may produce a move the rules would refuse.
//!
//! # Strategy
//!
//! - Pointer sequences: arbitrary down/move/up/choose events, including
//!   coordinates far off the board and non-finite ones
//! - Modes: free sandbox, restricted to either color, locked
//! - Geometry changes mid-drag, in both orientations
//!
//! # Invariants
//!
//! - Highlighted targets are exactly the oracle's destinations from the origin
//! - A drag only starts on a piece the mode allows to move
//! - Every produced [`Move`] is accepted by the oracle
//! - A promotion prompt always comes from a pawn on its last-but-one rank
//! - After pointer-up the controller is never left dragging

#![no_main]

use arbitrary::Arbitrary;
use kingside_client::{BoardGeometry, InputController, InputOutcome, InputState, InteractionMode};
use kingside_core::{Color, Oracle, PieceKind, PromotionPiece};
use kingside_rules::ShakmatyOracle;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Coord {
    Pixel(i16),
    NotANumber,
    Infinite,
}

impl Coord {
    fn value(self) -> f32 {
        match self {
            Coord::Pixel(p) => f32::from(p),
            Coord::NotANumber => f32::NAN,
            Coord::Infinite => f32::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum PointerEvent {
    Down { x: Coord, y: Coord },
    Move { x: Coord, y: Coord },
    Up { x: Coord, y: Coord },
    Choose(u8),
    Resize { square_size: u8, flipped: bool },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum FuzzMode {
    Free,
    White,
    Black,
    Locked,
}

impl From<FuzzMode> for InteractionMode {
    fn from(mode: FuzzMode) -> Self {
        match mode {
            FuzzMode::Free => InteractionMode::Free,
            FuzzMode::White => InteractionMode::Restricted(Color::White),
            FuzzMode::Black => InteractionMode::Restricted(Color::Black),
            FuzzMode::Locked => InteractionMode::Locked,
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    mode: FuzzMode,
    events: Vec<PointerEvent>,
}

fuzz_target!(|input: FuzzInput| {
    let mode = InteractionMode::from(input.mode);
    let mut oracle = ShakmatyOracle::new();
    let mut controller = InputController::default();

    for event in input.events {
        let outcome = match event {
            PointerEvent::Down { x, y } => controller.pointer_down(x.value(), y.value(), &oracle, mode),
            PointerEvent::Move { x, y } => controller.pointer_move(x.value(), y.value()),
            PointerEvent::Up { x, y } => {
                let outcome = controller.pointer_up(x.value(), y.value());
                assert!(!matches!(controller.state(), InputState::Dragging(_)));
                outcome
            },
            PointerEvent::Choose(index) => {
                let piece = PromotionPiece::ALL[usize::from(index) % PromotionPiece::ALL.len()];
                controller.choose_promotion(piece)
            },
            PointerEvent::Resize { square_size, flipped } => {
                let geometry = BoardGeometry { square_size: f32::from(square_size), flipped };
                controller.set_geometry(geometry);
                InputOutcome::Ignored
            },
        };

        match outcome {
            InputOutcome::DragStarted { origin, targets } => {
                let piece = oracle.piece_at(origin).expect("drag started on an empty square");
                assert_eq!(piece.color, oracle.side_to_move());
                assert_ne!(mode, InteractionMode::Locked);
                if let InteractionMode::Restricted(local) = mode {
                    assert_eq!(piece.color, local);
                }

                let legal: Vec<_> = oracle.legal_moves(origin).into_iter().map(|m| m.to).collect();
                assert_eq!(targets, legal);
            },
            InputOutcome::PromotionPrompt { square, color } => {
                assert_eq!(color, oracle.side_to_move());
                assert_eq!(square.rank(), color.promotion_rank());
                let InputState::AwaitingPromotion(pending) = controller.state() else {
                    panic!("prompt without a pending promotion");
                };
                let pawn = oracle.piece_at(pending.from).expect("promotion from an empty square");
                assert_eq!(pawn.kind, PieceKind::Pawn);
            },
            InputOutcome::Move(mv) => {
                oracle.apply(&mv).expect("input produced an illegal move");
                if oracle.is_checkmate() || oracle.is_stalemate() {
                    oracle.reset();
                }
            },
            InputOutcome::Ignored | InputOutcome::DragMoved { .. } | InputOutcome::Returned { .. } => {},
        }
    }
});
