//! Scripted two-player games.
//!
//! Client 0 hosts, client 1 joins, and a list of moves in coordinate notation
//! is played by whichever of them is to move. Every move goes through the
//! relay before the next one is played.

use kingside_client::{ClientConfig, ClientEvent, SessionStatus};
use kingside_core::{BoardView, Color, GameResult, Move, Oracle, Promotion, Square};

use crate::{ClientId, HarnessError, SimWorld};

const HOST: ClientId = 0;
const GUEST: ClientId = 1;

/// Parse a move like `e2e4` or `e7e8q`.
///
/// The promotion letter may be given in either case; it is re-encoded for
/// `mover`.
pub fn parse_move(text: &str, mover: Color) -> Result<Move, HarnessError> {
    let bad = |reason: &str| HarnessError::BadMove { input: text.to_string(), reason: reason.to_string() };

    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(bad("expected four or five characters"));
    }
    let from: Square = text[0..2].parse().map_err(|_| bad("bad origin square"))?;
    let to: Square = text[2..4].parse().map_err(|_| bad("bad destination square"))?;

    match text[4..].chars().next() {
        None => Ok(Move::new(from, to)),
        Some(letter) => {
            let piece = Promotion::try_from(letter).map_err(|_| bad("bad promotion piece"))?.piece;
            Ok(Move::with_promotion(from, to, Promotion { piece, color: mover }))
        },
    }
}

/// Split a move list on whitespace and commas.
pub fn split_moves(list: &str) -> Vec<&str> {
    list.split(|c: char| c.is_whitespace() || c == ',').filter(|s| !s.is_empty()).collect()
}

/// How a scripted game finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    /// Moves played before the script ran out or the game ended.
    pub moves_played: usize,
    /// Result as seen by the host, then the guest.
    pub results: [Option<GameResult>; 2],
    /// Host's final board.
    pub board: BoardView,
    /// Both clients ended on the same position.
    pub in_sync: bool,
}

/// Play `moves` between a host and a guest.
///
/// Stops early once the game is over; moves after that are not played.
pub fn play_script(
    seed: u64,
    host_color: Color,
    config: &ClientConfig,
    moves: &[&str],
) -> Result<ScriptReport, HarnessError> {
    let mut world = SimWorld::with_config(2, seed, config)?;

    world.handle(HOST, ClientEvent::CreateGame { color: host_color, name: "host".to_string() })?;
    world.deliver_all()?;
    let room_id = room_of(&world, HOST)?;
    tracing::info!(room = %room_id, host_color = %host_color, "game hosted");

    world.handle(GUEST, ClientEvent::JoinGame { room_id, name: "guest".to_string() })?;
    world.deliver_all()?;

    let mut moves_played = 0;
    for text in moves {
        if is_over(&world) {
            tracing::info!(remaining = moves.len() - moves_played, "game over, rest of script skipped");
            break;
        }

        let (mover, color) = to_move(&world)?;
        let mv = parse_move(text, color)?;
        world.handle(mover, ClientEvent::PlayMove(mv))?;
        world.deliver_all()?;
        moves_played += 1;
        tracing::debug!(%mv, client = mover, "scripted move played");
    }

    let host = world.client(HOST).ok_or(HarnessError::UnknownClient(HOST))?;
    let guest = world.client(GUEST).ok_or(HarnessError::UnknownClient(GUEST))?;

    Ok(ScriptReport {
        moves_played,
        results: [host.session().result(), guest.session().result()],
        board: host.board(),
        in_sync: host.oracle().snapshot() == guest.oracle().snapshot(),
    })
}

fn room_of(world: &SimWorld, id: ClientId) -> Result<String, HarnessError> {
    let client = world.client(id).ok_or(HarnessError::UnknownClient(id))?;
    client.session().room_id().map(str::to_owned).ok_or(HarnessError::NoRoom(id))
}

fn is_over(world: &SimWorld) -> bool {
    [HOST, GUEST].into_iter().filter_map(|id| world.client(id)).any(|client| {
        matches!(client.session().status(), SessionStatus::Ended(_))
    })
}

/// Which client is to move, and with which color.
fn to_move(world: &SimWorld) -> Result<(ClientId, Color), HarnessError> {
    let host = world.client(HOST).ok_or(HarnessError::UnknownClient(HOST))?;
    let color = host.oracle().side_to_move();
    let mover = if host.session().local_color() == color { HOST } else { GUEST };
    Ok((mover, color))
}

#[cfg(test)]
mod tests {
    use kingside_core::{Outcome, PromotionPiece, TerminalKind};

    use super::*;

    #[test]
    fn parses_plain_and_promoting_moves() {
        let mv = parse_move("e2e4", Color::White).unwrap();
        assert_eq!(mv.to_string(), "e2e4");

        let white = parse_move("a7a8q", Color::White).unwrap();
        assert_eq!(white.promotion, Some(Promotion { piece: PromotionPiece::Queen, color: Color::White }));

        let black = parse_move("h2h1N", Color::Black).unwrap();
        assert_eq!(black.to_string(), "h2h1n");
    }

    #[test]
    fn rejects_garbage() {
        for text in ["", "e2", "e2e9", "z2e4", "e7e8x", "e7e8qq", "é2e4"] {
            assert!(parse_move(text, Color::White).is_err(), "{text}");
        }
    }

    #[test]
    fn splits_on_commas_and_spaces() {
        assert_eq!(split_moves(" e2e4, e7e5  g1f3,"), vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn scholars_mate_ends_for_both() {
        let moves = split_moves("e2e4 e7e5 f1c4 b8c6 d1h5 g8f6 h5f7 a7a6");
        let report = play_script(11, Color::White, &ClientConfig::default(), &moves).unwrap();

        assert_eq!(report.moves_played, 7);
        assert!(report.in_sync);
        let [host, guest] = report.results;
        assert_eq!(host.unwrap().kind, TerminalKind::Checkmate);
        assert_eq!(host.unwrap().outcome, Outcome::Win);
        assert_eq!(guest.unwrap().outcome, Outcome::Lose);
    }

    #[test]
    fn black_host_moves_second() {
        let moves = split_moves("d2d4 d7d5");
        let report = play_script(5, Color::Black, &ClientConfig::default(), &moves).unwrap();

        assert_eq!(report.moves_played, 2);
        assert!(report.in_sync);
        assert_eq!(report.board.side_to_move, Color::White);
    }

    #[test]
    fn illegal_scripted_move_fails_the_run() {
        let moves = split_moves("e2e5");
        let result = play_script(5, Color::White, &ClientConfig::default(), &moves);
        assert!(matches!(result, Err(HarnessError::Client { client: 0, .. })));
    }
}
