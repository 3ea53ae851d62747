//! In-memory relay.
//!
//! Plays the role of the room server: hands out room codes, seats at most two
//! players per room, and forwards moves from one seat to the other. It has no
//! notion of chess; move frames are passed through unread apart from the room
//! they claim to belong to.
//!
//! A room that has seated its second player is closed to new joiners even if
//! one of them leaves afterwards. A room with nobody left in it is dropped.

use std::collections::{BTreeMap, HashMap};

use kingside_core::Environment;
use kingside_proto::{
    Ack, CreateGame, Empty, EventName, Frame, FrameKind, JoinGame, LeaveGame, MakeMove,
    PlayerInfo, ProtoError, RemoteMove, RoomId,
};

use crate::ClientId;

/// Length of generated room codes.
pub const ROOM_CODE_LEN: usize = 6;

/// Characters room codes are drawn from. No 0/O or 1/I.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Frames the relay wants delivered, addressed by client.
pub type Outbound = Vec<(ClientId, Frame)>;

/// A player sitting in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    /// Connection the player is on.
    pub client: ClientId,
    /// What the player announced.
    pub info: PlayerInfo,
}

#[derive(Debug, Clone, Default)]
struct Room {
    seats: Vec<Seat>,
    started: bool,
}

/// Room server for simulated clients.
#[derive(Debug)]
pub struct SimRelay<E: Environment> {
    env: E,
    rooms: BTreeMap<RoomId, Room>,
    seated: HashMap<ClientId, RoomId>,
}

impl<E: Environment> SimRelay<E> {
    /// Create an empty relay.
    pub fn new(env: E) -> Self {
        Self { env, rooms: BTreeMap::new(), seated: HashMap::new() }
    }

    /// Players in `room_id`, host first.
    pub fn seats(&self, room_id: &str) -> Option<&[Seat]> {
        self.rooms.get(room_id).map(|room| room.seats.as_slice())
    }

    /// Room the client currently sits in.
    pub fn room_of(&self, client: ClientId) -> Option<&str> {
        self.seated.get(&client).map(String::as_str)
    }

    /// Number of open rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Handle one frame from `from`.
    ///
    /// # Errors
    ///
    /// Returns `ProtoError` if the body does not match the event name or a
    /// reply cannot be encoded.
    pub fn handle(&mut self, from: ClientId, frame: &Frame) -> Result<Outbound, ProtoError> {
        match frame.kind {
            FrameKind::Request { name: EventName::CreateGame, request_id } => {
                let request: CreateGame = frame.decode_body()?;
                self.create(from, request_id, request)
            },
            FrameKind::Request { name: EventName::JoinGame, request_id } => {
                let request: JoinGame = frame.decode_body()?;
                self.join(from, request_id, request)
            },
            FrameKind::Request { name: EventName::LeaveGame, request_id } => {
                let request: LeaveGame = frame.decode_body()?;
                self.leave(from, request_id, &request)
            },
            FrameKind::Request { name, request_id } => {
                tracing::warn!(client = from, %name, "unsupported request");
                Ok(vec![(from, Frame::reply(request_id, &Ack::<Empty>::err("unsupported request"))?)])
            },
            FrameKind::Event(EventName::MakeMove) => {
                let outbound: MakeMove = frame.decode_body()?;
                self.forward_move(from, outbound)
            },
            FrameKind::Event(name) => {
                tracing::warn!(client = from, %name, "ignoring event from client");
                Ok(Vec::new())
            },
            FrameKind::Reply { request_id } => {
                tracing::warn!(client = from, request_id, "relay sent no request");
                Ok(Vec::new())
            },
        }
    }

    /// The client's connection went away.
    ///
    /// # Errors
    ///
    /// Returns `ProtoError` if a notification cannot be encoded.
    pub fn disconnect(&mut self, client: ClientId) -> Result<Outbound, ProtoError> {
        self.vacate(client)
    }

    fn create(
        &mut self,
        from: ClientId,
        request_id: u64,
        request: CreateGame,
    ) -> Result<Outbound, ProtoError> {
        let mut out = self.vacate(from)?;
        let room_id = self.fresh_code();

        let host = Seat { client: from, info: PlayerInfo { name: request.name, color: request.color } };
        self.rooms.insert(room_id.clone(), Room { seats: vec![host], started: false });
        self.seated.insert(from, room_id.clone());

        tracing::debug!(client = from, room = %room_id, "room created");
        out.push((from, Frame::reply(request_id, &Ack::ok(room_id))?));
        Ok(out)
    }

    fn join(
        &mut self,
        from: ClientId,
        request_id: u64,
        request: JoinGame,
    ) -> Result<Outbound, ProtoError> {
        let refusal = match self.rooms.get(&request.room_id) {
            None => Some("room not found"),
            Some(room) if room.seats.iter().any(|seat| seat.client == from) => {
                Some("already in this room")
            },
            Some(room) if room.started || room.seats.len() >= 2 => Some("room is full"),
            Some(_) => None,
        };
        if let Some(reason) = refusal {
            tracing::debug!(client = from, room = %request.room_id, reason, "join refused");
            return Ok(vec![(from, Frame::reply(request_id, &Ack::<PlayerInfo>::err(reason))?)]);
        }

        let mut out = self.vacate(from)?;
        let Some(room) = self.rooms.get_mut(&request.room_id) else {
            return Ok(vec![(from, Frame::reply(request_id, &Ack::<PlayerInfo>::err("room not found"))?)]);
        };
        let Some(host) = room.seats.first().cloned() else {
            return Ok(vec![(from, Frame::reply(request_id, &Ack::<PlayerInfo>::err("room not found"))?)]);
        };

        let guest = PlayerInfo { name: request.name, color: host.info.color.opposite() };
        room.seats.push(Seat { client: from, info: guest.clone() });
        room.started = true;
        self.seated.insert(from, request.room_id.clone());

        tracing::debug!(client = from, room = %request.room_id, host = host.client, "room started");
        out.push((host.client, Frame::event(EventName::OpponentConnected, &guest)?));
        out.push((from, Frame::reply(request_id, &Ack::ok(host.info))?));
        Ok(out)
    }

    fn leave(
        &mut self,
        from: ClientId,
        request_id: u64,
        request: &LeaveGame,
    ) -> Result<Outbound, ProtoError> {
        let mut out = if self.room_of(from) == Some(request.room_id.as_str()) {
            self.vacate(from)?
        } else {
            tracing::warn!(client = from, room = %request.room_id, "leave for a room not sat in");
            Vec::new()
        };
        out.push((from, Frame::reply(request_id, &Ack::ok(Empty {}))?));
        Ok(out)
    }

    fn forward_move(&self, from: ClientId, outbound: MakeMove) -> Result<Outbound, ProtoError> {
        if self.room_of(from) != Some(outbound.room_id.as_str()) {
            tracing::warn!(client = from, room = %outbound.room_id, "move for a room not sat in");
            return Ok(Vec::new());
        }
        let Some(room) = self.rooms.get(&outbound.room_id) else {
            return Ok(Vec::new());
        };

        let inbound = RemoteMove::from(outbound);
        let mut out = Vec::new();
        for seat in room.seats.iter().filter(|seat| seat.client != from) {
            out.push((seat.client, Frame::event(EventName::MakeMove, &inbound)?));
        }
        Ok(out)
    }

    /// Take `client` out of its room, telling whoever is left.
    fn vacate(&mut self, client: ClientId) -> Result<Outbound, ProtoError> {
        let Some(room_id) = self.seated.remove(&client) else {
            return Ok(Vec::new());
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Ok(Vec::new());
        };

        room.seats.retain(|seat| seat.client != client);
        let mut out = Vec::with_capacity(room.seats.len());
        for seat in &room.seats {
            out.push((seat.client, Frame::event(EventName::OpponentDisconnected, &Empty {})?));
        }

        if room.seats.is_empty() {
            self.rooms.remove(&room_id);
            tracing::debug!(room = %room_id, "room closed");
        }
        Ok(out)
    }

    fn fresh_code(&self) -> RoomId {
        loop {
            let code: String = (0..ROOM_CODE_LEN)
                .map(|_| {
                    let pick = self.env.random_u64() % ROOM_CODE_ALPHABET.len() as u64;
                    let index = usize::try_from(pick).unwrap_or_default();
                    char::from(ROOM_CODE_ALPHABET[index])
                })
                .collect();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kingside_core::Color;

    use super::*;
    use crate::SimEnv;

    fn relay() -> SimRelay<SimEnv> {
        SimRelay::new(SimEnv::with_seed(7))
    }

    fn create(relay: &mut SimRelay<SimEnv>, client: ClientId, color: Color) -> RoomId {
        let request = CreateGame { color, name: format!("p{client}") };
        let frame = Frame::request(EventName::CreateGame, 1, &request).unwrap();
        let out = relay.handle(client, &frame).unwrap();
        let (to, reply) = out.last().unwrap();
        assert_eq!(*to, client);
        reply.decode_body::<Ack<RoomId>>().unwrap().into_payload().unwrap()
    }

    fn join(relay: &mut SimRelay<SimEnv>, client: ClientId, room_id: &str) -> Outbound {
        let request = JoinGame { room_id: room_id.to_string(), name: format!("p{client}") };
        let frame = Frame::request(EventName::JoinGame, 2, &request).unwrap();
        relay.handle(client, &frame).unwrap()
    }

    fn reply_for(out: &Outbound, client: ClientId) -> Ack<PlayerInfo> {
        let (_, frame) = out
            .iter()
            .find(|(to, frame)| *to == client && matches!(frame.kind, FrameKind::Reply { .. }))
            .unwrap();
        frame.decode_body().unwrap()
    }

    #[test]
    fn room_codes_use_the_alphabet() {
        let mut relay = relay();
        let code = create(&mut relay, 0, Color::White);

        assert_eq!(code.len(), ROOM_CODE_LEN);
        assert!(code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
        assert_eq!(relay.room_of(0), Some(code.as_str()));
    }

    #[test]
    fn join_seats_guest_with_other_color_and_tells_host() {
        let mut relay = relay();
        let code = create(&mut relay, 0, Color::Black);

        let out = join(&mut relay, 1, &code);

        let host = reply_for(&out, 1).into_payload().unwrap();
        assert_eq!(host.color, Color::Black);

        let (_, notice) = out.iter().find(|(to, _)| *to == 0).unwrap();
        assert_eq!(notice.kind, FrameKind::Event(EventName::OpponentConnected));
        let guest: PlayerInfo = notice.decode_body().unwrap();
        assert_eq!(guest, PlayerInfo { name: "p1".to_string(), color: Color::White });
    }

    #[test]
    fn unknown_room_is_refused() {
        let mut relay = relay();
        let out = join(&mut relay, 1, "NOPE22");

        let ack = reply_for(&out, 1);
        assert!(!ack.success);
        assert_eq!(ack.reason.as_deref(), Some("room not found"));
    }

    #[test]
    fn started_room_stays_closed() {
        let mut relay = relay();
        let code = create(&mut relay, 0, Color::White);
        join(&mut relay, 1, &code);

        let leave = Frame::request(EventName::LeaveGame, 3, &LeaveGame { room_id: code.clone() }).unwrap();
        relay.handle(1, &leave).unwrap();

        let out = join(&mut relay, 2, &code);
        assert_eq!(reply_for(&out, 2).reason.as_deref(), Some("room is full"));
    }

    #[test]
    fn moves_go_to_the_other_seat_only() {
        let mut relay = relay();
        let code = create(&mut relay, 0, Color::White);
        join(&mut relay, 1, &code);

        let outbound = MakeMove {
            mv: kingside_proto::Move::new("e2".parse().unwrap(), "e4".parse().unwrap()),
            room_id: code,
        };
        let frame = Frame::event(EventName::MakeMove, &outbound).unwrap();

        let out = relay.handle(0, &frame).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, 1);
        let inbound: RemoteMove = out[0].1.decode_body().unwrap();
        assert_eq!(inbound.mv, outbound.mv);
    }

    #[test]
    fn leaving_notifies_and_last_out_closes_the_room() {
        let mut relay = relay();
        let code = create(&mut relay, 0, Color::White);
        join(&mut relay, 1, &code);

        let out = relay.disconnect(0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, 1);
        assert_eq!(out[0].1.kind, FrameKind::Event(EventName::OpponentDisconnected));
        assert_eq!(relay.room_count(), 1);

        let out = relay.disconnect(1).unwrap();
        assert!(out.is_empty());
        assert_eq!(relay.room_count(), 0);
    }

    #[test]
    fn creating_again_moves_the_client() {
        let mut relay = relay();
        let first = create(&mut relay, 0, Color::White);
        let second = create(&mut relay, 0, Color::White);

        assert_ne!(first, second);
        assert!(relay.seats(&first).is_none());
        assert_eq!(relay.room_of(0), Some(second.as_str()));
    }
}
