//! Simulated world: clients, relay and the wire between them.
//!
//! Every frame crosses the wire as CBOR bytes, exactly as it would over a
//! socket. Frames from clients queue up until [`SimWorld::deliver_all`] runs,
//! which drains the relay side first and then each client's inbox in client
//! order, repeating until nothing is in flight. Per-client ordering is
//! preserved; interleaving across clients is decided by the operation
//! sequence alone, so a run is a pure function of its seed and operations.

use std::{collections::VecDeque, time::Duration};

use kingside_client::{
    ChannelError, Client, ClientAction, ClientConfig, ClientError, ClientEvent, SessionStatus,
};
use kingside_core::{
    BoardSnapshot, Color, Environment, Move, Oracle, PlayerInfo, Promotion, PromotionPiece, Square,
    validator::legal_targets,
};
use kingside_proto::{EventName, Frame};
use kingside_rules::ShakmatyOracle;

use crate::{
    ClientId, HarnessError, Operation, OperationError, OperationResult, SimEnv, SimRelay,
};

/// Upper bound on relay/client exchange rounds per delivery.
pub const MAX_DELIVERY_ROUNDS: usize = 1_000;

/// Room code no generated code can collide with.
const NO_ROOM: &str = "------";

/// A client as driven by the simulation.
pub type SimClient = Client<ShakmatyOracle, SimEnv>;

struct Peer {
    id: ClientId,
    client: SimClient,
    inbox: VecDeque<Vec<u8>>,
}

/// What one client shows, for comparing runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientState {
    /// Session lifecycle state.
    pub status: SessionStatus,
    /// Room code held.
    pub room_id: Option<String>,
    /// Color played.
    pub local_color: Color,
    /// Opponent, while present.
    pub opponent: Option<PlayerInfo>,
    /// Request waiting for its reply.
    pub pending: Option<EventName>,
    /// Board as the oracle reports it.
    pub board: BoardSnapshot,
    /// Messages of the live notices.
    pub notices: Vec<String>,
}

/// Observable state of the whole world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Per-client state, indexed by `ClientId`.
    pub clients: Vec<ClientState>,
    /// Rooms open on the relay.
    pub rooms: usize,
}

/// Oracle for a new client, honoring the configured start position.
pub fn build_oracle(config: &ClientConfig) -> Result<ShakmatyOracle, HarnessError> {
    match &config.initial_fen {
        Some(fen) => Ok(ShakmatyOracle::from_fen(fen)?),
        None => Ok(ShakmatyOracle::new()),
    }
}

/// Complete legal moves for the side to move, in board order.
///
/// Promotions are completed with a queen.
pub fn moves_for_side_to_move<O: Oracle + ?Sized>(oracle: &O) -> Vec<Move> {
    let mover = oracle.side_to_move();
    (0..64)
        .filter_map(Square::from_index)
        .flat_map(|square| legal_targets(oracle, square))
        .map(|legal| {
            if legal.promotion_required {
                let promotion = Promotion { piece: PromotionPiece::Queen, color: mover };
                Move::with_promotion(legal.from, legal.to, promotion)
            } else {
                legal.to_move()
            }
        })
        .collect()
}

/// Clients, relay and in-flight frames.
pub struct SimWorld {
    env: SimEnv,
    relay: SimRelay<SimEnv>,
    peers: Vec<Peer>,
    to_relay: VecDeque<(ClientId, Vec<u8>)>,
}

impl SimWorld {
    /// World of `num_clients` connected clients at the standard start.
    pub fn new(num_clients: u8, seed: u64) -> Result<Self, HarnessError> {
        Self::with_config(num_clients, seed, &ClientConfig::default())
    }

    /// World of `num_clients` connected clients sharing `config`.
    pub fn with_config(
        num_clients: u8,
        seed: u64,
        config: &ClientConfig,
    ) -> Result<Self, HarnessError> {
        let env = SimEnv::with_seed(seed);
        let mut world = Self {
            relay: SimRelay::new(env.clone()),
            env,
            peers: Vec::with_capacity(usize::from(num_clients)),
            to_relay: VecDeque::new(),
        };

        for id in 0..num_clients {
            let client = Client::new(world.env.clone(), build_oracle(config)?, config);
            world.peers.push(Peer { id, client, inbox: VecDeque::new() });
            world.handle(id, ClientEvent::Connected)?;
        }

        tracing::debug!(seed, clients = num_clients, "world created");
        Ok(world)
    }

    /// Number of clients in the world.
    pub fn num_clients(&self) -> usize {
        self.peers.len()
    }

    /// Get a client by ID.
    pub fn client(&self, id: ClientId) -> Option<&SimClient> {
        self.peers.get(usize::from(id)).map(|peer| &peer.client)
    }

    /// The relay.
    pub fn relay(&self) -> &SimRelay<SimEnv> {
        &self.relay
    }

    /// Shared environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Frames sent by clients and not yet seen by the relay.
    pub fn in_flight(&self) -> usize {
        self.to_relay.len()
    }

    /// Feed `event` to a client, queueing whatever it sends.
    pub fn handle(
        &mut self,
        id: ClientId,
        event: ClientEvent,
    ) -> Result<Vec<ClientAction>, HarnessError> {
        match self.dispatch(id, event) {
            Some(result) => result.map_err(|source| HarnessError::Client { client: id, source }),
            None => Err(HarnessError::UnknownClient(id)),
        }
    }

    /// Deliver until no frame is in flight in either direction.
    ///
    /// Returns the number of frames handed to clients.
    pub fn deliver_all(&mut self) -> Result<usize, HarnessError> {
        let mut delivered = 0;
        for _ in 0..MAX_DELIVERY_ROUNDS {
            if self.to_relay.is_empty() && self.peers.iter().all(|peer| peer.inbox.is_empty()) {
                return Ok(delivered);
            }

            while let Some((from, bytes)) = self.to_relay.pop_front() {
                let frame = Frame::decode(&bytes)?;
                for (to, frame) in self.relay.handle(from, &frame)? {
                    self.push_to_client(to, &frame)?;
                }
            }

            for index in 0..self.peers.len() {
                let id = self.peers[index].id;
                while let Some(bytes) = self.peers[index].inbox.pop_front() {
                    let frame = Frame::decode(&bytes)?;
                    self.handle(id, ClientEvent::FrameReceived(frame))?;
                    delivered += 1;
                }
            }
        }
        Err(HarnessError::Unsettled { rounds: MAX_DELIVERY_ROUNDS })
    }

    /// Drop a client's transport.
    ///
    /// The relay vacates its seat; the client keeps its session.
    pub fn disconnect(&mut self, id: ClientId) -> Result<(), HarnessError> {
        self.handle(id, ClientEvent::Disconnected)?;
        for (to, frame) in self.relay.disconnect(id)? {
            self.push_to_client(to, &frame)?;
        }
        Ok(())
    }

    /// Bring a client's transport back.
    pub fn reconnect(&mut self, id: ClientId) -> Result<(), HarnessError> {
        self.handle(id, ClientEvent::Connected).map(|_| ())
    }

    /// Move the clock and let every client expire its notices.
    pub fn advance(&mut self, duration: Duration) -> Result<(), HarnessError> {
        self.env.advance(duration);
        let now = self.env.now();
        for index in 0..self.peers.len() {
            let id = self.peers[index].id;
            self.handle(id, ClientEvent::Tick { now })?;
        }
        Ok(())
    }

    /// Apply an operation.
    ///
    /// Expected refusals come back as [`OperationResult::Error`]; anything
    /// else that goes wrong is a harness failure.
    pub fn apply(&mut self, op: &Operation) -> Result<OperationResult, HarnessError> {
        if let Some(id) = op.client_id()
            && self.client(id).is_none()
        {
            return Ok(OperationResult::Error(OperationError::InvalidClient));
        }

        match *op {
            Operation::CreateGame { client_id, white } => {
                let color = if white { Color::White } else { Color::Black };
                let name = format!("player-{client_id}");
                self.classify(client_id, ClientEvent::CreateGame { color, name })
            },
            Operation::JoinGame { client_id, host_id } => self.apply_join(client_id, host_id),
            Operation::PlayMove { client_id, choice } => self.apply_play(client_id, choice),
            Operation::DragMove { client_id, choice } => self.apply_drag(client_id, choice),
            Operation::LeaveGame { client_id } => self.classify(client_id, ClientEvent::LeaveGame),
            Operation::AdvanceTime { millis } => {
                self.advance(Duration::from_millis(u64::from(millis)))?;
                Ok(OperationResult::Ok)
            },
            Operation::Deliver => {
                self.deliver_all()?;
                Ok(OperationResult::Ok)
            },
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let clients = self
            .peers
            .iter()
            .map(|peer| {
                let session = peer.client.session();
                ClientState {
                    status: session.status().clone(),
                    room_id: session.room_id().map(str::to_owned),
                    local_color: session.local_color(),
                    opponent: session.opponent().cloned(),
                    pending: session.pending_request(),
                    board: peer.client.oracle().snapshot(),
                    notices: peer.client.notices().iter().map(|n| n.message.clone()).collect(),
                }
            })
            .collect();

        ObservableState { clients, rooms: self.relay.room_count() }
    }

    /// Pairs of clients playing each other.
    ///
    /// Both hold the same room code, both are past the lobby, and the relay
    /// still seats both in that room.
    pub fn paired_clients(&self) -> Vec<(ClientId, ClientId)> {
        let playing = |peer: &Peer| {
            matches!(peer.client.session().status(), SessionStatus::InProgress | SessionStatus::Ended(_))
        };

        let mut pairs = Vec::new();
        for (i, a) in self.peers.iter().enumerate() {
            for b in &self.peers[i + 1..] {
                let (Some(room_a), Some(room_b)) =
                    (a.client.session().room_id(), b.client.session().room_id())
                else {
                    continue;
                };
                if room_a != room_b || !playing(a) || !playing(b) {
                    continue;
                }
                let seated = self.relay.seats(room_a).is_some_and(|seats| {
                    seats.iter().any(|s| s.client == a.id) && seats.iter().any(|s| s.client == b.id)
                });
                if seated {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    fn apply_join(
        &mut self,
        client_id: ClientId,
        host_id: ClientId,
    ) -> Result<OperationResult, HarnessError> {
        let Some(host) = self.client(host_id) else {
            return Ok(OperationResult::Error(OperationError::InvalidClient));
        };
        let room_id = host.session().room_id().unwrap_or(NO_ROOM).to_owned();
        let name = format!("player-{client_id}");
        self.classify(client_id, ClientEvent::JoinGame { room_id, name })
    }

    fn apply_play(
        &mut self,
        client_id: ClientId,
        choice: u16,
    ) -> Result<OperationResult, HarnessError> {
        let Some(mv) = self.pick_move(client_id, choice) else {
            return Ok(OperationResult::Error(OperationError::NoLegalMove));
        };
        self.classify(client_id, ClientEvent::PlayMove(mv))
    }

    fn apply_drag(
        &mut self,
        client_id: ClientId,
        choice: u16,
    ) -> Result<OperationResult, HarnessError> {
        let Some(client) = self.client(client_id) else {
            return Ok(OperationResult::Error(OperationError::InvalidClient));
        };
        let geometry = client.input().geometry();
        let Some(mv) = self.pick_move(client_id, choice) else {
            return Ok(OperationResult::Error(OperationError::NoLegalMove));
        };

        let (x0, y0) = geometry.centre_of(mv.from);
        let (x1, y1) = geometry.centre_of(mv.to);

        let picked_up = self.handle(client_id, ClientEvent::PointerDown { x: x0, y: y0 })?;
        if picked_up.is_empty() {
            return Ok(OperationResult::Error(OperationError::Rejected));
        }
        self.handle(client_id, ClientEvent::PointerMove { x: x1, y: y1 })?;
        let mut dropped = self.handle(client_id, ClientEvent::PointerUp { x: x1, y: y1 })?;

        if dropped.iter().any(|a| matches!(a, ClientAction::PromptPromotion { .. })) {
            dropped = self.handle(client_id, ClientEvent::ChoosePromotion(PromotionPiece::Queen))?;
        }

        if dropped.iter().any(|a| matches!(a, ClientAction::Render(_))) {
            Ok(OperationResult::Ok)
        } else {
            Ok(OperationResult::Error(OperationError::Rejected))
        }
    }

    fn pick_move(&self, client_id: ClientId, choice: u16) -> Option<Move> {
        let moves = moves_for_side_to_move(self.client(client_id)?.oracle());
        if moves.is_empty() {
            return None;
        }
        moves.get(usize::from(choice) % moves.len()).copied()
    }

    /// Run `event` and sort the outcome into expected refusals and failures.
    fn classify(
        &mut self,
        id: ClientId,
        event: ClientEvent,
    ) -> Result<OperationResult, HarnessError> {
        let Some(result) = self.dispatch(id, event) else {
            return Ok(OperationResult::Error(OperationError::InvalidClient));
        };

        let error = match result {
            Ok(_) => return Ok(OperationResult::Ok),
            Err(ClientError::RequestPending { .. }) => OperationError::RequestPending,
            Err(ClientError::InvalidState { .. }) => OperationError::InvalidState,
            Err(ClientError::NotYourTurn) => OperationError::NotYourTurn,
            Err(ClientError::Oracle(_) | ClientError::Channel(ChannelError::Disconnected { .. })) => {
                OperationError::Rejected
            },
            Err(source) => return Err(HarnessError::Client { client: id, source }),
        };
        Ok(OperationResult::Error(error))
    }

    /// Feed `event` to a client and queue its frames for the relay.
    ///
    /// `None` if the client does not exist.
    fn dispatch(
        &mut self,
        id: ClientId,
        event: ClientEvent,
    ) -> Option<Result<Vec<ClientAction>, ClientError>> {
        let peer = self.peers.get_mut(usize::from(id))?;
        let result = peer.client.handle(event).and_then(|actions| {
            for action in &actions {
                if let ClientAction::Send(frame) = action {
                    let mut bytes = Vec::new();
                    frame.encode(&mut bytes)?;
                    self.to_relay.push_back((id, bytes));
                }
            }
            Ok(actions)
        });
        Some(result)
    }

    fn push_to_client(&mut self, to: ClientId, frame: &Frame) -> Result<(), HarnessError> {
        let Some(peer) = self.peers.get_mut(usize::from(to)) else {
            tracing::warn!(client = to, "relay addressed a client that does not exist");
            return Ok(());
        };
        let mut bytes = Vec::new();
        frame.encode(&mut bytes)?;
        peer.inbox.push_back(bytes);
        Ok(())
    }
}
