//! UDP Game Server
//!
//! The single control loop: receive one datagram, decode it, run it
//! through the session/turn machinery, send the resulting datagrams,
//! repeat. All match state lives in one owned [`ServerState`] passed
//! into the handler each iteration: the loop itself is the critical
//! section, so no locking exists anywhere.
//!
//! The handler is a pure synchronous function from (state, datagram) to
//! outbound datagrams; only the loop touches the socket. Loss is
//! accepted: nothing is retried, and a failed send is logged and
//! forgotten.

use std::net::SocketAddr;
use std::time::{Duration, Instant, SystemTime};

use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::game::state::MatchState;
use crate::game::turn::{submit_move, MoveOutcome};
use crate::network::protocol::{
    ClientMessage, IncorrectMove, ServerMessage, MAX_DATAGRAM,
};
use crate::network::session::{
    JoinedPlayer, LeaveOutcome, SessionError, SessionManager, DEFAULT_PROBE_WINDOW,
};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Cells removed from each generated puzzle.
    pub holes: usize,
    /// Staleness threshold for the liveness probe.
    pub probe_window: Duration,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5555".parse().unwrap(),
            holes: crate::game::grid::DEFAULT_HOLES,
            probe_window: DEFAULT_PROBE_WINDOW,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind the UDP socket. The only fatal error: everything
    /// after startup is drop-and-continue.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),
}

/// A datagram queued for sending.
#[derive(Debug, Clone)]
pub struct Outbound {
    /// Destination endpoint.
    pub to: SocketAddr,
    /// Message to encode into the datagram.
    pub message: ServerMessage,
}

/// The single owned state of the authoritative process. No statics, no
/// ambient globals. The event loop hands this to the handler by `&mut`.
#[derive(Debug)]
pub struct ServerState {
    /// The live match.
    pub match_state: MatchState,
    /// Player registrations.
    pub sessions: SessionManager,
    holes: usize,
}

impl ServerState {
    /// Build the initial state: empty roster, first match generated.
    pub fn new(config: &ServerConfig) -> Self {
        let match_state = MatchState::generate(config.holes, entropy_now());
        info!("Match {} ready", hex::encode(&match_state.id[..4]));

        Self {
            match_state,
            sessions: SessionManager::new(config.probe_window),
            holes: config.holes,
        }
    }

    /// Replace the live match with a freshly generated one. Registrations
    /// are left alone; callers clear them separately where the lifecycle
    /// demands it.
    fn fresh_match(&mut self) {
        self.match_state = MatchState::generate(self.holes, entropy_now());
        info!("Match {} ready", hex::encode(&self.match_state.id[..4]));
    }

    /// Full reset: fresh match, empty roster.
    fn reset(&mut self) {
        self.fresh_match();
        self.sessions.clear();
    }
}

/// Process one received datagram against the server state, returning the
/// datagrams to send in response.
///
/// Never panics on hostile input: undecodable payloads, messages from
/// unregistered endpoints, and rule violations are all dropped silently
/// (logged at debug) and produce no response.
pub fn handle_datagram(
    state: &mut ServerState,
    payload: &[u8],
    from: SocketAddr,
    now: Instant,
) -> Vec<Outbound> {
    let message = match ClientMessage::from_slice(payload) {
        Ok(m) => m,
        Err(e) => {
            debug!("Undecodable datagram from {}: {}", from, e);
            return Vec::new();
        }
    };

    // Any decoded traffic from a registered endpoint counts as liveness.
    state.sessions.touch(&from, now);

    match message {
        ClientMessage::Join => handle_join(state, from, now),
        ClientMessage::Move { x, y, value } => handle_move(state, from, x, y, value),
        ClientMessage::Disconnect => handle_disconnect(state, from),
    }
}

/// Handle a join request: register, probe if full, answer with `init`.
fn handle_join(state: &mut ServerState, from: SocketAddr, now: Instant) -> Vec<Outbound> {
    match state.sessions.join(from, now) {
        Ok(JoinedPlayer {
            player,
            rejoined,
            fresh_match,
            evicted,
            probed,
        }) => {
            let mut out: Vec<Outbound> = probed
                .iter()
                .map(|&to| Outbound {
                    to,
                    message: ServerMessage::Ping,
                })
                .collect();

            for addr in &evicted {
                info!("Evicted stale player at {}", addr);
            }

            if fresh_match {
                // A slot recycled from an evicted or departed player
                // starts a brand-new match. Survivors get an update so
                // they stop rendering the dead board.
                state.fresh_match();
                let survivors: Vec<SocketAddr> = state
                    .sessions
                    .endpoints()
                    .map(|(addr, _)| addr)
                    .filter(|addr| *addr != from)
                    .collect();
                for addr in survivors {
                    out.push(update_for(state, addr, None));
                }
            }

            if rejoined {
                debug!("Player {} re-joined from {}", player + 1, from);
            } else {
                info!("Player {} connected from {}", player + 1, from);
            }

            out.push(Outbound {
                to: from,
                message: ServerMessage::Init {
                    board: state.match_state.board,
                    player_number: player,
                    current_turn: state.match_state.turn,
                    scores: state.match_state.scores,
                    correct_cells: state.match_state.correct_cells.iter().copied().collect(),
                },
            });
            out
        }
        Err(SessionError::SessionFull { probed }) => {
            // Rejection is by omission: pings go out, no init does.
            info!("Rejected join from {}: match full", from);
            probed
                .into_iter()
                .map(|to| Outbound {
                    to,
                    message: ServerMessage::Ping,
                })
                .collect()
        }
    }
}

/// Handle a move attempt from a registered player.
fn handle_move(state: &mut ServerState, from: SocketAddr, x: u8, y: u8, value: u8) -> Vec<Outbound> {
    let Some(player) = state.sessions.player_of(&from) else {
        debug!("Move from unregistered endpoint {}", from);
        return Vec::new();
    };

    match submit_move(&mut state.match_state, player, x, y, value) {
        Err(rejection) => {
            debug!("Dropped move from player {}: {}", player + 1, rejection);
            Vec::new()
        }
        Ok(MoveOutcome::Correct { completed: true }) => {
            info!(
                "Match {} complete, final scores {:?}",
                hex::encode(&state.match_state.id[..4]),
                state.match_state.scores
            );

            let message = ServerMessage::GameEnd {
                board: state.match_state.board,
                scores: state.match_state.scores,
                correct_cells: state.match_state.correct_cells.iter().copied().collect(),
            };
            let out: Vec<Outbound> = state
                .sessions
                .endpoints()
                .map(|(to, _)| Outbound {
                    to,
                    message: message.clone(),
                })
                .collect();

            // Infinite session: the next match starts accepting joins
            // immediately.
            state.reset();
            out
        }
        Ok(MoveOutcome::Correct { completed: false }) => {
            let recipients: Vec<SocketAddr> =
                state.sessions.endpoints().map(|(to, _)| to).collect();
            recipients
                .into_iter()
                .map(|to| update_for(state, to, None))
                .collect()
        }
        Ok(MoveOutcome::Incorrect) => {
            let recipients: Vec<SocketAddr> =
                state.sessions.endpoints().map(|(to, _)| to).collect();
            recipients
                .into_iter()
                .map(|to| {
                    let echo = if to == from {
                        Some(IncorrectMove { x, y, value })
                    } else {
                        None
                    };
                    update_for(state, to, echo)
                })
                .collect()
        }
    }
}

/// Handle a voluntary disconnect.
fn handle_disconnect(state: &mut ServerState, from: SocketAddr) -> Vec<Outbound> {
    match state.sessions.leave(&from) {
        LeaveOutcome::NotRegistered => {
            debug!("Disconnect from unregistered endpoint {}", from);
        }
        LeaveOutcome::Left {
            player,
            roster_empty,
        } => {
            info!("Player {} disconnected from {}", player + 1, from);
            if roster_empty {
                // The match does not persist across an empty room.
                state.reset();
            }
        }
    }
    Vec::new()
}

/// Build the per-recipient `update` for the current state.
fn update_for(state: &ServerState, to: SocketAddr, incorrect_move: Option<IncorrectMove>) -> Outbound {
    Outbound {
        to,
        message: ServerMessage::Update {
            board: state.match_state.board,
            current_turn: state.match_state.turn,
            scores: state.match_state.scores,
            correct_cells: state.match_state.correct_cells.iter().copied().collect(),
            incorrect_move,
        },
    }
}

/// Wall-clock entropy for seed derivation.
fn entropy_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

// =============================================================================
// SERVER LOOP
// =============================================================================

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Run the server until shutdown.
    ///
    /// Binds the socket (the only fatal failure), then loops: receive a
    /// datagram, process it fully, send the responses, receive the next.
    pub async fn run(&self) -> Result<(), GameServerError> {
        let socket = UdpSocket::bind(self.config.bind_addr).await?;
        info!(
            "Sudoku duel server v{} listening on {}",
            self.config.version, self.config.bind_addr
        );

        let mut state = ServerState::new(&self.config);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            tokio::select! {
                result = socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, from)) => {
                            let outbound =
                                handle_datagram(&mut state, &buf[..len], from, Instant::now());
                            for out in outbound {
                                send(&socket, out).await;
                            }
                        }
                        Err(e) => {
                            // One bad receive never terminates the session.
                            warn!("Receive error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    for (to, _) in state.sessions.endpoints() {
                        send(&socket, Outbound { to, message: ServerMessage::Disconnect }).await;
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    /// Shutdown the server. The loop broadcasts a best-effort disconnect
    /// notice to all registered endpoints before exiting.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Encode and send one datagram, best-effort.
async fn send(socket: &UdpSocket, out: Outbound) {
    let json = match out.message.to_json() {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to serialize message: {}", e);
            return;
        }
    };
    if let Err(e) = socket.send_to(json.as_bytes(), out.to).await {
        warn!("Send to {} failed: {}", out.to, e);
    }
}

// =============================================================================
// TESTS
// =============================================================================
