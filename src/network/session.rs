//! Player Registration and Liveness
//!
//! Tracks which remote endpoints hold the (at most two) player slots,
//! assigns player numbers in join order, and reclaims slots from vanished
//! players. UDP gives no disconnect signal, so a stale player must be
//! inferred: when a join arrives while the table is full, the caller
//! pings every registered endpoint and this manager evicts any whose
//! last activity predates the probe window.
//!
//! All methods take `now` explicitly so the logic is testable without
//! sleeping.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::game::state::{PlayerNumber, PLAYER_COUNT};

/// Default probe window: an endpoint silent for longer than this is
/// considered stale when the table is probed.
pub const DEFAULT_PROBE_WINDOW: Duration = Duration::from_secs(10);

/// A registered player endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    /// Assigned player number, stable for the lifetime of a match.
    pub player: PlayerNumber,
    /// Last time this endpoint produced any inbound traffic.
    pub last_seen: Instant,
}

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinedPlayer {
    /// Assigned (or re-confirmed) player number.
    pub player: PlayerNumber,
    /// The endpoint was already registered; its `init` may have been
    /// lost, so the caller re-sends it.
    pub rejoined: bool,
    /// The caller must start a fresh match: the assigned number was
    /// held by a different endpoint during the current match (freed by
    /// a probe eviction or a mid-match leave). Player numbers are
    /// recycled only across a match boundary.
    pub fresh_match: bool,
    /// Endpoints evicted by the liveness probe.
    pub evicted: Vec<SocketAddr>,
    /// Endpoints that were registered when the join arrived and must be
    /// sent a `ping` (only populated on the join-while-full path).
    pub probed: Vec<SocketAddr>,
}

/// Result of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Endpoint was not registered; nothing happened.
    NotRegistered,
    /// Endpoint removed. `roster_empty` tells the caller to reset the
    /// match.
    Left {
        /// The player number that was freed.
        player: PlayerNumber,
        /// Whether the registration count reached zero.
        roster_empty: bool,
    },
}

/// Session errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// Both slots are held by endpoints that passed the liveness probe.
    /// Rejection is silent on the wire; `probed` still receive pings.
    #[error("session is full")]
    SessionFull {
        /// Endpoints that were pinged during the probe.
        probed: Vec<SocketAddr>,
    },
}

/// Registration table for the single live match.
#[derive(Debug)]
pub struct SessionManager {
    /// Registered endpoints. At most [`PLAYER_COUNT`] entries.
    registrations: BTreeMap<SocketAddr, Registration>,
    /// Staleness threshold for the liveness probe.
    probe_window: Duration,
    /// A slot was vacated while the match was underway; the next
    /// endpoint to fill it enters a fresh match instead of inheriting
    /// the departed player's number on a half-played board.
    vacated: bool,
}

impl SessionManager {
    /// Create an empty registration table.
    pub fn new(probe_window: Duration) -> Self {
        Self {
            registrations: BTreeMap::new(),
            probe_window,
            vacated: false,
        }
    }

    /// Register `addr` as a player, probing liveness if the table is full.
    pub fn join(&mut self, addr: SocketAddr, now: Instant) -> Result<JoinedPlayer, SessionError> {
        // Idempotent rejoin: the client may be retrying a join whose
        // init reply was lost.
        if let Some(reg) = self.registrations.get_mut(&addr) {
            reg.last_seen = now;
            return Ok(JoinedPlayer {
                player: reg.player,
                rejoined: true,
                fresh_match: false,
                evicted: Vec::new(),
                probed: Vec::new(),
            });
        }

        if self.registrations.len() < PLAYER_COUNT {
            let fresh_match = std::mem::take(&mut self.vacated);
            return Ok(JoinedPlayer {
                player: self.register(addr, now),
                rejoined: false,
                fresh_match,
                evicted: Vec::new(),
                probed: Vec::new(),
            });
        }

        // Full: ping everyone, then judge staleness on last-seen age.
        // Best-effort heuristic, not a blocking wait. The ping prompts
        // live clients to refresh last_seen before any later probe.
        let probed: Vec<SocketAddr> = self.registrations.keys().copied().collect();
        let evicted = self.evict_stale(now);

        if self.registrations.len() < PLAYER_COUNT {
            self.vacated = false;
            Ok(JoinedPlayer {
                player: self.register(addr, now),
                rejoined: false,
                fresh_match: true,
                evicted,
                probed,
            })
        } else {
            Err(SessionError::SessionFull { probed })
        }
    }

    /// Remove the registration for `addr`. Idempotent.
    pub fn leave(&mut self, addr: &SocketAddr) -> LeaveOutcome {
        match self.registrations.remove(addr) {
            Some(reg) => {
                let roster_empty = self.registrations.is_empty();
                // A departure that leaves someone behind taints the
                // freed number for the rest of this match.
                self.vacated = !roster_empty;
                LeaveOutcome::Left {
                    player: reg.player,
                    roster_empty,
                }
            }
            None => LeaveOutcome::NotRegistered,
        }
    }

    /// Refresh `last_seen` for a registered endpoint. Returns false when
    /// the endpoint is unknown.
    pub fn touch(&mut self, addr: &SocketAddr, now: Instant) -> bool {
        match self.registrations.get_mut(addr) {
            Some(reg) => {
                reg.last_seen = now;
                true
            }
            None => false,
        }
    }

    /// Player number held by `addr`, if registered.
    pub fn player_of(&self, addr: &SocketAddr) -> Option<PlayerNumber> {
        self.registrations.get(addr).map(|reg| reg.player)
    }

    /// All registered endpoints with their player numbers.
    pub fn endpoints(&self) -> impl Iterator<Item = (SocketAddr, PlayerNumber)> + '_ {
        self.registrations.iter().map(|(addr, reg)| (*addr, reg.player))
    }

    /// Number of registered players.
    pub fn player_count(&self) -> usize {
        self.registrations.len()
    }

    /// Drop every registration (match reset).
    pub fn clear(&mut self) {
        self.registrations.clear();
        self.vacated = false;
    }

    fn register(&mut self, addr: SocketAddr, now: Instant) -> PlayerNumber {
        let player = self.next_free_number();
        self.registrations.insert(
            addr,
            Registration {
                player,
                last_seen: now,
            },
        );
        player
    }

    /// Lowest player number not currently held. Join order gives 0
    /// before 1; after an eviction the freed number is reused only by
    /// the reclaiming endpoint, inside a fresh match.
    fn next_free_number(&self) -> PlayerNumber {
        let taken: Vec<PlayerNumber> = self.registrations.values().map(|r| r.player).collect();
        (0..PLAYER_COUNT as u8)
            .find(|n| !taken.contains(n))
            .expect("registration table over capacity")
    }

    /// Evict every registration silent for longer than the probe window.
    fn evict_stale(&mut self, now: Instant) -> Vec<SocketAddr> {
        let window = self.probe_window;
        let stale: Vec<SocketAddr> = self
            .registrations
            .iter()
            .filter(|(_, reg)| now.duration_since(reg.last_seen) > window)
            .map(|(addr, _)| *addr)
            .collect();

        for addr in &stale {
            self.registrations.remove(addr);
        }
        stale
    }
}

// =============================================================================
// TESTS
// =============================================================================
