//! Registries of game servers and running PUGs.
//!
//! Both registries sit behind a reader/writer lock so lookups can run
//! while a server is being claimed or a PUG created. The state inside
//! each entry has its own lock, independent of the registry's.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use pugbot_match::{MatchState, PugError, PugId, PugSession};
use pugbot_rcon::RconSession;
use pugbot_transport::Connection;
use tokio::sync::{Mutex, RwLock};

use crate::ServerConfig;

// ---------------------------------------------------------------------------
// GameServerHandle
// ---------------------------------------------------------------------------

/// Unique identifier for a provisioned game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerId(pub u32);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "srv-{}", self.0)
    }
}

/// Mutable state of a server, guarded by the handle's lock.
#[derive(Debug)]
pub struct ServerSlot {
    /// Set while the server hosts a PUG.
    pub in_use: bool,
    /// Channel of the PUG using the server.
    pub channel: Option<String>,
    /// Current `sv_password`.
    pub server_password: String,
    /// Password for in-game `!login`.
    pub admin_password: String,
    pub match_state: MatchState,
}

impl ServerSlot {
    fn release(&mut self, temporary_password: String) {
        self.in_use = false;
        self.channel = None;
        self.server_password = temporary_password;
        self.admin_password.clear();
        self.match_state.disarm();
    }
}

/// A game server the bot holds an authenticated RCON session to.
pub struct GameServerHandle<C> {
    id: ServerId,
    config: ServerConfig,
    rcon: RconSession<C>,
    slot: Mutex<ServerSlot>,
}

impl<C> GameServerHandle<C> {
    pub fn new(
        id: ServerId,
        config: ServerConfig,
        rcon: RconSession<C>,
        match_state: MatchState,
    ) -> Self {
        Self {
            id,
            config,
            rcon,
            slot: Mutex::new(ServerSlot {
                in_use: false,
                channel: None,
                server_password: String::new(),
                admin_password: String::new(),
                match_state,
            }),
        }
    }

    pub fn id(&self) -> ServerId {
        self.id
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    pub fn rcon(&self) -> &RconSession<C> {
        &self.rcon
    }

    /// Locks the server's mutable state.
    pub async fn slot(&self) -> tokio::sync::MutexGuard<'_, ServerSlot> {
        self.slot.lock().await
    }

    /// Takes the server for `channel` if it is free.
    async fn try_claim(&self, channel: &str) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.in_use {
            return false;
        }
        slot.in_use = true;
        slot.channel = Some(channel.to_string());
        true
    }

    /// Returns the server to the free pool with a temporary password.
    pub async fn release(&self, temporary_password: String) {
        self.slot.lock().await.release(temporary_password);
        tracing::info!(server = %self.id, "server released");
    }
}

// ---------------------------------------------------------------------------
// ServerRegistry
// ---------------------------------------------------------------------------

/// All provisioned game servers.
pub struct ServerRegistry<C> {
    servers: RwLock<Vec<Arc<GameServerHandle<C>>>>,
}

impl<C: Connection> ServerRegistry<C> {
    pub fn new() -> Self {
        Self {
            servers: RwLock::new(Vec::new()),
        }
    }

    /// Adds a server.
    pub async fn register(&self, server: Arc<GameServerHandle<C>>) {
        tracing::info!(server = %server.id(), address = %server.address(), region = %server.region(), "server registered");
        self.servers.write().await.push(server);
    }

    /// Looks a server up by id.
    pub async fn get(&self, id: ServerId) -> Option<Arc<GameServerHandle<C>>> {
        self.servers
            .read()
            .await
            .iter()
            .find(|s| s.id() == id)
            .cloned()
    }

    /// The server hosting `channel`'s PUG.
    pub async fn by_channel(&self, channel: &str) -> Option<Arc<GameServerHandle<C>>> {
        let servers = self.servers.read().await;
        for server in servers.iter() {
            if server.slot().await.channel.as_deref() == Some(channel) {
                return Some(Arc::clone(server));
            }
        }
        None
    }

    /// Claims the first free server in `region` for `channel`.
    pub async fn claim_free(
        &self,
        region: &str,
        channel: &str,
    ) -> Option<Arc<GameServerHandle<C>>> {
        let servers = self.servers.read().await;
        for server in servers.iter().filter(|s| s.region() == region) {
            if server.rcon().is_authenticated() && server.try_claim(channel).await {
                tracing::info!(server = %server.id(), channel, "server claimed");
                return Some(Arc::clone(server));
            }
        }
        None
    }

    /// Number of registered servers.
    pub async fn len(&self) -> usize {
        self.servers.read().await.len()
    }

    /// Returns `true` if no servers are registered.
    pub async fn is_empty(&self) -> bool {
        self.servers.read().await.is_empty()
    }
}

impl<C: Connection> Default for ServerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// PugRegistry
// ---------------------------------------------------------------------------

/// A PUG shared between the chat side and the log side.
pub type SharedPug = Arc<Mutex<PugSession>>;

#[derive(Default)]
struct Channels {
    running: HashMap<String, SharedPug>,
    /// Channels whose PUG is still being set up.
    reserved: HashSet<String>,
}

/// Running PUGs, at most one per channel.
///
/// Starting a PUG first [reserves](PugRegistry::reserve) its channel, so
/// a second start in the same channel fails while the first is still
/// claiming and preparing a server.
#[derive(Default)]
pub struct PugRegistry {
    channels: RwLock<Channels>,
    next_id: AtomicU64,
}

impl PugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a fresh PUG id.
    pub fn next_id(&self) -> PugId {
        PugId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Holds `channel` for a PUG about to start.
    pub async fn reserve(&self, channel: &str) -> Result<(), PugError> {
        let mut channels = self.channels.write().await;
        if channels.running.contains_key(channel) || !channels.reserved.insert(channel.to_string()) {
            return Err(PugError::AlreadyStarted);
        }
        Ok(())
    }

    /// Gives up a reservation that did not lead to a PUG.
    pub async fn unreserve(&self, channel: &str) {
        self.channels.write().await.reserved.remove(channel);
    }

    /// Registers a PUG under its channel, taking over any reservation.
    pub async fn insert(&self, pug: PugSession) -> Result<SharedPug, PugError> {
        let mut channels = self.channels.write().await;
        if channels.running.contains_key(pug.channel()) {
            return Err(PugError::AlreadyStarted);
        }
        let channel = pug.channel().to_string();
        channels.reserved.remove(&channel);
        let shared = Arc::new(Mutex::new(pug));
        channels.running.insert(channel, Arc::clone(&shared));
        Ok(shared)
    }

    /// The PUG running in `channel`.
    pub async fn get(&self, channel: &str) -> Option<SharedPug> {
        self.channels.read().await.running.get(channel).cloned()
    }

    /// Returns `true` if a PUG is running in `channel`.
    pub async fn contains(&self, channel: &str) -> bool {
        self.channels.read().await.running.contains_key(channel)
    }

    /// Removes and returns `channel`'s PUG.
    pub async fn remove(&self, channel: &str) -> Option<SharedPug> {
        self.channels.write().await.running.remove(channel)
    }

    /// Every PUG `player` is on the roster of.
    pub async fn with_player(&self, player: &str) -> Vec<SharedPug> {
        let snapshot: Vec<SharedPug> =
            self.channels.read().await.running.values().cloned().collect();
        let mut found = Vec::new();
        for pug in snapshot {
            if pug.lock().await.contains(player) {
                found.push(pug);
            }
        }
        found
    }
}
