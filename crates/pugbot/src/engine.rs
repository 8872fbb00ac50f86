//! The bot: chat intents and server log streams in, RCON commands and
//! chat messages out.
//!
//! Each provisioned server is driven by two tasks, one per read loop:
//!   1. [`PugBot::run_log_loop`] feeds the server's UDP log stream through
//!      the parser into its [`MatchState`]
//!   2. [`PugBot::run_reply_loop`] drains RCON replies so the socket
//!      buffer never fills up
//!
//! Chat intents arrive on yet another task through [`PugBot::dispatch`].
//! A server's slot lock and a PUG's lock are never held at the same time.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use pugbot_events::{parse_line, strip_frame};
use pugbot_match::{
    Effect, JoinOutcome, LeaveOutcome, MatchError, MatchState, MatchSummary,
    PugError, PugSession, generate_password,
};
use pugbot_rcon::{RconError, RconSession};
use pugbot_transport::{Connection, LogSocket};

use crate::registry::{GameServerHandle, PugRegistry, ServerId, ServerRegistry, SharedPug};
use crate::{BotConfig, Intent, Notifier, PugbotError, ServerConfig};

/// A match command issued from chat by the PUG admin.
enum AdminAction {
    GoLive,
    ChangeMap(String),
    Restart,
    CancelHalf,
}

/// Runs PUGs across a pool of game servers.
pub struct PugBot<C, N> {
    config: BotConfig,
    servers: ServerRegistry<C>,
    pugs: PugRegistry,
    notifier: N,
    next_server_id: AtomicU32,
}

impl<C: Connection, N: Notifier> PugBot<C, N> {
    pub fn new(config: BotConfig, notifier: N) -> Self {
        Self {
            config,
            servers: ServerRegistry::new(),
            pugs: PugRegistry::new(),
            notifier,
            next_server_id: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn servers(&self) -> &ServerRegistry<C> {
        &self.servers
    }

    pub fn pugs(&self) -> &PugRegistry {
        &self.pugs
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    // -----------------------------------------------------------------------
    // Provisioning and read loops
    // -----------------------------------------------------------------------

    /// Authenticates to a game server, points its log stream at
    /// `log_addr` and adds it to the free pool.
    ///
    /// The server is told to send its log to the local interface the RCON
    /// connection came from, on `log_addr`'s port.
    pub async fn provision(
        &self,
        server: ServerConfig,
        conn: C,
        log_addr: SocketAddr,
    ) -> Result<Arc<GameServerHandle<C>>, PugbotError> {
        let rcon = RconSession::new(conn);
        let local = rcon.authenticate(&server.rcon_password).await?;
        rcon.execute(&format!("logaddress_add {}:{}", local.ip(), log_addr.port()))
            .await?;
        rcon.execute("log on").await?;

        let id = ServerId(self.next_server_id.fetch_add(1, Ordering::Relaxed) + 1);
        let match_state = MatchState::new(
            self.config.match_rules.clone(),
            self.config.pug.allowed_maps.clone(),
        );
        let handle = Arc::new(GameServerHandle::new(id, server, rcon, match_state));
        self.servers.register(Arc::clone(&handle)).await;
        Ok(handle)
    }

    /// Feeds every datagram from `socket` to `server`'s match state.
    ///
    /// Runs until the socket fails. The server stays registered.
    pub async fn run_log_loop(
        &self,
        server: Arc<GameServerHandle<C>>,
        socket: LogSocket,
    ) -> Result<(), PugbotError> {
        loop {
            match socket.recv().await {
                Ok((datagram, from)) => {
                    tracing::trace!(server = %server.id(), %from, len = datagram.len(), "log datagram");
                    self.handle_log_datagram(&server, &datagram).await;
                }
                Err(e) => {
                    tracing::warn!(server = %server.id(), error = %e, "log stream lost");
                    return Err(e.into());
                }
            }
        }
    }

    /// Drains RCON replies. Timeouts are expected while the server is
    /// quiet; any other error ends the loop.
    pub async fn run_reply_loop(
        &self,
        server: Arc<GameServerHandle<C>>,
    ) -> Result<(), PugbotError> {
        loop {
            match server.rcon().read_reply().await {
                Ok(Some(text)) => {
                    tracing::debug!(server = %server.id(), reply = %text.trim_end(), "rcon reply");
                }
                Ok(None) => {}
                Err(RconError::Timeout(_)) => continue,
                Err(e) => {
                    tracing::warn!(server = %server.id(), error = %e, "rcon reply loop stopped");
                    return Err(e.into());
                }
            }
        }
    }

    /// Parses one raw log datagram and applies every line in it.
    pub async fn handle_log_datagram(&self, server: &GameServerHandle<C>, datagram: &[u8]) {
        let Some(text) = strip_frame(datagram) else {
            return;
        };
        for line in text.lines() {
            self.handle_log_line(server, line).await;
        }
    }

    /// Applies one log line to `server`'s match state and carries out the
    /// resulting effects.
    pub async fn handle_log_line(&self, server: &GameServerHandle<C>, line: &str) {
        let Some(event) = parse_line(line) else {
            return;
        };
        tracing::debug!(server = %server.id(), ?event, "log event");

        let (effects, channel, gone_live) = {
            let mut slot = server.slot().await;
            let was_live = slot.match_state.phase().has_gone_live();
            let effects = slot.match_state.handle_event(&event);
            let gone_live = slot.match_state.phase().has_gone_live();
            (effects, slot.channel.clone(), (gone_live != was_live).then_some(gone_live))
        };

        if let (Some(gone_live), Some(channel)) = (gone_live, channel.as_deref()) {
            if let Some(pug) = self.pugs.get(channel).await {
                lock_roster(&pug, gone_live).await;
            }
        }
        self.apply_effects(server, channel.as_deref(), effects).await;
    }

    // -----------------------------------------------------------------------
    // Chat intents
    // -----------------------------------------------------------------------

    /// Carries out a chat intent. Rejections are replied to the channel,
    /// other failures go to the log.
    pub async fn dispatch(&self, intent: Intent) {
        let channel = intent.channel().map(str::to_string);
        tracing::debug!(?intent, "dispatching intent");

        let result = match intent {
            Intent::StartPug { channel, player, map } => {
                self.start_pug(&channel, &player, map.as_deref()).await
            }
            Intent::Join { channel, player } => self.join(&channel, &player).await,
            Intent::Leave { channel, player } => self.leave(&channel, &player).await,
            Intent::Cancel { channel, player } => self.cancel_pug(&channel, &player).await,
            Intent::Say { channel, text, .. } => self.say(&channel, &text).await,
            Intent::Players { channel } => self.players(&channel).await,
            Intent::GoLive { channel, player } => {
                self.admin_command(&channel, &player, AdminAction::GoLive).await
            }
            Intent::ChangeMap { channel, player, map } => {
                self.admin_command(&channel, &player, AdminAction::ChangeMap(map))
                    .await
            }
            Intent::Restart { channel, player } => {
                self.admin_command(&channel, &player, AdminAction::Restart).await
            }
            Intent::CancelHalf { channel, player } => {
                self.admin_command(&channel, &player, AdminAction::CancelHalf)
                    .await
            }
            Intent::Rename { old, new } => {
                self.rename(&old, &new).await;
                Ok(())
            }
            Intent::Disconnect { player } => {
                self.disconnect(&player).await;
                Ok(())
            }
        };

        if let Err(err) = result {
            match channel {
                Some(channel) if err.is_user_facing() => {
                    tracing::debug!(%channel, error = %err, "intent rejected");
                    self.notify(&channel, &err.to_string()).await;
                }
                _ => tracing::error!(error = %err, "intent failed"),
            }
        }
    }

    /// Starts a PUG in `channel` on a free server of the channel's region.
    /// The starter is the first to join and becomes admin.
    pub async fn start_pug(
        &self,
        channel: &str,
        player: &str,
        map: Option<&str>,
    ) -> Result<(), PugbotError> {
        self.pugs.reserve(channel).await?;
        let region = self.config.region_for(channel);
        let Some(server) = self.servers.claim_free(region, channel).await else {
            self.pugs.unreserve(channel).await;
            return Err(PugError::NoServer(region.to_string()).into());
        };

        let pug = PugSession::start(self.pugs.next_id(), channel, map, &self.config.pug);
        let map = pug.map().to_string();
        tracing::info!(pug_id = %pug.id(), server = %server.id(), region, channel, "server assigned to pug");

        let (server_password, admin_password) = {
            let mut rng = rand::rng();
            (
                generate_password(&self.config.server_password_prefix, &mut rng),
                generate_password(&self.config.admin_password_prefix, &mut rng),
            )
        };
        {
            let mut slot = server.slot().await;
            slot.server_password = server_password.clone();
            slot.admin_password = admin_password.clone();
            slot.match_state.arm(map.as_str(), admin_password);
        }

        let prepared = async {
            server.rcon().execute(&format!("changelevel {map}")).await?;
            server
                .rcon()
                .execute(&format!("sv_password {server_password}"))
                .await?;
            self.pugs.insert(pug).await?;
            Ok::<_, PugbotError>(())
        };
        if let Err(err) = prepared.await {
            self.pugs.unreserve(channel).await;
            self.release_server(&server).await;
            return Err(err);
        }

        self.notify(
            channel,
            &format!("A PUG has been started on map {map}, type !join to join the pug"),
        )
        .await;
        self.join(channel, player).await
    }

    /// Adds `player` to `channel`'s PUG. The join that fills it announces
    /// the teams and whispers the connect details to every player.
    pub async fn join(&self, channel: &str, player: &str) -> Result<(), PugbotError> {
        let pug = self.pug(channel).await?;
        let (outcome, players, admin, max) = {
            let mut pug = pug.lock().await;
            let outcome = {
                let mut rng = rand::rng();
                pug.join(player, &mut rng)?
            };
            (
                outcome,
                pug.players().to_vec(),
                pug.admin().map(str::to_string),
                pug.max_players(),
            )
        };

        match outcome {
            JoinOutcome::Joined { count } => {
                self.notify(channel, &format!("{player} has joined the pug! [{count}/{max}]"))
                    .await;
            }
            JoinOutcome::Filled(teams) => {
                self.notify(channel, &format!("{player} has joined the pug! [{max}/{max}]"))
                    .await;
                self.notify(
                    channel,
                    "The PUG is now full! The server information will be messaged to you.",
                )
                .await;
                self.notify(
                    channel,
                    &format!(
                        "The teams are as follows. Terrorists: {} Counter-Terrorists: {}",
                        teams.terrorists.join(" "),
                        teams.counter_terrorists.join(" ")
                    ),
                )
                .await;
                self.send_details(channel, &players, admin.as_deref()).await?;
            }
        }
        Ok(())
    }

    /// Removes `player` from `channel`'s PUG. The last player out ends the
    /// PUG and frees its server.
    pub async fn leave(&self, channel: &str, player: &str) -> Result<(), PugbotError> {
        let pug = self.pug(channel).await?;
        let (outcome, max) = {
            let mut pug = pug.lock().await;
            let outcome = {
                let mut rng = rand::rng();
                pug.leave(player, &mut rng)?
            };
            (outcome, pug.max_players())
        };

        match outcome {
            LeaveOutcome::Left { count } => {
                self.notify(channel, &format!("{player} has left the pug, [{count}/{max}]"))
                    .await;
            }
            LeaveOutcome::AdminReassigned { new_admin, .. } => {
                self.notify(
                    channel,
                    &format!(
                        "The PUG administrator has left the pug and {new_admin} has been assigned as the PUG admin."
                    ),
                )
                .await;
            }
            LeaveOutcome::Emptied => {
                self.end_pug(channel).await;
                self.notify(
                    channel,
                    "The PUG admin has left the PUG and there are no other players to assign the admin rights to. Type !pug <map> to start a new one.",
                )
                .await;
            }
        }
        Ok(())
    }

    /// Ends `channel`'s PUG before its match starts. Admin only.
    pub async fn cancel_pug(&self, channel: &str, player: &str) -> Result<(), PugbotError> {
        let pug = self.pug(channel).await?;
        pug.lock().await.cancel(player)?;
        self.end_pug(channel).await;
        tracing::info!(channel, player, "pug cancelled");
        self.notify(
            channel,
            &format!("The PUG has been cancelled by {player}. Type !pug <map> to start a new one."),
        )
        .await;
        Ok(())
    }

    /// Relays chat text to the players on `channel`'s server.
    pub async fn say(&self, channel: &str, text: &str) -> Result<(), PugbotError> {
        let server = self.server_for(channel).await?;
        server.rcon().execute(&format!("say [IRC] {text}")).await?;
        self.notify(channel, "Sent message to CS server.").await;
        Ok(())
    }

    /// Lists the roster of `channel`'s PUG.
    pub async fn players(&self, channel: &str) -> Result<(), PugbotError> {
        let pug = self.pug(channel).await?;
        let line = {
            let pug = pug.lock().await;
            format!(
                "Player list: {} [{}/{}]",
                pug.players().join(" "),
                pug.player_count(),
                pug.max_players()
            )
        };
        self.notify(channel, &line).await;
        Ok(())
    }

    /// Follows a nickname change in every PUG the user is in.
    pub async fn rename(&self, old: &str, new: &str) {
        for pug in self.pugs.with_player(old).await {
            let mut pug = pug.lock().await;
            if pug.rename(old, new) {
                tracing::info!(pug_id = %pug.id(), old, new, "player renamed");
            }
        }
    }

    /// Takes a user who left the chat out of every PUG they were in.
    pub async fn disconnect(&self, player: &str) {
        let mut channels = Vec::new();
        for pug in self.pugs.with_player(player).await {
            channels.push(pug.lock().await.channel().to_string());
        }
        for channel in channels {
            if let Err(err) = self.leave(&channel, player).await {
                tracing::debug!(%channel, player, error = %err, "player kept on roster");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn admin_command(
        &self,
        channel: &str,
        player: &str,
        action: AdminAction,
    ) -> Result<(), PugbotError> {
        let pug = self.pug(channel).await?;
        pug.lock().await.ensure_admin(player)?;
        let server = self.server_for(channel).await?;

        let (effects, gone_live) = {
            let mut slot = server.slot().await;
            let state = &mut slot.match_state;
            if state.admin().is_none() {
                return Err(MatchError::NotLoggedIn.into());
            }
            let effects = match action {
                AdminAction::GoLive => state.go_live(),
                AdminAction::ChangeMap(map) => state.change_map(&map),
                AdminAction::Restart => state.restart(),
                AdminAction::CancelHalf => state.cancel_half(),
            }?;
            (effects, state.phase().has_gone_live())
        };

        lock_roster(&pug, gone_live).await;
        self.apply_effects(&server, Some(channel), effects).await;
        Ok(())
    }

    async fn apply_effects(
        &self,
        server: &GameServerHandle<C>,
        channel: Option<&str>,
        effects: Vec<Effect>,
    ) {
        for effect in effects {
            match effect {
                Effect::Rcon(command) => {
                    if let Err(e) = server.rcon().execute(&command).await {
                        tracing::warn!(server = %server.id(), %command, error = %e, "rcon command failed");
                    }
                }
                Effect::Notify(text) => match channel {
                    Some(channel) => self.notify(channel, &text).await,
                    None => tracing::info!(server = %server.id(), %text, "no channel for notice"),
                },
                Effect::MatchCompleted(summary) => {
                    self.finish_match(server, channel, summary).await;
                }
            }
        }
    }

    async fn finish_match(
        &self,
        server: &GameServerHandle<C>,
        channel: Option<&str>,
        summary: MatchSummary,
    ) {
        match serde_json::to_string(&summary) {
            Ok(json) => tracing::info!(server = %server.id(), summary = %json, "match summary"),
            Err(e) => tracing::warn!(server = %server.id(), error = %e, "could not serialize match summary"),
        }

        if let Some(channel) = channel {
            if let Some(pug) = self.pugs.remove(channel).await {
                let mut pug = pug.lock().await;
                pug.complete();
                tracing::info!(pug_id = %pug.id(), channel, "pug completed");
            }
        }
        self.release_server(server).await;
    }

    /// Drops `channel`'s PUG and frees its server.
    async fn end_pug(&self, channel: &str) {
        if let Some(pug) = self.pugs.remove(channel).await {
            pug.lock().await.complete();
        }
        if let Some(server) = self.servers.by_channel(channel).await {
            self.release_server(&server).await;
        }
    }

    /// Locks the server with a temporary password and returns it to the
    /// free pool.
    async fn release_server(&self, server: &GameServerHandle<C>) {
        let password = {
            let mut rng = rand::rng();
            generate_password(&self.config.temporary_password_prefix, &mut rng)
        };
        if let Err(e) = server
            .rcon()
            .execute(&format!("sv_password {password}"))
            .await
        {
            tracing::warn!(server = %server.id(), error = %e, "could not rotate server password");
        }
        server.release(password).await;
    }

    /// Whispers the connect details to every player, and the admin
    /// password to the admin.
    async fn send_details(
        &self,
        channel: &str,
        players: &[String],
        admin: Option<&str>,
    ) -> Result<(), PugbotError> {
        let server = self.server_for(channel).await?;
        let (server_password, admin_password) = {
            let slot = server.slot().await;
            (slot.server_password.clone(), slot.admin_password.clone())
        };
        let details = format!(
            "PUG details are: connect {}; password {server_password}.",
            server.address()
        );

        for player in players {
            let text = if Some(player.as_str()) == admin {
                format!(
                    "{details} PUG Admin password: {admin_password} (type !login <password> in game and !lo3 once all players are ready)."
                )
            } else {
                details.clone()
            };
            if let Err(e) = self.notifier.whisper(player, &text).await {
                tracing::warn!(player = %player, error = %e, "could not send pug details");
            }
        }
        Ok(())
    }

    async fn notify(&self, channel: &str, text: &str) {
        if let Err(e) = self.notifier.notify(channel, text).await {
            tracing::warn!(channel, error = %e, "could not notify channel");
        }
    }

    async fn pug(&self, channel: &str) -> Result<SharedPug, PugError> {
        self.pugs.get(channel).await.ok_or(PugError::NoPug)
    }

    async fn server_for(&self, channel: &str) -> Result<Arc<GameServerHandle<C>>, PugError> {
        self.servers.by_channel(channel).await.ok_or(PugError::NoPug)
    }
}

/// Locks the PUG roster once the match has gone live and unlocks it if
/// the first half was cancelled.
async fn lock_roster(pug: &SharedPug, gone_live: bool) {
    let mut pug = pug.lock().await;
    if gone_live {
        pug.begin_match();
    } else if pug.match_started() {
        pug.reopen();
    }
}
