//! The match state machine for one game server.
//!
//! [`MatchState`] consumes [`LogEvent`]s and admin commands and answers
//! with [`Effect`]s: console commands for the server, lines for the chat
//! channel, and the final summary when the match ends. It performs no I/O
//! itself. The owner dispatches the effects in order.

use pugbot_events::{LogEvent, PlayerDescriptor, Side, round_winner};
use serde::Serialize;

use crate::{ChatCommand, MatchConfig, MatchError, MatchPhase, PlayerStats, Roster};

// ---------------------------------------------------------------------------
// Effects and results
// ---------------------------------------------------------------------------

/// Something the owner of a [`MatchState`] must do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run a console command on the game server.
    Rcon(String),
    /// Post a line to the PUG's chat channel.
    Notify(String),
    /// The match is over. Release the server and complete the PUG.
    MatchCompleted(MatchSummary),
}

/// Rounds won by each side, counted on the sides as they are now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub ct: u32,
    pub t: u32,
}

impl Score {
    pub fn total(&self) -> u32 {
        self.ct + self.t
    }
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchOutcome {
    Won(Side),
    Draw,
}

/// The final record of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub map: String,
    /// Combined totals for the sides as they finished the match.
    pub final_score: Score,
    /// First-half score, on the sides as they started.
    pub first_half: Score,
    pub outcome: MatchOutcome,
    pub players: Vec<PlayerStats>,
}

impl MatchSummary {
    /// One-line result for chat.
    pub fn announcement(&self) -> String {
        let result = match self.outcome {
            MatchOutcome::Won(side) => format!("{side} win!"),
            MatchOutcome::Draw => "It's a draw!".to_string(),
        };
        format!(
            "Match over on {}: Counter-Terrorists {} - {} Terrorists. {result}",
            self.map, self.final_score.ct, self.final_score.t
        )
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// Scores, roster and phase of the match on one server.
///
/// A server's state is *armed* while it hosts a PUG: it knows the map and
/// the admin password handed to the PUG admin. Unarmed state ignores
/// every event.
#[derive(Debug, Clone)]
pub struct MatchState {
    rules: MatchConfig,
    allowed_maps: Vec<String>,
    phase: MatchPhase,
    map: String,
    admin_password: Option<String>,
    /// Steam id of the player who logged in with the admin password.
    admin: Option<String>,
    score: Score,
    first_half: Score,
    ct_alive: u32,
    t_alive: u32,
    round_decided: bool,
    roster: Roster,
    /// The roster as it stood when the current half went live.
    half_checkpoint: Roster,
}

impl MatchState {
    /// Creates unarmed state. An empty `allowed_maps` allows any map.
    pub fn new(rules: MatchConfig, allowed_maps: Vec<String>) -> Self {
        Self {
            ct_alive: rules.team_size,
            t_alive: rules.team_size,
            rules,
            allowed_maps,
            phase: MatchPhase::NotStarted,
            map: String::new(),
            admin_password: None,
            admin: None,
            score: Score::default(),
            first_half: Score::default(),
            round_decided: false,
            roster: Roster::default(),
            half_checkpoint: Roster::default(),
        }
    }

    /// Prepares for a new PUG on `map`.
    pub fn arm(&mut self, map: impl Into<String>, admin_password: impl Into<String>) {
        self.reset();
        self.map = map.into();
        self.admin_password = Some(admin_password.into());
        tracing::info!(map = %self.map, "match state armed");
    }

    /// Forgets the PUG: zeroes everything and drops the admin password.
    pub fn disarm(&mut self) {
        self.reset();
        self.map.clear();
        self.admin_password = None;
    }

    pub fn is_armed(&self) -> bool {
        self.admin_password.is_some()
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    /// Live score of the current half.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Score snapshot taken at half time.
    pub fn first_half(&self) -> Score {
        self.first_half
    }

    /// Totals for the sides as they are now.
    ///
    /// Sides swap at half time, so each side's first-half rounds were won
    /// under the other side's name: current CT adds the first-half T
    /// score and current T adds the first-half CT score.
    pub fn combined(&self) -> Score {
        Score {
            ct: self.score.ct + self.first_half.t,
            t: self.score.t + self.first_half.ct,
        }
    }

    pub fn ct_alive(&self) -> u32 {
        self.ct_alive
    }

    pub fn t_alive(&self) -> u32 {
        self.t_alive
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Steam id of the logged-in admin.
    pub fn admin(&self) -> Option<&str> {
        self.admin.as_deref()
    }

    // -- admin ------------------------------------------------------------

    /// Grants admin rights to `player` if `password` matches.
    pub fn login(
        &mut self,
        player: &PlayerDescriptor,
        password: &str,
    ) -> Result<Vec<Effect>, MatchError> {
        let expected = self.admin_password.as_deref().ok_or(MatchError::NotArmed)?;
        if !player.is_known() {
            return Err(MatchError::UnknownPlayer);
        }
        if self.admin.is_some() {
            return Err(MatchError::AdminTaken);
        }
        if password != expected {
            tracing::warn!(player = %player.name, "wrong pug admin password");
            return Err(MatchError::WrongPassword);
        }

        self.admin = Some(player.steam_id.clone());
        tracing::info!(player = %player.name, steam_id = %player.steam_id, "pug admin logged in");
        Ok(vec![
            Effect::Rcon(format!(
                "say PUG admin rights has been granted to {}",
                player.name
            )),
            Effect::Notify(format!(
                "PUG admin rights has been granted to {}",
                player.name
            )),
        ])
    }

    /// Fails unless `player` is the logged-in admin.
    pub fn authorize(&self, player: &PlayerDescriptor) -> Result<(), MatchError> {
        if !player.is_known() {
            return Err(MatchError::UnknownPlayer);
        }
        match &self.admin {
            None => Err(MatchError::NotLoggedIn),
            Some(admin) if *admin == player.steam_id => Ok(()),
            Some(_) => Err(MatchError::NotAdmin),
        }
    }

    /// Starts the next half.
    pub fn go_live(&mut self) -> Result<Vec<Effect>, MatchError> {
        self.ensure_armed()?;
        let half = match self.phase {
            MatchPhase::NotStarted => "first",
            MatchPhase::HalfBreak => "second",
            other => return Err(MatchError::InvalidPhase(other)),
        };
        self.advance();
        self.score = Score::default();
        self.half_checkpoint = self.roster.clone();
        self.reset_round();

        let restarts = self.rules.live_restarts;
        let mut effects = vec![Effect::Rcon(format!(
            "say Going live on {restarts} restarts.."
        ))];
        effects.extend((0..restarts).map(|_| Effect::Rcon("mp_restartgame 1".into())));
        effects.push(Effect::Rcon("say LIVE! Good luck and have fun.".into()));
        effects.push(Effect::Notify(format!(
            "The {half} half on {} has gone live!",
            self.map
        )));
        tracing::info!(map = %self.map, phase = %self.phase, "half gone live");
        Ok(effects)
    }

    /// Throws away the current half's rounds and returns to the phase
    /// before it.
    pub fn cancel_half(&mut self) -> Result<Vec<Effect>, MatchError> {
        let previous = self
            .phase
            .before_half()
            .ok_or(MatchError::InvalidPhase(self.phase))?;
        tracing::info!(from = %self.phase, to = %previous, "half cancelled");
        self.phase = previous;
        self.score = Score::default();
        self.roster.rewind(&self.half_checkpoint);
        self.reset_round();

        Ok(vec![
            Effect::Rcon("mp_restartgame 1".into()),
            Effect::Rcon(
                "say The current half has been cancelled, type !lo3 to go live again."
                    .into(),
            ),
            Effect::Notify("PUG admin cancelled the current half.".into()),
        ])
    }

    /// Changes level. Only before the match has gone live.
    pub fn change_map(&mut self, map: &str) -> Result<Vec<Effect>, MatchError> {
        self.ensure_armed()?;
        if self.phase.has_gone_live() {
            return Err(MatchError::GoneLive);
        }
        if !self.allowed_maps.is_empty() && !self.allowed_maps.iter().any(|m| m == map) {
            return Err(MatchError::UnknownMap(map.to_string()));
        }

        self.map = map.to_string();
        tracing::info!(map, "pug map changed");
        Ok(vec![
            Effect::Rcon(format!("say Changing map to '{map}'.")),
            Effect::Rcon(format!("changelevel {map}")),
            Effect::Notify(format!("PUG admin changed level to {map}")),
        ])
    }

    /// Restarts the game. Only before the match has gone live.
    pub fn restart(&mut self) -> Result<Vec<Effect>, MatchError> {
        self.ensure_armed()?;
        if self.phase.has_gone_live() {
            return Err(MatchError::GoneLive);
        }
        Ok(vec![
            Effect::Rcon("say Restarting game.".into()),
            Effect::Rcon("mp_restartgame 1".into()),
            Effect::Notify("PUG admin restarted the game.".into()),
        ])
    }

    // -- log events -------------------------------------------------------

    /// Applies one log event.
    pub fn handle_event(&mut self, event: &LogEvent) -> Vec<Effect> {
        if !self.is_armed() {
            return Vec::new();
        }

        match event {
            LogEvent::PlayerJoined { player } => {
                self.roster.add(player);
                vec![Effect::Notify(format!("{} has entered the game.", player.name))]
            }
            LogEvent::PlayerLeft { player } => {
                if !self.phase.has_gone_live() {
                    self.roster.remove(player);
                }
                vec![Effect::Notify(format!("{} has left the game.", player.name))]
            }
            LogEvent::Chat { player, text, .. } => self.handle_chat(player, text),
            LogEvent::Trigger { player, event } => self.on_player_trigger(player, event),
            LogEvent::RoundTrigger { event, .. } => self.on_round_trigger(event),
            LogEvent::Kill { killer, victim, .. } => {
                self.on_kill(killer, victim);
                Vec::new()
            }
            LogEvent::Assist { assister, .. } => {
                if self.phase.is_live() {
                    self.roster.record_assist(assister);
                }
                Vec::new()
            }
            LogEvent::RoundStart => {
                self.reset_round();
                self.roster.end_round();
                tracing::debug!(score = ?self.score, "round started");
                Vec::new()
            }
            LogEvent::RoundEnd => {
                self.ct_alive = self.rules.team_size;
                self.t_alive = self.rules.team_size;
                tracing::debug!(score = ?self.score, "round ended");
                Vec::new()
            }
            LogEvent::Purchased { player, item } => {
                tracing::debug!(player = %player.name, %item, "purchase");
                Vec::new()
            }
        }
    }

    fn handle_chat(&mut self, player: &PlayerDescriptor, text: &str) -> Vec<Effect> {
        let Some(command) = ChatCommand::parse(text) else {
            return Vec::new();
        };

        let result = if command.requires_admin() {
            self.authorize(player)
                .and_then(|()| self.run_admin_command(player, command))
        } else if let ChatCommand::Login(password) = command {
            self.login(player, &password)
        } else {
            Ok(Vec::new())
        };

        result.unwrap_or_else(|err| {
            tracing::warn!(player = %player.name, error = %err, "chat command rejected");
            vec![Effect::Rcon(format!("say {err}"))]
        })
    }

    fn run_admin_command(
        &mut self,
        player: &PlayerDescriptor,
        command: ChatCommand,
    ) -> Result<Vec<Effect>, MatchError> {
        match command {
            ChatCommand::Lo3 => self.go_live(),
            ChatCommand::Map(map) => self.change_map(&map),
            ChatCommand::Restart => self.restart(),
            ChatCommand::CancelHalf => self.cancel_half(),
            ChatCommand::Request => Ok(vec![
                Effect::Rcon("say Requesting for players on IRC.".into()),
                Effect::Notify(format!(
                    "{} is requesting players for the PUG on {}.",
                    player.name, self.map
                )),
            ]),
            ChatCommand::Irc(text) => Ok(vec![
                Effect::Rcon(format!("say Sending message to IRC: {text}.")),
                Effect::Notify(format!("[CS]: {text}")),
            ]),
            ChatCommand::Login(password) => self.login(player, &password),
        }
    }

    fn on_player_trigger(&mut self, player: &PlayerDescriptor, event: &str) -> Vec<Effect> {
        if !self.phase.is_live() {
            return Vec::new();
        }
        self.roster.record_trigger(player, event);

        let action = match event {
            "Begin_Bomb_Defuse_Without_Kit" => "started bomb defuse without kit",
            "Begin_Bomb_Defuse_With_Kit" => "started bomb defuse with kit",
            "Dropped_The_Bomb" => "dropped the bomb",
            "Planted_The_Bomb" => "planted the bomb",
            "Got_The_Bomb" => "picked up the bomb",
            "Defused_The_Bomb" => "defused the bomb",
            _ => return Vec::new(),
        };
        vec![Effect::Notify(format!("{} {action}.", player.name))]
    }

    fn on_kill(&mut self, killer: &PlayerDescriptor, victim: &PlayerDescriptor) {
        if !self.phase.is_live() {
            return;
        }
        // Friendly fire still costs the victim's side a player.
        match victim.side() {
            Some(Side::Terrorist) => self.t_alive = self.t_alive.saturating_sub(1),
            Some(Side::CounterTerrorist) => self.ct_alive = self.ct_alive.saturating_sub(1),
            None => {}
        }
        self.roster.record_kill(killer, victim);
        tracing::debug!(
            killer = %killer.name,
            victim = %victim.name,
            ct_alive = self.ct_alive,
            t_alive = self.t_alive,
            "kill"
        );
    }

    fn on_round_trigger(&mut self, event: &str) -> Vec<Effect> {
        if !self.phase.is_live() || self.round_decided {
            return Vec::new();
        }
        let Some(winner) = round_winner(event) else {
            return Vec::new();
        };
        self.round_decided = true;
        if event.ends_with("Target_Bombed") {
            self.roster.credit_target_bombed();
        }
        match winner {
            Side::Terrorist => self.score.t += 1,
            Side::CounterTerrorist => self.score.ct += 1,
        }
        tracing::info!(%winner, ct = self.score.ct, t = self.score.t, phase = %self.phase, "round won");

        let mut effects = vec![Effect::Notify(format!(
            "{winner} win the round. CT {} - {} T",
            self.score.ct, self.score.t
        ))];
        match self.phase {
            MatchPhase::FirstHalf if self.score.total() >= self.rules.half_rounds => {
                effects.extend(self.end_first_half());
            }
            MatchPhase::SecondHalf => {
                if let Some(outcome) = self.outcome() {
                    effects.extend(self.complete(outcome));
                }
            }
            _ => {}
        }
        effects
    }

    fn end_first_half(&mut self) -> Vec<Effect> {
        self.first_half = self.score;
        self.score = Score::default();
        self.advance();
        self.reset_round();
        tracing::info!(ct = self.first_half.ct, t = self.first_half.t, "first half over");

        let Score { ct, t } = self.first_half;
        vec![
            Effect::Rcon(self.rules.swap_command.clone()),
            Effect::Rcon(format!(
                "say Half time! CT {ct} - {t} T. Teams have been swapped, type !lo3 when ready."
            )),
            Effect::Notify(format!(
                "First half over: Counter-Terrorists {ct} - {t} Terrorists."
            )),
        ]
    }

    /// Win at `win_score`, or a draw once both sides reach `draw_score`.
    fn outcome(&self) -> Option<MatchOutcome> {
        let total = self.combined();
        if total.ct >= self.rules.win_score {
            Some(MatchOutcome::Won(Side::CounterTerrorist))
        } else if total.t >= self.rules.win_score {
            Some(MatchOutcome::Won(Side::Terrorist))
        } else if total.ct >= self.rules.draw_score && total.t >= self.rules.draw_score {
            Some(MatchOutcome::Draw)
        } else {
            None
        }
    }

    fn complete(&mut self, outcome: MatchOutcome) -> Vec<Effect> {
        self.advance();
        let summary = MatchSummary {
            map: self.map.clone(),
            final_score: self.combined(),
            first_half: self.first_half,
            outcome,
            players: self.roster.snapshot(),
        };
        tracing::info!(map = %summary.map, ?outcome, "match completed");

        let announcement = summary.announcement();
        self.disarm();
        vec![
            Effect::Rcon(format!("say {announcement}")),
            Effect::Notify(announcement),
            Effect::MatchCompleted(summary),
        ]
    }

    // -- internals --------------------------------------------------------

    fn advance(&mut self) {
        if let Some(next) = self.phase.next() {
            tracing::debug!(from = %self.phase, to = %next, "match phase changed");
            self.phase = next;
        }
    }

    fn ensure_armed(&self) -> Result<(), MatchError> {
        if self.is_armed() {
            Ok(())
        } else {
            Err(MatchError::NotArmed)
        }
    }

    fn reset_round(&mut self) {
        self.ct_alive = self.rules.team_size;
        self.t_alive = self.rules.team_size;
        self.round_decided = false;
    }

    fn reset(&mut self) {
        self.phase = MatchPhase::NotStarted;
        self.admin = None;
        self.score = Score::default();
        self.first_half = Score::default();
        self.roster.clear();
        self.half_checkpoint.clear();
        self.reset_round();
    }
}
