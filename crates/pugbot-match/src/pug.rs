//! PUG roster forming: join, leave, admin succession, team assignment.

use std::fmt;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{PugConfig, PugError, PugState};

/// Unique identifier for a PUG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PugId(pub u64);

impl fmt::Display for PugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pug-{}", self.0)
    }
}

/// Returns `prefix` followed by a random three-digit number.
pub fn generate_password(prefix: &str, rng: &mut impl Rng) -> String {
    format!("{prefix}{}", rng.random_range(100..=999))
}

/// The two sides of a full PUG, by chat nickname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teams {
    pub terrorists: Vec<String>,
    pub counter_terrorists: Vec<String>,
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The player is on the roster, which now holds `count` players.
    Joined { count: usize },
    /// The player filled the last slot and teams were drawn.
    Filled(Teams),
}

/// Result of a successful leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The player left. `count` players remain.
    Left { count: usize },
    /// The admin left and `new_admin` was picked from those remaining.
    AdminReassigned { new_admin: String, count: usize },
    /// The last player left and the PUG is over.
    Emptied,
}

/// A PUG being organized in one chat channel.
///
/// The roster keeps join order. The first joiner is admin, and the admin
/// is always someone on the roster.
#[derive(Debug, Clone)]
pub struct PugSession {
    id: PugId,
    channel: String,
    map: String,
    players: Vec<String>,
    admin: Option<String>,
    state: PugState,
    teams: Option<Teams>,
    match_started: bool,
    max_players: usize,
}

impl PugSession {
    /// Starts a PUG in `Forming`. An unknown or missing map falls back to
    /// the configured default.
    pub fn start(
        id: PugId,
        channel: impl Into<String>,
        requested_map: Option<&str>,
        config: &PugConfig,
    ) -> Self {
        let session = Self {
            id,
            channel: channel.into(),
            map: config.resolve_map(requested_map),
            players: Vec::new(),
            admin: None,
            state: PugState::Forming,
            teams: None,
            match_started: false,
            max_players: config.max_players,
        };
        tracing::info!(pug_id = %id, channel = %session.channel, map = %session.map, "pug started");
        session
    }

    /// Adds a player. The first joiner becomes admin. The join that fills
    /// the roster shuffles it into two teams and moves the PUG to `Full`.
    pub fn join(
        &mut self,
        player: &str,
        rng: &mut impl Rng,
    ) -> Result<JoinOutcome, PugError> {
        if self.players.iter().any(|p| p == player) {
            return Err(PugError::AlreadyJoined(player.to_string()));
        }
        if !self.state.is_joinable() || self.players.len() >= self.max_players {
            return Err(PugError::PugFull);
        }

        self.players.push(player.to_string());
        if self.admin.is_none() {
            self.admin = Some(player.to_string());
        }
        tracing::info!(
            pug_id = %self.id,
            player,
            players = self.players.len(),
            "player joined pug"
        );

        if self.players.len() < self.max_players {
            return Ok(JoinOutcome::Joined {
                count: self.players.len(),
            });
        }

        let teams = self.draw_teams(rng);
        self.transition(PugState::Full);
        self.teams = Some(teams.clone());
        Ok(JoinOutcome::Filled(teams))
    }

    /// Removes a player.
    ///
    /// If the admin leaves, a new one is drawn uniformly from the players
    /// left. Leaving a full PUG reopens it and discards the teams. The
    /// roster is locked once the match has gone live.
    pub fn leave(
        &mut self,
        player: &str,
        rng: &mut impl Rng,
    ) -> Result<LeaveOutcome, PugError> {
        if self.match_started {
            return Err(PugError::MatchInProgress);
        }
        let index = self
            .players
            .iter()
            .position(|p| p == player)
            .ok_or_else(|| PugError::NotInPug(player.to_string()))?;
        self.players.remove(index);
        tracing::info!(
            pug_id = %self.id,
            player,
            players = self.players.len(),
            "player left pug"
        );

        if self.state == PugState::Full {
            self.teams = None;
            self.transition(PugState::Forming);
        }

        if self.players.is_empty() {
            self.admin = None;
            self.transition(PugState::Completed);
            return Ok(LeaveOutcome::Emptied);
        }

        let count = self.players.len();
        if self.admin.as_deref() != Some(player) {
            return Ok(LeaveOutcome::Left { count });
        }

        let new_admin = self
            .players
            .choose(rng)
            .cloned()
            .ok_or_else(|| PugError::NotInPug(player.to_string()))?;
        self.admin = Some(new_admin.clone());
        tracing::info!(pug_id = %self.id, admin = %new_admin, "pug admin reassigned");
        Ok(LeaveOutcome::AdminReassigned { new_admin, count })
    }

    /// Ends the PUG before its match starts. Admin only.
    pub fn cancel(&mut self, issuer: &str) -> Result<(), PugError> {
        self.ensure_admin(issuer)?;
        if self.match_started {
            return Err(PugError::MatchInProgress);
        }
        self.transition(PugState::Completed);
        Ok(())
    }

    /// Ends the PUG after its match finished.
    pub fn complete(&mut self) {
        self.transition(PugState::Completed);
    }

    /// Locks the roster for the match.
    pub fn begin_match(&mut self) {
        self.match_started = true;
    }

    /// Unlocks the roster after the only played half was cancelled.
    pub fn reopen(&mut self) {
        self.match_started = false;
    }

    /// Follows a nickname change. Returns `true` if the player was on the
    /// roster.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let Some(slot) = self.players.iter_mut().find(|p| p.as_str() == old) else {
            return false;
        };
        *slot = new.to_string();
        if self.admin.as_deref() == Some(old) {
            self.admin = Some(new.to_string());
        }
        if let Some(teams) = &mut self.teams {
            for name in teams
                .terrorists
                .iter_mut()
                .chain(teams.counter_terrorists.iter_mut())
            {
                if name.as_str() == old {
                    *name = new.to_string();
                }
            }
        }
        true
    }

    /// Fails with [`PugError::NotAdmin`] unless `player` is the admin.
    pub fn ensure_admin(&self, player: &str) -> Result<(), PugError> {
        match &self.admin {
            Some(admin) if admin == player => Ok(()),
            Some(admin) => Err(PugError::NotAdmin(admin.clone())),
            None => Err(PugError::NotAdmin(String::new())),
        }
    }

    pub fn id(&self) -> PugId {
        self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    /// Players in join order.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn admin(&self) -> Option<&str> {
        self.admin.as_deref()
    }

    pub fn state(&self) -> PugState {
        self.state
    }

    pub fn teams(&self) -> Option<&Teams> {
        self.teams.as_ref()
    }

    pub fn match_started(&self) -> bool {
        self.match_started
    }

    pub fn contains(&self, player: &str) -> bool {
        self.players.iter().any(|p| p == player)
    }

    // -- internals --------------------------------------------------------

    /// Shuffles the roster. The first half are Terrorists, the rest
    /// Counter-Terrorists.
    fn draw_teams(&self, rng: &mut impl Rng) -> Teams {
        let mut shuffled = self.players.clone();
        shuffled.shuffle(rng);
        let counter_terrorists = shuffled.split_off(shuffled.len() / 2);
        Teams {
            terrorists: shuffled,
            counter_terrorists,
        }
    }

    fn transition(&mut self, target: PugState) {
        if self.state == target {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(target),
            "illegal pug transition {} -> {}",
            self.state,
            target
        );
        tracing::debug!(pug_id = %self.id, from = %self.state, to = %target, "pug state changed");
        self.state = target;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn forming() -> PugSession {
        PugSession::start(PugId(1), "#pug", Some("de_nuke"), &PugConfig::default())
    }

    #[test]
    fn test_start_unknown_map_uses_default() {
        let pug = PugSession::start(
            PugId(1),
            "#pug",
            Some("cs_office"),
            &PugConfig::default(),
        );
        assert_eq!(pug.map(), "de_dust2");
        assert_eq!(pug.state(), PugState::Forming);
    }

    #[test]
    fn test_join_first_player_becomes_admin() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pug = forming();

        pug.join("alice", &mut rng).unwrap();
        pug.join("bob", &mut rng).unwrap();

        assert_eq!(pug.admin(), Some("alice"));
        assert_eq!(pug.players(), ["alice", "bob"]);
    }

    #[test]
    fn test_rename_updates_roster_and_admin() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pug = forming();
        pug.join("alice", &mut rng).unwrap();

        assert!(pug.rename("alice", "alice_afk"));
        assert!(!pug.rename("nobody", "x"));

        assert_eq!(pug.admin(), Some("alice_afk"));
        assert!(pug.contains("alice_afk"));
    }

    #[test]
    fn test_cancel_non_admin_is_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pug = forming();
        pug.join("alice", &mut rng).unwrap();
        pug.join("bob", &mut rng).unwrap();

        assert_eq!(
            pug.cancel("bob"),
            Err(PugError::NotAdmin("alice".into()))
        );
        assert!(pug.cancel("alice").is_ok());
        assert_eq!(pug.state(), PugState::Completed);
    }

    #[test]
    fn test_leave_after_match_start_is_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pug = forming();
        pug.join("alice", &mut rng).unwrap();
        pug.begin_match();

        assert_eq!(
            pug.leave("alice", &mut rng),
            Err(PugError::MatchInProgress)
        );
    }

    #[test]
    fn test_reopen_allows_leave_and_cancel_again() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pug = forming();
        pug.join("alice", &mut rng).unwrap();
        pug.join("bob", &mut rng).unwrap();
        pug.begin_match();

        pug.reopen();

        assert!(!pug.match_started());
        assert!(pug.leave("bob", &mut rng).is_ok());
        assert!(pug.cancel("alice").is_ok());
    }

    #[test]
    fn test_generate_password_has_prefix_and_three_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let password = generate_password("pug", &mut rng);
            let digits = password.strip_prefix("pug").unwrap();
            let n: u32 = digits.parse().unwrap();
            assert!((100..=999).contains(&n), "{password}");
        }
    }
}
