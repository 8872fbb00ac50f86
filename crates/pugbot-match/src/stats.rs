//! Per-player match statistics.

use pugbot_events::{PlayerDescriptor, Side};
use serde::Serialize;

// ---------------------------------------------------------------------------
// RosterKey
// ---------------------------------------------------------------------------

/// How a player is identified on the roster.
///
/// Humans are keyed by steam id. Every bot shares the steam id `BOT`, so
/// bots are keyed by name instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RosterKey {
    Steam(String),
    Bot(String),
}

impl RosterKey {
    /// The key for a descriptor, or `None` if it carries no identity.
    pub fn of(player: &PlayerDescriptor) -> Option<Self> {
        if !player.is_known() {
            None
        } else if player.is_bot() {
            Some(Self::Bot(player.name.clone()))
        } else {
            Some(Self::Steam(player.steam_id.clone()))
        }
    }

    fn matches(&self, stats: &PlayerStats) -> bool {
        match self {
            Self::Steam(id) => stats.steam_id == *id,
            Self::Bot(name) => stats.is_bot() && stats.name == *name,
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerStats
// ---------------------------------------------------------------------------

/// One roster entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub steam_id: String,
    pub name: String,
    pub team: Option<Side>,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub bomb_planted: u32,
    pub bomb_dropped: u32,
    pub bomb_picked_up: u32,
    pub target_bombed: u32,
    pub bomb_defused: u32,
    pub defuse_attempts_with_kit: u32,
    pub defuse_attempts_without_kit: u32,
}

impl PlayerStats {
    fn new(player: &PlayerDescriptor) -> Self {
        Self {
            steam_id: player.steam_id.clone(),
            name: player.name.clone(),
            team: player.side(),
            ..Self::default()
        }
    }

    /// Returns `true` for bot players.
    pub fn is_bot(&self) -> bool {
        self.steam_id == pugbot_events::BOT_STEAM_ID
    }

    fn same_player(&self, other: &PlayerStats) -> bool {
        self.steam_id == other.steam_id && (!self.is_bot() || self.name == other.name)
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The players seen on a server during a match, each at most once.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<PlayerStats>,
    last_planter: Option<RosterKey>,
}

impl Roster {
    /// Adds a player unless they are already on the roster.
    ///
    /// Returns `true` if the player was added. Descriptors without an
    /// identity are ignored.
    pub fn add(&mut self, player: &PlayerDescriptor) -> bool {
        let Some(key) = RosterKey::of(player) else {
            return false;
        };
        if self.players.iter().any(|p| key.matches(p)) {
            return false;
        }
        self.players.push(PlayerStats::new(player));
        true
    }

    /// Removes a player. Returns `true` if they were on the roster.
    pub fn remove(&mut self, player: &PlayerDescriptor) -> bool {
        let Some(key) = RosterKey::of(player) else {
            return false;
        };
        let before = self.players.len();
        self.players.retain(|p| !key.matches(p));
        self.players.len() != before
    }

    /// Looks a player up by key.
    pub fn get(&self, key: &RosterKey) -> Option<&PlayerStats> {
        self.players.iter().find(|p| key.matches(p))
    }

    /// Returns the player's entry, adding it first if needed. The entry's
    /// name and team are refreshed from the descriptor.
    fn entry(&mut self, player: &PlayerDescriptor) -> Option<&mut PlayerStats> {
        let key = RosterKey::of(player)?;
        let index = match self.players.iter().position(|p| key.matches(p)) {
            Some(index) => index,
            None => {
                self.players.push(PlayerStats::new(player));
                self.players.len() - 1
            }
        };
        let stats = &mut self.players[index];
        stats.name.clone_from(&player.name);
        if let Some(side) = player.side() {
            stats.team = Some(side);
        }
        Some(stats)
    }

    /// Credits a kill and a death. Team kills give the killer no credit.
    pub fn record_kill(
        &mut self,
        killer: &PlayerDescriptor,
        victim: &PlayerDescriptor,
    ) {
        let team_kill = killer.side().is_some() && killer.side() == victim.side();
        if !team_kill && RosterKey::of(killer) != RosterKey::of(victim) {
            if let Some(stats) = self.entry(killer) {
                stats.kills += 1;
            }
        }
        if let Some(stats) = self.entry(victim) {
            stats.deaths += 1;
        }
    }

    /// Credits an assist.
    pub fn record_assist(&mut self, assister: &PlayerDescriptor) {
        if let Some(stats) = self.entry(assister) {
            stats.assists += 1;
        }
    }

    /// Records a player-attributed trigger. Returns `false` for triggers
    /// that carry no statistic.
    pub fn record_trigger(&mut self, player: &PlayerDescriptor, event: &str) -> bool {
        if event == "Planted_The_Bomb" {
            self.last_planter = RosterKey::of(player);
        }
        let Some(stats) = self.entry(player) else {
            return false;
        };
        let counter = match event {
            "Planted_The_Bomb" => &mut stats.bomb_planted,
            "Dropped_The_Bomb" => &mut stats.bomb_dropped,
            "Got_The_Bomb" => &mut stats.bomb_picked_up,
            "Defused_The_Bomb" => &mut stats.bomb_defused,
            "Begin_Bomb_Defuse_With_Kit" => &mut stats.defuse_attempts_with_kit,
            "Begin_Bomb_Defuse_Without_Kit" => {
                &mut stats.defuse_attempts_without_kit
            }
            _ => return false,
        };
        *counter += 1;
        true
    }

    /// Credits a detonation to whoever planted last this round.
    pub fn credit_target_bombed(&mut self) {
        if let Some(key) = self.last_planter.take() {
            if let Some(stats) = self.players.iter_mut().find(|p| key.matches(p)) {
                stats.target_bombed += 1;
            }
        }
    }

    /// Forgets the round's planter.
    pub fn end_round(&mut self) {
        self.last_planter = None;
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerStats> {
        self.players.iter()
    }

    /// Copies the entries out, for a final summary.
    pub fn snapshot(&self) -> Vec<PlayerStats> {
        self.players.clone()
    }

    /// Puts every entry's counters back to what `checkpoint` recorded.
    ///
    /// Players missing from the checkpoint keep their place with zeroed
    /// counters. Names and teams stay as they are now.
    pub fn rewind(&mut self, checkpoint: &Roster) {
        for stats in &mut self.players {
            let earlier = checkpoint
                .players
                .iter()
                .find(|p| p.same_player(stats))
                .cloned()
                .unwrap_or_default();
            *stats = PlayerStats {
                steam_id: std::mem::take(&mut stats.steam_id),
                name: std::mem::take(&mut stats.name),
                team: stats.team,
                ..earlier
            };
        }
        self.last_planter = None;
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.last_planter = None;
    }
}
