//! Typed log events.

use std::fmt;

use serde::Serialize;

use crate::PlayerDescriptor;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two teams in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Terrorist,
    CounterTerrorist,
}

impl Side {
    /// Parses a team name as the log prints it (`TERRORIST`, `CT`, and the
    /// short `T` used in team trigger lines).
    pub fn from_log(team: &str) -> Option<Self> {
        match team.trim_matches('"') {
            "TERRORIST" | "T" => Some(Self::Terrorist),
            "CT" => Some(Self::CounterTerrorist),
            _ => None,
        }
    }

    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Terrorist => Self::CounterTerrorist,
            Self::CounterTerrorist => Self::Terrorist,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terrorist => write!(f, "Terrorists"),
            Self::CounterTerrorist => write!(f, "Counter-Terrorists"),
        }
    }
}

// ---------------------------------------------------------------------------
// LogEvent
// ---------------------------------------------------------------------------

/// Something that happened on the game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LogEvent {
    /// A player finished connecting and entered the game.
    PlayerJoined { player: PlayerDescriptor },

    /// A player disconnected.
    PlayerLeft { player: PlayerDescriptor },

    /// A player typed in chat. `team_only` is set for `say_team`.
    Chat {
        player: PlayerDescriptor,
        text: String,
        team_only: bool,
    },

    /// A player-attributed trigger such as `Planted_The_Bomb`.
    Trigger {
        player: PlayerDescriptor,
        event: String,
    },

    /// A team-wide trigger that decides a round, such as
    /// `Terrorists_Win`. `event` has any `SFUI_Notice_` prefix removed.
    RoundTrigger { team: Option<Side>, event: String },

    /// One player killed another.
    Kill {
        killer: PlayerDescriptor,
        victim: PlayerDescriptor,
        weapon: String,
        headshot: bool,
    },

    /// A player helped kill `victim` without landing the kill.
    Assist {
        assister: PlayerDescriptor,
        victim: PlayerDescriptor,
    },

    /// A player bought an item.
    Purchased {
        player: PlayerDescriptor,
        item: String,
    },

    RoundStart,
    RoundEnd,
}

/// The side a round-deciding trigger awards the round to.
///
/// Accepts names with or without the `SFUI_Notice_` prefix. Returns
/// `None` for triggers that do not end a round.
pub fn round_winner(event: &str) -> Option<Side> {
    match event.strip_prefix("SFUI_Notice_").unwrap_or(event) {
        "Target_Bombed" | "Terrorists_Win" => Some(Side::Terrorist),
        "Bomb_Defused" | "CTs_Win" | "Target_Saved" => {
            Some(Side::CounterTerrorist)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_winner_known_triggers() {
        assert_eq!(round_winner("Target_Bombed"), Some(Side::Terrorist));
        assert_eq!(round_winner("Terrorists_Win"), Some(Side::Terrorist));
        assert_eq!(round_winner("Bomb_Defused"), Some(Side::CounterTerrorist));
        assert_eq!(round_winner("CTs_Win"), Some(Side::CounterTerrorist));
        assert_eq!(round_winner("Target_Saved"), Some(Side::CounterTerrorist));
    }

    #[test]
    fn test_round_winner_strips_sfui_prefix() {
        assert_eq!(
            round_winner("SFUI_Notice_Terrorists_Win"),
            Some(Side::Terrorist)
        );
        assert_eq!(
            round_winner("SFUI_Notice_Bomb_Defused"),
            Some(Side::CounterTerrorist)
        );
    }

    #[test]
    fn test_round_winner_other_trigger_is_none() {
        assert_eq!(round_winner("Round_Draw"), None);
        assert_eq!(round_winner("Planted_The_Bomb"), None);
    }

    #[test]
    fn test_side_from_log_and_opposite() {
        assert_eq!(Side::from_log("TERRORIST"), Some(Side::Terrorist));
        assert_eq!(Side::from_log("\"CT\""), Some(Side::CounterTerrorist));
        assert_eq!(Side::from_log("Unassigned"), None);
        assert_eq!(Side::Terrorist.opposite(), Side::CounterTerrorist);
    }
}
