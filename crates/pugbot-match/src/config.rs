//! PUG and match rules, and the two lifecycle state machines.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PugConfig
// ---------------------------------------------------------------------------

/// Settings for forming a PUG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PugConfig {
    /// Roster size at which the PUG is full. Two teams of five.
    pub max_players: usize,

    /// Maps a PUG may be started on or changed to.
    pub allowed_maps: Vec<String>,

    /// Map used when none (or an unknown one) is requested.
    pub default_map: String,
}

impl PugConfig {
    /// Returns `true` if `map` is on the allow-list.
    pub fn is_allowed_map(&self, map: &str) -> bool {
        self.allowed_maps.iter().any(|m| m == map)
    }

    /// Returns the requested map if it is allowed, else the default.
    pub fn resolve_map(&self, requested: Option<&str>) -> String {
        match requested {
            Some(map) if self.is_allowed_map(map) => map.to_string(),
            _ => self.default_map.clone(),
        }
    }
}

impl Default for PugConfig {
    fn default() -> Self {
        Self {
            max_players: 10,
            allowed_maps: [
                "de_dust2",
                "de_inferno",
                "de_mirage",
                "de_nuke",
                "de_overpass",
                "de_train",
                "de_cache",
            ]
            .map(String::from)
            .to_vec(),
            default_map: "de_dust2".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Scoring rules for a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Players per side.
    pub team_size: u32,

    /// Rounds played before sides swap.
    pub half_rounds: u32,

    /// Combined score that wins the match.
    pub win_score: u32,

    /// Combined score both sides must reach for a draw.
    pub draw_score: u32,

    /// `mp_restartgame 1` commands issued when going live.
    pub live_restarts: u32,

    /// Console command that moves every player to the other side.
    pub swap_command: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            team_size: 5,
            half_rounds: 15,
            win_score: 16,
            draw_score: 15,
            live_restarts: 3,
            swap_command: "mp_swapteams".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PugState
// ---------------------------------------------------------------------------

/// The lifecycle of a PUG.
///
/// ```text
///  (Idle) ──start──→ Forming ──10th join──→ Full ──complete──→ Completed
///                       ↑  │                  │
///                       │  └──cancel/empty────┼──→ Completed
///                       └──────leave──────────┘
/// ```
///
/// `Idle` is the absence of a PUG on a channel and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PugState {
    Forming,
    Full,
    Completed,
}

impl PugState {
    /// Returns `true` if the PUG is accepting players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Forming)
    }

    /// Returns `true` until the PUG completes.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Forming, Self::Full)
                | (Self::Forming, Self::Completed)
                | (Self::Full, Self::Forming)
                | (Self::Full, Self::Completed)
        )
    }
}

impl std::fmt::Display for PugState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forming => write!(f, "Forming"),
            Self::Full => write!(f, "Full"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchPhase
// ---------------------------------------------------------------------------

/// The lifecycle of a match on one server.
///
/// ```text
/// NotStarted → FirstHalf → HalfBreak → SecondHalf → Completed → NotStarted
/// ```
///
/// - **NotStarted**: warmup. Map changes and restarts are allowed.
/// - **FirstHalf**: live. Round wins count toward the first half.
/// - **HalfBreak**: sides swapped, waiting for the admin to go live again.
/// - **SecondHalf**: live. The match ends on a win or draw score.
/// - **Completed**: final score announced. The server is then reset and
///   returns to `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    NotStarted,
    FirstHalf,
    HalfBreak,
    SecondHalf,
    Completed,
}

impl MatchPhase {
    /// Returns `true` while round results are being counted.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::FirstHalf | Self::SecondHalf)
    }

    /// Returns `true` once the first half has been started.
    pub fn has_gone_live(&self) -> bool {
        !matches!(self, Self::NotStarted)
    }

    /// The next phase in match order.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::FirstHalf),
            Self::FirstHalf => Some(Self::HalfBreak),
            Self::HalfBreak => Some(Self::SecondHalf),
            Self::SecondHalf => Some(Self::Completed),
            Self::Completed => Some(Self::NotStarted),
        }
    }

    /// The phase a cancelled half falls back to.
    pub fn before_half(self) -> Option<Self> {
        match self {
            Self::FirstHalf => Some(Self::NotStarted),
            Self::SecondHalf => Some(Self::HalfBreak),
            _ => None,
        }
    }

    /// Returns `true` if `target` directly follows this phase.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::FirstHalf => write!(f, "FirstHalf"),
            Self::HalfBreak => write!(f, "HalfBreak"),
            Self::SecondHalf => write!(f, "SecondHalf"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_phase_next_follows_strict_order() {
        assert_eq!(MatchPhase::NotStarted.next(), Some(MatchPhase::FirstHalf));
        assert_eq!(MatchPhase::FirstHalf.next(), Some(MatchPhase::HalfBreak));
        assert_eq!(MatchPhase::HalfBreak.next(), Some(MatchPhase::SecondHalf));
        assert_eq!(MatchPhase::SecondHalf.next(), Some(MatchPhase::Completed));
        assert_eq!(MatchPhase::Completed.next(), Some(MatchPhase::NotStarted));
    }

    #[test]
    fn test_match_phase_can_transition_to() {
        assert!(MatchPhase::NotStarted.can_transition_to(MatchPhase::FirstHalf));
        assert!(!MatchPhase::NotStarted.can_transition_to(MatchPhase::SecondHalf));
        assert!(!MatchPhase::HalfBreak.can_transition_to(MatchPhase::FirstHalf));
    }

    #[test]
    fn test_match_phase_is_live() {
        assert!(!MatchPhase::NotStarted.is_live());
        assert!(MatchPhase::FirstHalf.is_live());
        assert!(!MatchPhase::HalfBreak.is_live());
        assert!(MatchPhase::SecondHalf.is_live());
        assert!(!MatchPhase::Completed.is_live());
    }

    #[test]
    fn test_match_phase_before_half() {
        assert_eq!(
            MatchPhase::FirstHalf.before_half(),
            Some(MatchPhase::NotStarted)
        );
        assert_eq!(
            MatchPhase::SecondHalf.before_half(),
            Some(MatchPhase::HalfBreak)
        );
        assert_eq!(MatchPhase::HalfBreak.before_half(), None);
    }

    #[test]
    fn test_pug_state_transitions() {
        assert!(PugState::Forming.can_transition_to(PugState::Full));
        assert!(PugState::Full.can_transition_to(PugState::Forming));
        assert!(!PugState::Completed.can_transition_to(PugState::Forming));
        assert!(PugState::Forming.is_joinable());
        assert!(!PugState::Full.is_joinable());
    }

    #[test]
    fn test_pug_config_resolve_map_falls_back_to_default() {
        let config = PugConfig::default();
        assert_eq!(config.resolve_map(Some("de_nuke")), "de_nuke");
        assert_eq!(config.resolve_map(Some("cs_office")), "de_dust2");
        assert_eq!(config.resolve_map(None), "de_dust2");
    }

    #[test]
    fn test_match_config_default() {
        let config = MatchConfig::default();
        assert_eq!(config.team_size, 5);
        assert_eq!(config.half_rounds, 15);
        assert_eq!(config.win_score, 16);
        assert_eq!(config.draw_score, 15);
        assert_eq!(config.swap_command, "mp_swapteams");
    }
}
