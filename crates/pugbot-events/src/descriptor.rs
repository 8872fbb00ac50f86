//! Player descriptors as printed in the game log.

use serde::Serialize;

use crate::Side;

/// The steam id the game prints for bots.
pub const BOT_STEAM_ID: &str = "BOT";

/// A player as the log identifies them: `"Name<slot><steamId><TEAM>"`.
///
/// Every field is kept as printed. A descriptor the parser could not make
/// sense of has every field empty; callers treat an empty `steam_id` as
/// "unknown player" and ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerDescriptor {
    pub name: String,
    pub slot: String,
    pub steam_id: String,
    pub team: String,
}

impl PlayerDescriptor {
    /// Parses a descriptor token.
    ///
    /// Surrounding quotes are dropped, then the text is split on `<` and
    /// the pieces are assigned in order with their closing `>` removed.
    /// Missing pieces stay empty. A token without any `<` is not a
    /// descriptor and yields all-empty fields.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim_matches('"');
        if !raw.contains('<') {
            return Self::default();
        }

        let mut parts = raw.split('<').map(|p| p.trim_end_matches('>'));
        let mut next = || parts.next().unwrap_or_default().to_string();
        Self {
            name: next(),
            slot: next(),
            steam_id: next(),
            team: next(),
        }
    }

    /// Returns `true` for bot players.
    pub fn is_bot(&self) -> bool {
        self.steam_id == BOT_STEAM_ID
    }

    /// Returns `false` if the descriptor carried no identity.
    pub fn is_known(&self) -> bool {
        !self.steam_id.is_empty()
    }

    /// The side the player was on when the line was written, if any.
    pub fn side(&self) -> Option<Side> {
        Side::from_log(&self.team)
    }
}
