//! PUG and match state machines for pugbot.
//!
//! Two state machines live here, neither doing any I/O:
//!
//! - [`PugSession`] forms a roster in a chat channel: join, leave, admin
//!   succession, and drawing teams once ten players are in.
//! - [`MatchState`] follows the match on the game server. It is driven by
//!   [`LogEvent`](pugbot_events::LogEvent)s and admin commands, and
//!   answers with [`Effect`]s for its owner to carry out.
//!
//! ```text
//!  chat intents ──→ PugSession ──(full)──→ server armed
//!                                              │
//!  log events ────────────────────────────→ MatchState ──→ Vec<Effect>
//! ```
//!
//! # Key types
//!
//! - [`PugConfig`] / [`MatchConfig`]: roster size, maps, scoring rules
//! - [`PugState`] / [`MatchPhase`]: the two lifecycles
//! - [`Roster`] / [`PlayerStats`]: per-player statistics
//! - [`ChatCommand`]: `!commands` typed in game chat

mod command;
mod config;
mod error;
mod pug;
mod state;
mod stats;

pub use command::ChatCommand;
pub use config::{MatchConfig, MatchPhase, PugConfig, PugState};
pub use error::{MatchError, PugError};
pub use pug::{JoinOutcome, LeaveOutcome, PugId, PugSession, Teams, generate_password};
pub use state::{Effect, MatchOutcome, MatchState, MatchSummary, Score};
pub use stats::{PlayerStats, Roster, RosterKey};
