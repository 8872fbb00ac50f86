//! Log line parsing for pugbot.
//!
//! A game server streams its event log to us as UDP datagrams, one line
//! per datagram. This crate turns those lines into typed [`LogEvent`]s:
//!
//! ```text
//!  datagram ──strip_frame──→ line ──parse_line──→ Option<LogEvent>
//! ```
//!
//! Parsing is positional. A line is split on single spaces and the parser
//! looks at fixed token slots:
//!
//! ```text
//!   0  1           2  3          4                          5
//!   L  10/19/2026  -  20:15:01:  "Quinn<28><BOT><TERRORIST>" entered the game
//! ```
//!
//! Lines the parser does not recognize yield `None`. That is the normal
//! case for most of the log and is never an error.
//!
//! The crate is pure: no sockets, no state.

mod descriptor;
mod event;
mod parser;

pub use descriptor::{BOT_STEAM_ID, PlayerDescriptor};
pub use event::{LogEvent, Side, round_winner};
pub use parser::{parse_line, parse_tokens, strip_frame};
