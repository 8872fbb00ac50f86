//! # pugbot
//!
//! Runs pick-up games (PUGs) on Counter-Strike game servers.
//!
//! Players gather in a chat channel, the bot claims a free game server,
//! and once ten players have joined it draws teams and whispers everyone
//! the connect details. From then on the server's log stream drives the
//! match: halves, score, swap and the final result.
//!
//! ```text
//!   chat ──Intent──→ PugBot ──RCON──→ game server
//!                      ↑                  │
//!                      └──── UDP log ─────┘
//! ```
//!
//! The layers below live in their own crates:
//! - `pugbot-transport`: TCP connection and UDP log socket
//! - `pugbot-protocol`: RCON frame codec
//! - `pugbot-rcon`: authenticated RCON session with frame reassembly
//! - `pugbot-events`: log line parser
//! - `pugbot-match`: PUG roster and match state machine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pugbot::prelude::*;
//!
//! # async fn run() -> Result<(), PugbotError> {
//! let config = BotConfig::from_json_str(r#"{ "servers": [] }"#)?;
//! let bot: PugBot<TcpConnection, _> = PugBot::new(config, TracingNotifier);
//! bot.dispatch(Intent::StartPug {
//!     channel: "#pug".into(),
//!     player: "alice".into(),
//!     map: Some("de_inferno".into()),
//! })
//! .await;
//! # Ok(())
//! # }
//! ```

mod config;
mod engine;
mod error;
mod intent;
mod notify;
mod registry;

pub use config::{BotConfig, ServerConfig};
pub use engine::PugBot;
pub use error::PugbotError;
pub use intent::Intent;
pub use notify::{Notifier, TracingNotifier};
pub use registry::{
    GameServerHandle, PugRegistry, ServerId, ServerRegistry, ServerSlot, SharedPug,
};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Installs a stderr log subscriber. The level comes from `RUST_LOG` and
/// defaults to `info`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .try_init()
}

/// Convenience re-exports for embedding the bot.
pub mod prelude {
    pub use crate::{
        BotConfig, GameServerHandle, Intent, Notifier, PugBot, PugbotError,
        ServerConfig, ServerId, TracingNotifier,
    };
    pub use pugbot_events::{LogEvent, PlayerDescriptor, Side};
    pub use pugbot_match::{
        Effect, MatchConfig, MatchPhase, MatchSummary, PugConfig, PugState,
    };
    pub use pugbot_transport::{Connection, LogSocket, TcpConnection};
}
