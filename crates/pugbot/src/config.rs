//! Bot configuration.

use std::collections::HashMap;

use pugbot_match::{MatchConfig, PugConfig};
use serde::{Deserialize, Serialize};

use crate::PugbotError;

/// One game server the bot may host PUGs on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `host:port` of the server. Players are given this to connect, and
    /// RCON uses the same port over TCP.
    pub address: String,

    pub rcon_password: String,

    /// Local `ip:port` the server's log stream is received on.
    pub listen_address: String,

    pub region: String,
}

/// Everything the bot needs to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub servers: Vec<ServerConfig>,
    pub pug: PugConfig,
    pub match_rules: MatchConfig,

    /// Region used for channels not listed in `channel_regions`.
    pub default_region: String,

    /// Which region's servers a channel's PUGs are played on.
    pub channel_regions: HashMap<String, String>,

    /// Prefix of the generated `sv_password` for a PUG.
    pub server_password_prefix: String,

    /// Prefix of the generated in-game `!login` password.
    pub admin_password_prefix: String,

    /// Prefix of the password set on a server once it is released.
    pub temporary_password_prefix: String,
}

impl BotConfig {
    /// Parses a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PugbotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The region PUGs started in `channel` are hosted in.
    pub fn region_for(&self, channel: &str) -> &str {
        self.channel_regions
            .get(channel)
            .map(String::as_str)
            .unwrap_or(&self.default_region)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            pug: PugConfig::default(),
            match_rules: MatchConfig::default(),
            default_region: "Sydney".into(),
            channel_regions: HashMap::new(),
            server_password_prefix: "pug".into(),
            admin_password_prefix: "admin".into(),
            temporary_password_prefix: "closed".into(),
        }
    }
}
