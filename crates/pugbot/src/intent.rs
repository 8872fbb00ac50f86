//! What a chat user asked the bot to do.
//!
//! The chat client turns channel messages into [`Intent`]s and hands them
//! to [`PugBot::dispatch`](crate::PugBot::dispatch). [`Intent::parse_console`]
//! does the same for a plain text line, which is how the console demo and
//! the tests drive the bot.

/// A request from a chat user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// `!pug [map]`
    StartPug {
        channel: String,
        player: String,
        map: Option<String>,
    },
    /// `!join`
    Join { channel: String, player: String },
    /// `!leave`
    Leave { channel: String, player: String },
    /// `!cancel`
    Cancel { channel: String, player: String },
    /// `!say <text>`
    Say {
        channel: String,
        player: String,
        text: String,
    },
    /// `!players`
    Players { channel: String },
    /// `!lo3`
    GoLive { channel: String, player: String },
    /// `!map <map>`
    ChangeMap {
        channel: String,
        player: String,
        map: String,
    },
    /// `!restart`
    Restart { channel: String, player: String },
    /// `!cancelhalf`
    CancelHalf { channel: String, player: String },
    /// A nickname change seen by the chat client.
    Rename { old: String, new: String },
    /// The user left the chat network or the channel.
    Disconnect { player: String },
}

impl Intent {
    /// Parses `<#channel> <nick> <!command> [args]`.
    ///
    /// `!nick <new>` stands in for a nickname change and `!quit` for the
    /// user leaving the network. Returns `None` for
    /// anything that is not a known command.
    pub fn parse_console(line: &str) -> Option<Self> {
        let mut parts = line.trim().splitn(4, char::is_whitespace);
        let channel = parts.next().filter(|c| c.starts_with('#'))?.to_string();
        let player = parts.next().filter(|p| !p.is_empty())?.to_string();
        let command = parts.next()?.to_ascii_lowercase();
        let rest = parts.next().map(str::trim).filter(|r| !r.is_empty());

        let intent = match command.as_str() {
            "!pug" => Self::StartPug {
                channel,
                player,
                map: rest.and_then(|r| r.split_whitespace().next()).map(str::to_string),
            },
            "!join" => Self::Join { channel, player },
            "!leave" => Self::Leave { channel, player },
            "!cancel" => Self::Cancel { channel, player },
            "!say" => Self::Say {
                channel,
                player,
                text: rest?.to_string(),
            },
            "!players" => Self::Players { channel },
            "!lo3" => Self::GoLive { channel, player },
            "!map" => Self::ChangeMap {
                channel,
                player,
                map: rest?.split_whitespace().next()?.to_string(),
            },
            "!restart" => Self::Restart { channel, player },
            "!cancelhalf" => Self::CancelHalf { channel, player },
            "!nick" => Self::Rename {
                old: player,
                new: rest?.split_whitespace().next()?.to_string(),
            },
            "!quit" => Self::Disconnect { player },
            _ => return None,
        };
        Some(intent)
    }

    /// The channel the reply goes to, if the intent has one.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::StartPug { channel, .. }
            | Self::Join { channel, .. }
            | Self::Leave { channel, .. }
            | Self::Cancel { channel, .. }
            | Self::Say { channel, .. }
            | Self::Players { channel }
            | Self::GoLive { channel, .. }
            | Self::ChangeMap { channel, .. }
            | Self::Restart { channel, .. }
            | Self::CancelHalf { channel, .. } => Some(channel),
            Self::Rename { .. } | Self::Disconnect { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_console_pug_with_map() {
        let intent = Intent::parse_console("#pug alice !pug de_nuke").unwrap();
        assert_eq!(
            intent,
            Intent::StartPug {
                channel: "#pug".into(),
                player: "alice".into(),
                map: Some("de_nuke".into()),
            }
        );
    }

    #[test]
    fn test_parse_console_pug_without_map() {
        let intent = Intent::parse_console("#pug alice !pug").unwrap();
        assert!(matches!(intent, Intent::StartPug { map: None, .. }));
    }

    #[test]
    fn test_parse_console_say_keeps_whole_text() {
        let intent = Intent::parse_console("#pug bob !say gl hf everyone").unwrap();
        assert_eq!(
            intent,
            Intent::Say {
                channel: "#pug".into(),
                player: "bob".into(),
                text: "gl hf everyone".into(),
            }
        );
    }

    #[test]
    fn test_parse_console_command_is_case_insensitive() {
        let intent = Intent::parse_console("#pug bob !JOIN").unwrap();
        assert!(matches!(intent, Intent::Join { .. }));
    }

    #[test]
    fn test_parse_console_missing_argument_is_none() {
        assert!(Intent::parse_console("#pug bob !say").is_none());
        assert!(Intent::parse_console("#pug bob !map").is_none());
        assert!(Intent::parse_console("#pug bob !nick").is_none());
    }

    #[test]
    fn test_parse_console_rejects_unknown_and_malformed() {
        assert!(Intent::parse_console("#pug bob !dance").is_none());
        assert!(Intent::parse_console("pug bob !join").is_none());
        assert!(Intent::parse_console("#pug").is_none());
        assert!(Intent::parse_console("").is_none());
    }

    #[test]
    fn test_parse_console_nick_is_rename() {
        let intent = Intent::parse_console("#pug bob !nick bobby").unwrap();
        assert_eq!(
            intent,
            Intent::Rename {
                old: "bob".into(),
                new: "bobby".into(),
            }
        );
        assert_eq!(intent.channel(), None);
    }
}
