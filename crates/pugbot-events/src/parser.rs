//! Positional log line parser.

use crate::{LogEvent, PlayerDescriptor};

/// Bytes the game server puts in front of every log datagram.
const FRAME_PREFIX: usize = 5;
/// Bytes after the line text (newline and terminating null).
const FRAME_SUFFIX: usize = 2;

/// Token slot of the player descriptor.
const PLAYER: usize = 4;
/// Token slot of the action keyword on player lines.
const ACTION: usize = 5;

/// Extracts the log line from a raw datagram.
///
/// Skips the 5-byte prefix and drops the 2 trailing bytes. Returns `None`
/// for datagrams too short to hold any text.
pub fn strip_frame(datagram: &[u8]) -> Option<String> {
    if datagram.len() <= FRAME_PREFIX + FRAME_SUFFIX {
        return None;
    }
    let text = &datagram[FRAME_PREFIX..datagram.len() - FRAME_SUFFIX];
    Some(String::from_utf8_lossy(text).into_owned())
}

/// Parses one log line. Unrecognized lines yield `None`.
pub fn parse_line(line: &str) -> Option<LogEvent> {
    let tokens: Vec<&str> = line.split(' ').collect();
    let event = parse_tokens(&tokens);
    if event.is_none() {
        tracing::trace!(line, "log line not recognized");
    }
    event
}

/// Parses a line that has already been split on spaces.
pub fn parse_tokens(tokens: &[&str]) -> Option<LogEvent> {
    if tokens.len() <= ACTION {
        return None;
    }

    if let Some(kill) = parse_kill(tokens) {
        return Some(kill);
    }

    match (tokens[PLAYER], tokens[ACTION]) {
        ("World", "triggered") => parse_world_trigger(tokens),
        ("Team", _) => parse_team_trigger(tokens),
        (player, "entered") => Some(LogEvent::PlayerJoined {
            player: PlayerDescriptor::parse(player),
        }),
        (player, "disconnected") => Some(LogEvent::PlayerLeft {
            player: PlayerDescriptor::parse(player),
        }),
        (player, action @ ("say" | "say_team")) => Some(LogEvent::Chat {
            player: PlayerDescriptor::parse(player),
            text: unquote(&tokens[ACTION + 1..].join(" ")).to_string(),
            team_only: action == "say_team",
        }),
        (player, "assisted") if tokens.get(ACTION + 1) == Some(&"killing") => {
            Some(LogEvent::Assist {
                assister: PlayerDescriptor::parse(player),
                victim: PlayerDescriptor::parse(tokens.get(ACTION + 2)?),
            })
        }
        (player, "purchased") => Some(LogEvent::Purchased {
            player: PlayerDescriptor::parse(player),
            item: unquote(tokens.get(ACTION + 1)?).to_string(),
        }),
        (player, "triggered") => Some(LogEvent::Trigger {
            player: PlayerDescriptor::parse(player),
            event: unquote(tokens.get(ACTION + 1)?).to_string(),
        }),
        _ => None,
    }
}

/// `World triggered "Round_Start"`
fn parse_world_trigger(tokens: &[&str]) -> Option<LogEvent> {
    match unquote(tokens.get(ACTION + 1)?) {
        "Round_Start" => Some(LogEvent::RoundStart),
        "Round_End" => Some(LogEvent::RoundEnd),
        _ => None,
    }
}

/// `Team "CT" triggered "SFUI_Notice_CTs_Win" (CT "3") (T "1")`
fn parse_team_trigger(tokens: &[&str]) -> Option<LogEvent> {
    if tokens.get(ACTION + 1) != Some(&"triggered") {
        return None;
    }
    let event = unquote(tokens.get(ACTION + 2)?);
    Some(LogEvent::RoundTrigger {
        team: crate::Side::from_log(tokens[ACTION]),
        event: event.strip_prefix("SFUI_Notice_").unwrap_or(event).to_string(),
    })
}

/// Kill lines come in two layouts:
///
/// ```text
/// "K<..>" [93 303 82] killed "V<..>" [-1 -5 1] with "ak47" (headshot)
/// "K<..>" killed "V<..>" with "ak47" (headshot)
/// ```
fn parse_kill(tokens: &[&str]) -> Option<LogEvent> {
    let (victim, weapon) = if tokens.get(8) == Some(&"killed") {
        (9, 14)
    } else if tokens.get(ACTION) == Some(&"killed") {
        (6, 8)
    } else {
        return None;
    };

    Some(LogEvent::Kill {
        killer: PlayerDescriptor::parse(tokens[PLAYER]),
        victim: PlayerDescriptor::parse(tokens.get(victim)?),
        weapon: unquote(tokens.get(weapon)?).to_string(),
        headshot: tokens
            .get(weapon + 1)
            .is_some_and(|t| t.contains("headshot")),
    })
}

fn unquote(token: &str) -> &str {
    token.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_frame_removes_prefix_and_suffix() {
        let mut datagram = vec![0xff, 0xff, 0xff, 0xff, b'R'];
        datagram.extend_from_slice(b"L 10/19/2026 - 20:15:01: Log file started");
        datagram.extend_from_slice(b"\n\0");

        assert_eq!(
            strip_frame(&datagram).as_deref(),
            Some("L 10/19/2026 - 20:15:01: Log file started")
        );
    }

    #[test]
    fn test_strip_frame_short_datagram_is_none() {
        assert_eq!(strip_frame(b"\xff\xff\xff\xffR\n\0"), None);
        assert_eq!(strip_frame(b""), None);
    }

    #[test]
    fn test_parse_tokens_short_line_is_none() {
        assert_eq!(parse_tokens(&["L", "10/19/2026", "-"]), None);
    }

    #[test]
    fn test_parse_line_unknown_action_is_none() {
        let line = "L 10/19/2026 - 20:15:01: \"Quinn<28><BOT><CT>\" switched from team <Unassigned> to <CT>";
        assert_eq!(parse_line(line), None);
    }

    #[test]
    fn test_parse_line_team_without_triggered_is_none() {
        let line = "L 10/19/2026 - 20:15:01: Team \"CT\" scored \"3\" with \"5\" players";
        assert_eq!(parse_line(line), None);
    }
}
