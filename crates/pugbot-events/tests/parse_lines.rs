//! Parses realistic log lines end to end.

use pugbot_events::{LogEvent, PlayerDescriptor, Side, parse_line, strip_frame};

const STAMP: &str = "L 10/19/2026 - 20:15:01:";

fn line(rest: &str) -> String {
    format!("{STAMP} {rest}")
}

fn player(name: &str, slot: &str, steam_id: &str, team: &str) -> PlayerDescriptor {
    PlayerDescriptor {
        name: name.into(),
        slot: slot.into(),
        steam_id: steam_id.into(),
        team: team.into(),
    }
}

// =========================================================================
// Player lines
// =========================================================================

#[test]
fn test_parse_line_entered_yields_player_joined() {
    let event = parse_line(&line("\"Quinn<28><BOT><>\" entered the game"));
    assert_eq!(
        event,
        Some(LogEvent::PlayerJoined {
            player: player("Quinn", "28", "BOT", ""),
        })
    );
}

#[test]
fn test_parse_line_disconnected_yields_player_left() {
    let event = parse_line(&line(
        "\"rain<3><STEAM_1:0:1234><CT>\" disconnected (reason \"Disconnect\")",
    ));
    assert_eq!(
        event,
        Some(LogEvent::PlayerLeft {
            player: player("rain", "3", "STEAM_1:0:1234", "CT"),
        })
    );
}

#[test]
fn test_parse_line_say_yields_chat_text() {
    let event = parse_line(&line(
        "\"rain<3><STEAM_1:0:1234><CT>\" say \"!login admin417\"",
    ));
    let Some(LogEvent::Chat { player, text, team_only }) = event else {
        panic!("expected a chat event");
    };
    assert_eq!(player.steam_id, "STEAM_1:0:1234");
    assert_eq!(text, "!login admin417");
    assert!(!team_only);
}

#[test]
fn test_parse_line_say_team_is_team_only() {
    let event = parse_line(&line(
        "\"Quinn<28><BOT><TERRORIST>\" say_team \"rush b\"",
    ));
    assert!(matches!(
        event,
        Some(LogEvent::Chat { team_only: true, ref text, .. }) if text == "rush b"
    ));
}

#[test]
fn test_parse_line_purchased_yields_item() {
    let event = parse_line(&line(
        "\"Quinn<28><BOT><TERRORIST>\" purchased \"ak47\"",
    ));
    assert!(matches!(
        event,
        Some(LogEvent::Purchased { ref item, .. }) if item == "ak47"
    ));
}

#[test]
fn test_parse_line_player_trigger_yields_event_name() {
    let event = parse_line(&line(
        "\"Quinn<28><BOT><TERRORIST>\" triggered \"Planted_The_Bomb\" at bombsite B",
    ));
    assert_eq!(
        event,
        Some(LogEvent::Trigger {
            player: player("Quinn", "28", "BOT", "TERRORIST"),
            event: "Planted_The_Bomb".into(),
        })
    );
}

// =========================================================================
// World and team lines
// =========================================================================

#[test]
fn test_parse_line_world_round_start_and_end() {
    assert_eq!(
        parse_line(&line("World triggered \"Round_Start\"")),
        Some(LogEvent::RoundStart)
    );
    assert_eq!(
        parse_line(&line("World triggered \"Round_End\"")),
        Some(LogEvent::RoundEnd)
    );
    assert_eq!(parse_line(&line("World triggered \"Match_Start\" on \"de_dust2\"")), None);
}

#[test]
fn test_parse_line_team_trigger_strips_prefix() {
    let event = parse_line(&line(
        "Team \"CT\" triggered \"SFUI_Notice_CTs_Win\" (CT \"3\") (T \"1\")",
    ));
    assert_eq!(
        event,
        Some(LogEvent::RoundTrigger {
            team: Some(Side::CounterTerrorist),
            event: "CTs_Win".into(),
        })
    );
}

#[test]
fn test_parse_line_team_trigger_without_prefix() {
    let event = parse_line(&line(
        "Team \"TERRORIST\" triggered \"Target_Bombed\" (CT \"0\") (T \"1\")",
    ));
    assert_eq!(
        event,
        Some(LogEvent::RoundTrigger {
            team: Some(Side::Terrorist),
            event: "Target_Bombed".into(),
        })
    );
}

// =========================================================================
// Kill lines
// =========================================================================

#[test]
fn test_parse_line_kill_with_coordinates_and_headshot() {
    let event = parse_line(&line(
        "\"Quinn<28><BOT><TERRORIST>\" [93 303 82] killed \"rain<3><STEAM_1:0:1234><CT>\" [-1 -5 1] with \"ak47\" (headshot)",
    ));
    assert_eq!(
        event,
        Some(LogEvent::Kill {
            killer: player("Quinn", "28", "BOT", "TERRORIST"),
            victim: player("rain", "3", "STEAM_1:0:1234", "CT"),
            weapon: "ak47".into(),
            headshot: true,
        })
    );
}

#[test]
fn test_parse_line_kill_with_coordinates_no_headshot() {
    let event = parse_line(&line(
        "\"Quinn<28><BOT><TERRORIST>\" [93 303 82] killed \"rain<3><STEAM_1:0:1234><CT>\" [-1 -5 1] with \"glock\"",
    ));
    assert!(matches!(
        event,
        Some(LogEvent::Kill { headshot: false, ref weapon, .. }) if weapon == "glock"
    ));
}

#[test]
fn test_parse_line_kill_old_layout() {
    let event = parse_line(&line(
        "\"Quinn<28><BOT><TERRORIST>\" killed \"rain<3><STEAM_1:0:1234><CT>\" with \"deagle\" (headshot)",
    ));
    let Some(LogEvent::Kill { killer, victim, weapon, headshot }) = event else {
        panic!("expected a kill event");
    };
    assert_eq!(killer.side(), Some(Side::Terrorist));
    assert_eq!(victim.side(), Some(Side::CounterTerrorist));
    assert_eq!(weapon, "deagle");
    assert!(headshot);
}

#[test]
fn test_parse_line_assist_yields_assister_and_victim() {
    let event = parse_line(&line(
        "\"rain<3><STEAM_1:0:1234><CT>\" assisted killing \"Quinn<28><BOT><TERRORIST>\"",
    ));
    assert_eq!(
        event,
        Some(LogEvent::Assist {
            assister: player("rain", "3", "STEAM_1:0:1234", "CT"),
            victim: player("Quinn", "28", "BOT", "TERRORIST"),
        })
    );
}

// =========================================================================
// Datagrams
// =========================================================================

#[test]
fn test_strip_frame_then_parse() {
    let mut datagram = b"\xff\xff\xff\xffR".to_vec();
    datagram.extend_from_slice(line("World triggered \"Round_Start\"").as_bytes());
    datagram.extend_from_slice(b"\n\0");

    let text = strip_frame(&datagram).unwrap();
    assert_eq!(parse_line(&text), Some(LogEvent::RoundStart));
}
