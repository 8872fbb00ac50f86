//! PUG roster forming driven end to end with a seeded RNG.

use pugbot_match::{JoinOutcome, LeaveOutcome, PugConfig, PugError, PugId, PugSession, PugState};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Helpers
// =========================================================================

fn nick(i: usize) -> String {
    format!("player{i}")
}

fn new_pug() -> PugSession {
    PugSession::start(PugId(7), "#pug", Some("de_inferno"), &PugConfig::default())
}

fn full_pug(rng: &mut StdRng) -> PugSession {
    let mut pug = new_pug();
    for i in 0..10 {
        pug.join(&nick(i), rng).unwrap();
    }
    pug
}

// =========================================================================
// Join bound
// =========================================================================

#[test]
fn test_join_ten_players_fills_pug() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pug = new_pug();

    for i in 0..9 {
        assert_eq!(
            pug.join(&nick(i), &mut rng),
            Ok(JoinOutcome::Joined { count: i + 1 })
        );
        assert_eq!(pug.state(), PugState::Forming);
    }
    let outcome = pug.join(&nick(9), &mut rng).unwrap();

    assert!(matches!(outcome, JoinOutcome::Filled(_)));
    assert_eq!(pug.state(), PugState::Full);
    assert_eq!(pug.player_count(), 10);
}

#[test]
fn test_join_eleventh_player_is_rejected() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut pug = full_pug(&mut rng);

    assert_eq!(pug.join("latecomer", &mut rng), Err(PugError::PugFull));
    assert_eq!(pug.player_count(), 10);
}

#[test]
fn test_join_same_player_twice_is_rejected() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut pug = new_pug();
    pug.join("alice", &mut rng).unwrap();

    assert_eq!(
        pug.join("alice", &mut rng),
        Err(PugError::AlreadyJoined("alice".into()))
    );
    assert_eq!(pug.player_count(), 1);
}

#[test]
fn test_full_pug_teams_split_five_and_five() {
    let mut rng = StdRng::seed_from_u64(4);
    let pug = full_pug(&mut rng);
    let teams = pug.teams().unwrap();

    assert_eq!(teams.terrorists.len(), 5);
    assert_eq!(teams.counter_terrorists.len(), 5);

    let mut everyone: Vec<String> = teams
        .terrorists
        .iter()
        .chain(&teams.counter_terrorists)
        .cloned()
        .collect();
    everyone.sort();
    let mut roster = pug.players().to_vec();
    roster.sort();
    assert_eq!(everyone, roster);
}

// =========================================================================
// Leave and admin succession
// =========================================================================

#[test]
fn test_leave_admin_reassigns_to_remaining_player() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pug = new_pug();
        for p in ["A", "B", "C"] {
            pug.join(p, &mut rng).unwrap();
        }
        assert_eq!(pug.admin(), Some("A"));

        let outcome = pug.leave("A", &mut rng).unwrap();

        let LeaveOutcome::AdminReassigned { new_admin, count } = outcome else {
            panic!("expected the admin to be reassigned");
        };
        assert!(new_admin == "B" || new_admin == "C", "got {new_admin}");
        assert_eq!(count, 2);
        assert_eq!(pug.admin(), Some(new_admin.as_str()));
    }
}

#[test]
fn test_leave_non_admin_keeps_admin() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut pug = new_pug();
    pug.join("A", &mut rng).unwrap();
    pug.join("B", &mut rng).unwrap();

    assert_eq!(
        pug.leave("B", &mut rng),
        Ok(LeaveOutcome::Left { count: 1 })
    );
    assert_eq!(pug.admin(), Some("A"));
}

#[test]
fn test_leave_last_player_completes_pug() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut pug = new_pug();
    pug.join("A", &mut rng).unwrap();

    assert_eq!(pug.leave("A", &mut rng), Ok(LeaveOutcome::Emptied));
    assert_eq!(pug.state(), PugState::Completed);
    assert_eq!(pug.admin(), None);
}

#[test]
fn test_leave_full_pug_reopens_and_clears_teams() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut pug = full_pug(&mut rng);

    pug.leave(&nick(3), &mut rng).unwrap();

    assert_eq!(pug.state(), PugState::Forming);
    assert!(pug.teams().is_none());
    assert!(pug.join("replacement", &mut rng).is_ok());
    assert_eq!(pug.state(), PugState::Full);
}

#[test]
fn test_leave_unknown_player_is_rejected() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut pug = new_pug();
    pug.join("A", &mut rng).unwrap();

    assert_eq!(
        pug.leave("Z", &mut rng),
        Err(PugError::NotInPug("Z".into()))
    );
}
