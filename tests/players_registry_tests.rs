mod common;

use std::sync::Arc;

use battleship_arena::{
    ActivePlayers, Battlefield, DefaultMatchFactory, GameEvent, Match, MatchFactory,
    PlayersRegistry,
};
use common::{level, player, Arena, FakeFactory, FakeSessions, RecordingInterface};

#[test]
fn test_add_as_active_is_idempotent() {
    let arena = Arena::new();
    assert!(arena.players.add_as_active(player("a")));
    assert!(!arena.players.add_as_active(player("a")));
    assert_eq!(arena.players.active_players(), vec![player("a")]);
}

#[test]
fn test_lookups() {
    let arena = Arena::with_players(&["a", "b"]);
    assert!(arena.players.is_player_active("a"));
    assert!(!arena.players.is_player_active("z"));
    assert_eq!(arena.players.get_player("b"), Some(player("b")));
    assert_eq!(arena.players.get_player("z"), None);
    assert_eq!(arena.players.active_players_except("a"), vec![player("b")]);
}

#[test]
fn test_remove_from_active_ends_created_sessions() {
    let arena = Arena::with_players(&["a", "b"]);
    arena.sessions.create_session("a", &level()).unwrap();
    assert!(arena.players.remove_from_active("a"));
    assert!(!arena.players.is_player_active("a"));
    assert!(arena.sessions.is_empty());
    assert!(!arena.players.remove_from_active("a"));
}

#[test]
fn test_remove_from_active_leaves_roster_before_ending_sessions() {
    let sessions = Arc::new(FakeSessions::default());
    let roster = Arc::new(ActivePlayers::new());
    sessions.roster.set(roster.clone()).ok();
    let players = PlayersRegistry::new(
        roster,
        sessions.clone(),
        Arc::new(RecordingInterface::default()),
    );
    players.add_as_active(player("a"));
    players.remove_from_active("a");
    assert_eq!(*sessions.ended.lock().unwrap(), vec!["a".to_string()]);
    assert_eq!(*sessions.active_at_end.lock().unwrap(), vec![false]);
}

#[test]
fn test_accept_invite_goes_through_directory() {
    let boards = Arc::new(FakeFactory::default());
    let interface = Arc::new(RecordingInterface::default());
    let factory = DefaultMatchFactory::new(boards, interface.clone());
    let session: Arc<Match> = factory.create(player("a"), &level());

    let sessions = Arc::new(FakeSessions::default());
    *sessions.session.lock().unwrap() = Some(session.clone());
    let players = PlayersRegistry::new(Arc::new(ActivePlayers::new()), sessions.clone(), interface);

    assert!(players.accept_invite("b", "a").is_some());
    assert_eq!(
        *sessions.joined.lock().unwrap(),
        vec![("b".to_string(), "a".to_string())]
    );
    assert_eq!(session.opponent(), Some(player("b")));
}

#[test]
fn test_invite_player_success() {
    let arena = Arena::with_players(&["a", "b"]);
    let session = arena.sessions.create_session("a", &level()).unwrap();
    assert!(arena.players.invite_player("b", "a"));
    assert!(session.is_invited("b"));
    assert_eq!(
        arena.interface.events(),
        vec![GameEvent::Invite {
            target: "b".into(),
            sender: player("a"),
        }]
    );
}

#[test]
fn test_invite_requires_active_target() {
    let arena = Arena::with_players(&["a"]);
    let session = arena.sessions.create_session("a", &level()).unwrap();
    assert!(!arena.players.invite_player("b", "a"));
    assert!(session.invited_players().is_empty());
    assert_eq!(arena.interface.invites(), 0);
}

#[test]
fn test_invite_requires_active_sender() {
    let arena = Arena::with_players(&["b"]);
    assert!(!arena.players.invite_player("b", "a"));
    assert_eq!(arena.interface.invites(), 0);
}

#[test]
fn test_invite_requires_sender_session() {
    let arena = Arena::with_players(&["a", "b"]);
    assert!(!arena.players.invite_player("b", "a"));
    assert_eq!(arena.interface.invites(), 0);
}

#[test]
fn test_opponent_cannot_invite() {
    let arena = Arena::with_players(&["a", "b", "c"]);
    let session = arena.join("a", "b");
    assert!(!arena.players.invite_player("c", "b"));
    assert!(!session.is_invited("c"));
    assert_eq!(arena.interface.invites(), 1);
}

#[test]
fn test_invite_by_name() {
    let arena = Arena::with_players(&["a", "b"]);
    let session = arena.sessions.create_session("a", &level()).unwrap();
    assert!(arena.players.invite_player_by_name("B", "a"));
    assert!(session.is_invited("b"));
    assert!(!arena.players.invite_player_by_name("Nobody", "a"));
}

#[test]
fn test_accept_invite_returns_opponent_battlefield() {
    let arena = Arena::with_players(&["a", "b"]);
    let session = arena.sessions.create_session("a", &level()).unwrap();
    arena.players.invite_player("b", "a");
    let battlefield = arena.players.accept_invite("b", "a").unwrap();
    assert_eq!(battlefield.owner(), Some(player("b")));
    assert_eq!(session.opponent(), Some(player("b")));
}

#[test]
fn test_accept_invite_by_name() {
    let arena = Arena::with_players(&["a", "b"]);
    arena.sessions.create_session("a", &level()).unwrap();
    arena.players.invite_player("b", "a");
    assert!(arena.players.accept_invite_by_name("b", "Nobody").is_none());
    assert!(arena.players.accept_invite_by_name("b", "A").is_some());
}

#[test]
fn test_accept_without_invite() {
    let arena = Arena::with_players(&["a", "b"]);
    let session = arena.sessions.create_session("a", &level()).unwrap();
    assert!(arena.players.accept_invite("b", "a").is_none());
    assert!(session.opponent().is_none());
    assert_eq!(arena.boards.built().len(), 1);
}

#[test]
fn test_accept_from_inactive_sender() {
    let arena = Arena::with_players(&["a", "b"]);
    arena.sessions.create_session("a", &level()).unwrap();
    arena.players.invite_player("b", "a");
    arena.roster.remove("a");
    assert!(arena.players.accept_invite("b", "a").is_none());
}

#[test]
fn test_accept_without_sender_session() {
    let arena = Arena::with_players(&["a", "b"]);
    assert!(arena.players.accept_invite("b", "a").is_none());
}

#[test]
fn test_accept_while_in_own_session() {
    let arena = Arena::with_players(&["a", "b"]);
    let first = arena.sessions.create_session("a", &level()).unwrap();
    arena.sessions.create_session("b", &level()).unwrap();
    arena.players.invite_player("b", "a");
    assert!(arena.players.accept_invite("b", "a").is_none());
    assert!(first.opponent().is_none());
}

#[test]
fn test_accept_full_session() {
    let arena = Arena::with_players(&["a", "b", "c"]);
    let session = arena.sessions.create_session("a", &level()).unwrap();
    arena.players.invite_player("b", "a");
    arena.players.invite_player("c", "a");
    assert!(arena.players.accept_invite("b", "a").is_some());
    assert!(arena.players.accept_invite("c", "a").is_none());
    assert_eq!(session.opponent(), Some(player("b")));
    assert_eq!(arena.boards.built().len(), 2);
}

#[test]
fn test_accept_twice() {
    let arena = Arena::with_players(&["a", "b"]);
    arena.sessions.create_session("a", &level()).unwrap();
    arena.players.invite_player("b", "a");
    assert!(arena.players.accept_invite("b", "a").is_some());
    assert!(arena.players.accept_invite("b", "a").is_none());
}

#[test]
fn test_accept_requires_active_player() {
    let arena = Arena::with_players(&["a", "b"]);
    let session = arena.sessions.create_session("a", &level()).unwrap();
    arena.players.invite_player("b", "a");
    arena.roster.remove("b");
    assert!(arena.players.accept_invite("b", "a").is_none());
    assert!(session.opponent().is_none());
}

#[test]
fn test_confirm_ready_transitions_once() {
    let arena = Arena::with_players(&["a", "b"]);
    arena.join("a", "b");
    assert!(arena.players.confirm_ready("a"));
    assert!(!arena.players.confirm_ready("a"));
    assert!(arena.boards.get(0).is_ready());
    assert!(!arena.boards.get(1).is_ready());
}

#[test]
fn test_confirm_ready_without_session() {
    let arena = Arena::with_players(&["a"]);
    assert!(!arena.players.confirm_ready("a"));
    assert!(!arena.players.confirm_ready("ghost"));
}

#[test]
fn test_confirm_ready_through_fake_directory() {
    let boards = Arc::new(FakeFactory::default());
    let interface = Arc::new(RecordingInterface::default());
    let factory = DefaultMatchFactory::new(boards.clone(), interface.clone());
    let session: Arc<Match> = factory.create(player("a"), &level());

    let sessions = Arc::new(FakeSessions::default());
    *sessions.session.lock().unwrap() = Some(session);
    let roster = Arc::new(ActivePlayers::new());
    let players = PlayersRegistry::new(roster, sessions, interface);

    assert!(players.confirm_ready("a"));
    assert!(boards.get(0).is_ready());
    assert!(!players.confirm_ready("b"));
}
