//! Tests for complete matches: slot handling, announcements and recording.

mod common;

use common::{CountingGate, FixedMoves, Pick, Report, Script, ScriptedChannel, contestant, secs};
use std::sync::Arc;
use strictly_roshambo::{
    Contestant, DeliveryError, GameMode, HeadToHeadLedger, MatchConfig, MatchGate, MatchOutcome,
    MatchRegistry, MatchRunner, Move, Participant, RecordKeeper, ReplyRouter, Side, SolicitError,
};

fn config() -> MatchConfig {
    MatchConfig::from_toml("timeout_secs = 60\npacing_ms = 1000").unwrap()
}

fn runner_with(
    moves: Arc<FixedMoves>,
    channel: &Arc<ScriptedChannel>,
    gate: Arc<dyn MatchGate>,
) -> MatchRunner {
    MatchRunner::with_move_source(
        &config(),
        moves,
        channel.clone(),
        gate,
        Arc::new(HeadToHeadLedger::new()),
    )
}

#[tokio::test(start_paused = true)]
async fn test_full_series_over_scripted_channel() {
    let router = ReplyRouter::new();
    let channel = ScriptedChannel::new(router.clone());
    channel.script("alice", [Script::After(secs(2), "r"); 3]);
    channel.script("bob", [Script::After(secs(4), "s"); 3]);
    let registry = MatchRegistry::new();
    let ledger = Arc::new(HeadToHeadLedger::new());
    let runner = MatchRunner::new(
        &config(),
        channel.clone(),
        channel.clone(),
        router,
        Arc::new(registry.clone()),
        ledger.clone(),
    );
    let (alice, bob) = (contestant("alice", "Alice"), contestant("bob", "Bob"));

    let outcome = runner.run(GameMode::BestOfThree, &alice, &bob).await.unwrap();

    assert_eq!(outcome, MatchOutcome::Won(Side::Challenger));
    assert_eq!(ledger.wins(GameMode::BestOfThree, &alice, &bob), (1, 0));
    assert!(!registry.is_active(alice.participant()));
    assert!(!registry.is_active(bob.participant()));
    assert_eq!(channel.prompts_to("alice").len(), 3);
    assert_eq!(channel.acks.lock().unwrap().len(), 6);

    let reports = channel.reports();
    assert_eq!(
        reports[0],
        Report::Notice("#1 Alice (50%) versus #1 Bob (50%)!".to_string())
    );
    assert!(matches!(reports.last(), Some(Report::Outcome(name, _)) if name == "Alice"));
}

#[tokio::test(start_paused = true)]
async fn test_single_round_records_decisive_result() {
    let moves = FixedMoves::new();
    moves.queue("alice", [Pick::Play(Move::Lizard)]);
    moves.queue("bob", [Pick::Play(Move::Spock)]);
    let channel = ScriptedChannel::new(ReplyRouter::new());
    let ledger = Arc::new(HeadToHeadLedger::new());
    let runner = MatchRunner::with_move_source(
        &config(),
        moves,
        channel.clone(),
        CountingGate::new(),
        ledger.clone(),
    );
    let (alice, bob) = (contestant("alice", "Alice"), contestant("bob", "Bob"));

    let outcome = runner.run(GameMode::LizardSpock, &alice, &bob).await.unwrap();
    assert_eq!(outcome, MatchOutcome::Won(Side::Challenger));

    let reports = channel.reports();
    let Some(Report::Summary(lines)) = reports.last() else {
        panic!("expected a round summary");
    };
    assert_eq!(lines[0], "Alice (lizard) poisoned Bob (spock)!");
    assert!(lines.contains(&"Alice: 1 wins".to_string()));

    let odds = ledger.odds(GameMode::LizardSpock, &alice, &bob);
    assert_eq!(odds.challenger_percent(), 67);
}

#[tokio::test(start_paused = true)]
async fn test_single_round_draw_is_terminal() {
    let moves = FixedMoves::new();
    moves.queue("alice", [Pick::Play(Move::Rock)]);
    moves.queue("bob", [Pick::Play(Move::Rock)]);
    let channel = ScriptedChannel::new(ReplyRouter::new());
    let gate = CountingGate::new();
    let runner = runner_with(moves.clone(), &channel, gate.clone());
    let (alice, bob) = (contestant("alice", "Alice"), contestant("bob", "Bob"));

    let outcome = runner.run(GameMode::Classic, &alice, &bob).await.unwrap();
    assert_eq!(outcome, MatchOutcome::Draw);
    assert_eq!(moves.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(gate.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slot_released_once_on_every_terminal_path() {
    let (alice, bob) = (contestant("alice", "Alice"), contestant("bob", "Bob"));
    let paths: Vec<(GameMode, Vec<Pick>, Vec<Pick>, Result<MatchOutcome, ()>)> = vec![
        (
            GameMode::BestOfThree,
            [Move::Paper; 3].map(Pick::Play).to_vec(),
            [Move::Rock; 3].map(Pick::Play).to_vec(),
            Ok(MatchOutcome::Won(Side::Challenger)),
        ),
        (
            GameMode::BestOfThree,
            vec![Pick::Play(Move::Paper), Pick::Fail(SolicitError::Timeout)],
            vec![Pick::Play(Move::Rock), Pick::Play(Move::Rock)],
            Ok(MatchOutcome::Abandoned),
        ),
        (
            GameMode::Classic,
            vec![Pick::Fail(SolicitError::Delivery(DeliveryError::new("gone")))],
            vec![Pick::Play(Move::Rock)],
            Ok(MatchOutcome::Abandoned),
        ),
        (
            GameMode::Classic,
            vec![Pick::Play(Move::Spock)],
            vec![Pick::Play(Move::Rock)],
            Err(()),
        ),
    ];

    for (mode, left, right, expected) in paths {
        let moves = FixedMoves::new();
        moves.queue("alice", left);
        moves.queue("bob", right);
        let channel = ScriptedChannel::new(ReplyRouter::new());
        let gate = CountingGate::new();
        let runner = runner_with(moves, &channel, gate.clone());

        let outcome = runner.run(mode, &alice, &bob).await.map_err(|_| ());
        assert_eq!(outcome, expected);
        assert_eq!(gate.acquired(), 1);
        assert_eq!(gate.released(), 1, "{expected:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_slot_released_when_match_panics() {
    let moves = FixedMoves::new();
    moves.queue("alice", [Pick::Panic]);
    moves.queue("bob", [Pick::Play(Move::Rock)]);
    let channel = ScriptedChannel::new(ReplyRouter::new());
    let gate = CountingGate::new();
    let runner = runner_with(moves, &channel, gate.clone());
    let (alice, bob) = (contestant("alice", "Alice"), contestant("bob", "Bob"));

    let joined = tokio::spawn(async move { runner.run(GameMode::Classic, &alice, &bob).await }).await;
    assert!(joined.unwrap_err().is_panic());
    assert_eq!(gate.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_busy_participant_is_rejected() {
    let registry = MatchRegistry::new();
    let (alice, bob, carol) = (
        contestant("alice", "Alice"),
        contestant("bob", "Bob"),
        contestant("carol", "Carol"),
    );
    assert!(registry.acquire(GameMode::BestOfThree, alice.participant(), bob.participant()));

    let moves = FixedMoves::new();
    let channel = ScriptedChannel::new(ReplyRouter::new());
    let runner = runner_with(moves.clone(), &channel, Arc::new(registry.clone()));

    let outcome = runner.run(GameMode::BestOfThree, &carol, &bob).await.unwrap();
    assert_eq!(outcome, MatchOutcome::Rejected);
    assert_eq!(
        channel.reports(),
        vec![Report::Notice(
            "Unable to start: Both users can only be in one game at a time".to_string()
        )]
    );
    assert_eq!(moves.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    // The existing match keeps its slot.
    assert!(registry.is_active(bob.participant()));
    assert!(!registry.is_active(carol.participant()));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_pairings_are_rejected_without_a_slot() {
    let gate = CountingGate::new();
    let channel = ScriptedChannel::new(ReplyRouter::new());
    let runner = runner_with(FixedMoves::new(), &channel, gate.clone());
    let alice = contestant("alice", "Alice");
    let bot = contestant("ai", "Roshambot");

    assert_eq!(
        runner.run(GameMode::Classic, &alice, &alice).await.unwrap(),
        MatchOutcome::Rejected
    );
    assert_eq!(
        runner.run(GameMode::Classic, &bot, &alice).await.unwrap(),
        MatchOutcome::Rejected
    );
    assert_eq!(gate.acquired(), 0);
    assert_eq!(gate.released(), 0);
    assert_eq!(
        channel.reports()[0],
        Report::Notice("You cannot challenge yourself".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_automatic_opponent_plays_a_series() {
    let router = ReplyRouter::new();
    let channel = ScriptedChannel::new(router.clone());
    // Enough replies for any run of draws the seeded picker produces.
    channel.script("alice", [Script::After(secs(1), "r"); 32]);
    let runner = MatchRunner::new(
        &config().with_seed(11),
        channel.clone(),
        channel.clone(),
        router,
        Arc::new(MatchRegistry::new()),
        Arc::new(HeadToHeadLedger::new()),
    );
    let alice = contestant("alice", "Alice");
    let bot = Contestant::new(Participant::Automatic, "Roshambot".to_string());

    let outcome = runner.run(GameMode::BestOfThree, &alice, &bot).await.unwrap();
    assert!(matches!(outcome, MatchOutcome::Won(_)));
    assert!(channel.prompts_to("ai").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_announcement_shows_rank_and_odds() {
    let moves = FixedMoves::new();
    moves.queue("alice", [Pick::Play(Move::Rock), Pick::Play(Move::Paper)]);
    moves.queue("bob", [Pick::Play(Move::Scissors), Pick::Play(Move::Paper)]);
    let channel = ScriptedChannel::new(ReplyRouter::new());
    let runner = runner_with(moves, &channel, Arc::new(MatchRegistry::new()));
    let (alice, bob) = (contestant("alice", "Alice"), contestant("bob", "Bob"));

    runner.run(GameMode::Classic, &alice, &bob).await.unwrap();
    runner.run(GameMode::Classic, &bob, &alice).await.unwrap();

    let notices: Vec<_> = channel
        .reports()
        .into_iter()
        .filter_map(|report| match report {
            Report::Notice(text) => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(
        notices,
        vec![
            "#1 Alice (50%) versus #1 Bob (50%)!".to_string(),
            "#2 Bob (33%) versus #1 Alice (67%)!".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_second_match_for_busy_human_is_rejected_in_any_mode() {
    let router = ReplyRouter::new();
    let channel = ScriptedChannel::new(router.clone());
    channel.script("alice", [Script::After(secs(5), "r")]);
    channel.script("bob", [Script::After(secs(5), "s")]);
    channel.script("carol", [Script::After(secs(5), "p")]);
    let registry = MatchRegistry::new();
    let runner = MatchRunner::new(
        &config(),
        channel.clone(),
        channel.clone(),
        router,
        Arc::new(registry.clone()),
        Arc::new(HeadToHeadLedger::new()),
    );
    let (alice, bob, carol) = (
        contestant("alice", "Alice"),
        contestant("bob", "Bob"),
        contestant("carol", "Carol"),
    );

    let start = tokio::time::Instant::now();
    let first = runner.run(GameMode::Classic, &alice, &bob);
    let second = async {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        runner.run(GameMode::LizardSpock, &alice, &carol).await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap(), MatchOutcome::Won(Side::Challenger));
    assert_eq!(second.unwrap(), MatchOutcome::Rejected);
    // The first match ran to its replies, not to an early abandonment.
    assert!(start.elapsed() >= secs(5));
    assert_eq!(channel.prompts_to("alice").len(), 1);
    assert!(channel.prompts_to("carol").is_empty());
    assert!(
        channel
            .reports()
            .contains(&Report::Notice(
                "Unable to start: Both users can only be in one game at a time".to_string()
            ))
    );
    assert!(!channel.reports().iter().any(|report| matches!(
        report,
        Report::Notice(text) if text.contains("chickened out")
    )));
    assert!(!registry.is_active(alice.participant()));
}
