//! QA tests for the headless driver.
//!
//! Time is paused, so the 1 Hz ticker runs instantly and deterministically.
//! The live dictionary test is ignored by default:
//!
//! Run with: `cargo test -p chiffres-core qa_headless -- --ignored --nocapture`

use chiffres_core::dictionary::DictionaryStatus;
use chiffres_core::headless::{HeadlessGame, Update};
use chiffres_core::rules::{Effect, Intent, Phase};
use chiffres_core::session::{GameSession, SessionConfig};
use chiffres_core::testing::*;
use chiffres_core::timer::TimerState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn setup() {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn game(letters: &str) -> HeadlessGame {
    let draw = ScriptedDraw::new()
        .with_letters(letters.chars())
        .with_numbers([5, 3, 8, 25, 50, 100])
        .with_target(523);
    HeadlessGame::with_session(GameSession::with_draw(SessionConfig::new(), Box::new(draw)))
}

async fn draw_ten(game: &mut HeadlessGame) {
    for _ in 0..10 {
        game.send(Intent::DrawLetter { vowel: false }).await.unwrap();
    }
}

// =============================================================================
// TIMERS
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_countdown_then_running() {
    setup();
    let mut game = game("MAISONTRES");
    draw_ten(&mut game).await;
    assert!(game.snapshot().timer.is_countdown());

    let resolutions = game.run_for(Duration::from_millis(2500)).await;
    assert!(resolutions
        .iter()
        .flat_map(|r| &r.effects)
        .any(|e| *e == Effect::ClockStarted { total: 45 }));
    assert_eq!(
        game.snapshot().timer,
        TimerState::Running {
            remaining: 45,
            total: 45
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_letters_clock_expires() {
    setup();
    let mut game = game("MAISONTRES");
    draw_ten(&mut game).await;

    game.run_for(Duration::from_millis(47_500)).await;
    let snapshot = game.snapshot();
    assert!(snapshot.time_expired);
    assert!(game.session().word_round().unwrap().is_locked());
}

#[tokio::test(start_paused = true)]
async fn test_reset_while_running_never_expires() {
    setup();
    let mut game = game("MAISONTRES");
    draw_ten(&mut game).await;
    game.run_for(Duration::from_millis(5500)).await;
    assert!(game.snapshot().timer.is_running());

    game.send(Intent::ResetGame {
        phase: Phase::Numbers,
    })
    .await
    .unwrap();
    game.run_for(Duration::from_secs(120)).await;

    let snapshot = game.snapshot();
    assert!(!snapshot.time_expired);
    assert_eq!(snapshot.timer, TimerState::Idle);
    assert_eq!(snapshot.phase, Phase::Numbers);
}

#[tokio::test(start_paused = true)]
async fn test_target_expiry_scores_automatically() {
    setup();
    let mut game = game("MAISONTRES");
    game.send(Intent::ResetGame {
        phase: Phase::Numbers,
    })
    .await
    .unwrap();
    game.send(Intent::GenerateTarget).await.unwrap();

    game.run_for(Duration::from_millis(62_500)).await;
    let snapshot = game.snapshot();
    assert!(snapshot.time_expired);
    assert_eq!(snapshot.score, 1);
    let summary = game.session().arithmetic_round().unwrap().summary().unwrap();
    assert_eq!(summary.final_result, 0);
}

// =============================================================================
// DICTIONARY
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_lookup_resolves_through_driver() {
    setup();
    let dictionary = MockDictionary::new(["maison"]);
    let mut game = game("MAISONTRES").with_dictionary(Arc::new(dictionary.clone()));
    draw_ten(&mut game).await;
    game.run_for(Duration::from_millis(2500)).await;

    for index in 0..6 {
        game.send(Intent::AppendToWord { tile_index: index })
            .await
            .unwrap();
    }
    game.send(Intent::SubmitWord).await.unwrap();
    assert_eq!(
        game.snapshot().dictionary.pending_word(),
        Some("MAISON")
    );

    let resolution = game.step().await.unwrap();
    assert!(matches!(
        resolution.snapshot.dictionary,
        DictionaryStatus::Found { .. }
    ));
    assert_eq!(dictionary.calls(), vec!["MAISON"]);
    assert_eq!(game.snapshot().score, 6);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_failure_is_displayed() {
    setup();
    let mut game = game("MAISONTRES").with_dictionary(Arc::new(MockDictionary::failing()));
    draw_ten(&mut game).await;
    game.run_for(Duration::from_millis(2500)).await;
    game.send(Intent::AppendToWord { tile_index: 3 }).await.unwrap();
    game.send(Intent::SubmitWord).await.unwrap();

    game.run_for(Duration::from_millis(100)).await;
    assert!(matches!(
        game.snapshot().dictionary,
        DictionaryStatus::Failed { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_missing_dictionary_reports_failure() {
    setup();
    let mut game = game("MAISONTRES");
    draw_ten(&mut game).await;
    game.run_for(Duration::from_millis(2500)).await;
    game.send(Intent::AppendToWord { tile_index: 0 }).await.unwrap();
    game.send(Intent::SubmitWord).await.unwrap();

    game.step().await.unwrap();
    match game.snapshot().dictionary {
        DictionaryStatus::Failed { error, .. } => assert!(error.contains("No dictionary")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

// =============================================================================
// EVENT LOOP
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_run_loop_reports_updates() {
    setup();
    let (intent_tx, intent_rx) = mpsc::channel(16);
    let (update_tx, mut update_rx) = mpsc::channel(64);
    let handle = tokio::spawn(game("MAISONTRES").run(intent_rx, update_tx));

    intent_tx
        .send(Intent::AdvancePhase { to: Phase::Target })
        .await
        .unwrap();
    match update_rx.recv().await.unwrap() {
        Update::Rejected { error, snapshot, .. } => {
            assert!(error.to_string().contains("letters"));
            assert_eq!(snapshot.phase, Phase::Letters);
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    intent_tx.send(Intent::DrawLetter { vowel: true }).await.unwrap();
    match update_rx.recv().await.unwrap() {
        Update::Applied(resolution) => {
            assert_eq!(
                resolution.effects,
                vec![Effect::LetterDrawn {
                    index: 0,
                    symbol: 'M'
                }]
            );
        }
        other => panic!("expected applied update, got {other:?}"),
    }

    drop(intent_tx);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_transcript_records_rejections() {
    let mut game = game("MAISONTRES");
    game.send(Intent::DrawLetter { vowel: true }).await.unwrap();
    let _ = game.send(Intent::CommitStep).await;

    let transcript = game.transcript();
    assert_eq!(transcript.len(), 2);
    assert!(transcript[0].rejection.is_none());
    assert!(transcript[1].rejection.is_some());
    assert_eq!(transcript[1].turn, 2);
}

// =============================================================================
// LIVE DICTIONARY
// =============================================================================

#[tokio::test]
#[ignore]
async fn test_live_wiktionary_lookup() {
    setup();
    let mut game = game("MAISONTRES").with_wiktionary().unwrap();
    draw_ten(&mut game).await;
    while game.snapshot().timer.is_countdown() {
        game.step().await;
    }
    for index in 0..6 {
        game.send(Intent::AppendToWord { tile_index: index })
            .await
            .unwrap();
    }
    game.send(Intent::SubmitWord).await.unwrap();

    loop {
        game.step().await;
        if game.snapshot().dictionary.pending_word().is_none() {
            break;
        }
    }
    println!("Dictionary status: {:?}", game.snapshot().dictionary);
    assert!(matches!(
        game.snapshot().dictionary,
        DictionaryStatus::Found { .. }
    ));
}
