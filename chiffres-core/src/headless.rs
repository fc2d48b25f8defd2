//! Headless game driver for programmatic use.
//!
//! `GameSession` is synchronous and never touches the clock or the network.
//! `HeadlessGame` owns those side effects: a 1 Hz ticker task per armed
//! timer and a spawned task per dictionary lookup. Both report back through
//! one channel, so every mutation is applied in order on the caller's task.
//!
//! # Example
//!
//! ```ignore
//! use chiffres_core::headless::HeadlessGame;
//! use chiffres_core::{Intent, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut game = HeadlessGame::new(SessionConfig::new()).with_wiktionary()?;
//!
//!     for _ in 0..10 {
//!         game.send(Intent::DrawLetter { vowel: false }).await?;
//!     }
//!     game.run_for(std::time::Duration::from_secs(3)).await;
//!     println!("{:?}", game.snapshot().timer);
//!
//!     Ok(())
//! }
//! ```

use crate::dictionary::{DictionaryLookup, LookupError, LookupResult};
use crate::rules::{Effect, Intent};
use crate::session::{GameSession, IntentError, Resolution, SessionConfig, Snapshot};
use crate::timer::TimerToken;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};
use wiktionary::Wiktionary;

/// What the driver reports after each intent.
#[derive(Debug, Clone)]
pub enum Update {
    Applied(Resolution),
    Rejected {
        intent: Intent,
        error: IntentError,
        snapshot: Snapshot,
    },
}

/// An entry in the game transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub intent: Intent,
    /// `None` if the intent was applied.
    pub rejection: Option<String>,
    pub turn: usize,
}

/// A game session wired to real time and a dictionary service.
pub struct HeadlessGame {
    session: GameSession,
    dictionary: Option<Arc<dyn DictionaryLookup>>,
    events_tx: mpsc::UnboundedSender<Intent>,
    events_rx: mpsc::UnboundedReceiver<Intent>,
    ticker: Option<JoinHandle<()>>,
    transcript: Vec<TranscriptEntry>,
}

impl HeadlessGame {
    /// Create a driver with no dictionary service; lookups report as failed.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_session(GameSession::new(config))
    }

    pub fn with_session(session: GameSession) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session,
            dictionary: None,
            events_tx,
            events_rx,
            ticker: None,
            transcript: Vec::new(),
        }
    }

    pub fn with_dictionary(mut self, dictionary: Arc<dyn DictionaryLookup>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Use the French Wiktionary, honoring `WIKTIONARY_API_URL`.
    pub fn with_wiktionary(self) -> Result<Self, LookupError> {
        let client = Wiktionary::from_env()?;
        Ok(self.with_dictionary(Arc::new(client)))
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Apply a player intent and start whatever side effects it asks for.
    ///
    /// Nothing here is awaited. The method is async because the ticker and
    /// lookup tasks it starts are spawned onto the current Tokio runtime, so
    /// it must run inside one.
    pub async fn send(&mut self, intent: Intent) -> Result<Resolution, IntentError> {
        let result = self.session.dispatch(intent.clone());
        self.transcript.push(TranscriptEntry {
            intent,
            rejection: result.as_ref().err().map(|e| e.to_string()),
            turn: self.transcript.len() + 1,
        });
        if let Ok(resolution) = &result {
            self.handle_effects(&resolution.effects);
        }
        result
    }

    /// Wait for the next tick or dictionary answer and apply it.
    pub async fn step(&mut self) -> Option<Resolution> {
        let event = self.events_rx.recv().await?;
        self.apply_event(event)
    }

    /// Apply ticks and dictionary answers until `duration` has elapsed.
    pub async fn run_for(&mut self, duration: Duration) -> Vec<Resolution> {
        let deadline = Instant::now() + duration;
        let mut resolutions = Vec::new();
        loop {
            tokio::select! {
                biased;
                Some(event) = self.events_rx.recv() => {
                    resolutions.extend(self.apply_event(event));
                }
                _ = tokio::time::sleep_until(deadline) => break,
            }
        }
        resolutions
    }

    /// Serve a presentation layer until its intent channel closes.
    ///
    /// Player intents and internal events are interleaved on this task, and
    /// an [`Update`] is sent after each one that changed something.
    pub async fn run(mut self, mut intents: mpsc::Receiver<Intent>, updates: mpsc::Sender<Update>) {
        loop {
            let update = tokio::select! {
                intent = intents.recv() => {
                    let Some(intent) = intent else { break };
                    match self.send(intent.clone()).await {
                        Ok(resolution) => Update::Applied(resolution),
                        Err(error) => Update::Rejected {
                            intent,
                            error,
                            snapshot: self.snapshot(),
                        },
                    }
                }
                Some(event) = self.events_rx.recv() => {
                    match self.apply_event(event) {
                        Some(resolution) => Update::Applied(resolution),
                        None => continue,
                    }
                }
            };

            if updates.send(update).await.is_err() {
                debug!("Update receiver dropped");
                break;
            }
        }
        self.stop_ticker();
    }

    fn apply_event(&mut self, event: Intent) -> Option<Resolution> {
        match self.session.dispatch(event) {
            Ok(resolution) if resolution.effects.is_empty() => None,
            Ok(resolution) => {
                self.handle_effects(&resolution.effects);
                Some(resolution)
            }
            Err(err) => {
                warn!(error = %err, "Driver event rejected");
                None
            }
        }
    }

    fn handle_effects(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::TimerArmed { token, .. } => self.start_ticker(*token),
                Effect::TimerStopped | Effect::TimeExpired { .. } => self.stop_ticker(),
                Effect::LookupRequested { word } => self.spawn_lookup(word.clone()),
                _ => {}
            }
        }
    }

    fn start_ticker(&mut self, token: TimerToken) {
        self.stop_ticker();
        let tx = self.events_tx.clone();
        let period = Duration::from_secs(1);
        self.ticker = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(Intent::Tick { token }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn spawn_lookup(&self, word: String) {
        let tx = self.events_tx.clone();
        let Some(dictionary) = self.dictionary.clone() else {
            let result = LookupResult::Failed {
                error: "No dictionary service configured".to_string(),
            };
            let _ = tx.send(Intent::DictionaryResultArrived { word, result });
            return;
        };

        tokio::spawn(async move {
            let result = dictionary.check_word(&word).await;
            if let Err(err) = &result {
                warn!(word = %word, error = %err, "Dictionary lookup failed");
            }
            let _ = tx.send(Intent::DictionaryResultArrived {
                word,
                result: result.into(),
            });
        });
    }
}

impl Drop for HeadlessGame {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
