//! Dictionary lookup for submitted words.
//!
//! The lookup is informational only: it never changes the score. The session
//! tracks which word is awaiting an answer so that late replies for an older
//! word are dropped.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wiktionary::Wiktionary;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Dictionary service error: {0}")]
    Service(#[from] wiktionary::Error),

    #[error("Dictionary lookup unavailable: {0}")]
    Unavailable(String),
}

/// Something that can say whether a word exists.
pub trait DictionaryLookup: Send + Sync {
    fn check_word<'a>(&'a self, word: &'a str) -> BoxFuture<'a, Result<bool, LookupError>>;
}

impl DictionaryLookup for Wiktionary {
    fn check_word<'a>(&'a self, word: &'a str) -> BoxFuture<'a, Result<bool, LookupError>> {
        Box::pin(async move {
            let lookup = Wiktionary::check_word(self, word).await?;
            Ok(lookup.exists)
        })
    }
}

/// The answer delivered back to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupResult {
    Checked { exists: bool },
    Failed { error: String },
}

impl From<Result<bool, LookupError>> for LookupResult {
    fn from(result: Result<bool, LookupError>) -> Self {
        match result {
            Ok(exists) => LookupResult::Checked { exists },
            Err(err) => LookupResult::Failed {
                error: err.to_string(),
            },
        }
    }
}

/// What the player sees about the last submitted word.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DictionaryStatus {
    #[default]
    Idle,
    Pending {
        word: String,
    },
    Found {
        word: String,
        url: String,
    },
    NotFound {
        word: String,
        url: String,
    },
    Failed {
        word: String,
        error: String,
    },
}

impl DictionaryStatus {
    /// The word awaiting an answer, if any.
    pub fn pending_word(&self) -> Option<&str> {
        match self {
            DictionaryStatus::Pending { word } => Some(word),
            _ => None,
        }
    }

    /// Apply a lookup answer. Returns false if `word` is not the pending word.
    pub fn resolve(&mut self, word: &str, result: LookupResult) -> bool {
        if self.pending_word() != Some(word) {
            return false;
        }
        let word = word.to_string();
        *self = match result {
            LookupResult::Checked { exists: true } => DictionaryStatus::Found {
                url: wiktionary::page_url(&word),
                word,
            },
            LookupResult::Checked { exists: false } => DictionaryStatus::NotFound {
                url: wiktionary::page_url(&word),
                word,
            },
            LookupResult::Failed { error } => DictionaryStatus::Failed { word, error },
        };
        true
    }
}
