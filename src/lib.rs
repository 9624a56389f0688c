pub mod cli;
pub mod config;
pub mod documents;
pub mod oracle;
pub mod pipeline;
pub mod rewrite;
pub mod tokenizer;

pub use config::Config;
pub use pipeline::SpellChecker;

use documents::DocumentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTask {
    pub document: DocumentId,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct { word: String },
    Misspelled { word: String, suggestion: String },
    Unresolved { word: String, error: String },
}

impl Verdict {
    /// The word this verdict is about.
    pub fn word(&self) -> &str {
        match self {
            Verdict::Correct { word }
            | Verdict::Misspelled { word, .. }
            | Verdict::Unresolved { word, .. } => word,
        }
    }

    /// The spelling the oracle settled on, if it answered at all.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Verdict::Correct { word } => Some(word),
            Verdict::Misspelled { suggestion, .. } => Some(suggestion),
            Verdict::Unresolved { .. } => None,
        }
    }

    /// Whether the oracle confirmed the spelling as-is.
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct { .. })
    }
}
