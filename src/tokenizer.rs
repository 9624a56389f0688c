use crate::documents::DocumentId;
use crate::WordTask;

/// Split one document's text into word tasks.
///
/// Words are whatever sits between spaces, tabs, carriage returns and
/// newlines; empty tokens are discarded. Order and duplicates are preserved,
/// and no case or punctuation normalization happens, so `"fox,"` is checked
/// exactly as it appears in the document.
pub fn tokenize(document: &DocumentId, text: &str) -> Vec<WordTask> {
    text.split([' ', '\t', '\r', '\n'])
        .filter(|token| !token.is_empty())
        .map(|token| WordTask {
            document: document.clone(),
            word: token.to_string(),
        })
        .collect()
}
