use aho_corasick::{AhoCorasick, MatchKind};
use anyhow::{Context, Result};

use crate::documents::{DocumentError, DocumentId, DocumentStore};

/// One reviewed correction: replace `original` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionPair {
    pub original: String,
    pub replacement: String,
}

impl CorrectionPair {
    pub fn new(original: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            replacement: replacement.into(),
        }
    }
}

/// What happened to one rewritten document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteReport {
    pub document: DocumentId,
    pub occurrences: usize,
}

/// Outcome of a rewrite pass over a document batch.
#[derive(Debug, Default)]
pub struct RewriteSummary {
    /// Documents that contained at least one occurrence and were written
    /// back. Untouched documents are left out.
    pub rewritten: Vec<RewriteReport>,
    pub failed_documents: Vec<DocumentError>,
}

impl RewriteSummary {
    pub fn total_occurrences(&self) -> usize {
        self.rewritten.iter().map(|report| report.occurrences).sum()
    }

    pub fn files_changed(&self) -> usize {
        self.rewritten.len()
    }
}

/// Applies a reviewed set of corrections to whole documents.
///
/// All pairs are compiled into one automaton and every document gets a
/// single replacement pass, so an already-applied replacement is never
/// re-matched. Runs strictly after checking, on one thread.
pub struct FileRewriter {
    automaton: AhoCorasick,
    replacements: Vec<String>,
}

impl FileRewriter {
    pub fn new(pairs: &[CorrectionPair]) -> Result<Self> {
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(pairs.iter().map(|pair| pair.original.as_str()))
            .context("failed to build replacement automaton")?;
        let replacements = pairs.iter().map(|pair| pair.replacement.clone()).collect();

        Ok(Self {
            automaton,
            replacements,
        })
    }

    /// Rewrite each document in turn. A document that fails to read or
    /// write lands in the failure list; the rest of the batch continues.
    pub fn apply(&self, documents: &[DocumentId], store: &dyn DocumentStore) -> RewriteSummary {
        let mut summary = RewriteSummary::default();

        for document in documents {
            match self.rewrite_document(document, store) {
                Ok(Some(report)) => summary.rewritten.push(report),
                Ok(None) => {}
                Err(error) => summary.failed_documents.push(error),
            }
        }

        summary
    }

    /// Replace every literal occurrence in one document. Returns `None`
    /// when nothing matched; the document is then not written at all,
    /// which makes a repeated apply a no-op.
    fn rewrite_document(
        &self,
        document: &DocumentId,
        store: &dyn DocumentStore,
    ) -> Result<Option<RewriteReport>, DocumentError> {
        let text = store.read_all(document)?;

        let occurrences = self.automaton.find_iter(&text).count();
        if occurrences == 0 {
            return Ok(None);
        }

        let replaced = self.automaton.replace_all(&text, &self.replacements);
        store.write_all(document, &replaced)?;

        Ok(Some(RewriteReport {
            document: document.clone(),
            occurrences,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::FsDocumentStore;
    use std::fs;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, text: &str) -> DocumentId {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_replaces_every_literal_occurrence() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir, "a.txt", "teh quick teh fox teh");

        let rewriter = FileRewriter::new(&[CorrectionPair::new("teh", "the")]).unwrap();
        let summary = rewriter.apply(&[doc.clone()], &FsDocumentStore);

        assert_eq!(fs::read_to_string(&doc).unwrap(), "the quick the fox the");
        assert_eq!(summary.files_changed(), 1);
        assert_eq!(summary.total_occurrences(), 3);
    }

    #[test]
    fn test_unselected_words_stay_untouched() {
        let dir = TempDir::new().unwrap();
        let first = write_doc(&dir, "a.txt", "teh quick fox");
        let second = write_doc(&dir, "b.txt", "brown fox jumps");

        let rewriter = FileRewriter::new(&[CorrectionPair::new("teh", "the")]).unwrap();
        let summary = rewriter.apply(&[first.clone(), second.clone()], &FsDocumentStore);

        assert_eq!(fs::read_to_string(&first).unwrap(), "the quick fox");
        assert_eq!(fs::read_to_string(&second).unwrap(), "brown fox jumps");
        // The second document had no matches and was not rewritten.
        assert_eq!(summary.files_changed(), 1);
        assert_eq!(summary.rewritten[0].document, first);
    }

    #[test]
    fn test_applying_twice_equals_applying_once() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir, "a.txt", "teh wrld is teh stage");

        let pairs = [
            CorrectionPair::new("teh", "the"),
            CorrectionPair::new("wrld", "world"),
        ];
        let rewriter = FileRewriter::new(&pairs).unwrap();

        let first = rewriter.apply(&[doc.clone()], &FsDocumentStore);
        let after_once = fs::read_to_string(&doc).unwrap();
        let second = rewriter.apply(&[doc.clone()], &FsDocumentStore);
        let after_twice = fs::read_to_string(&doc).unwrap();

        assert_eq!(after_once, "the world is the stage");
        assert_eq!(after_once, after_twice);
        assert_eq!(first.total_occurrences(), 3);
        assert_eq!(second.files_changed(), 0);
        assert_eq!(second.total_occurrences(), 0);
    }

    #[test]
    fn test_longest_pattern_wins_on_overlap() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir, "a.txt", "tehre we go");

        let pairs = [
            CorrectionPair::new("teh", "the"),
            CorrectionPair::new("tehre", "there"),
        ];
        let rewriter = FileRewriter::new(&pairs).unwrap();
        rewriter.apply(&[doc.clone()], &FsDocumentStore);

        assert_eq!(fs::read_to_string(&doc).unwrap(), "there we go");
    }

    #[test]
    fn test_unreadable_document_fails_alone() {
        let dir = TempDir::new().unwrap();
        let good = write_doc(&dir, "good.txt", "teh fox");
        let missing = dir.path().join("missing.txt");

        let rewriter = FileRewriter::new(&[CorrectionPair::new("teh", "the")]).unwrap();
        let summary = rewriter.apply(&[missing.clone(), good.clone()], &FsDocumentStore);

        assert_eq!(summary.failed_documents.len(), 1);
        assert_eq!(summary.failed_documents[0].path(), missing.as_path());
        assert_eq!(fs::read_to_string(&good).unwrap(), "the fox");
    }

    #[test]
    fn test_empty_pair_set_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir, "a.txt", "left as is");

        let rewriter = FileRewriter::new(&[]).unwrap();
        let summary = rewriter.apply(&[doc.clone()], &FsDocumentStore);

        assert_eq!(fs::read_to_string(&doc).unwrap(), "left as is");
        assert_eq!(summary.files_changed(), 0);
        assert!(summary.failed_documents.is_empty());
    }
}
