use crate::error::{EmbedbenchError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One corpus document: optional title plus required body text.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusDoc {
    #[serde(default)]
    pub title: String,
    pub text: String,
}

impl CorpusDoc {
    /// Text submitted to the document encoder: title and body joined by a
    /// single space, trimmed of leading/trailing whitespace. An empty title
    /// therefore contributes nothing (no leading space survives the trim).
    pub fn passage(&self) -> String {
        format!("{} {}", self.title, self.text).trim().to_string()
    }
}

/// One split of a retrieval task: corpus, queries, and relevance judgments.
///
/// Ordered maps keep encoding order deterministic across runs.
#[derive(Debug, Clone)]
pub struct RetrievalSplit {
    pub corpus: BTreeMap<String, CorpusDoc>,
    pub queries: BTreeMap<String, String>,
    /// query id -> doc id -> graded relevance (> 0 means relevant)
    pub qrels: BTreeMap<String, BTreeMap<String, i32>>,
}

impl RetrievalSplit {
    /// Load `corpus.json`, `queries.json` and `qrels.json` from
    /// `<task_dir>/<split>/`.
    pub fn load(task_dir: &Path, split: &str) -> Result<Self> {
        let dir = task_dir.join(split);
        if !dir.is_dir() {
            return Err(EmbedbenchError::Dataset(format!(
                "Split directory not found: {}",
                dir.display()
            )));
        }

        let corpus: BTreeMap<String, CorpusDoc> = super::read_json_file(&dir.join("corpus.json"))?;
        let queries: BTreeMap<String, String> = super::read_json_file(&dir.join("queries.json"))?;
        let qrels: BTreeMap<String, BTreeMap<String, i32>> =
            super::read_json_file(&dir.join("qrels.json"))?;

        let loaded = Self {
            corpus,
            queries,
            qrels,
        };
        loaded.validate(&dir)?;
        Ok(loaded)
    }

    fn validate(&self, dir: &Path) -> Result<()> {
        if self.corpus.is_empty() {
            return Err(EmbedbenchError::Dataset(format!(
                "Empty corpus in {}",
                dir.display()
            )));
        }
        if self.queries.is_empty() {
            return Err(EmbedbenchError::Dataset(format!(
                "No queries in {}",
                dir.display()
            )));
        }
        if self.qrels.is_empty() {
            return Err(EmbedbenchError::Dataset(format!(
                "No relevance judgments in {}",
                dir.display()
            )));
        }
        for qid in self.qrels.keys() {
            if !self.queries.contains_key(qid) {
                return Err(EmbedbenchError::Dataset(format!(
                    "qrels references unknown query id '{}' in {}",
                    qid,
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_split(dir: &Path, corpus: &str, queries: &str, qrels: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("corpus.json"), corpus).unwrap();
        fs::write(dir.join("queries.json"), queries).unwrap();
        fs::write(dir.join("qrels.json"), qrels).unwrap();
    }

    #[test]
    fn test_passage_title_and_text() {
        let doc = CorpusDoc {
            title: "Rust".to_string(),
            text: "A systems language.".to_string(),
        };
        assert_eq!(doc.passage(), "Rust A systems language.");
    }

    #[test]
    fn test_passage_empty_title() {
        let doc = CorpusDoc {
            title: String::new(),
            text: "Body only.".to_string(),
        };
        // No leading space, no double space
        assert_eq!(doc.passage(), "Body only.");
    }

    #[test]
    fn test_passage_trims_outer_whitespace_only() {
        let doc = CorpusDoc {
            title: "Title".to_string(),
            text: " padded ".to_string(),
        };
        // Inner whitespace is preserved as-is, outer whitespace trimmed
        assert_eq!(doc.passage(), "Title  padded");
    }

    #[test]
    fn test_load_success() {
        let tmp = TempDir::new().unwrap();
        write_split(
            &tmp.path().join("test"),
            r#"{"d1": {"title": "T", "text": "body"}, "d2": {"text": "no title"}}"#,
            r#"{"q1": "first query"}"#,
            r#"{"q1": {"d1": 1}}"#,
        );
        let split = RetrievalSplit::load(tmp.path(), "test").unwrap();
        assert_eq!(split.corpus.len(), 2);
        assert_eq!(split.corpus["d2"].title, "");
        assert_eq!(split.queries["q1"], "first query");
        assert_eq!(split.qrels["q1"]["d1"], 1);
    }

    #[test]
    fn test_load_missing_split_dir() {
        let tmp = TempDir::new().unwrap();
        let err = RetrievalSplit::load(tmp.path(), "test").unwrap_err();
        assert!(err.to_string().contains("Split directory not found"));
    }

    #[test]
    fn test_load_malformed_corpus() {
        let tmp = TempDir::new().unwrap();
        write_split(
            &tmp.path().join("test"),
            "not json",
            r#"{"q1": "q"}"#,
            r#"{"q1": {"d1": 1}}"#,
        );
        let err = RetrievalSplit::load(tmp.path(), "test").unwrap_err();
        assert!(err.to_string().contains("corpus.json"));
    }

    #[test]
    fn test_load_qrels_unknown_query() {
        let tmp = TempDir::new().unwrap();
        write_split(
            &tmp.path().join("test"),
            r#"{"d1": {"text": "body"}}"#,
            r#"{"q1": "q"}"#,
            r#"{"q9": {"d1": 1}}"#,
        );
        let err = RetrievalSplit::load(tmp.path(), "test").unwrap_err();
        assert!(err.to_string().contains("unknown query id"));
    }
}
