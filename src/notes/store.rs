use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::lib::{
    errors::NotesError,
    fs::{read_optional, sha256_hex, write_atomic},
};

use super::{merge_entry, MergeOutcome, SubjectRule};

const ENTRY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse an entry timestamp as shown in a preview.
pub fn parse_entry_timestamp(raw: &str) -> Result<DateTime<Utc>, NotesError> {
    NaiveDateTime::parse_from_str(raw.trim(), ENTRY_TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| NotesError::InvalidTimestamp {
            value: raw.to_string(),
        })
}

/// Merge preview produced without touching the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub outcome: MergeOutcome,
    /// Digest of the document the preview was computed from.
    pub base_sha256: String,
    /// Timestamp written into the entry; pass it to `commit` to reproduce it.
    pub timestamp: String,
}

/// Summary returned after a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    pub path: String,
    pub section: String,
    pub entry: String,
    pub removed: Vec<String>,
    pub sha256: String,
    pub recovered: bool,
}

/// File-backed notes document.
///
/// The mutex serializes read-merge-write cycles and, when `auto_reload` is
/// off, holds the cached document text.
pub struct NotesStore {
    path: PathBuf,
    rule: SubjectRule,
    auto_reload: bool,
    cache: Mutex<Option<String>>,
}

impl NotesStore {
    pub fn new(path: PathBuf, rule: SubjectRule, auto_reload: bool) -> Self {
        Self {
            path,
            rule,
            auto_reload,
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document text; empty when the file does not exist yet.
    pub fn read(&self) -> Result<String, NotesError> {
        let mut cache = self.cache.lock().map_err(|_| NotesError::Poisoned)?;
        self.load(&mut cache)
    }

    /// Merge `content` in memory and return the reconciled document.
    pub fn preview(
        &self,
        content: &str,
        section: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Preview, NotesError> {
        let base = self.read()?;
        let outcome = self.merge(&base, content, section, now)?;
        Ok(Preview {
            base_sha256: sha256_hex(base.as_bytes()),
            timestamp: now.format(ENTRY_TIMESTAMP_FORMAT).to_string(),
            outcome,
        })
    }

    /// Merge `content` and write the result.
    ///
    /// When `expected_sha256` is given the current file must still match it.
    pub fn commit(
        &self,
        content: &str,
        section: Option<&str>,
        expected_sha256: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CommitReceipt, NotesError> {
        let mut cache = self.cache.lock().map_err(|_| NotesError::Poisoned)?;
        let base = self.load(&mut cache)?;

        if let Some(expected) = expected_sha256.map(str::trim).filter(|s| !s.is_empty()) {
            let actual = sha256_hex(base.as_bytes());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(NotesError::DigestMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        let outcome = self.merge(&base, content, section, now)?;
        write_atomic(&self.path, outcome.document.as_bytes()).map_err(|source| {
            NotesError::Io {
                path: self.path.clone(),
                source,
            }
        })?;
        if !self.auto_reload {
            *cache = Some(outcome.document.clone());
        }

        let receipt = CommitReceipt {
            path: self.path.display().to_string(),
            section: outcome.section,
            entry: outcome.entry,
            removed: outcome.removed,
            sha256: sha256_hex(outcome.document.as_bytes()),
            recovered: outcome.recovered.is_some(),
        };
        tracing::info!(
            target: "productivity_mcp::notes",
            path = %self.path.display(),
            section = %receipt.section,
            removed = receipt.removed.len(),
            recovered = receipt.recovered,
            "Committed notes entry"
        );
        Ok(receipt)
    }

    fn merge(
        &self,
        base: &str,
        content: &str,
        section: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<MergeOutcome, NotesError> {
        let timestamp = now.format(ENTRY_TIMESTAMP_FORMAT).to_string();
        let outcome = merge_entry(base, content, section, &self.rule, &timestamp)?;
        if let Some(err) = &outcome.recovered {
            tracing::warn!(
                target: "productivity_mcp::notes",
                path = %self.path.display(),
                reason = %err,
                "Notes document is malformed; appending without reconciliation"
            );
        }
        Ok(outcome)
    }

    fn load(&self, cache: &mut Option<String>) -> Result<String, NotesError> {
        if !self.auto_reload {
            if let Some(text) = cache.as_ref() {
                return Ok(text.clone());
            }
        }

        let bytes = read_optional(&self.path).map_err(|source| NotesError::Io {
            path: self.path.clone(),
            source,
        })?;
        let text = match bytes {
            Some(bytes) => String::from_utf8(bytes).map_err(|_| NotesError::Encoding {
                path: self.path.clone(),
            })?,
            None => String::new(),
        };

        if !self.auto_reload {
            *cache = Some(text.clone());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 15, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn preview_does_not_write() {
        let temp = tempdir().expect("can create temporary directory");
        let path = temp.path().join("AGENTS.md");
        let store = NotesStore::new(path.clone(), SubjectRule::default(), true);

        let preview = store
            .preview("Prefers dark mode", None, at(9))
            .expect("preview");

        assert!(!path.exists(), "preview must not create the file");
        assert_eq!(preview.base_sha256, sha256_hex(b""));
        assert_eq!(
            preview.outcome.document,
            "## User Preferences\n- [2026-03-01 09:15] Prefers dark mode\n"
        );
    }

    #[test]
    fn commit_writes_reconciled_document() {
        let temp = tempdir().expect("can create temporary directory");
        let path = temp.path().join("AGENTS.md");
        fs::write(&path, "# Notes\n\n## Testing\n- Uses nextest\n").expect("seed");
        let store = NotesStore::new(path.clone(), SubjectRule::default(), true);

        store
            .commit("Prefers dark mode", None, None, at(9))
            .expect("first commit");
        let receipt = store
            .commit("Prefers light mode", None, None, at(10))
            .expect("second commit");

        let written = fs::read_to_string(&path).expect("read back");
        assert_eq!(
            written,
            "# Notes\n\n## Testing\n- Uses nextest\n\n## User Preferences\n- [2026-03-01 10:15] Prefers light mode\n"
        );
        assert_eq!(receipt.removed, ["Prefers dark mode"]);
        assert_eq!(receipt.sha256, sha256_hex(written.as_bytes()));
        assert!(!receipt.recovered);
    }

    #[test]
    fn commit_refuses_stale_preview() {
        let temp = tempdir().expect("can create temporary directory");
        let path = temp.path().join("AGENTS.md");
        let store = NotesStore::new(path.clone(), SubjectRule::default(), true);

        let preview = store
            .preview("Prefers dark mode", None, at(9))
            .expect("preview");
        fs::write(&path, "## Testing\n- edited elsewhere\n").expect("external edit");

        let err = store
            .commit(
                "Prefers dark mode",
                None,
                Some(&preview.base_sha256),
                at(9),
            )
            .unwrap_err();
        assert!(matches!(err, NotesError::DigestMismatch { .. }));
        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "## Testing\n- edited elsewhere\n"
        );
    }

    #[test]
    fn commit_accepts_matching_preview_digest() {
        let temp = tempdir().expect("can create temporary directory");
        let path = temp.path().join("AGENTS.md");
        let store = NotesStore::new(path.clone(), SubjectRule::default(), true);

        let preview = store
            .preview("Prefers dark mode", None, at(9))
            .expect("preview");
        let receipt = store
            .commit(
                "Prefers dark mode",
                None,
                Some(&preview.base_sha256),
                at(9),
            )
            .expect("commit");

        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            preview.outcome.document
        );
        assert_eq!(receipt.section, "User Preferences");
    }

    #[test]
    fn commit_with_preview_timestamp_writes_the_previewed_document() {
        let temp = tempdir().expect("can create temporary directory");
        let path = temp.path().join("AGENTS.md");
        let store = NotesStore::new(path.clone(), SubjectRule::default(), true);

        let preview = store
            .preview("Prefers dark mode", None, at(9))
            .expect("preview");
        assert_eq!(preview.timestamp, "2026-03-01 09:15");

        let stamped = parse_entry_timestamp(&preview.timestamp).expect("timestamp");
        store
            .commit(
                "Prefers dark mode",
                None,
                Some(&preview.base_sha256),
                stamped,
            )
            .expect("commit");
        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            preview.outcome.document
        );
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        assert!(matches!(
            parse_entry_timestamp("yesterday"),
            Err(NotesError::InvalidTimestamp { .. })
        ));
        assert_eq!(
            parse_entry_timestamp(" 2026-03-01 09:15 ").expect("timestamp"),
            at(9)
        );
    }

    #[test]
    fn cached_store_ignores_external_edits_until_commit() {
        let temp = tempdir().expect("can create temporary directory");
        let path = temp.path().join("AGENTS.md");
        fs::write(&path, "## Testing\n- a\n").expect("seed");
        let store = NotesStore::new(path.clone(), SubjectRule::default(), false);

        assert_eq!(store.read().expect("read"), "## Testing\n- a\n");
        fs::write(&path, "## Testing\n- b\n").expect("external edit");
        assert_eq!(store.read().expect("cached read"), "## Testing\n- a\n");

        let reloading = NotesStore::new(path, SubjectRule::default(), true);
        assert_eq!(reloading.read().expect("read"), "## Testing\n- b\n");
    }

    #[test]
    fn malformed_document_commit_reports_recovery() {
        let temp = tempdir().expect("can create temporary directory");
        let path = temp.path().join("AGENTS.md");
        fs::write(&path, "## Testing\n- a\n## Testing\n- b\n").expect("seed");
        let store = NotesStore::new(path.clone(), SubjectRule::default(), true);

        let receipt = store
            .commit("Uses tokio", Some("Dependencies"), None, at(9))
            .expect("commit");

        assert!(receipt.recovered);
        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "## Testing\n- a\n## Testing\n- b\n\n## Dependencies\n- [2026-03-01 09:15] Uses tokio\n"
        );
    }

    #[test]
    fn non_utf8_document_is_an_encoding_error() {
        let temp = tempdir().expect("can create temporary directory");
        let path = temp.path().join("AGENTS.md");
        fs::write(&path, [0xff, 0xfe, 0x00]).expect("seed");
        let store = NotesStore::new(path, SubjectRule::default(), true);

        assert!(matches!(store.read(), Err(NotesError::Encoding { .. })));
    }
}
