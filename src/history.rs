use crate::error::{Error, IoResultExt, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};
use tracing::debug;

/// Clipboard history, oldest entry first.
/// The last entry is the one currently being served to the desktop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the history file at `path`.
    /// A missing file is an empty history; anything unparsable is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no history file");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(Error::io(
                    format!("failure reading history file {}", path.display()),
                    e,
                ));
            }
        };

        // Older versions wrote `null` for an empty history.
        let entries: Option<Vec<String>> =
            serde_json::from_slice(&bytes).map_err(|source| Error::Format {
                path: path.to_path_buf(),
                source,
            })?;
        let history = Self {
            entries: entries.unwrap_or_default(),
        };
        debug!(path = %path.display(), len = history.len(), "loaded history");
        Ok(history)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry being served, if any.
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// The entry just before the served one.
    pub fn second_last(&self) -> Option<&str> {
        self.entries
            .len()
            .checked_sub(2)
            .map(|i| self.entries[i].as_str())
    }

    /// Record `text` as the newest entry, and return whether the history changed.
    ///
    /// Empty text, or text equal to the newest entry, is ignored: clipboard
    /// watchers fire again when we re-serve what we just stored.
    /// Any older copy of `text` is removed, then the oldest entries are dropped so
    /// the history holds at most `max_items` entries (0 means unbounded).
    pub fn record(&mut self, text: &str, max_items: usize) -> bool {
        if text.is_empty() || self.last() == Some(text) {
            return false;
        }

        self.remove(text);
        if max_items > 0 && self.entries.len() >= max_items {
            // Usually one, more if max_items was lowered since the last run.
            let excess = self.entries.len() + 1 - max_items;
            self.entries.drain(..excess);
        }
        self.entries.push(text.to_string());
        true
    }

    /// Remove every occurrence of `text`, and return whether anything was removed.
    pub fn remove(&mut self, text: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != text);
        self.entries.len() != before
    }

    /// Write the history to `path`.
    /// The new contents go to a temporary file in the same directory, which then
    /// replaces the old file, so a crash never leaves a truncated history behind.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .io_context(|| format!("create history directory {}", dir.display()))?;

        let payload = serde_json::to_vec(&self.entries).map_err(|source| Error::Format {
            path: path.to_path_buf(),
            source,
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .io_context(|| format!("create temporary file in {}", dir.display()))?;
        tmp.write_all(&payload)
            .io_context(|| "error writing history")?;
        tmp.as_file()
            .sync_all()
            .io_context(|| "error syncing history")?;
        tmp.persist(path)
            .map_err(|e| Error::io(format!("error replacing {}", path.display()), e.error))?;
        debug!(path = %path.display(), len = self.len(), "persisted history");
        Ok(())
    }

    /// Delete the history file. A file that is already gone is not an error.
    pub fn wipe(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed history file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("remove {}", path.display()), e)),
        }
    }
}

impl From<Vec<String>> for History {
    fn from(entries: Vec<String>) -> Self {
        let mut history = History::new();
        for entry in entries {
            history.remove(&entry);
            history.entries.push(entry);
        }
        history
    }
}

impl<S: Into<String>> FromIterator<S> for History {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().map(Into::into).collect::<Vec<String>>().into()
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use crate::error::Error;
    use std::fs;

    fn history(entries: &[&str]) -> History {
        entries.iter().copied().collect()
    }

    #[test]
    fn record_appends_new_text() {
        let mut h = history(&["a", "b"]);
        assert!(h.record("c", 15));
        assert_eq!(h.entries(), ["a", "b", "c"]);
    }

    #[test]
    fn record_moves_duplicate_to_the_end() {
        let mut h = history(&["a", "b", "c"]);
        assert!(h.record("a", 15));
        assert_eq!(h.entries(), ["b", "c", "a"]);
    }

    #[test]
    fn record_ignores_repeat_of_last_entry() {
        let mut h = history(&["a", "b"]);
        assert!(!h.record("b", 15));
        assert_eq!(h.entries(), ["a", "b"]);
    }

    #[test]
    fn record_ignores_empty_text() {
        let mut h = history(&["a"]);
        assert!(!h.record("", 15));
        assert_eq!(h.entries(), ["a"]);
    }

    #[test]
    fn record_drops_oldest_when_full() {
        let mut h = history(&["a", "b", "c"]);
        assert!(h.record("d", 3));
        assert_eq!(h.entries(), ["b", "c", "d"]);
    }

    #[test]
    fn record_shrinks_to_lowered_limit() {
        let mut h = history(&["a", "b", "c", "d", "e"]);
        h.record("f", 2);
        assert_eq!(h.entries(), ["e", "f"]);
    }

    #[test]
    fn record_duplicate_in_full_history_keeps_the_rest() {
        let mut h = history(&["a", "b", "c"]);
        h.record("a", 3);
        assert_eq!(h.entries(), ["b", "c", "a"]);
    }

    #[test]
    fn record_unbounded_when_limit_is_zero() {
        let mut h = History::new();
        for i in 0..100 {
            h.record(&i.to_string(), 0);
        }
        assert_eq!(h.len(), 100);
    }

    #[test]
    fn record_keeps_entries_unique() {
        let mut h = History::new();
        for text in ["x", "y", "x", "z", "y", "x", "x"] {
            h.record(text, 0);
            let last = h.last().unwrap();
            assert_eq!(last, text);
            assert_eq!(h.entries().iter().filter(|e| *e == text).count(), 1);
        }
        assert_eq!(h.entries(), ["z", "y", "x"]);
    }

    #[test]
    fn remove_filters_every_occurrence() {
        let mut h = history(&["a", "b", "c"]);
        assert!(h.remove("b"));
        assert!(!h.remove("b"));
        assert_eq!(h.entries(), ["a", "c"]);
    }

    #[test]
    fn second_last_needs_two_entries() {
        assert_eq!(history(&["a"]).second_last(), None);
        assert_eq!(history(&["a", "b", "c"]).second_last(), Some("b"));
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let h = History::load(&dir.path().join("missing.json")).unwrap();
        assert!(h.is_empty());
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipman.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(History::load(&path), Err(Error::Format { .. })));
    }

    #[test]
    fn load_accepts_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipman.json");
        fs::write(&path, "null").unwrap();
        assert!(History::load(&path).unwrap().is_empty());
    }

    #[test]
    fn load_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory fails with something other than NotFound.
        assert!(matches!(History::load(dir.path()), Err(Error::Io { .. })));
    }

    #[test]
    fn persist_writes_json_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clipman.json");
        let h = history(&["a", "line\nbreak"]);
        h.persist(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"["a","line\nbreak"]"#);
        assert_eq!(History::load(&path).unwrap(), h);
    }

    #[test]
    fn persist_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipman.json");
        history(&["a", "b", "c"]).persist(&path).unwrap();
        history(&["z"]).persist(&path).unwrap();
        assert_eq!(History::load(&path).unwrap().entries(), ["z"]);
        // No temporary files are left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn wipe_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipman.json");
        history(&["a"]).persist(&path).unwrap();
        History::wipe(&path).unwrap();
        assert!(!path.exists());
        History::wipe(&path).unwrap();
    }
}
