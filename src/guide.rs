//! Turn history entries into single-line strings an external selector can show,
//! and map the selector's answer back to the entry it came from.

use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Maps a displayed string back to the history entry it was made from.
#[derive(Debug, Default)]
pub struct Guide {
    originals: HashMap<String, String>,
}

impl Guide {
    /// The entry shown as `repr`, if any.
    pub fn lookup(&self, repr: &str) -> Option<&str> {
        self.originals.get(repr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    fn insert(&mut self, repr: String, original: &str) {
        // Entries that encode to the same string collide; the older one wins,
        // since it is inserted last.
        self.originals.insert(repr, original.to_string());
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct EncodeOptions {
    /// Cut representations to this many bytes; 0 disables truncation.
    pub max_len: usize,
    /// Write newlines, tabs and carriage returns as `\n`, `\t` and `\r`.
    pub escape: bool,
    /// Normalize representations to Unicode NFC.
    pub normalize: bool,
}

/// Encode `entries` (oldest first) for display, newest first.
pub fn encode<S: AsRef<str>>(entries: &[S], opts: EncodeOptions) -> (Vec<String>, Guide) {
    let mut reprs = Vec::with_capacity(entries.len());
    let mut guide = Guide::default();

    for original in entries.iter().rev().map(AsRef::as_ref) {
        let mut repr = if opts.escape {
            escape(original)
        } else {
            original.to_string()
        };
        if opts.max_len > 0 {
            truncate(&mut repr, opts.max_len);
        }
        if opts.normalize {
            repr = repr.nfc().collect();
        }

        guide.insert(repr.clone(), original);
        reprs.push(repr);
    }

    (reprs, guide)
}

/// Put `text` on a single line.
/// Literal backslash sequences are doubled first, so they stay distinguishable from
/// the escaped control characters.
pub fn escape(text: &str) -> String {
    text.replace("\\n", "\\\\n")
        .replace('\n', "\\n")
        .replace("\\t", "\\\\t")
        .replace('\t', "\\t")
        .replace("\\r", "\\\\r")
        .replace('\r', "\\r")
}

/// Keep the first `max` bytes of `s`, backing off only as far as needed to
/// stay on a character boundary.
fn truncate(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let end = (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
    s.truncate(end);
}
