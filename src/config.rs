use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_HISTPATH: &str = "~/.local/share/clipman.json";

/// Settings shared by every action, built once from the command line.
#[derive(Clone, Debug)]
pub struct Config {
    pub histfile: PathBuf,
    pub notify: bool,
    /// Serve to the primary selection instead of the regular clipboard.
    pub primary: bool,
    /// Normalize selector input and output to Unicode NFC.
    pub normalize: bool,
}

impl Config {
    pub fn new(histpath: &Path, notify: bool, primary: bool, normalize: bool) -> Result<Self> {
        Ok(Config {
            histfile: expand_home(histpath)?,
            notify,
            primary,
            normalize,
        })
    }
}

#[derive(Clone, Debug)]
pub struct StoreOptions {
    /// History size; 0 keeps everything.
    pub max_items: usize,
    /// Re-serve the stored text so it outlives the program that copied it.
    pub persist: bool,
    /// Texts with fewer bytes than this are ignored.
    pub min_chars: Option<usize>,
    /// Turn CRLF line endings into LF.
    pub unix: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            max_items: 15,
            persist: true,
            min_chars: None,
            unix: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SelectOptions {
    /// Number of rows the selector shows.
    pub max_items: usize,
    pub tool: String,
    pub tool_args: String,
    /// Separate entries with NUL instead of newline.
    pub null: bool,
    pub err_on_no_selection: bool,
}

impl SelectOptions {
    pub fn new(tool: impl Into<String>) -> Self {
        SelectOptions {
            max_items: 15,
            tool: tool.into(),
            tool_args: String::new(),
            null: false,
            err_on_no_selection: false,
        }
    }
}

/// Replace a leading `~` with the user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("cannot get home directory".to_string()))?;
    Ok(home.join(rest))
}
