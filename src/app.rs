use crate::{
    config::{Config, SelectOptions, StoreOptions},
    error::{Error, IoResultExt, Result},
    history::History,
    input,
    notify::{DesktopNotifier, Notifier},
    selector::{self, Selection},
    serve::{ClipboardServer, WlCopy},
};
use std::io::{Read, Write};
use tracing::{debug, info};

/// How an action ended, when it did not fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Nothing was selected and the caller asked for that to be an error.
    NoSelection,
}

pub struct App {
    config: Config,
    server: Box<dyn ClipboardServer>,
    notifier: Box<dyn Notifier>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let server = Box::new(WlCopy::new(config.primary));
        let notifier = Box::new(DesktopNotifier::new(config.notify));
        Self::new_with(config, server, notifier)
    }

    pub fn new_with(
        config: Config,
        server: Box<dyn ClipboardServer>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        App {
            config,
            server,
            notifier,
        }
    }

    pub fn load_history(&self) -> Result<History> {
        History::load(&self.config.histfile)
    }

    /// Record the text sent by the clipboard watcher on `reader`.
    pub fn store_from<R: Read>(&mut self, reader: R, opts: &StoreOptions) -> Result<()> {
        let text = input::read_text(reader, opts.unix)?;
        if matches!(opts.min_chars, Some(min) if text.len() < min) {
            debug!(len = text.len(), "text too short to store");
            return Ok(());
        }
        self.store(&text, opts)
    }

    /// Add `text` to the history, and keep serving it if asked to.
    pub fn store(&mut self, text: &str, opts: &StoreOptions) -> Result<()> {
        let mut history = self.load_history()?;
        if !history.record(text, opts.max_items) {
            debug!("nothing new to store");
            return Ok(());
        }
        history.persist(&self.config.histfile)?;

        // The program we copied from may exit, taking the clipboard with it.
        if opts.persist {
            self.serve(text);
        }
        Ok(())
    }

    /// Let the user choose an entry and serve it.
    pub fn pick(&mut self, opts: &SelectOptions, out: &mut dyn Write) -> Result<Outcome> {
        let history = self.load_history()?;
        match self.select(&history, opts, "pick", out)? {
            Selection::Picked(text) => {
                self.serve(&text);
                Ok(Outcome::Done)
            }
            Selection::Nothing => Ok(no_selection(opts)),
            Selection::Printed => Ok(Outcome::Done),
        }
    }

    /// Let the user choose an entry and remove it from the history.
    pub fn clear(&mut self, opts: &SelectOptions, out: &mut dyn Write) -> Result<Outcome> {
        let mut history = self.load_history()?;
        let text = match self.select(&history, opts, "clear", out)? {
            Selection::Picked(text) => text,
            Selection::Nothing => return Ok(no_selection(opts)),
            Selection::Printed => return Ok(Outcome::Done),
        };

        if history.len() < 2 {
            // The only entry is gone, so is everything.
            self.clear_all()?;
            return Ok(Outcome::Done);
        }

        if history.last() == Some(text.as_str()) {
            // The old entry is still being served; replace it with the one before.
            if let Some(previous) = history.second_last().map(str::to_string) {
                self.serve(&previous);
            }
        }

        history.remove(&text);
        history.persist(&self.config.histfile)?;
        Ok(Outcome::Done)
    }

    /// Delete the whole history and empty the clipboard.
    pub fn clear_all(&mut self) -> Result<()> {
        self.server.clear()?;
        History::wipe(&self.config.histfile)
    }

    /// Serve the newest entry again, e.g. after a login.
    pub fn restore(&mut self, out: &mut dyn Write) -> Result<()> {
        let history = self.load_history()?;
        match history.last() {
            Some(text) => {
                self.serve(text);
                Ok(())
            }
            None => writeln!(out, "Nothing to restore").io_context(|| "write to stdout"),
        }
    }

    /// Print the history as a JSON list.
    pub fn show_history(&self, out: &mut dyn Write) -> Result<()> {
        let history = self.load_history()?;
        if history.is_empty() {
            return writeln!(out, "Nothing to show").io_context(|| "write to stdout");
        }
        let json = serde_json::to_string(&history).map_err(|source| Error::Format {
            path: self.config.histfile.clone(),
            source,
        })?;
        writeln!(out, "{}", json).io_context(|| "write to stdout")
    }

    fn select(
        &self,
        history: &History,
        opts: &SelectOptions,
        prompt: &str,
        out: &mut dyn Write,
    ) -> Result<Selection> {
        selector::select(
            history.entries(),
            opts,
            prompt,
            self.config.normalize,
            out,
        )
    }

    /// Serving problems are reported, but never undo what was already saved.
    fn serve(&mut self, text: &str) {
        if let Err(e) = self.server.serve(text) {
            self.notifier.notify(e.severity(), &e.to_string());
        }
    }
}

fn no_selection(opts: &SelectOptions) -> Outcome {
    info!("no selection made");
    if opts.err_on_no_selection {
        Outcome::NoSelection
    } else {
        Outcome::Done
    }
}
