use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clipman::{
    app::{App, Outcome},
    config::{self, Config, SelectOptions, StoreOptions},
    error::Error,
    notify::{DesktopNotifier, Notifier, Severity},
};
use std::{io, path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "A clipboard manager for Wayland")]
struct Cli {
    /// Path of history file
    #[arg(long, env = "CLIPMAN_HISTPATH", default_value = config::DEFAULT_HISTPATH)]
    histpath: PathBuf,
    /// Send desktop notifications on errors
    #[arg(long = "notify")]
    notify: bool,
    /// Serve item to the primary clipboard
    #[arg(long)]
    primary: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record clipboard events (run as argument to `wl-paste --watch`)
    Store {
        /// History size; 0 keeps everything
        #[arg(long, default_value_t = 15)]
        max_items: usize,
        /// Don't persist a copy buffer after a program exits
        #[arg(long, short = 'P')]
        no_persist: bool,
        /// Minimum number of characters before storing
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        min_char: i64,
        /// Normalize line endings to LF
        #[arg(long)]
        unix: bool,
    },
    /// Pick an item from clipboard history
    Pick {
        #[command(flatten)]
        select: SelectArgs,
    },
    /// Remove item/s from history
    Clear {
        #[command(flatten)]
        select: SelectArgs,
        /// Remove all items
        #[arg(long, short = 'a')]
        all: bool,
    },
    /// Show all items from history
    ShowHistory,
    /// Serve the last recorded item from history
    Restore,
}

#[derive(Args)]
struct SelectArgs {
    /// Scrollview length
    #[arg(long, default_value_t = 15)]
    max_items: usize,
    /// Which selector to use: wofi/bemenu/CUSTOM/dmenu/rofi/STDOUT
    #[arg(long, short = 't')]
    tool: Option<String>,
    /// Extra arguments to pass to the --tool
    #[arg(long, short = 'T', default_value = "")]
    tool_args: String,
    /// Separate items using NULL; recommended if your tool supports --read0 or similar
    #[arg(long)]
    print0: bool,
    /// Exit 1 when there is no selection
    #[arg(long)]
    err_on_no_selection: bool,
    /// Don't normalize Unicode to NFC before handing items to the tool
    #[arg(long)]
    no_normalize: bool,
}

impl SelectArgs {
    fn options(&self, tool: String) -> SelectOptions {
        SelectOptions {
            max_items: self.max_items,
            tool,
            tool_args: self.tool_args.clone(),
            null: self.print0,
            err_on_no_selection: self.err_on_no_selection,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut notifier = DesktopNotifier::new(cli.notify);
    match run(cli) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::NoSelection) => ExitCode::FAILURE,
        Err(e) => {
            let severity = e
                .downcast_ref::<Error>()
                .map_or(Severity::Critical, Error::severity);
            notifier.notify(severity, &format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let normalize = match &cli.command {
        Command::Pick { select } | Command::Clear { select, .. } => !select.no_normalize,
        _ => true,
    };
    let config = Config::new(&cli.histpath, cli.notify, cli.primary, normalize)
        .context("resolve history path")?;
    let mut app = App::new(config);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Store {
            max_items,
            no_persist,
            min_char,
            unix,
        } => {
            let opts = StoreOptions {
                max_items,
                persist: !no_persist,
                min_chars: usize::try_from(min_char).ok().filter(|&n| n > 0),
                unix,
            };
            app.store_from(io::stdin().lock(), &opts)
                .context("error writing history")?;
            Ok(Outcome::Done)
        }
        Command::Pick { select } => {
            let tool = select.tool.clone().ok_or_else(|| {
                Error::Config("required flag --tool not provided, try --help".into())
            })?;
            Ok(app.pick(&select.options(tool), &mut stdout)?)
        }
        Command::Clear { select, all } => {
            if all {
                app.clear_all()?;
                return Ok(Outcome::Done);
            }
            let tool = select.tool.clone().ok_or_else(|| {
                Error::Config("required flag --tool or --all not provided, try --help".into())
            })?;
            Ok(app.clear(&select.options(tool), &mut stdout)?)
        }
        Command::ShowHistory => {
            app.show_history(&mut stdout)?;
            Ok(Outcome::Done)
        }
        Command::Restore => {
            app.restore(&mut stdout)?;
            Ok(Outcome::Done)
        }
    }
}
