use crate::{
    config::SelectOptions,
    error::{Error, IoResultExt, Result},
    guide::{self, EncodeOptions},
};
use std::{
    fmt,
    io::Write,
    process::{Command, Stdio},
    str::FromStr,
    thread,
};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Longest line, in bytes, handed to a selector. dmenu chokes at around 1200.
pub const MAX_LINE_BYTES: usize = 1000;

/// Exit codes meaning the user chose nothing: dmenu and rofi exit 1,
/// fzf exits 1 on no match and 130 when interrupted.
const NO_SELECTION_CODES: [i32; 2] = [1, 130];

const DMENU_FONT: &str = "-misc-dejavu sans mono-medium-r-normal--17-120-100-100-m-0-iso8859-16";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tool {
    /// Print the history instead of asking anyone.
    Stdout,
    Dmenu,
    Bemenu,
    Rofi,
    Wofi,
    /// The whole command line comes from the tool arguments.
    Custom,
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "STDOUT" => Ok(Tool::Stdout),
            "dmenu" => Ok(Tool::Dmenu),
            "bemenu" => Ok(Tool::Bemenu),
            "rofi" => Ok(Tool::Rofi),
            "wofi" => Ok(Tool::Wofi),
            "CUSTOM" => Ok(Tool::Custom),
            _ => Err(Error::Config(format!("unsupported tool: {}", s))),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tool::Stdout => "STDOUT",
            Tool::Dmenu => "dmenu",
            Tool::Bemenu => "bemenu",
            Tool::Rofi => "rofi",
            Tool::Wofi => "wofi",
            Tool::Custom => "CUSTOM",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The history entry the user picked.
    Picked(String),
    /// The selector was dismissed without a choice.
    Nothing,
    /// The history was printed to stdout.
    Printed,
}

/// Build the selector's command line: program first, then its arguments.
pub fn command_line(tool: Tool, opts: &SelectOptions, prompt: &str) -> Result<Vec<String>> {
    let rows = opts.max_items.to_string();
    let rows = rows.as_str();
    let mut args: Vec<String> = match tool {
        Tool::Stdout => {
            return Err(Error::Config("STDOUT is not an external tool".to_string()));
        }
        Tool::Dmenu => vec!["dmenu", "-b", "-fn", DMENU_FONT, "-l", rows],
        Tool::Bemenu => vec!["bemenu", "--prompt", prompt, "--list", rows],
        Tool::Rofi => vec!["rofi", "-p", prompt, "-dmenu", "-lines", rows],
        Tool::Wofi => vec!["wofi", "-p", prompt, "--cache-file", "/dev/null", "--dmenu"],
        Tool::Custom => {
            if opts.tool_args.is_empty() {
                return Err(Error::Config(
                    "missing tool args for CUSTOM tool".to_string(),
                ));
            }
            let args = split_args(&opts.tool_args)?;
            if args.is_empty() {
                return Err(Error::Config(
                    "missing tool args for CUSTOM tool".to_string(),
                ));
            }
            return Ok(args);
        }
    }
    .into_iter()
    .map(String::from)
    .collect();

    if !opts.tool_args.is_empty() {
        args.extend(split_args(&opts.tool_args)?);
    }
    Ok(args)
}

fn split_args(args: &str) -> Result<Vec<String>> {
    shlex::split(args).ok_or_else(|| {
        Error::Config(format!("selector: cannot parse tool args {:?}", args))
    })
}

/// Let the user choose one of `entries` (oldest first) with the configured tool.
/// The STDOUT tool prints the entries to `out` instead.
pub fn select<S: AsRef<str>>(
    entries: &[S],
    opts: &SelectOptions,
    prompt: &str,
    normalize: bool,
    out: &mut dyn Write,
) -> Result<Selection> {
    if entries.is_empty() {
        return Err(Error::NoData);
    }

    let tool: Tool = opts.tool.parse()?;
    let sep = if opts.null { "\0" } else { "\n" };
    if tool == Tool::Stdout {
        let (reprs, _) = guide::encode(
            entries,
            EncodeOptions {
                max_len: 0,
                escape: !opts.null,
                normalize,
            },
        );
        out.write_all(reprs.join(sep).as_bytes())
            .and_then(|_| out.flush())
            .io_context(|| "write history to stdout")?;
        return Ok(Selection::Printed);
    }

    let args = command_line(tool, opts, prompt)?;
    let program = &args[0];
    let bin = which::which(program).map_err(|_| Error::ToolNotFound(program.clone()))?;
    debug!(tool = %tool, bin = %bin.display(), ?args, "running selector");

    let (reprs, guide) = guide::encode(
        entries,
        EncodeOptions {
            max_len: MAX_LINE_BYTES,
            escape: !opts.null,
            normalize,
        },
    );
    let input = reprs.join(sep);

    let mut child = Command::new(&bin)
        .args(&args[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .io_context(|| format!("run {}", program))?;
    let mut stdin = child.stdin.take().ok_or_else(|| {
        Error::io(
            format!("capture {} stdin", program),
            std::io::ErrorKind::BrokenPipe.into(),
        )
    })?;
    // Input is written from another thread: the selector may answer before
    // it has read all of it.
    let output = thread::scope(|s| {
        s.spawn(move || {
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                debug!(error = %e, "selector stopped reading its input");
            }
        });
        child.wait_with_output()
    })
    .io_context(|| format!("wait for {}", program))?;

    let status = output.status;
    debug!(%status, bytes = output.stdout.len(), "selector exited");
    if !status.success() {
        return match status.code() {
            Some(code) if NO_SELECTION_CODES.contains(&code) => Ok(Selection::Nothing),
            _ => Err(Error::ToolExecution {
                tool: program.clone(),
                status,
            }),
        };
    }

    // wofi exits 0 when dismissed.
    let mut chosen = output.stdout;
    if chosen.is_empty() {
        return Ok(Selection::Nothing);
    }
    if chosen.last() == Some(&b'\n') {
        chosen.pop();
    }
    let chosen = String::from_utf8(chosen).map_err(|_| Error::Recovery)?;
    let chosen = if normalize {
        chosen.nfc().collect()
    } else {
        chosen
    };

    guide
        .lookup(&chosen)
        .map(|original| Selection::Picked(original.to_string()))
        .ok_or(Error::Recovery)
}
