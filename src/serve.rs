use crate::error::{Error, Result};
use nix::unistd::{Pid, setpgid};
use std::{
    io::Write,
    os::unix::process::CommandExt,
    path::PathBuf,
    process::{Command, Stdio},
};
use tracing::debug;

/// Exposes text to the desktop clipboard.
pub trait ClipboardServer {
    /// Hand `text` to a process that keeps serving it after we exit.
    fn serve(&mut self, text: &str) -> Result<()>;
    /// Empty the clipboard.
    fn clear(&mut self) -> Result<()>;
}

/// Serves through `wl-copy` from wl-clipboard.
pub struct WlCopy {
    program: String,
    primary: bool,
}

impl WlCopy {
    pub fn new(primary: bool) -> Self {
        Self::with_program("wl-copy", primary)
    }

    pub fn with_program(program: impl Into<String>, primary: bool) -> Self {
        WlCopy {
            program: program.into(),
            primary,
        }
    }

    fn locate(&self) -> Result<PathBuf> {
        which::which(&self.program)
            .map_err(|e| Error::Serve(format!("couldn't find {}: {}", self.program, e)))
    }

    fn command(&self, bin: PathBuf) -> Command {
        let mut cmd = Command::new(bin);
        if self.primary {
            cmd.arg("-p");
        }
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

impl ClipboardServer for WlCopy {
    fn serve(&mut self, text: &str) -> Result<()> {
        let bin = self.locate()?;
        let mut cmd = self.command(bin);
        // Only text is ever served; without an explicit type some clients
        // guess wrong about what they are pasting.
        cmd.args(["-t", "TEXT"]).stdin(Stdio::piped());
        detach(&mut cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Serve(format!("error running {}: {}", self.program, e)))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Serve(format!("no stdin for {}", self.program)))?;
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| Error::Serve(format!("error writing to {}: {}", self.program, e)))?;
        drop(stdin);

        // Not waited on: it keeps serving after we are gone.
        debug!(pid = child.id(), primary = self.primary, "serving clipboard");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let bin = self.locate()?;
        let status = self
            .command(bin)
            .arg("-c")
            .stdin(Stdio::null())
            .status()
            .map_err(|e| Error::Serve(format!("error running {} -c: {}", self.program, e)))?;
        if !status.success() {
            return Err(Error::Serve(format!("{} -c failed: {}", self.program, status)));
        }
        debug!(primary = self.primary, "cleared clipboard");
        Ok(())
    }
}

/// Make the child the leader of its own process group, so it survives the
/// terminal or script that ran us going away.
fn detach(cmd: &mut Command) {
    // SAFETY: setpgid is async-signal-safe and the closure allocates nothing.
    unsafe {
        cmd.pre_exec(|| {
            setpgid(Pid::from_raw(0), Pid::from_raw(0)).map_err(std::io::Error::from)
        });
    }
}
