#![cfg(target_os = "linux")]

use clipman::{
    error::Error,
    serve::{ClipboardServer, WlCopy},
};
use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};
use tempfile::TempDir;

/// A stand-in for wl-copy that writes its arguments, process ids and stdin
/// to `log` next to itself.
const FAKE_WL_COPY: &str = r#"#!/bin/sh
log="$(dirname "$0")/log"
echo "args=$*" >> "$log"
echo "pid=$$ pgid=$(cut -d' ' -f5 /proc/$$/stat)" >> "$log"
echo "stdin=$(cat)" >> "$log"
echo end >> "$log"
"#;

struct FakeWlCopy {
    dir: TempDir,
    program: PathBuf,
}

impl FakeWlCopy {
    fn new(script: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let program = dir.path().join("wl-copy");
        fs::write(&program, script).expect("write script");
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).expect("chmod script");
        FakeWlCopy { dir, program }
    }

    fn server(&self, primary: bool) -> WlCopy {
        WlCopy::with_program(self.program.display().to_string(), primary)
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("log")
    }

    /// The log lines of the first finished run. `serve` does not wait for
    /// its child, so this polls.
    fn finished_run(&self) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let log = read_log(&self.log_path());
            if let Some(end) = log.iter().position(|l| l == "end") {
                return log[..end].to_vec();
            }
            assert!(Instant::now() < deadline, "fake wl-copy never finished: {:?}", log);
            thread::sleep(Duration::from_millis(10));
        }
    }
}

fn read_log(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

fn field<'a>(run: &'a [String], key: &str) -> &'a str {
    run.iter()
        .find_map(|l| l.strip_prefix(key))
        .unwrap_or_else(|| panic!("no {} in {:?}", key, run))
}

fn assert_leads_own_group(run: &[String]) {
    let ids = field(run, "pid=");
    let (pid, pgid) = ids.split_once(" pgid=").expect("pid and pgid");
    assert_eq!(pid, pgid.trim());
}

#[test]
fn serve_pipes_text_to_detached_wl_copy() {
    let fake = FakeWlCopy::new(FAKE_WL_COPY);

    fake.server(false).serve("hello").expect("serve");

    let run = fake.finished_run();
    assert_eq!(field(&run, "args="), "-t TEXT");
    assert_eq!(field(&run, "stdin="), "hello");
    assert_leads_own_group(&run);
}

#[test]
fn serve_primary_passes_primary_flag() {
    let fake = FakeWlCopy::new(FAKE_WL_COPY);

    fake.server(true).serve("hello").expect("serve");

    let run = fake.finished_run();
    assert_eq!(field(&run, "args="), "-p -t TEXT");
    assert_eq!(field(&run, "stdin="), "hello");
    assert_leads_own_group(&run);
}

#[test]
fn clear_runs_wl_copy_clear() {
    let fake = FakeWlCopy::new(FAKE_WL_COPY);

    fake.server(false).clear().expect("clear");

    let run = fake.finished_run();
    assert_eq!(field(&run, "args="), "-c");
    assert_eq!(field(&run, "stdin="), "");
}

#[test]
fn clear_primary_clears_primary_selection() {
    let fake = FakeWlCopy::new(FAKE_WL_COPY);

    fake.server(true).clear().expect("clear");

    let run = fake.finished_run();
    assert_eq!(field(&run, "args="), "-p -c");
}

#[test]
fn failing_clear_is_serve_error() {
    let fake = FakeWlCopy::new("#!/bin/sh\nexit 1\n");

    let err = fake.server(false).clear().unwrap_err();

    assert!(matches!(err, Error::Serve(msg) if msg.contains("-c failed")));
}

#[test]
fn missing_wl_copy_is_serve_error() {
    let mut server = WlCopy::with_program("clipman-no-such-wl-copy", false);

    assert!(matches!(server.serve("hello"), Err(Error::Serve(_))));
    assert!(matches!(server.clear(), Err(Error::Serve(_))));
}
