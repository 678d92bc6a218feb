use std::process::{Command, Stdio};
use tracing::{error, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Low,
    Normal,
    Critical,
}

impl Severity {
    /// The urgency name understood by `notify-send -u`.
    pub fn urgency(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Normal => "normal",
            Severity::Critical => "critical",
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, severity: Severity, message: &str);
}

/// Logs every message, and forwards it to the desktop through `notify-send`
/// when enabled.
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        DesktopNotifier { enabled }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Low => info!("{}", message),
            Severity::Normal => warn!("{}", message),
            Severity::Critical => error!("{}", message),
        }
        if !self.enabled {
            return;
        }

        let status = Command::new("notify-send")
            .args(["-a", "clipman", "-u", severity.urgency(), "Clipman", message])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status();
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => warn!(%s, "notify-send failed"),
            Err(e) => warn!(error = %e, "cannot run notify-send"),
        }
    }
}
