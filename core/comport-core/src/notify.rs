//! Notification backends.
//!
//! The monitor only sees the [`Notifier`] trait; which backend sits behind it
//! is decided by [`NotificationMode`] in the settings. Delivery failures are
//! reported to the caller but never affect history state.

use std::cell::RefCell;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{PortError, Result};
use crate::settings::NotificationMode;
use crate::types::TransitionEvent;

/// Title used for every notification.
pub const NOTIFICATION_TITLE: &str = "ComPortNotify";

pub trait Notifier {
    fn mode(&self) -> NotificationMode;

    fn notify(&self, title: &str, body: &str) -> Result<()>;

    fn announce(&self, event: &TransitionEvent) -> Result<()> {
        self.notify(NOTIFICATION_TITLE, &event.message())
    }
}

/// Builds the notifier for a configured mode.
pub fn notifier_for(mode: NotificationMode) -> Box<dyn Notifier> {
    match mode {
        NotificationMode::Off => Box::new(OffNotifier),
        NotificationMode::Balloon => Box::new(BalloonNotifier::stderr()),
        NotificationMode::Toast => Box::new(ToastNotifier::for_current_platform()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Off
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct OffNotifier;

impl Notifier for OffNotifier {
    fn mode(&self) -> NotificationMode {
        NotificationMode::Off
    }

    fn notify(&self, _title: &str, _body: &str) -> Result<()> {
        Err(PortError::NotificationsDisabled)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Balloon
// ─────────────────────────────────────────────────────────────────────────────

/// Writes a one-line notice to a terminal stream.
pub struct BalloonNotifier<W: Write> {
    out: RefCell<W>,
}

impl BalloonNotifier<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> BalloonNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> Notifier for BalloonNotifier<W> {
    fn mode(&self) -> NotificationMode {
        NotificationMode::Balloon
    }

    fn notify(&self, title: &str, body: &str) -> Result<()> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "[{}] {}", title, body.trim_end())
            .and_then(|_| out.flush())
            .map_err(|e| PortError::Io {
                context: "Failed to write balloon notification".to_string(),
                source: e,
            })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Toast
// ─────────────────────────────────────────────────────────────────────────────

/// How long a notification command may run before it is killed.
pub const TOAST_TIMEOUT: Duration = Duration::from_millis(1500);

const TOAST_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastBackend {
    NotifySend,
    Osascript,
}

/// Native desktop notification via the platform's notification command.
///
/// The command is spawned and polled until it exits or `timeout` passes, in
/// which case it is killed. A wedged notification daemon costs at most one
/// timeout per notification.
#[derive(Debug, Clone)]
pub struct ToastNotifier {
    backend: ToastBackend,
    /// Replaces the backend program; leading args go before the backend's own.
    launcher: Option<(String, Vec<String>)>,
    timeout: Duration,
}

impl ToastNotifier {
    pub fn for_current_platform() -> Self {
        let backend = if cfg!(target_os = "macos") {
            ToastBackend::Osascript
        } else {
            ToastBackend::NotifySend
        };
        Self {
            backend,
            launcher: None,
            timeout: TOAST_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_launcher(program: &str, args: &[&str], timeout: Duration) -> Self {
        Self {
            backend: ToastBackend::NotifySend,
            launcher: Some((
                program.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
            )),
            timeout,
        }
    }

    fn command(&self, title: &str, body: &str) -> Command {
        let mut cmd = match &self.launcher {
            Some((program, args)) => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            None => Command::new(match self.backend {
                ToastBackend::NotifySend => "notify-send",
                ToastBackend::Osascript => "osascript",
            }),
        };

        match self.backend {
            ToastBackend::NotifySend => {
                cmd.arg(format!("--app-name={}", NOTIFICATION_TITLE))
                    .arg(title)
                    .arg(body);
            }
            ToastBackend::Osascript => {
                cmd.arg("-e").arg(format!(
                    "display notification \"{}\" with title \"{}\"",
                    applescript_escape(body),
                    applescript_escape(title)
                ));
            }
        }
        cmd
    }
}

impl Notifier for ToastNotifier {
    fn mode(&self) -> NotificationMode {
        NotificationMode::Toast
    }

    fn notify(&self, title: &str, body: &str) -> Result<()> {
        let mut cmd = self.command(title, body.trim_end());
        let program = cmd.get_program().to_string_lossy().to_string();
        let failed = |details: String| PortError::CommandFailed {
            command: program.clone(),
            details,
        };

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(failed(format!("exit {}", status.code().unwrap_or(-1))))
                }
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(failed(format!(
                            "timed out after {}ms",
                            self.timeout.as_millis()
                        )));
                    }
                    thread::sleep(TOAST_POLL_INTERVAL);
                }
                Err(e) => return Err(failed(e.to_string())),
            }
        }
    }
}

fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps every notification in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(title, body)` pairs in delivery order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|(_, b)| b.clone()).collect()
    }
}

impl Notifier for MemoryNotifier {
    fn mode(&self) -> NotificationMode {
        NotificationMode::Balloon
    }

    fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.sent
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}
