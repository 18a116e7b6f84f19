//! comport-notify: announces serial port arrivals and removals.
//!
//! ## Subcommands
//!
//! - `watch`: Baseline pass, then poll for changes and notify
//! - `list`: Print the ports present right now
//! - `config`: Show or change notification and retention preferences
//! - `test-notify`: Send a test notification through the configured backend

mod logging;

use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use comport_core::{
    DisconnectedMode, FileSettings, NotificationMode, PortError, PortMonitor, Result,
    SettingsSource, StorageConfig, SysfsPortSource,
};

#[derive(Parser)]
#[command(name = "comport-notify")]
#[command(about = "Serial port arrival/removal notifier")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch for port changes until interrupted
    Watch {
        /// Delay between snapshots
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },

    /// Print the current port list
    List,

    /// Show or change preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Send a test notification
    TestNotify,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print current preferences
    Show,

    /// Choose how transitions are announced
    SetNotification {
        /// off, balloon or toast
        #[arg(value_name = "MODE")]
        mode: String,
    },

    /// Choose what happens to disconnected ports
    SetRetention {
        /// show, hide or hide-after
        #[arg(value_name = "MODE")]
        mode: String,

        /// Seconds a disconnected port stays listed in hide-after mode
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    let _logging_guard = logging::init();

    let result = match cli.command {
        Commands::Watch { interval_ms } => watch(Duration::from_millis(interval_ms)),
        Commands::List => list(),
        Commands::Config { action } => config(action),
        Commands::TestNotify => test_notify(),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "comport-notify failed");
        std::process::exit(1);
    }
}

fn file_settings() -> Result<FileSettings> {
    Ok(FileSettings::new(StorageConfig::from_env()?))
}

fn watch(interval: Duration) -> Result<()> {
    let mut monitor =
        PortMonitor::with_configured_notifier(SysfsPortSource::new(), file_settings()?);
    monitor.refresh(true);
    tracing::info!(
        ports = monitor.history().len(),
        interval_ms = interval.as_millis() as u64,
        "Watching serial ports"
    );

    loop {
        thread::sleep(interval);
        monitor.refresh(false);
    }
}

fn list() -> Result<()> {
    let mut monitor =
        PortMonitor::with_configured_notifier(SysfsPortSource::new(), file_settings()?);
    monitor.refresh(true);
    print!("{}", monitor.view(chrono::Utc::now()).render_text());
    Ok(())
}

fn config(action: ConfigAction) -> Result<()> {
    let settings = file_settings()?;

    let current = match action {
        ConfigAction::Show => settings.current(),
        ConfigAction::SetNotification { mode } => {
            let mode: NotificationMode = mode.parse()?;
            settings.update(|s| {
                s.notification_mode = mode;
                Ok(())
            })?
        }
        ConfigAction::SetRetention { mode, timeout_secs } => {
            let mode: DisconnectedMode = mode.parse()?;
            settings.update(|s| s.set_retention(mode, timeout_secs))?
        }
    };

    println!("notification: {}", current.notification_mode);
    println!("disconnected: {}", current.disconnected_mode);
    println!("timeout:      {}s", current.disconnected_timeout_secs);
    Ok(())
}

fn test_notify() -> Result<()> {
    let monitor = PortMonitor::with_configured_notifier(SysfsPortSource::new(), file_settings()?);
    match monitor.send_test_notification() {
        Ok(mode) => {
            println!("Sent test notification ({})", mode);
            Ok(())
        }
        Err(PortError::NotificationsDisabled) => {
            println!("Notifications are off");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
