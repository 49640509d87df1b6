// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

mod agent;
mod app;
mod config;
mod errors;
mod history;
mod monitor;
mod notify;
mod search;
mod settings_editor;
mod theme;
mod tui;

use app::App;

use std::env;
use std::fs;
use std::io::stdout;
use std::path::PathBuf;

use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;

use ratatui::{backend::CrosstermBackend, Terminal};

use tracing_subscriber::filter::Targets;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

// Conditionally import the flags ONLY on non-Windows platforms
#[cfg(not(windows))]
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};

use clap::Parser;

const DEFAULT_LOG_FILTER: LevelFilter = LevelFilter::INFO;

#[derive(Parser)]
#[command(name = "packdeck", version, about = "Terminal console for a pack-download agent")]
struct Cli {
    /// Agent base URL, overriding the configured one
    #[arg(short = 'u', long)]
    agent_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_data_dir = config::get_app_paths()
        .map(|(_, data_dir)| data_dir)
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let log_dir = base_data_dir.join("logs");
    let general_log = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(31)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(&log_dir)
        .expect("Failed to initialize rolling file appender");
    let (non_blocking_general, _guard_general) = tracing_appender::non_blocking(general_log);
    let _subscriber_result = {
        if fs::create_dir_all(&log_dir).is_ok() {
            let quiet_filter = Targets::new()
                .with_default(DEFAULT_LOG_FILTER)
                .with_target("hyper", LevelFilter::WARN)
                .with_target("reqwest", LevelFilter::WARN);

            let general_layer = fmt::layer()
                .with_writer(non_blocking_general)
                .with_ansi(false)
                .with_filter(quiet_filter);

            tracing_subscriber::registry()
                .with(general_layer)
                .try_init()
        } else {
            tracing_subscriber::registry().try_init()
        }
    };

    tracing::info!("STARTING PACKDECK");

    let cli = Cli::parse();

    let mut settings = config::load_settings();
    if let Err(e) = config::save_settings(&settings) {
        tracing::error!("Failed to write settings file: {}", e);
    }
    // The CLI override is session-only and never written back.
    if let Some(agent_url) = cli.agent_url {
        settings.agent_url = agent_url;
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = cleanup_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen,)?;

    // This command ONLY runs on non-Windows platforms (like Linux)
    #[cfg(not(windows))]
    {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES),
            EnableBracketedPaste
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings);
    if let Err(e) = app.run(&mut terminal).await {
        eprintln!("[Error] Application failed: {}", e);
    }

    cleanup_terminal()?;

    Ok(())
}

fn cleanup_terminal() -> Result<(), Box<dyn std::error::Error>> {
    disable_raw_mode()?;
    // Common cleanup for all platforms
    execute!(stdout(), LeaveAlternateScreen,)?;

    // Corresponding cleanup ONLY for non-Windows platforms
    #[cfg(not(windows))]
    {
        execute!(stdout(), PopKeyboardEnhancementFlags, DisableBracketedPaste)?;
    }

    Ok(())
}
