// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Root coordinator: owns the active view, the transient notification, the
//! poll lifecycle and every agent call. Action results come back over an
//! `AppCommand` channel so the UI loop never blocks on the network.

use std::cell::RefCell;
use std::io::Stdout;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ratatui::{backend::CrosstermBackend, Terminal};
use throbber_widgets_tui::ThrobberState;

use crossterm::event::{self, Event as CrosstermEvent};
use strum_macros::{EnumCount, EnumIter};

use tokio::sync::{broadcast, mpsc};
use tokio::time;

use crate::agent::models::{
    AgentConfig, DownloadHistoryItem, HistoryPage, PackUrl, SearchHistoryItem, SearchResult,
    Transfer, TransferPriority,
};
use crate::agent::AgentClient;
use crate::config::Settings;
use crate::errors::AgentError;
use crate::history::HistoryBrowser;
use crate::monitor::{self, MonitorState, Poller, ResourceUpdate};
use crate::notify::Notifier;
use crate::search::{SearchEngine, DEFAULT_PROVIDERS};
use crate::settings_editor::{CommitOutcome, SettingsEditor};
use crate::tui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumCount)]
pub enum View {
    #[default]
    Search,
    Activities,
    History,
    Settings,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Search => "Search",
            View::Activities => "Activities",
            View::History => "History",
            View::Settings => "Settings",
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Search => View::Activities,
            View::Activities => View::History,
            View::History => View::Settings,
            View::Settings => View::Search,
        }
    }
}

/// Which text field keystrokes currently edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    EditQuery,
    EditNameFilter,
    EditMinSize,
    EditMaxSize,
    DirectUrl,
    EditSetting,
    NewNetworkName,
}

/// A destructive action awaiting its y/n answer.
pub struct ConfirmDialog {
    pub message: String,
    pub action: PendingAction,
}

pub enum PendingAction {
    DeleteSearchRow(i64),
    BulkDeleteSearches(Vec<i64>),
    DeleteDownloadRow { id: String, delete_file: bool },
    BulkDeleteDownloads { ids: Vec<String>, delete_files: bool },
}

/// Completion of a spawned agent call, delivered back to the UI loop.
pub enum AppCommand {
    SearchCompleted(Result<Vec<SearchResult>, AgentError>),
    DownloadStarted(Result<(), AgentError>),
    TransferCancelled(Result<(), AgentError>),
    TransferRetried(Result<(), AgentError>),
    PriorityChanged(Result<(), AgentError>),
    SearchHistoryLoaded(Result<HistoryPage<SearchHistoryItem>, AgentError>),
    DownloadHistoryLoaded(Result<HistoryPage<DownloadHistoryItem>, AgentError>),
    SearchRowsDeleted {
        ids: Vec<i64>,
        result: Result<(), AgentError>,
    },
    DownloadRowsDeleted {
        ids: Vec<String>,
        result: Result<(), AgentError>,
    },
    SettingsLoaded(Result<AgentConfig, AgentError>),
    SettingsSaved(Result<(), AgentError>),
    NetworkPersisted {
        name: String,
        result: Result<(), AgentError>,
    },
    NetworkDeleted {
        name: String,
        result: Result<(), AgentError>,
    },
}

#[derive(Default)]
pub struct AppState {
    pub should_quit: bool,
    pub view: View,
    pub input_mode: InputMode,
    pub confirm: Option<ConfirmDialog>,
    /// Shared buffer for the small text prompts (filters, network name).
    pub prompt_buffer: String,
    pub activities_cursor: usize,
    pub throbber: RefCell<ThrobberState>,
}

pub struct App {
    pub state: AppState,
    pub settings: Settings,
    pub client: AgentClient,
    pub notifier: Notifier,

    pub monitor: MonitorState,
    pub search: SearchEngine,
    pub history: HistoryBrowser,
    pub editor: SettingsEditor,

    poller: Option<Poller>,
    poll_seq: Arc<AtomicU64>,

    monitor_tx: mpsc::UnboundedSender<ResourceUpdate>,
    monitor_rx: Option<mpsc::UnboundedReceiver<ResourceUpdate>>,
    command_tx: mpsc::UnboundedSender<AppCommand>,
    command_rx: Option<mpsc::UnboundedReceiver<AppCommand>>,
    tui_event_tx: mpsc::Sender<CrosstermEvent>,
    tui_event_rx: Option<mpsc::Receiver<CrosstermEvent>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let client = AgentClient::new(
            settings.agent_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
            Duration::from_secs(settings.connect_timeout_secs),
        );
        let notifier = Notifier::new(Duration::from_millis(settings.notification_ttl_ms));
        let history = HistoryBrowser::new(settings.history_page_size);

        let (monitor_tx, monitor_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (tui_event_tx, tui_event_rx) = mpsc::channel(100);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            state: AppState::default(),
            settings,
            client,
            notifier,
            monitor: MonitorState::default(),
            search: SearchEngine::default(),
            history,
            editor: SettingsEditor::default(),
            poller: None,
            poll_seq: Arc::new(AtomicU64::new(0)),
            monitor_tx,
            monitor_rx: Some(monitor_rx),
            command_tx,
            command_rx: Some(command_rx),
            tui_event_tx,
            tui_event_rx: Some(tui_event_rx),
            shutdown_tx,
        }
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // --- Spawn TUI event reader task ---
        let tui_event_tx = self.tui_event_tx.clone();
        let mut tui_shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tui_shutdown_rx.recv() => break,

                    result = tokio::task::spawn_blocking(event::read) => {
                        let event = match result {
                            Ok(Ok(e)) => e,
                            Ok(Err(e)) => {
                                tracing::error!("Crossterm event read error: {}", e);
                                break;
                            }
                            Err(e) => {
                                tracing::error!("Blocking TUI read task panicked: {}", e);
                                break;
                            }
                        };

                        if tui_event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let mut tui_event_rx = self.tui_event_rx.take().expect("run called twice");
        let mut monitor_rx = self.monitor_rx.take().expect("run called twice");
        let mut command_rx = self.command_rx.take().expect("run called twice");

        let mut draw_interval = time::interval(Duration::from_millis(100));

        loop {
            tokio::select! {
                Some(event) = tui_event_rx.recv() => {
                    tui::events::handle_event(event, self);
                }

                Some(update) = monitor_rx.recv() => {
                    self.monitor.apply(update);
                    self.clamp_activities_cursor();
                }

                Some(command) = command_rx.recv() => {
                    self.handle_command(command);
                }

                _ = draw_interval.tick() => {
                    self.notifier.tick();
                    self.state.throbber.borrow_mut().calc_next();
                    terminal.draw(|f| tui::view::draw(f, self))?;
                }
            }

            if self.state.should_quit {
                let _ = self.shutdown_tx.send(());
                break;
            }
        }

        Ok(())
    }

    // ---- View lifecycle ----

    pub fn set_view(&mut self, view: View) {
        if self.state.view == view {
            return;
        }
        self.state.view = view;
        self.state.input_mode = InputMode::Normal;

        // The poll interval lives exactly as long as the Activities view.
        match view {
            View::Activities => self.start_poller(),
            _ => self.poller = None,
        }

        match view {
            View::History => self.fetch_visible_history(1),
            View::Settings => self.load_agent_settings(),
            _ => {}
        }
    }

    fn start_poller(&mut self) {
        let generation = self.monitor.begin_generation();
        self.poller = Some(Poller::spawn(
            self.client.clone(),
            self.monitor_tx.clone(),
            generation,
            self.poll_seq.clone(),
            Duration::from_millis(self.settings.poll_interval_ms.max(100)),
        ));
    }

    /// Reconcile now instead of waiting for the next tick. Works with or
    /// without an active poller (actions can fire from any view).
    pub fn force_reconcile(&mut self) {
        if let Some(poller) = &self.poller {
            poller.force();
        } else {
            let seq = self.poll_seq.fetch_add(1, Ordering::Relaxed) + 1;
            monitor::spawn_fetch_round(
                self.client.clone(),
                self.monitor_tx.clone(),
                self.monitor.generation(),
                seq,
            );
        }
    }

    fn clamp_activities_cursor(&mut self) {
        let len = self.monitor.transfers.len();
        self.state.activities_cursor = if len == 0 {
            0
        } else {
            self.state.activities_cursor.min(len - 1)
        };
    }

    pub fn selected_transfer(&self) -> Option<&Transfer> {
        self.monitor.transfers.get(self.state.activities_cursor)
    }

    /// Provider names the search view can cycle through.
    pub fn available_providers(&self) -> Vec<String> {
        match &self.editor.doc {
            Some(doc) if !doc.enabled_providers.is_empty() => doc.enabled_providers.clone(),
            _ => DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect(),
        }
    }

    // ---- Search actions ----

    pub fn submit_search(&mut self) {
        let Some(query) = self.search.prepare_query() else {
            // No network call for an empty query; the result set stays put.
            self.notifier.info("Enter a search query first");
            return;
        };
        if self.search.loading {
            return;
        }
        self.search.loading = true;

        let providers = self.search.providers_param();
        let client = self.client.clone();
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = client.search(&query, &providers).await;
            let _ = tx.send(AppCommand::SearchCompleted(result));
        });
    }

    pub fn start_download(&mut self, url: PackUrl) {
        let client = self.client.clone();
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = client.start_download(&url.to_url()).await;
            let _ = tx.send(AppCommand::DownloadStarted(result));
        });
    }

    // ---- Transfer actions ----

    pub fn cancel_selected_transfer(&mut self) {
        let Some(transfer) = self.selected_transfer() else {
            return;
        };
        if transfer.status.can_retry() {
            // Retry is the only control offered in these states.
            return;
        }
        let id = transfer.id.clone();
        let client = self.client.clone();
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = client.cancel_transfer(&id).await;
            let _ = tx.send(AppCommand::TransferCancelled(result));
        });
    }

    pub fn retry_selected_transfer(&mut self) {
        let Some(transfer) = self.selected_transfer() else {
            return;
        };
        if !transfer.status.can_retry() {
            return;
        }
        let id = transfer.id.clone();
        let client = self.client.clone();
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = client.retry_transfer(&id).await;
            let _ = tx.send(AppCommand::TransferRetried(result));
        });
    }

    pub fn change_selected_priority(&mut self, raise: bool) {
        let Some(transfer) = self.selected_transfer() else {
            return;
        };
        let id = transfer.id.clone();
        let priority = if raise {
            transfer.priority.raised()
        } else {
            transfer.priority.lowered()
        };
        if priority == transfer.priority {
            return;
        }
        self.set_priority(id, priority);
    }

    fn set_priority(&mut self, id: String, priority: TransferPriority) {
        let client = self.client.clone();
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = client.set_priority(&id, priority).await;
            let _ = tx.send(AppCommand::PriorityChanged(result));
        });
    }

    // ---- History actions ----

    /// Fetch the given page (clamped) of whichever kind is visible.
    pub fn fetch_visible_history(&mut self, page: i64) {
        match self.history.kind {
            crate::history::HistoryKind::Searches => {
                let page = self.history.searches.clamp_page(page);
                let limit = self.history.searches.limit;
                let client = self.client.clone();
                let tx = self.command_tx.clone();
                tokio::spawn(async move {
                    let result = client.search_history(page, limit).await;
                    let _ = tx.send(AppCommand::SearchHistoryLoaded(result));
                });
            }
            crate::history::HistoryKind::Downloads => {
                let page = self.history.downloads.clamp_page(page);
                let limit = self.history.downloads.limit;
                let client = self.client.clone();
                let tx = self.command_tx.clone();
                tokio::spawn(async move {
                    let result = client.download_history(page, limit).await;
                    let _ = tx.send(AppCommand::DownloadHistoryLoaded(result));
                });
            }
        }
    }

    pub fn request_confirm(&mut self, message: String, action: PendingAction) {
        self.state.confirm = Some(ConfirmDialog { message, action });
    }

    pub fn confirm_accept(&mut self) {
        if let Some(dialog) = self.state.confirm.take() {
            self.execute_pending(dialog.action);
        }
    }

    pub fn confirm_decline(&mut self) {
        // The user declined; the action is simply dropped.
        self.state.confirm = None;
    }

    fn execute_pending(&mut self, action: PendingAction) {
        let client = self.client.clone();
        let tx = self.command_tx.clone();
        match action {
            PendingAction::DeleteSearchRow(id) => {
                tokio::spawn(async move {
                    let result = client.delete_search_history(id).await;
                    let _ = tx.send(AppCommand::SearchRowsDeleted {
                        ids: vec![id],
                        result,
                    });
                });
            }
            PendingAction::BulkDeleteSearches(ids) => {
                tokio::spawn(async move {
                    let result = client.bulk_delete_search_history(&ids).await;
                    let _ = tx.send(AppCommand::SearchRowsDeleted { ids, result });
                });
            }
            PendingAction::DeleteDownloadRow { id, delete_file } => {
                tokio::spawn(async move {
                    let result = client.delete_download_history(&id, delete_file).await;
                    let _ = tx.send(AppCommand::DownloadRowsDeleted {
                        ids: vec![id],
                        result,
                    });
                });
            }
            PendingAction::BulkDeleteDownloads { ids, delete_files } => {
                tokio::spawn(async move {
                    let result = client.bulk_delete_download_history(&ids, delete_files).await;
                    let _ = tx.send(AppCommand::DownloadRowsDeleted { ids, result });
                });
            }
        }
    }

    // ---- Settings actions ----

    pub fn load_agent_settings(&mut self) {
        let client = self.client.clone();
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = client.settings().await;
            let _ = tx.send(AppCommand::SettingsLoaded(result));
        });
    }

    pub fn save_agent_settings(&mut self) {
        let Some(doc) = self.editor.doc.clone() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = client.save_settings(&doc).await;
            let _ = tx.send(AppCommand::SettingsSaved(result));
        });
    }

    /// Route an editor commit: deferred edits wait for save, network edits
    /// persist eagerly right now.
    pub fn handle_commit_outcome(&mut self, outcome: CommitOutcome) {
        match outcome {
            CommitOutcome::Noop | CommitOutcome::Deferred => {}
            CommitOutcome::PersistNetwork(name, network) => {
                let client = self.client.clone();
                let tx = self.command_tx.clone();
                tokio::spawn(async move {
                    let result = client.put_network(&name, &network).await;
                    let _ = tx.send(AppCommand::NetworkPersisted { name, result });
                });
            }
            CommitOutcome::DeleteNetwork(name) => {
                let client = self.client.clone();
                let tx = self.command_tx.clone();
                tokio::spawn(async move {
                    let result = client.delete_network(&name).await;
                    let _ = tx.send(AppCommand::NetworkDeleted { name, result });
                });
            }
            CommitOutcome::Invalid(message) => {
                self.notifier.error(message);
            }
        }
    }

    // ---- Completions ----

    fn handle_command(&mut self, command: AppCommand) {
        match command {
            AppCommand::SearchCompleted(Ok(results)) => {
                let count = results.len();
                self.search.apply_results(results);
                self.notifier.success(format!("{} results", count));
            }
            AppCommand::SearchCompleted(Err(e)) => {
                tracing::error!("Search failed: {}", e);
                self.search.apply_failure();
                self.notifier.error("Search failed");
            }

            AppCommand::DownloadStarted(Ok(())) => {
                self.notifier.success("Download started");
                self.force_reconcile();
            }
            AppCommand::DownloadStarted(Err(e)) => {
                tracing::error!("Failed to start download: {}", e);
                self.notifier.error("Failed to start download");
            }

            AppCommand::TransferCancelled(Ok(())) => {
                self.notifier.success("Transfer cancelled");
                self.force_reconcile();
            }
            AppCommand::TransferCancelled(Err(e)) => {
                tracing::error!("Cancel failed: {}", e);
                self.notifier.error("Failed to cancel transfer");
                self.force_reconcile();
            }

            AppCommand::TransferRetried(Ok(())) => {
                self.notifier.success("Retry requested");
                self.force_reconcile();
            }
            AppCommand::TransferRetried(Err(e)) => {
                tracing::error!("Retry failed: {}", e);
                self.notifier.error("Failed to retry transfer");
                self.force_reconcile();
            }

            AppCommand::PriorityChanged(Ok(())) => {
                self.notifier.success("Priority updated");
                self.force_reconcile();
            }
            AppCommand::PriorityChanged(Err(e)) => {
                tracing::error!("Priority change failed: {}", e);
                self.notifier.error("Failed to change priority");
            }

            AppCommand::SearchHistoryLoaded(Ok(page)) => {
                self.history.searches.apply(page);
            }
            AppCommand::SearchHistoryLoaded(Err(e)) => {
                tracing::error!("Search history fetch failed: {}", e);
                self.notifier
                    .error(format!("Failed to load search history: {}", e.summary()));
            }

            AppCommand::DownloadHistoryLoaded(Ok(page)) => {
                self.history.downloads.apply(page);
            }
            AppCommand::DownloadHistoryLoaded(Err(e)) => {
                tracing::error!("Download history fetch failed: {}", e);
                self.notifier
                    .error(format!("Failed to load download history: {}", e.summary()));
            }

            AppCommand::SearchRowsDeleted { ids, result } => match result {
                Ok(()) => {
                    let count = ids.len();
                    self.history.remove_searches(&ids);
                    self.notifier.success(format!("Deleted {} record(s)", count));
                }
                Err(e) => {
                    tracing::error!("Search history delete failed: {}", e);
                    self.notifier.error("Delete failed");
                }
            },

            AppCommand::DownloadRowsDeleted { ids, result } => match result {
                Ok(()) => {
                    let count = ids.len();
                    self.history.remove_downloads(&ids);
                    self.notifier.success(format!("Deleted {} record(s)", count));
                }
                Err(e) => {
                    tracing::error!("Download history delete failed: {}", e);
                    self.notifier.error("Delete failed");
                }
            },

            AppCommand::SettingsLoaded(Ok(config)) => {
                self.editor.load(config);
            }
            AppCommand::SettingsLoaded(Err(e)) => {
                tracing::error!("Settings fetch failed: {}", e);
                self.notifier
                    .error(format!("Failed to load settings: {}", e.summary()));
            }

            AppCommand::SettingsSaved(Ok(())) => {
                self.editor.dirty = false;
                self.notifier.success("Settings saved");
            }
            AppCommand::SettingsSaved(Err(e)) => {
                tracing::error!("Settings save failed: {}", e);
                self.notifier.error("Failed to save settings");
            }

            AppCommand::NetworkPersisted { name, result } => match result {
                Ok(()) => self.notifier.success(format!("Network {} saved", name)),
                Err(e) => {
                    tracing::error!("Network {} save failed: {}", name, e);
                    self.notifier.error(format!("Failed to save network {}", name));
                }
            },

            AppCommand::NetworkDeleted { name, result } => match result {
                Ok(()) => self.notifier.success(format!("Network {} removed", name)),
                Err(e) => {
                    tracing::error!("Network {} delete failed: {}", name, e);
                    self.notifier
                        .error(format!("Failed to remove network {}", name));
                }
            },
        }
    }
}
