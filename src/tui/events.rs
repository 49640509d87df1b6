// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEventKind};

use crate::app::{App, InputMode, PendingAction, View};
use crate::history::HistoryKind;

pub fn handle_event(event: CrosstermEvent, app: &mut App) {
    let CrosstermEvent::Key(key) = event else {
        return;
    };
    if key.kind != KeyEventKind::Press {
        return;
    }

    // A pending confirmation swallows everything until answered.
    if app.state.confirm.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_accept(),
            _ => app.confirm_decline(),
        }
        return;
    }

    if app.state.input_mode != InputMode::Normal {
        handle_text_input(key.code, app);
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.set_view(app.state.view.next());
            return;
        }
        KeyCode::Char('1') => {
            app.set_view(View::Search);
            return;
        }
        KeyCode::Char('2') => {
            app.set_view(View::Activities);
            return;
        }
        KeyCode::Char('3') => {
            app.set_view(View::History);
            return;
        }
        KeyCode::Char('4') => {
            app.set_view(View::Settings);
            return;
        }
        _ => {}
    }

    match app.state.view {
        View::Search => handle_search_keys(key.code, app),
        View::Activities => handle_activities_keys(key.code, app),
        View::History => handle_history_keys(key.code, app),
        View::Settings => handle_settings_keys(key.code, app),
    }
}

fn handle_text_input(code: KeyCode, app: &mut App) {
    match app.state.input_mode {
        InputMode::Normal => {}

        InputMode::EditQuery => match code {
            KeyCode::Esc => app.state.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                app.state.input_mode = InputMode::Normal;
                app.submit_search();
            }
            KeyCode::Backspace => {
                app.search.query.pop();
            }
            KeyCode::Char(c) => app.search.query.push(c),
            _ => {}
        },

        // The name filter narrows live, on every keystroke.
        InputMode::EditNameFilter => match code {
            KeyCode::Esc => {
                app.search.filters.file_name.clear();
                app.search.cursor = 0;
                app.state.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => app.state.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                app.search.filters.file_name.pop();
                app.search.cursor = 0;
            }
            KeyCode::Char(c) => {
                app.search.filters.file_name.push(c);
                app.search.cursor = 0;
            }
            _ => {}
        },

        InputMode::EditMinSize | InputMode::EditMaxSize => match code {
            KeyCode::Esc => app.state.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                let is_min = app.state.input_mode == InputMode::EditMinSize;
                app.state.input_mode = InputMode::Normal;
                let raw = app.state.prompt_buffer.trim().to_string();
                let bound = if raw.is_empty() {
                    None
                } else {
                    match raw.parse::<u64>() {
                        Ok(mb) => Some(mb),
                        Err(_) => {
                            app.notifier.error(format!("Not a number: {}", raw));
                            return;
                        }
                    }
                };
                if is_min {
                    app.search.filters.min_mb = bound;
                } else {
                    app.search.filters.max_mb = bound;
                }
                app.search.cursor = 0;
            }
            KeyCode::Backspace => {
                app.state.prompt_buffer.pop();
            }
            KeyCode::Char(c) => app.state.prompt_buffer.push(c),
            _ => {}
        },

        InputMode::DirectUrl => match code {
            KeyCode::Esc => app.state.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                app.state.input_mode = InputMode::Normal;
                match crate::agent::models::PackUrl::parse(app.state.prompt_buffer.trim()) {
                    Ok(url) => app.start_download(url),
                    Err(e) => app.notifier.error(e),
                }
            }
            KeyCode::Backspace => {
                app.state.prompt_buffer.pop();
            }
            KeyCode::Char(c) => app.state.prompt_buffer.push(c),
            _ => {}
        },

        InputMode::EditSetting => match code {
            KeyCode::Esc => {
                app.editor.cancel_edit();
                app.state.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                app.state.input_mode = InputMode::Normal;
                let outcome = app.editor.commit_edit();
                app.handle_commit_outcome(outcome);
            }
            KeyCode::Backspace => {
                if let Some(buffer) = app.editor.editing.as_mut() {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = app.editor.editing.as_mut() {
                    buffer.push(c);
                }
            }
            _ => {}
        },

        InputMode::NewNetworkName => match code {
            KeyCode::Esc => app.state.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                app.state.input_mode = InputMode::Normal;
                let name = app.state.prompt_buffer.clone();
                let outcome = app.editor.add_network(&name);
                app.handle_commit_outcome(outcome);
            }
            KeyCode::Backspace => {
                app.state.prompt_buffer.pop();
            }
            KeyCode::Char(c) => app.state.prompt_buffer.push(c),
            _ => {}
        },
    }
}

fn handle_search_keys(code: KeyCode, app: &mut App) {
    match code {
        KeyCode::Char('/') => app.state.input_mode = InputMode::EditQuery,
        KeyCode::Char('n') => app.state.input_mode = InputMode::EditNameFilter,
        KeyCode::Char('m') => {
            app.state.prompt_buffer = app
                .search
                .filters
                .min_mb
                .map(|v| v.to_string())
                .unwrap_or_default();
            app.state.input_mode = InputMode::EditMinSize;
        }
        KeyCode::Char('M') => {
            app.state.prompt_buffer = app
                .search
                .filters
                .max_mb
                .map(|v| v.to_string())
                .unwrap_or_default();
            app.state.input_mode = InputMode::EditMaxSize;
        }
        KeyCode::Char('u') => {
            app.state.prompt_buffer.clear();
            app.state.input_mode = InputMode::DirectUrl;
        }
        KeyCode::Char('f') => app.search.cycle_server_filter(),
        KeyCode::Char('p') => {
            let providers = app.available_providers();
            app.search.cycle_provider(&providers);
        }
        KeyCode::Char('c') => app.search.clear_filters(),
        KeyCode::Up | KeyCode::Char('k') => move_search_cursor(app, -1),
        KeyCode::Down | KeyCode::Char('j') => move_search_cursor(app, 1),
        KeyCode::Enter | KeyCode::Char('d') => {
            let url = app
                .search
                .filtered()
                .get(app.search.cursor)
                .map(|r| r.pack_url());
            if let Some(url) = url {
                app.start_download(url);
            }
        }
        _ => {}
    }
}

fn move_search_cursor(app: &mut App, delta: isize) {
    let len = app.search.filtered().len();
    if len == 0 {
        app.search.cursor = 0;
        return;
    }
    let next = (app.search.cursor as isize + delta).clamp(0, len as isize - 1);
    app.search.cursor = next as usize;
}

fn handle_activities_keys(code: KeyCode, app: &mut App) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.state.activities_cursor = app.state.activities_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let len = app.monitor.transfers.len();
            if len > 0 {
                app.state.activities_cursor = (app.state.activities_cursor + 1).min(len - 1);
            }
        }
        KeyCode::Char('c') => app.cancel_selected_transfer(),
        KeyCode::Char('r') => app.retry_selected_transfer(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_selected_priority(true),
        KeyCode::Char('-') => app.change_selected_priority(false),
        _ => {}
    }
}

fn handle_history_keys(code: KeyCode, app: &mut App) {
    match code {
        KeyCode::Char('t') => {
            app.history.toggle_kind();
            let page = match app.history.kind {
                HistoryKind::Searches => app.history.searches.page,
                HistoryKind::Downloads => app.history.downloads.page,
            };
            app.fetch_visible_history(page);
        }
        KeyCode::Left | KeyCode::Char('h') => {
            let page = match app.history.kind {
                HistoryKind::Searches => app.history.searches.page - 1,
                HistoryKind::Downloads => app.history.downloads.page - 1,
            };
            app.fetch_visible_history(page);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            let page = match app.history.kind {
                HistoryKind::Searches => app.history.searches.page + 1,
                HistoryKind::Downloads => app.history.downloads.page + 1,
            };
            app.fetch_visible_history(page);
        }
        KeyCode::Up | KeyCode::Char('k') => match app.history.kind {
            HistoryKind::Searches => app.history.searches.move_cursor(-1),
            HistoryKind::Downloads => app.history.downloads.move_cursor(-1),
        },
        KeyCode::Down | KeyCode::Char('j') => match app.history.kind {
            HistoryKind::Searches => app.history.searches.move_cursor(1),
            HistoryKind::Downloads => app.history.downloads.move_cursor(1),
        },
        KeyCode::Char(' ') => match app.history.kind {
            HistoryKind::Searches => app.history.toggle_select_search(),
            HistoryKind::Downloads => app.history.toggle_select_download(),
        },
        KeyCode::Char('a') => match app.history.kind {
            HistoryKind::Searches => app.history.toggle_select_all_searches(),
            HistoryKind::Downloads => app.history.toggle_select_all_downloads(),
        },

        // Single-row deletion. For downloads, 'x' keeps the file on disk and
        // 'X' removes it too; the confirmation text reflects which one.
        KeyCode::Char('x') => match app.history.kind {
            HistoryKind::Searches => {
                if let Some(id) = app.history.current_search().map(|i| i.id) {
                    app.request_confirm(
                        "Delete this search record?".to_string(),
                        PendingAction::DeleteSearchRow(id),
                    );
                }
            }
            HistoryKind::Downloads => {
                if let Some(id) = app.history.current_download().map(|i| i.id.clone()) {
                    app.request_confirm(
                        "Delete this download record? The downloaded file is kept.".to_string(),
                        PendingAction::DeleteDownloadRow {
                            id,
                            delete_file: false,
                        },
                    );
                }
            }
        },
        KeyCode::Char('X') => {
            if app.history.kind == HistoryKind::Downloads {
                if let Some(id) = app.history.current_download().map(|i| i.id.clone()) {
                    app.request_confirm(
                        "Delete this download record AND its file from disk?".to_string(),
                        PendingAction::DeleteDownloadRow {
                            id,
                            delete_file: true,
                        },
                    );
                }
            }
        }

        // Bulk deletion over the current selection.
        KeyCode::Char('b') => match app.history.kind {
            HistoryKind::Searches => {
                let ids: Vec<i64> = app.history.selected_searches.iter().copied().collect();
                if !ids.is_empty() {
                    app.request_confirm(
                        format!("Delete {} search record(s)?", ids.len()),
                        PendingAction::BulkDeleteSearches(ids),
                    );
                }
            }
            HistoryKind::Downloads => {
                let ids: Vec<String> = app.history.selected_downloads.iter().cloned().collect();
                if !ids.is_empty() {
                    app.request_confirm(
                        format!("Delete {} download record(s)? Files are kept.", ids.len()),
                        PendingAction::BulkDeleteDownloads {
                            ids,
                            delete_files: false,
                        },
                    );
                }
            }
        },
        KeyCode::Char('B') => {
            if app.history.kind == HistoryKind::Downloads {
                let ids: Vec<String> = app.history.selected_downloads.iter().cloned().collect();
                if !ids.is_empty() {
                    app.request_confirm(
                        format!(
                            "Delete {} download record(s) AND their files from disk?",
                            ids.len()
                        ),
                        PendingAction::BulkDeleteDownloads {
                            ids,
                            delete_files: true,
                        },
                    );
                }
            }
        }

        KeyCode::Enter => {
            if app.history.kind == HistoryKind::Searches {
                app.history.toggle_expand();
            }
        }
        KeyCode::Char('K') => {
            if let Some(expanded) = app.history.expanded.as_mut() {
                expanded.cursor = expanded.cursor.saturating_sub(1);
            }
        }
        KeyCode::Char('J') => {
            if let Some(expanded) = app.history.expanded.as_mut() {
                if !expanded.results.is_empty() {
                    expanded.cursor = (expanded.cursor + 1).min(expanded.results.len() - 1);
                }
            }
        }
        KeyCode::Char('d') => {
            let url = app
                .history
                .expanded
                .as_ref()
                .and_then(|e| e.results.get(e.cursor))
                .map(|r| r.pack_url());
            if let Some(url) = url {
                app.start_download(url);
            }
        }
        _ => {}
    }
}

fn handle_settings_keys(code: KeyCode, app: &mut App) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => app.editor.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.editor.move_cursor(1),
        KeyCode::Enter => {
            if app.editor.doc.is_some() {
                app.editor.begin_edit();
                app.state.input_mode = InputMode::EditSetting;
            }
        }
        KeyCode::Char(' ') => {
            let outcome = app.editor.toggle_current();
            app.handle_commit_outcome(outcome);
        }
        KeyCode::Char('s') => app.save_agent_settings(),
        KeyCode::Char('n') => {
            if app.editor.doc.is_some() {
                app.state.prompt_buffer.clear();
                app.state.input_mode = InputMode::NewNetworkName;
            }
        }
        KeyCode::Char('D') => {
            if let Some(name) = app.editor.current_network_name() {
                let outcome = app.editor.remove_network(&name);
                app.handle_commit_outcome(outcome);
            }
        }
        KeyCode::Char('R') => app.load_agent_settings(),
        _ => {}
    }
}
