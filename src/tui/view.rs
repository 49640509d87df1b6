// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use ratatui::{prelude::*, symbols, widgets::*};

use strum::IntoEnumIterator;
use throbber_widgets_tui::Throbber;

use crate::agent::models::{Transfer, TransferStatus};
use crate::app::{App, InputMode, View};
use crate::history::HistoryKind;
use crate::notify::NoticeLevel;
use crate::theme;
use crate::tui::formatters::{
    centered_rect, format_bytes, format_eta, format_opt_bytes, format_speed, format_timestamp,
    truncate_with_ellipsis,
};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_tabs(f, app, chunks[0]);

    match app.state.view {
        View::Search => draw_search(f, app, chunks[1]),
        View::Activities => draw_activities(f, app, chunks[1]),
        View::History => draw_history(f, app, chunks[1]),
        View::Settings => draw_settings(f, app, chunks[1]),
    }

    draw_status_line(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if let Some(dialog) = &app.state.confirm {
        draw_confirm_dialog(f, &dialog.message, area);
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {} {} ", i + 1, view.title())))
        .collect();
    let selected = View::iter()
        .position(|v| v == app.state.view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(theme::SUBTEXT0))
        .highlight_style(
            Style::default()
                .fg(theme::LAVENDER)
                .add_modifier(Modifier::BOLD),
        )
        .divider(symbols::line::VERTICAL);
    f.render_widget(tabs, area);
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    // An active prompt owns the status line while the user types into it.
    let prompt_label = match app.state.input_mode {
        InputMode::EditMinSize => Some("min size (MB): "),
        InputMode::EditMaxSize => Some("max size (MB): "),
        InputMode::DirectUrl => Some("pack url: "),
        _ => None,
    };
    if let Some(label) = prompt_label {
        let line = Line::from(vec![
            Span::styled(format!(" {}", label), Style::default().fg(theme::SUBTEXT0)),
            Span::styled(
                app.state.prompt_buffer.clone(),
                Style::default().fg(theme::TEXT),
            ),
            Span::styled("█", Style::default().fg(theme::LAVENDER)),
        ]);
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let line = match app.notifier.current() {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => theme::SKY,
                NoticeLevel::Success => theme::GREEN,
                NoticeLevel::Error => theme::RED,
            };
            Line::from(Span::styled(
                format!(" {} ", notice.text),
                Style::default().fg(theme::BASE).bg(color),
            ))
        }
        None => Line::from(Span::styled(
            format!(" agent: {}", app.client.base_url()),
            Style::default().fg(theme::OVERLAY0),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = match app.state.input_mode {
        InputMode::EditQuery => "type query · Enter search · Esc close",
        InputMode::EditNameFilter => "type to narrow · Enter keep · Esc clear",
        InputMode::EditMinSize | InputMode::EditMaxSize => {
            "size bound in MB (empty clears) · Enter apply · Esc cancel"
        }
        InputMode::DirectUrl => "irc://server/channel/bot/pack · Enter download · Esc cancel",
        InputMode::EditSetting => "edit value · Enter commit · Esc discard",
        InputMode::NewNetworkName => "network name · Enter create · Esc cancel",
        InputMode::Normal => match app.state.view {
            View::Search => {
                "/ query · n name · m/M size · f server · p provider · u url · d download · q quit"
            }
            View::Activities => "c cancel · r retry · +/- priority · j/k move · q quit",
            View::History => {
                "t kind · h/l page · space sel · a all · x/X del · b/B bulk · Enter expand · q quit"
            }
            View::Settings => "Enter edit · space toggle · s save · n new net · D del net · q quit",
        },
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", hints),
            Style::default().fg(theme::OVERLAY0),
        ))),
        area,
    );
}

// ---- Search view ----

fn draw_search(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let query_style = if app.state.input_mode == InputMode::EditQuery {
        Style::default().fg(theme::TEXT)
    } else {
        Style::default().fg(theme::SUBTEXT0)
    };
    let mut query_line = vec![Span::styled(app.search.query.clone(), query_style)];
    if app.state.input_mode == InputMode::EditQuery {
        query_line.push(Span::styled("█", Style::default().fg(theme::LAVENDER)));
    }
    let provider_label = app
        .search
        .provider
        .clone()
        .unwrap_or_else(|| "all providers".to_string());
    let query_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::SURFACE1))
        .title(format!(" Search ({}) ", provider_label));
    f.render_widget(Paragraph::new(Line::from(query_line)).block(query_block), chunks[0]);

    if app.search.loading {
        let throbber = Throbber::default()
            .label("searching providers...")
            .style(Style::default().fg(theme::PEACH))
            .throbber_style(Style::default().fg(theme::PEACH));
        f.render_stateful_widget(throbber, chunks[1], &mut app.state.throbber.borrow_mut());
    } else {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                filter_summary(app),
                Style::default().fg(theme::SUBTEXT0),
            ))),
            chunks[1],
        );
    }

    let filtered = app.search.filtered();
    let header = Row::new(vec!["File", "Size", "Server", "Channel", "Bot", "Pack", "Gets"])
        .style(Style::default().fg(theme::MAUVE).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = filtered
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let style = if i == app.search.cursor {
                Style::default().bg(theme::SURFACE1).fg(theme::TEXT)
            } else {
                Style::default().fg(theme::SUBTEXT0)
            };
            Row::new(vec![
                truncate_with_ellipsis(&result.file_name, 48),
                format_opt_bytes(result.file_size),
                result.server.clone(),
                result.channel.clone(),
                result.bot.clone(),
                format!("#{}", result.pack_number),
                result
                    .downloads
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ])
            .style(style)
        })
        .collect();

    let title = format!(" Results {} / {} ", filtered.len(), app.search.results.len());
    let table = Table::new(
        rows,
        [
            Constraint::Min(30),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(7),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::SURFACE1))
            .title(title),
    );
    f.render_widget(table, chunks[2]);
}

fn filter_summary(app: &App) -> String {
    let filters = &app.search.filters;
    if filters.is_empty() {
        return " no filters".to_string();
    }
    let mut parts = Vec::new();
    if !filters.file_name.is_empty() {
        parts.push(format!("name~\"{}\"", filters.file_name));
    }
    if let Some(server) = &filters.server {
        let display = app
            .search
            .server_facets()
            .into_iter()
            .find(|facet| &facet.key == server)
            .map(|facet| facet.display)
            .unwrap_or_else(|| server.clone());
        parts.push(format!("server={}", display));
    }
    match (filters.min_mb, filters.max_mb) {
        (Some(min), Some(max)) => parts.push(format!("size {}-{} MB", min, max)),
        (Some(min), None) => parts.push(format!("size >= {} MB", min)),
        (None, Some(max)) => parts.push(format!("size <= {} MB", max)),
        (None, None) => {}
    }
    format!(" filters: {}", parts.join("  "))
}

// ---- Activities view ----

fn status_style(status: TransferStatus) -> Style {
    match status {
        TransferStatus::Downloading => Style::default().fg(theme::GREEN),
        TransferStatus::Pending => Style::default().fg(theme::SUBTEXT0),
        TransferStatus::Connecting | TransferStatus::Joining | TransferStatus::Requesting => {
            Style::default().fg(theme::PEACH)
        }
        TransferStatus::Completed => Style::default().fg(theme::TEAL),
        TransferStatus::Failed => Style::default().fg(theme::RED),
        TransferStatus::Cancelled => Style::default().fg(theme::YELLOW),
        // Anything the agent reports outside the known set stays unstyled.
        TransferStatus::Unknown => Style::default(),
    }
}

fn transfer_label(transfer: &Transfer) -> String {
    match &transfer.file_name {
        Some(name) => name.clone(),
        None => format!(
            "{} #{} @ {}",
            transfer.url.bot, transfer.url.pack, transfer.url.server
        ),
    }
}

fn draw_activities(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(6),
            Constraint::Length(8),
        ])
        .split(area);

    let summary = Line::from(vec![
        Span::styled(" active ", Style::default().fg(theme::SUBTEXT0)),
        Span::styled(
            app.monitor.active_downloads().to_string(),
            Style::default().fg(theme::GREEN),
        ),
        Span::styled("  queued ", Style::default().fg(theme::SUBTEXT0)),
        Span::styled(
            app.monitor.queue_size().to_string(),
            Style::default().fg(theme::PEACH),
        ),
        Span::styled("  lifetime volume ", Style::default().fg(theme::SUBTEXT0)),
        Span::styled(
            format_bytes(app.monitor.total_volume()),
            Style::default().fg(theme::SAPPHIRE),
        ),
    ]);
    f.render_widget(Paragraph::new(summary), chunks[0]);

    let header = Row::new(vec!["Status", "File / Pack", "Progress", "Speed", "ETA", "Prio", "Retries"])
        .style(Style::default().fg(theme::MAUVE).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .monitor
        .transfers
        .iter()
        .enumerate()
        .map(|(i, transfer)| {
            let selected = i == app.state.activities_cursor;
            let base = if selected {
                Style::default().bg(theme::SURFACE1)
            } else {
                Style::default()
            };
            // A numeric percentage is only meaningful while downloading; the
            // in-flight states pulse instead.
            let progress_cell = if transfer.status == TransferStatus::Downloading {
                Cell::from(format!("{:>5.1}%", transfer.progress))
                    .style(Style::default().fg(theme::GREEN))
            } else if transfer.status.is_in_flight() {
                Cell::from("  ···").style(Style::default().fg(theme::PEACH))
            } else {
                Cell::from("    -").style(Style::default().fg(theme::OVERLAY0))
            };
            Row::new(vec![
                Cell::from(transfer.status.label()).style(status_style(transfer.status)),
                Cell::from(truncate_with_ellipsis(&transfer_label(transfer), 42))
                    .style(Style::default().fg(theme::TEXT)),
                progress_cell,
                Cell::from(format_speed(transfer.speed)),
                Cell::from(format_eta(
                    transfer.downloaded,
                    transfer.file_size,
                    transfer.speed,
                )),
                Cell::from(transfer.priority.as_str()),
                Cell::from(format!("{}/{}", transfer.retry_count, transfer.max_retries)),
            ])
            .style(base)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Min(28),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::SURFACE1))
            .title(format!(" Transfers ({}) ", app.monitor.transfers.len())),
    );
    f.render_widget(table, chunks[1]);

    draw_transfer_detail(f, app, chunks[2]);
    draw_bot_stats(f, app, chunks[3]);
}

fn draw_transfer_detail(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::SURFACE1))
        .title(" Selected ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(transfer) = app.selected_transfer() else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "no transfers",
                Style::default().fg(theme::OVERLAY0),
            )),
            inner,
        );
        return;
    };

    let lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let info = Line::from(vec![
        Span::styled(transfer.status.label(), status_style(transfer.status)),
        Span::raw("  "),
        Span::styled(transfer.url.to_url(), Style::default().fg(theme::SUBTEXT0)),
    ]);
    f.render_widget(Paragraph::new(info), lines[0]);

    let size_line = Line::from(Span::styled(
        format!(
            "{} / {}  ({} downloaded)",
            format_bytes(transfer.downloaded),
            format_opt_bytes(transfer.file_size),
            format_speed(transfer.speed),
        ),
        Style::default().fg(theme::SUBTEXT0),
    ));
    f.render_widget(Paragraph::new(size_line), lines[1]);

    if transfer.status == TransferStatus::Downloading {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme::GREEN).bg(theme::SURFACE0))
            .ratio((transfer.progress / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.1}%", transfer.progress));
        f.render_widget(gauge, lines[2]);
    } else if transfer.status.is_in_flight() {
        let throbber = Throbber::default()
            .label(transfer.status.label())
            .style(Style::default().fg(theme::PEACH))
            .throbber_style(Style::default().fg(theme::PEACH));
        f.render_stateful_widget(throbber, lines[2], &mut app.state.throbber.borrow_mut());
    } else if let Some(error) = &transfer.error {
        f.render_widget(
            Paragraph::new(Span::styled(
                truncate_with_ellipsis(error, inner.width as usize),
                Style::default().fg(theme::RED),
            )),
            lines[2],
        );
    }
}

fn draw_bot_stats(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["Bot", "Network", "OK", "Failed", "Volume", "Avg speed", "Score"])
        .style(Style::default().fg(theme::MAUVE).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .monitor
        .bot_stats
        .iter()
        .map(|stats| {
            Row::new(vec![
                stats.bot_name.clone(),
                stats.network.clone(),
                stats.successful_downloads.to_string(),
                stats.failed_downloads.to_string(),
                format_bytes(stats.total_bytes),
                format_speed(stats.average_speed),
                format!("{:.2}", stats.reliability_score),
            ])
            .style(Style::default().fg(theme::SUBTEXT0))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::SURFACE1))
            .title(" Bots "),
    );
    f.render_widget(table, area);
}

// ---- History view ----

fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let expanded_open =
        app.history.kind == HistoryKind::Searches && app.history.expanded.is_some();
    let constraints = if expanded_open {
        vec![Constraint::Length(1), Constraint::Min(4), Constraint::Length(9)]
    } else {
        vec![Constraint::Length(1), Constraint::Min(4)]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let (page, total_pages, total, selected) = match app.history.kind {
        HistoryKind::Searches => (
            app.history.searches.page,
            app.history.searches.total_pages,
            app.history.searches.total,
            app.history.selected_searches.len(),
        ),
        HistoryKind::Downloads => (
            app.history.downloads.page,
            app.history.downloads.total_pages,
            app.history.downloads.total,
            app.history.selected_downloads.len(),
        ),
    };

    let header_line = Line::from(vec![
        Span::styled(
            format!(" {} ", HistoryKind::Searches.title()),
            if app.history.kind == HistoryKind::Searches {
                Style::default().fg(theme::LAVENDER).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::OVERLAY0)
            },
        ),
        Span::styled("|", Style::default().fg(theme::SURFACE1)),
        Span::styled(
            format!(" {} ", HistoryKind::Downloads.title()),
            if app.history.kind == HistoryKind::Downloads {
                Style::default().fg(theme::LAVENDER).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::OVERLAY0)
            },
        ),
        Span::styled(
            format!("   page {}/{} · {} total · {} selected", page, total_pages, total, selected),
            Style::default().fg(theme::SUBTEXT0),
        ),
    ]);
    f.render_widget(Paragraph::new(header_line), chunks[0]);

    match app.history.kind {
        HistoryKind::Searches => draw_search_history_table(f, app, chunks[1]),
        HistoryKind::Downloads => draw_download_history_table(f, app, chunks[1]),
    }

    if expanded_open {
        draw_expanded_search(f, app, chunks[2]);
    }
}

fn selection_marker(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

fn draw_search_history_table(f: &mut Frame, app: &App, area: Rect) {
    let expanded_id = app.history.expanded.as_ref().map(|e| e.id);
    let header = Row::new(vec!["", "Query", "Results", "When", ""])
        .style(Style::default().fg(theme::MAUVE).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .history
        .searches
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.history.searches.cursor {
                Style::default().bg(theme::SURFACE1).fg(theme::TEXT)
            } else {
                Style::default().fg(theme::SUBTEXT0)
            };
            let marker = if expanded_id == Some(item.id) { "▾" } else { "▸" };
            Row::new(vec![
                selection_marker(app.history.selected_searches.contains(&item.id)).to_string(),
                truncate_with_ellipsis(&item.query, 40),
                item.results_count.to_string(),
                format_timestamp(&item.searched_at),
                marker.to_string(),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(24),
            Constraint::Length(8),
            Constraint::Length(20),
            Constraint::Length(2),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::SURFACE1))
            .title(" Past searches "),
    );
    f.render_widget(table, area);
}

fn draw_download_history_table(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["", "File", "Status", "Size", "Network", "Bot", "When"])
        .style(Style::default().fg(theme::MAUVE).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .history
        .downloads
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.history.downloads.cursor {
                Style::default().bg(theme::SURFACE1).fg(theme::TEXT)
            } else {
                Style::default().fg(theme::SUBTEXT0)
            };
            let status_color = match item.status.as_str() {
                "completed" => theme::TEAL,
                "failed" => theme::RED,
                "cancelled" => theme::YELLOW,
                _ => theme::SUBTEXT0,
            };
            Row::new(vec![
                Cell::from(
                    selection_marker(app.history.selected_downloads.contains(&item.id)).to_string(),
                ),
                Cell::from(truncate_with_ellipsis(
                    item.file_name.as_deref().unwrap_or("(name unresolved)"),
                    38,
                )),
                Cell::from(item.status.clone()).style(Style::default().fg(status_color)),
                Cell::from(format_opt_bytes(item.size)),
                Cell::from(item.network_name().to_string()),
                Cell::from(item.bot_name().to_string()),
                Cell::from(format_timestamp(
                    item.completed_at.as_deref().unwrap_or(&item.created_at),
                )),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(24),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::SURFACE1))
            .title(" Past downloads "),
    );
    f.render_widget(table, area);
}

fn draw_expanded_search(f: &mut Frame, app: &App, area: Rect) {
    let Some(expanded) = &app.history.expanded else {
        return;
    };

    let rows: Vec<Row> = expanded
        .results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let style = if i == expanded.cursor {
                Style::default().bg(theme::SURFACE1).fg(theme::TEXT)
            } else {
                Style::default().fg(theme::SUBTEXT0)
            };
            Row::new(vec![
                truncate_with_ellipsis(&result.file_name, 44),
                format_opt_bytes(result.file_size),
                result.server.clone(),
                result.bot.clone(),
                format!("#{}", result.pack_number),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(28),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(14),
            Constraint::Length(7),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::SURFACE1))
            .title(" Snapshot results (J/K move · d download) "),
    );
    f.render_widget(table, area);
}

// ---- Settings view ----

fn draw_settings(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::SURFACE1))
        .title(if app.editor.dirty {
            " Agent settings (modified, press s to save) "
        } else {
            " Agent settings "
        });
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.editor.doc.is_none() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "loading settings...",
                Style::default().fg(theme::OVERLAY0),
            )),
            inner,
        );
        return;
    }

    if app.state.input_mode == InputMode::NewNetworkName {
        let prompt = Line::from(vec![
            Span::styled("new network name: ", Style::default().fg(theme::SUBTEXT0)),
            Span::styled(
                app.state.prompt_buffer.clone(),
                Style::default().fg(theme::TEXT),
            ),
            Span::styled("█", Style::default().fg(theme::LAVENDER)),
        ]);
        let prompt_area = Rect { height: 1, ..inner };
        f.render_widget(Paragraph::new(prompt), prompt_area);
        return;
    }

    let items = app.editor.items();
    let visible = inner.height as usize;
    // Keep the cursor on screen for long documents.
    let offset = app.editor.cursor.saturating_sub(visible.saturating_sub(1));

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, item)| {
            let selected = i == app.editor.cursor;
            let label = match item {
                crate::settings_editor::SettingsItem::Scalar(field) => field.label().to_string(),
                crate::settings_editor::SettingsItem::Network { name, field } => {
                    format!("network {} · {}", name, field.label())
                }
            };
            let value = if selected && app.state.input_mode == InputMode::EditSetting {
                format!(
                    "{}█",
                    app.editor.editing.clone().unwrap_or_default()
                )
            } else {
                app.editor.value_text(item)
            };
            let label_style = if selected {
                Style::default().fg(theme::LAVENDER).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::SUBTEXT0)
            };
            Line::from(vec![
                Span::styled(format!(" {:<34}", label), label_style),
                Span::styled(value, Style::default().fg(theme::TEXT)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

// ---- Confirmation popup ----

fn draw_confirm_dialog(f: &mut Frame, message: &str, area: Rect) {
    let popup = centered_rect(56, 24, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::RED))
        .title(" Confirm ");
    let text = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme::TEXT),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(theme::GREEN)),
            Span::styled(" confirm    ", Style::default().fg(theme::SUBTEXT0)),
            Span::styled("[n]", Style::default().fg(theme::RED)),
            Span::styled(" cancel", Style::default().fg(theme::SUBTEXT0)),
        ]),
    ];
    f.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(block),
        popup,
    );
}
