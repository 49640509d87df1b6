// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use ratatui::prelude::Constraint;
use ratatui::prelude::Direction;
use ratatui::prelude::Layout;
use ratatui::prelude::Rect;

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes < TB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    }
}

/// Bytes per second, as reported by the agent.
pub fn format_speed(bytes_per_second: f64) -> String {
    if bytes_per_second <= 0.0 {
        return "0 B/s".to_string();
    }
    format!("{}/s", format_bytes(bytes_per_second as u64))
}

pub fn format_opt_bytes(bytes: Option<u64>) -> String {
    bytes.map(format_bytes).unwrap_or_else(|| "?".to_string())
}

/// Seconds remaining at the current speed, or "-" when it cannot be known.
pub fn format_eta(downloaded: u64, total: Option<u64>, speed: f64) -> String {
    let Some(total) = total else {
        return "-".to_string();
    };
    if speed <= 0.0 || total <= downloaded {
        return "-".to_string();
    }
    let mut secs = ((total - downloaded) as f64 / speed) as u64;

    let hours = secs / 3600;
    secs %= 3600;
    let minutes = secs / 60;
    let seconds = secs % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}

pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Trim an RFC3339 timestamp down to its date+time prefix for table cells.
pub fn format_timestamp(raw: &str) -> String {
    let cleaned = raw.replace('T', " ");
    cleaned.chars().take(19).collect()
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_format_speed_zero() {
        assert_eq!(format_speed(0.0), "0 B/s");
        assert_eq!(format_speed(-1.0), "0 B/s");
        assert_eq!(format_speed(2048.0), "2.00 KB/s");
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0, Some(1000), 100.0), "10s");
        assert_eq!(format_eta(0, Some(720_000), 100.0), "2h");
        assert_eq!(format_eta(500, Some(1000), 0.0), "-");
        assert_eq!(format_eta(1000, Some(1000), 100.0), "-");
        assert_eq!(format_eta(0, None, 100.0), "-");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("a-very-long-name", 10), "a-very-...");
    }

    #[test]
    fn test_format_timestamp_prefix() {
        assert_eq!(
            format_timestamp("2026-02-03T04:05:06.789Z"),
            "2026-02-03 04:05:06"
        );
        assert_eq!(format_timestamp(""), "");
    }
}
