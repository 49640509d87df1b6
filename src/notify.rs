// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-slot transient notification. Showing a new message replaces the
//! old one; expiry is checked on the draw tick.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
}

pub struct Notifier {
    ttl: Duration,
    slot: Option<(Notice, Instant)>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.show(text, NoticeLevel::Info);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.show(text, NoticeLevel::Success);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.show(text, NoticeLevel::Error);
    }

    fn show(&mut self, text: impl Into<String>, level: NoticeLevel) {
        self.slot = Some((
            Notice {
                text: text.into(),
                level,
            },
            Instant::now() + self.ttl,
        ));
    }

    /// Drop the message once its deadline has passed.
    pub fn tick(&mut self) {
        if let Some((_, expires_at)) = &self.slot {
            if Instant::now() >= *expires_at {
                self.slot = None;
            }
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.slot.as_ref().map(|(notice, _)| notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_notice_replaces_older() {
        let mut notifier = Notifier::new(Duration::from_secs(60));
        notifier.success("first");
        notifier.error("second");

        let current = notifier.current().expect("notice should be visible");
        assert_eq!(current.text, "second");
        assert_eq!(current.level, NoticeLevel::Error);
    }

    #[test]
    fn test_expired_notice_clears_on_tick() {
        let mut notifier = Notifier::new(Duration::ZERO);
        notifier.info("gone soon");
        assert!(notifier.current().is_some());

        notifier.tick();
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_unexpired_notice_survives_tick() {
        let mut notifier = Notifier::new(Duration::from_secs(60));
        notifier.info("still here");
        notifier.tick();
        assert!(notifier.current().is_some());
    }
}
