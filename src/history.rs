// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Paginated browsing of the two durable record kinds: past searches and
//! past downloads. The kinds share nothing — each has its own page, cursor
//! and selection. Deletions remove locally on success instead of
//! re-fetching, and selection is page-local: select-all covers the loaded
//! page, not the grand total.

use std::collections::HashSet;

use crate::agent::models::{
    DownloadHistoryItem, HistoryPage, SearchHistoryItem, SearchResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryKind {
    #[default]
    Searches,
    Downloads,
}

impl HistoryKind {
    pub fn toggled(self) -> Self {
        match self {
            HistoryKind::Searches => HistoryKind::Downloads,
            HistoryKind::Downloads => HistoryKind::Searches,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            HistoryKind::Searches => "Searches",
            HistoryKind::Downloads => "Downloads",
        }
    }
}

/// One loaded page of records plus the pagination bookkeeping around it.
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub cursor: usize,
}

impl<T> Page<T> {
    pub fn new(limit: i64) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit,
            total_pages: 1,
            cursor: 0,
        }
    }

    pub fn apply(&mut self, fetched: HistoryPage<T>) {
        self.items = fetched.items;
        self.total = fetched.total;
        self.page = fetched.page;
        if fetched.limit > 0 {
            self.limit = fetched.limit;
        }
        self.total_pages = fetched.total_pages.max(1);
        self.clamp_cursor();
    }

    /// Requested page clamped to `[1, total_pages]`.
    pub fn clamp_page(&self, requested: i64) -> i64 {
        requested.clamp(1, self.total_pages.max(1))
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.cursor = 0;
            return;
        }
        let len = self.items.len() as isize;
        let next = (self.cursor as isize + delta).clamp(0, len - 1);
        self.cursor = next as usize;
    }

    fn clamp_cursor(&mut self) {
        if self.items.is_empty() {
            self.cursor = 0;
        } else {
            self.cursor = self.cursor.min(self.items.len() - 1);
        }
    }

    /// Drop locally deleted rows and shrink the totals without a re-fetch.
    fn after_removal(&mut self, removed: usize) {
        self.total = (self.total - removed as i64).max(0);
        self.total_pages = if self.limit > 0 {
            ((self.total + self.limit - 1) / self.limit).max(1)
        } else {
            1
        };
        self.page = self.page.min(self.total_pages);
        self.clamp_cursor();
    }
}

#[derive(Default)]
pub struct HistoryBrowser {
    pub kind: HistoryKind,
    pub searches: Page<SearchHistoryItem>,
    pub downloads: Page<DownloadHistoryItem>,
    pub selected_searches: HashSet<i64>,
    pub selected_downloads: HashSet<String>,
    /// Lazily decoded snapshot for the one expanded search row, with a
    /// cursor into it for the nested download action.
    pub expanded: Option<ExpandedSearch>,
}

pub struct ExpandedSearch {
    pub id: i64,
    pub results: Vec<SearchResult>,
    pub cursor: usize,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(10)
    }
}

impl HistoryBrowser {
    pub fn new(limit: i64) -> Self {
        Self {
            searches: Page::new(limit),
            downloads: Page::new(limit),
            ..Default::default()
        }
    }

    pub fn toggle_kind(&mut self) {
        self.kind = self.kind.toggled();
    }

    // ---- Searches ----

    pub fn current_search(&self) -> Option<&SearchHistoryItem> {
        self.searches.items.get(self.searches.cursor)
    }

    pub fn toggle_select_search(&mut self) {
        if let Some(item) = self.current_search() {
            let id = item.id;
            if !self.selected_searches.remove(&id) {
                self.selected_searches.insert(id);
            }
        }
    }

    /// Select every loaded row, or clear if the whole page is already
    /// selected. Page-local on purpose.
    pub fn toggle_select_all_searches(&mut self) {
        if !self.searches.items.is_empty()
            && self.selected_searches.len() == self.searches.items.len()
        {
            self.selected_searches.clear();
        } else {
            self.selected_searches = self.searches.items.iter().map(|i| i.id).collect();
        }
    }

    pub fn remove_searches(&mut self, ids: &[i64]) {
        let before = self.searches.items.len();
        self.searches.items.retain(|i| !ids.contains(&i.id));
        let removed = before - self.searches.items.len();
        for id in ids {
            self.selected_searches.remove(id);
            if self.expanded.as_ref().map(|e| e.id) == Some(*id) {
                self.expanded = None;
            }
        }
        self.searches.after_removal(removed);
    }

    /// Expand or collapse the search row under the cursor. The stored
    /// snapshot decodes on demand; undecodable JSON means no expansion.
    pub fn toggle_expand(&mut self) {
        let Some(id) = self.current_search().map(|i| i.id) else {
            return;
        };
        if self.expanded.as_ref().map(|e| e.id) == Some(id) {
            self.expanded = None;
            return;
        }
        let decoded = self.current_search().and_then(|i| i.decode_results());
        match decoded {
            Some(results) if !results.is_empty() => {
                self.expanded = Some(ExpandedSearch {
                    id,
                    results,
                    cursor: 0,
                });
            }
            _ => {
                tracing::debug!("Search history row {} has no decodable results", id);
                self.expanded = None;
            }
        }
    }

    // ---- Downloads ----

    pub fn current_download(&self) -> Option<&DownloadHistoryItem> {
        self.downloads.items.get(self.downloads.cursor)
    }

    pub fn toggle_select_download(&mut self) {
        if let Some(item) = self.current_download() {
            let id = item.id.clone();
            if !self.selected_downloads.remove(&id) {
                self.selected_downloads.insert(id);
            }
        }
    }

    pub fn toggle_select_all_downloads(&mut self) {
        if !self.downloads.items.is_empty()
            && self.selected_downloads.len() == self.downloads.items.len()
        {
            self.selected_downloads.clear();
        } else {
            self.selected_downloads = self
                .downloads
                .items
                .iter()
                .map(|i| i.id.clone())
                .collect();
        }
    }

    pub fn remove_downloads(&mut self, ids: &[String]) {
        let before = self.downloads.items.len();
        self.downloads.items.retain(|i| !ids.contains(&i.id));
        let removed = before - self.downloads.items.len();
        for id in ids {
            self.selected_downloads.remove(id);
        }
        self.downloads.after_removal(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_item(id: i64) -> SearchHistoryItem {
        SearchHistoryItem {
            id,
            query: format!("query-{}", id),
            results_count: 0,
            results_json: None,
            searched_at: String::new(),
        }
    }

    fn download_item(id: &str) -> DownloadHistoryItem {
        DownloadHistoryItem {
            id: id.to_string(),
            file_name: Some(format!("{}.iso", id)),
            size: None,
            status: "completed".to_string(),
            error: None,
            created_at: String::new(),
            completed_at: None,
            network: None,
            bot: None,
            channel: None,
            url: None,
        }
    }

    fn search_page(ids: &[i64], total: i64, page: i64, total_pages: i64) -> HistoryPage<SearchHistoryItem> {
        HistoryPage {
            items: ids.iter().map(|id| search_item(*id)).collect(),
            total,
            page,
            limit: 10,
            total_pages,
        }
    }

    #[test]
    fn test_page_change_is_clamped() {
        let mut browser = HistoryBrowser::new(10);
        browser.searches.apply(search_page(&[1, 2], 25, 2, 3));

        assert_eq!(browser.searches.clamp_page(0), 1);
        assert_eq!(browser.searches.clamp_page(-5), 1);
        assert_eq!(browser.searches.clamp_page(3), 3);
        assert_eq!(browser.searches.clamp_page(99), 3);
    }

    #[test]
    fn test_select_all_toggles_against_loaded_count() {
        let mut browser = HistoryBrowser::new(10);
        browser.searches.apply(search_page(&[1, 2, 3], 30, 1, 3));

        browser.toggle_select_all_searches();
        assert_eq!(browser.selected_searches.len(), 3);

        // A partial selection flips to full, not to empty.
        browser.selected_searches.remove(&2);
        browser.toggle_select_all_searches();
        assert_eq!(browser.selected_searches.len(), 3);

        // A full page selection clears.
        browser.toggle_select_all_searches();
        assert!(browser.selected_searches.is_empty());
    }

    #[test]
    fn test_optimistic_removal_updates_totals() {
        let mut browser = HistoryBrowser::new(10);
        browser.searches.apply(search_page(&[1, 2, 3], 21, 1, 3));
        browser.selected_searches.insert(1);
        browser.selected_searches.insert(2);

        browser.remove_searches(&[1, 2]);

        assert_eq!(browser.searches.items.len(), 1);
        assert_eq!(browser.searches.total, 19);
        assert_eq!(browser.searches.total_pages, 2);
        assert!(browser.selected_searches.is_empty());
    }

    #[test]
    fn test_removal_clamps_page_and_cursor() {
        let mut browser = HistoryBrowser::new(10);
        let mut page = search_page(&[41], 11, 2, 2);
        page.limit = 10;
        browser.searches.apply(page);
        browser.searches.cursor = 0;

        browser.remove_searches(&[41]);

        assert_eq!(browser.searches.total, 10);
        assert_eq!(browser.searches.total_pages, 1);
        assert_eq!(browser.searches.page, 1);
        assert_eq!(browser.searches.cursor, 0);
    }

    #[test]
    fn test_download_bulk_removal() {
        let mut browser = HistoryBrowser::new(10);
        browser.downloads.apply(HistoryPage {
            items: vec![download_item("a"), download_item("b"), download_item("c")],
            total: 3,
            page: 1,
            limit: 10,
            total_pages: 1,
        });
        browser.toggle_select_all_downloads();

        let ids: Vec<String> = browser.selected_downloads.iter().cloned().collect();
        browser.remove_downloads(&ids);

        assert!(browser.downloads.items.is_empty());
        assert_eq!(browser.downloads.total, 0);
        assert!(browser.selected_downloads.is_empty());
    }

    #[test]
    fn test_expand_tolerates_malformed_snapshot() {
        let mut browser = HistoryBrowser::new(10);
        let mut item = search_item(7);
        item.results_json = Some("{{{ definitely not json".to_string());
        browser.searches.apply(HistoryPage {
            items: vec![item],
            total: 1,
            page: 1,
            limit: 10,
            total_pages: 1,
        });

        browser.toggle_expand();
        assert!(browser.expanded.is_none());
    }

    #[test]
    fn test_expand_decodes_and_toggles_off() {
        let mut browser = HistoryBrowser::new(10);
        let mut item = search_item(7);
        item.results_json = Some(
            r##"[{"server":"irc.foo.net","bot":"B","channel":"#c","pack_number":3,
                 "file_name":"x.mkv","file_size":null,"downloads":null}]"##
                .to_string(),
        );
        browser.searches.apply(HistoryPage {
            items: vec![item],
            total: 1,
            page: 1,
            limit: 10,
            total_pages: 1,
        });

        browser.toggle_expand();
        let expanded = browser.expanded.as_ref().expect("row should expand");
        assert_eq!(expanded.id, 7);
        assert_eq!(expanded.results.len(), 1);

        browser.toggle_expand();
        assert!(browser.expanded.is_none());
    }

    #[test]
    fn test_removal_collapses_expanded_row() {
        let mut browser = HistoryBrowser::new(10);
        let mut item = search_item(9);
        item.results_json = Some(
            r##"[{"server":"s","bot":"B","channel":"#c","pack_number":1,
                 "file_name":"f","file_size":null,"downloads":null}]"##
                .to_string(),
        );
        browser.searches.apply(HistoryPage {
            items: vec![item, search_item(10)],
            total: 2,
            page: 1,
            limit: 10,
            total_pages: 1,
        });
        browser.toggle_expand();
        assert!(browser.expanded.is_some());

        browser.remove_searches(&[9]);
        assert!(browser.expanded.is_none());
    }
}
