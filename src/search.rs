// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Search results and client-side refinement.
//!
//! One fetch per submitted query; every filter below operates on the
//! last-fetched set without touching the network. Server names are
//! normalized for comparison but the first raw spelling seen is kept for
//! display, so `irc.foo.net` and `foo.net` collapse into one facet without
//! losing how the provider spelled it.

use crate::agent::models::SearchResult;

/// Providers queried when the agent configuration has not been loaded yet.
pub const DEFAULT_PROVIDERS: [&str; 3] = ["SkullXDCC", "XDCC.rocks", "XDCC.eu"];

/// Lowercase and strip any leading `irc.` prefixes. Idempotent.
pub fn normalize_server(raw: &str) -> String {
    let mut name = raw.to_lowercase();
    while let Some(stripped) = name.strip_prefix("irc.") {
        name = stripped.to_string();
    }
    name
}

pub fn mb_to_bytes(mb: u64) -> u64 {
    mb * 1024 * 1024
}

/// One entry in the server filter dropdown: the normalized comparison key
/// plus the first raw spelling that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerFacet {
    pub key: String,
    pub display: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResultFilters {
    /// Case-insensitive substring on the file name.
    pub file_name: String,
    /// Normalized server key; `None` means all servers.
    pub server: Option<String>,
    /// Inclusive size bounds, expressed in MB.
    pub min_mb: Option<u64>,
    pub max_mb: Option<u64>,
}

impl ResultFilters {
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty()
            && self.server.is_none()
            && self.min_mb.is_none()
            && self.max_mb.is_none()
    }

    fn matches(&self, result: &SearchResult) -> bool {
        if !self.file_name.is_empty() {
            let needle = self.file_name.to_lowercase();
            if !result.file_name.to_lowercase().contains(&needle) {
                return false;
            }
        }

        if let Some(server_key) = &self.server {
            if normalize_server(&result.server) != *server_key {
                return false;
            }
        }

        if self.min_mb.is_some() || self.max_mb.is_some() {
            // An unknown size cannot be shown to satisfy the range.
            let Some(size) = result.file_size else {
                return false;
            };
            if let Some(min) = self.min_mb {
                if size < mb_to_bytes(min) {
                    return false;
                }
            }
            if let Some(max) = self.max_mb {
                if size > mb_to_bytes(max) {
                    return false;
                }
            }
        }

        true
    }
}

#[derive(Default)]
pub struct SearchEngine {
    pub query: String,
    /// Normalized provider constraint; empty means all enabled providers.
    pub provider: Option<String>,
    pub loading: bool,
    pub results: Vec<SearchResult>,
    pub filters: ResultFilters,
    pub cursor: usize,
}

impl SearchEngine {
    /// The query to submit, or `None` for an empty/whitespace-only query
    /// (which must not produce a network call).
    pub fn prepare_query(&self) -> Option<String> {
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn providers_param(&self) -> Vec<String> {
        self.provider.iter().cloned().collect()
    }

    pub fn cycle_provider(&mut self, available: &[String]) {
        self.provider = match &self.provider {
            None => available.first().cloned(),
            Some(current) => {
                let idx = available.iter().position(|p| p == current);
                match idx {
                    Some(i) if i + 1 < available.len() => Some(available[i + 1].clone()),
                    _ => None,
                }
            }
        };
    }

    /// A successful search replaces the whole result set.
    pub fn apply_results(&mut self, results: Vec<SearchResult>) {
        self.results = results;
        self.cursor = 0;
        self.loading = false;
    }

    /// A failed search leaves an empty set behind.
    pub fn apply_failure(&mut self) {
        self.results.clear();
        self.cursor = 0;
        self.loading = false;
    }

    pub fn clear_filters(&mut self) {
        self.filters = ResultFilters::default();
        self.cursor = 0;
    }

    /// Last-fetched results narrowed by the active filters.
    pub fn filtered(&self) -> Vec<&SearchResult> {
        self.results
            .iter()
            .filter(|r| self.filters.matches(r))
            .collect()
    }

    /// Distinct servers across the full (unfiltered) result set, one entry
    /// per normalized key, displaying the first raw spelling seen, sorted by
    /// normalized key.
    pub fn server_facets(&self) -> Vec<ServerFacet> {
        let mut facets: Vec<ServerFacet> = Vec::new();
        for result in &self.results {
            let key = normalize_server(&result.server);
            if !facets.iter().any(|f| f.key == key) {
                facets.push(ServerFacet {
                    key,
                    display: result.server.clone(),
                });
            }
        }
        facets.sort_by(|a, b| a.key.cmp(&b.key));
        facets
    }

    /// Advance the server filter through: all -> facet 1 -> .. -> facet n -> all.
    pub fn cycle_server_filter(&mut self) {
        let facets = self.server_facets();
        self.filters.server = match &self.filters.server {
            None => facets.first().map(|f| f.key.clone()),
            Some(current) => {
                let idx = facets.iter().position(|f| &f.key == current);
                match idx {
                    Some(i) if i + 1 < facets.len() => Some(facets[i + 1].key.clone()),
                    _ => None,
                }
            }
        };
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(server: &str, file_name: &str, file_size: Option<u64>) -> SearchResult {
        SearchResult {
            server: server.to_string(),
            bot: "Bot".to_string(),
            channel: "#c".to_string(),
            pack_number: 1,
            file_name: file_name.to_string(),
            file_size,
            downloads: None,
        }
    }

    #[test]
    fn test_normalize_strips_irc_prefix() {
        assert_eq!(normalize_server("irc.foo.net"), "foo.net");
        assert_eq!(normalize_server("foo.net"), "foo.net");
        assert_eq!(normalize_server("IRC.Foo.NET"), "foo.net");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["foo.net", "irc.foo.net", "irc.irc.foo.net", "IRC.BAR.ORG"] {
            let once = normalize_server(s);
            assert_eq!(normalize_server(&once), once);
        }
    }

    #[test]
    fn test_normalize_prefix_equivalence() {
        let s = "foo.net";
        assert_eq!(normalize_server(s), normalize_server(&format!("irc.{}", s)));
    }

    #[test]
    fn test_facets_dedup_with_first_seen_display() {
        let mut engine = SearchEngine::default();
        engine.results = vec![
            result("irc.foo.net", "a", None),
            result("foo.net", "b", None),
            result("irc.bar.net", "c", None),
        ];

        let facets = engine.server_facets();
        assert_eq!(facets.len(), 2);
        // Sorted by normalized key: bar.net before foo.net.
        assert_eq!(facets[0].key, "bar.net");
        assert_eq!(facets[1].key, "foo.net");
        // First-occurrence spelling wins for display.
        assert_eq!(facets[1].display, "irc.foo.net");
    }

    #[test]
    fn test_size_filter_bounds_are_inclusive() {
        let mut engine = SearchEngine::default();
        engine.results = vec![
            result("s", "too-small", Some(mb_to_bytes(100) - 1)),
            result("s", "at-min", Some(mb_to_bytes(100))),
            result("s", "middle", Some(mb_to_bytes(150))),
            result("s", "at-max", Some(mb_to_bytes(200))),
            result("s", "too-big", Some(mb_to_bytes(200) + 1)),
        ];
        engine.filters.min_mb = Some(100);
        engine.filters.max_mb = Some(200);

        let names: Vec<&str> = engine
            .filtered()
            .iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["at-min", "middle", "at-max"]);
    }

    #[test]
    fn test_size_filter_excludes_unknown_sizes() {
        let mut engine = SearchEngine::default();
        engine.results = vec![result("s", "unknown", None), result("s", "known", Some(mb_to_bytes(150)))];
        engine.filters.min_mb = Some(100);

        let filtered = engine.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].file_name, "known");
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let mut engine = SearchEngine::default();
        engine.results = vec![result("s", "Big.Buck.Bunny.mkv", None), result("s", "other", None)];
        engine.filters.file_name = "buck".to_string();
        assert_eq!(engine.filtered().len(), 1);
    }

    #[test]
    fn test_server_filter_matches_normalized() {
        let mut engine = SearchEngine::default();
        engine.results = vec![result("irc.foo.net", "a", None), result("bar.net", "b", None)];
        engine.filters.server = Some("foo.net".to_string());
        let filtered = engine.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].server, "irc.foo.net");
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let mut engine = SearchEngine::default();
        engine.query = "   \t ".to_string();
        assert!(engine.prepare_query().is_none());

        engine.query = "  ubuntu ".to_string();
        assert_eq!(engine.prepare_query().as_deref(), Some("ubuntu"));
    }

    #[test]
    fn test_failure_empties_results_and_clears_loading() {
        let mut engine = SearchEngine::default();
        engine.results = vec![result("s", "old", None)];
        engine.loading = true;
        engine.apply_failure();
        assert!(engine.results.is_empty());
        assert!(!engine.loading);
    }

    #[test]
    fn test_provider_cycle_wraps_to_all() {
        let available = vec!["A".to_string(), "B".to_string()];
        let mut engine = SearchEngine::default();
        engine.cycle_provider(&available);
        assert_eq!(engine.provider.as_deref(), Some("A"));
        engine.cycle_provider(&available);
        assert_eq!(engine.provider.as_deref(), Some("B"));
        engine.cycle_provider(&available);
        assert_eq!(engine.provider, None);
        assert!(engine.providers_param().is_empty());
    }
}
