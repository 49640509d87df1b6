// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-place editing of the agent's configuration document.
//!
//! Scalar fields commit into the working copy and persist only on the
//! explicit whole-document save. Network entries are the exception: every
//! committed network edit (and add/delete) also returns the eager
//! per-network call for the caller to issue immediately — the agent reacts
//! to network changes right away, so they cannot wait for a save.
//!
//! Free-text list fields (autojoin channels, providers) edit as a draft
//! string and are synthesized into the structured list only when the edit
//! commits; the draft re-seeds from the authoritative value whenever an
//! edit begins.

use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::agent::models::{AgentConfig, NetworkConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ScalarField {
    UseSsl,
    ConnectTimeout,
    GeneralTimeout,
    ProxyEnabled,
    ProxyUrl,
    Nickname,
    Username,
    Realname,
    MaxRetries,
    RetryDelay,
    QueueLimit,
    PassiveDcc,
    DccPortMin,
    DccPortMax,
    ResumeEnabled,
    EnabledProviders,
    ResultsPerPage,
    SearchTimeout,
    MoveCompleted,
    MoveCompletedDir,
    PostprocessScriptEnabled,
    PostprocessScript,
    PostprocessTimeout,
}

impl ScalarField {
    pub fn label(self) -> &'static str {
        match self {
            ScalarField::UseSsl => "Use SSL",
            ScalarField::ConnectTimeout => "Connect timeout (s)",
            ScalarField::GeneralTimeout => "General timeout (s)",
            ScalarField::ProxyEnabled => "Proxy enabled",
            ScalarField::ProxyUrl => "Proxy URL",
            ScalarField::Nickname => "Nickname",
            ScalarField::Username => "Username",
            ScalarField::Realname => "Real name",
            ScalarField::MaxRetries => "Max retries",
            ScalarField::RetryDelay => "Retry delay (s)",
            ScalarField::QueueLimit => "Queue limit",
            ScalarField::PassiveDcc => "Passive DCC",
            ScalarField::DccPortMin => "DCC port min",
            ScalarField::DccPortMax => "DCC port max",
            ScalarField::ResumeEnabled => "Resume enabled",
            ScalarField::EnabledProviders => "Enabled providers",
            ScalarField::ResultsPerPage => "Results per page",
            ScalarField::SearchTimeout => "Search timeout (s)",
            ScalarField::MoveCompleted => "Move completed",
            ScalarField::MoveCompletedDir => "Move completed dir",
            ScalarField::PostprocessScriptEnabled => "Postprocess script enabled",
            ScalarField::PostprocessScript => "Postprocess script",
            ScalarField::PostprocessTimeout => "Postprocess timeout (s)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum NetworkField {
    Host,
    Port,
    Ssl,
    AutojoinChannels,
    JoinDelaySecs,
}

impl NetworkField {
    pub fn label(self) -> &'static str {
        match self {
            NetworkField::Host => "host",
            NetworkField::Port => "port",
            NetworkField::Ssl => "ssl",
            NetworkField::AutojoinChannels => "autojoin channels",
            NetworkField::JoinDelaySecs => "join delay (s)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsItem {
    Scalar(ScalarField),
    Network { name: String, field: NetworkField },
}

/// What a committed edit requires of the caller.
#[derive(Debug, PartialEq)]
pub enum CommitOutcome {
    /// Nothing changed or nothing editable under the cursor.
    Noop,
    /// Working copy changed; persisted by the next whole-document save.
    Deferred,
    /// Network entry changed; issue the per-network PUT now.
    PersistNetwork(String, NetworkConfig),
    /// Network entry removed; issue the per-network DELETE now.
    DeleteNetwork(String),
    /// The buffer did not parse; the document is unchanged.
    Invalid(String),
}

/// Split a comma-separated draft into the structured channel list:
/// trimmed, empty segments dropped, order preserved.
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Default)]
pub struct SettingsEditor {
    /// Working copy of the document; `None` until the first load completes.
    pub doc: Option<AgentConfig>,
    /// Unsaved scalar edits pending the wholesale save.
    pub dirty: bool,
    pub cursor: usize,
    /// Draft buffer for the item under the cursor while editing.
    pub editing: Option<String>,
}

impl SettingsEditor {
    /// Install a freshly fetched document, discarding any unsaved edits.
    pub fn load(&mut self, doc: AgentConfig) {
        self.doc = Some(doc);
        self.dirty = false;
        self.editing = None;
        let len = self.items().len();
        if len > 0 {
            self.cursor = self.cursor.min(len - 1);
        } else {
            self.cursor = 0;
        }
    }

    /// Flat edit list: all scalar fields, then each network (sorted by
    /// name) with its fields.
    pub fn items(&self) -> Vec<SettingsItem> {
        let mut items: Vec<SettingsItem> = ScalarField::iter().map(SettingsItem::Scalar).collect();
        if let Some(doc) = &self.doc {
            let mut names: Vec<&String> = doc.networks.keys().collect();
            names.sort();
            for name in names {
                for field in NetworkField::iter() {
                    items.push(SettingsItem::Network {
                        name: name.clone(),
                        field,
                    });
                }
            }
        }
        items
    }

    pub fn current_item(&self) -> Option<SettingsItem> {
        self.items().into_iter().nth(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.items().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    /// Authoritative display value for an item; also the seed for its draft.
    pub fn value_text(&self, item: &SettingsItem) -> String {
        let Some(doc) = &self.doc else {
            return String::new();
        };
        match item {
            SettingsItem::Scalar(field) => match field {
                ScalarField::UseSsl => doc.use_ssl.to_string(),
                ScalarField::ConnectTimeout => doc.connect_timeout.to_string(),
                ScalarField::GeneralTimeout => doc.general_timeout.to_string(),
                ScalarField::ProxyEnabled => doc.proxy_enabled.to_string(),
                ScalarField::ProxyUrl => doc.proxy_url.clone(),
                ScalarField::Nickname => doc.nickname.clone(),
                ScalarField::Username => doc.username.clone(),
                ScalarField::Realname => doc.realname.clone(),
                ScalarField::MaxRetries => doc.max_retries.to_string(),
                ScalarField::RetryDelay => doc.retry_delay.to_string(),
                ScalarField::QueueLimit => doc.queue_limit.to_string(),
                ScalarField::PassiveDcc => doc.passive_dcc.to_string(),
                ScalarField::DccPortMin => doc.dcc_port_min.to_string(),
                ScalarField::DccPortMax => doc.dcc_port_max.to_string(),
                ScalarField::ResumeEnabled => doc.resume_enabled.to_string(),
                ScalarField::EnabledProviders => doc.enabled_providers.join(", "),
                ScalarField::ResultsPerPage => doc.results_per_page.to_string(),
                ScalarField::SearchTimeout => doc.search_timeout.to_string(),
                ScalarField::MoveCompleted => doc.move_completed.to_string(),
                ScalarField::MoveCompletedDir => doc.move_completed_dir.clone(),
                ScalarField::PostprocessScriptEnabled => {
                    doc.postprocess_script_enabled.to_string()
                }
                ScalarField::PostprocessScript => doc.postprocess_script.clone(),
                ScalarField::PostprocessTimeout => doc.postprocess_timeout.to_string(),
            },
            SettingsItem::Network { name, field } => {
                let Some(network) = doc.networks.get(name) else {
                    return String::new();
                };
                match field {
                    NetworkField::Host => network.host.clone(),
                    NetworkField::Port => network.port.to_string(),
                    NetworkField::Ssl => network.ssl.to_string(),
                    NetworkField::AutojoinChannels => network.autojoin_channels.join(", "),
                    NetworkField::JoinDelaySecs => network.join_delay_secs.to_string(),
                }
            }
        }
    }

    /// Begin editing the item under the cursor, seeding the draft from the
    /// authoritative value.
    pub fn begin_edit(&mut self) {
        if let Some(item) = self.current_item() {
            self.editing = Some(self.value_text(&item));
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Commit the draft for the item under the cursor.
    pub fn commit_edit(&mut self) -> CommitOutcome {
        let Some(buffer) = self.editing.take() else {
            return CommitOutcome::Noop;
        };
        let Some(item) = self.current_item() else {
            return CommitOutcome::Noop;
        };
        self.apply_value(&item, &buffer)
    }

    fn apply_value(&mut self, item: &SettingsItem, raw: &str) -> CommitOutcome {
        let Some(doc) = self.doc.as_mut() else {
            return CommitOutcome::Noop;
        };

        macro_rules! number {
            ($ty:ty) => {
                match raw.trim().parse::<$ty>() {
                    Ok(v) => v,
                    Err(_) => {
                        return CommitOutcome::Invalid(format!("not a number: {}", raw.trim()))
                    }
                }
            };
        }

        match item {
            SettingsItem::Scalar(field) => {
                match field {
                    ScalarField::UseSsl => match parse_bool(raw) {
                        Some(v) => doc.use_ssl = v,
                        None => return CommitOutcome::Invalid("expected true/false".to_string()),
                    },
                    ScalarField::ConnectTimeout => doc.connect_timeout = number!(u64),
                    ScalarField::GeneralTimeout => doc.general_timeout = number!(u64),
                    ScalarField::ProxyEnabled => match parse_bool(raw) {
                        Some(v) => doc.proxy_enabled = v,
                        None => return CommitOutcome::Invalid("expected true/false".to_string()),
                    },
                    // Never validated client-side; only meaningful when the
                    // proxy is enabled.
                    ScalarField::ProxyUrl => doc.proxy_url = raw.trim().to_string(),
                    ScalarField::Nickname => doc.nickname = raw.trim().to_string(),
                    ScalarField::Username => doc.username = raw.trim().to_string(),
                    ScalarField::Realname => doc.realname = raw.trim().to_string(),
                    ScalarField::MaxRetries => doc.max_retries = number!(u32),
                    ScalarField::RetryDelay => doc.retry_delay = number!(u64),
                    ScalarField::QueueLimit => doc.queue_limit = number!(u32),
                    ScalarField::PassiveDcc => match parse_bool(raw) {
                        Some(v) => doc.passive_dcc = v,
                        None => return CommitOutcome::Invalid("expected true/false".to_string()),
                    },
                    ScalarField::DccPortMin => doc.dcc_port_min = number!(u16),
                    ScalarField::DccPortMax => doc.dcc_port_max = number!(u16),
                    ScalarField::ResumeEnabled => match parse_bool(raw) {
                        Some(v) => doc.resume_enabled = v,
                        None => return CommitOutcome::Invalid("expected true/false".to_string()),
                    },
                    ScalarField::EnabledProviders => {
                        doc.enabled_providers = parse_channel_list(raw)
                    }
                    ScalarField::ResultsPerPage => doc.results_per_page = number!(u32),
                    ScalarField::SearchTimeout => doc.search_timeout = number!(u64),
                    ScalarField::MoveCompleted => match parse_bool(raw) {
                        Some(v) => doc.move_completed = v,
                        None => return CommitOutcome::Invalid("expected true/false".to_string()),
                    },
                    ScalarField::MoveCompletedDir => {
                        doc.move_completed_dir = raw.trim().to_string()
                    }
                    ScalarField::PostprocessScriptEnabled => match parse_bool(raw) {
                        Some(v) => doc.postprocess_script_enabled = v,
                        None => return CommitOutcome::Invalid("expected true/false".to_string()),
                    },
                    ScalarField::PostprocessScript => {
                        doc.postprocess_script = raw.trim().to_string()
                    }
                    ScalarField::PostprocessTimeout => doc.postprocess_timeout = number!(u64),
                }
                self.dirty = true;
                CommitOutcome::Deferred
            }
            SettingsItem::Network { name, field } => {
                let Some(network) = doc.networks.get_mut(name) else {
                    return CommitOutcome::Noop;
                };
                match field {
                    NetworkField::Host => network.host = raw.trim().to_string(),
                    NetworkField::Port => network.port = number!(u16),
                    NetworkField::Ssl => match parse_bool(raw) {
                        Some(v) => network.ssl = v,
                        None => return CommitOutcome::Invalid("expected true/false".to_string()),
                    },
                    NetworkField::AutojoinChannels => {
                        network.autojoin_channels = parse_channel_list(raw)
                    }
                    NetworkField::JoinDelaySecs => network.join_delay_secs = number!(u64),
                }
                CommitOutcome::PersistNetwork(name.clone(), network.clone())
            }
        }
    }

    /// Flip the boolean item under the cursor, if it is one.
    pub fn toggle_current(&mut self) -> CommitOutcome {
        let Some(item) = self.current_item() else {
            return CommitOutcome::Noop;
        };
        let current = self.value_text(&item);
        match parse_bool(&current) {
            Some(v) => self.apply_value(&item, if v { "false" } else { "true" }),
            None => CommitOutcome::Noop,
        }
    }

    /// Create a network with defaults derived from its name and hand back
    /// the eager PUT.
    pub fn add_network(&mut self, name: &str) -> CommitOutcome {
        let name = name.trim();
        if name.is_empty() {
            return CommitOutcome::Invalid("network name must not be empty".to_string());
        }
        let Some(doc) = self.doc.as_mut() else {
            return CommitOutcome::Noop;
        };
        if doc.networks.contains_key(name) {
            return CommitOutcome::Invalid(format!("network {} already exists", name));
        }
        let network = NetworkConfig {
            host: format!("irc.{}.net", name.to_lowercase()),
            ..NetworkConfig::default()
        };
        doc.networks.insert(name.to_string(), network.clone());
        CommitOutcome::PersistNetwork(name.to_string(), network)
    }

    /// Remove a network from the working copy and hand back the eager
    /// DELETE.
    pub fn remove_network(&mut self, name: &str) -> CommitOutcome {
        let Some(doc) = self.doc.as_mut() else {
            return CommitOutcome::Noop;
        };
        if doc.networks.remove(name).is_none() {
            return CommitOutcome::Noop;
        }
        let len = self.items().len();
        if len > 0 {
            self.cursor = self.cursor.min(len - 1);
        }
        CommitOutcome::DeleteNetwork(name.to_string())
    }

    /// Name of the network under the cursor, if the cursor is on one.
    pub fn current_network_name(&self) -> Option<String> {
        match self.current_item() {
            Some(SettingsItem::Network { name, .. }) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with_network(name: &str) -> SettingsEditor {
        let mut editor = SettingsEditor::default();
        let mut doc = AgentConfig::default();
        doc.networks.insert(
            name.to_string(),
            NetworkConfig {
                host: format!("irc.{}.net", name.to_lowercase()),
                port: 6667,
                ssl: false,
                autojoin_channels: vec!["#old".to_string()],
                join_delay_secs: 6,
            },
        );
        editor.load(doc);
        editor
    }

    fn cursor_to(editor: &mut SettingsEditor, wanted: &SettingsItem) {
        let idx = editor
            .items()
            .iter()
            .position(|i| i == wanted)
            .expect("item should exist");
        editor.cursor = idx;
    }

    #[test]
    fn test_channel_list_synthesis() {
        assert_eq!(
            parse_channel_list("#a, #b ,  #c"),
            vec!["#a".to_string(), "#b".to_string(), "#c".to_string()]
        );
        assert_eq!(parse_channel_list(",, ,"), Vec::<String>::new());
        assert_eq!(parse_channel_list("#only"), vec!["#only".to_string()]);
    }

    #[test]
    fn test_network_channel_commit_is_eager() {
        let mut editor = editor_with_network("Rizon");
        cursor_to(
            &mut editor,
            &SettingsItem::Network {
                name: "Rizon".to_string(),
                field: NetworkField::AutojoinChannels,
            },
        );

        editor.begin_edit();
        assert_eq!(editor.editing.as_deref(), Some("#old"));

        editor.editing = Some("#a, #b ,  #c".to_string());
        let outcome = editor.commit_edit();

        match outcome {
            CommitOutcome::PersistNetwork(name, network) => {
                assert_eq!(name, "Rizon");
                assert_eq!(network.autojoin_channels, vec!["#a", "#b", "#c"]);
            }
            other => panic!("expected eager network persist, got {:?}", other),
        }

        // The working copy reflects the same change (bulk save stays
        // consistent with the per-network call).
        let doc = editor.doc.as_ref().unwrap();
        assert_eq!(
            doc.networks["Rizon"].autojoin_channels,
            vec!["#a", "#b", "#c"]
        );
        // Eagerly persisted, so nothing is pending a save.
        assert!(!editor.dirty);
    }

    #[test]
    fn test_scalar_commit_is_deferred() {
        let mut editor = editor_with_network("Rizon");
        cursor_to(&mut editor, &SettingsItem::Scalar(ScalarField::Nickname));

        editor.editing = Some("operator".to_string());
        assert_eq!(editor.commit_edit(), CommitOutcome::Deferred);
        assert!(editor.dirty);
        assert_eq!(editor.doc.as_ref().unwrap().nickname, "operator");
    }

    #[test]
    fn test_invalid_number_leaves_document_unchanged() {
        let mut editor = editor_with_network("Rizon");
        cursor_to(&mut editor, &SettingsItem::Scalar(ScalarField::MaxRetries));

        editor.editing = Some("lots".to_string());
        let outcome = editor.commit_edit();
        assert!(matches!(outcome, CommitOutcome::Invalid(_)));
        assert_eq!(editor.doc.as_ref().unwrap().max_retries, 3);
        assert!(!editor.dirty);
    }

    #[test]
    fn test_proxy_url_is_never_validated() {
        let mut editor = editor_with_network("Rizon");
        assert!(!editor.doc.as_ref().unwrap().proxy_enabled);

        cursor_to(&mut editor, &SettingsItem::Scalar(ScalarField::ProxyUrl));
        editor.editing = Some("not a url at all".to_string());
        assert_eq!(editor.commit_edit(), CommitOutcome::Deferred);
        assert_eq!(
            editor.doc.as_ref().unwrap().proxy_url,
            "not a url at all"
        );
    }

    #[test]
    fn test_draft_reseeds_after_reload() {
        let mut editor = editor_with_network("Rizon");
        cursor_to(
            &mut editor,
            &SettingsItem::Network {
                name: "Rizon".to_string(),
                field: NetworkField::AutojoinChannels,
            },
        );
        editor.begin_edit();
        assert_eq!(editor.editing.as_deref(), Some("#old"));
        editor.cancel_edit();

        // A fresh document arrives; the next edit seeds from the new value.
        let mut doc = editor.doc.clone().unwrap();
        doc.networks.get_mut("Rizon").unwrap().autojoin_channels =
            vec!["#new".to_string(), "#extra".to_string()];
        editor.load(doc);

        cursor_to(
            &mut editor,
            &SettingsItem::Network {
                name: "Rizon".to_string(),
                field: NetworkField::AutojoinChannels,
            },
        );
        editor.begin_edit();
        assert_eq!(editor.editing.as_deref(), Some("#new, #extra"));
    }

    #[test]
    fn test_add_network_defaults_and_rejects_duplicates() {
        let mut editor = editor_with_network("Rizon");

        match editor.add_network("Abjects") {
            CommitOutcome::PersistNetwork(name, network) => {
                assert_eq!(name, "Abjects");
                assert_eq!(network.host, "irc.abjects.net");
                assert_eq!(network.port, 6697);
                assert!(network.ssl);
            }
            other => panic!("expected persist, got {:?}", other),
        }
        assert!(editor.doc.as_ref().unwrap().networks.contains_key("Abjects"));

        assert!(matches!(
            editor.add_network("Abjects"),
            CommitOutcome::Invalid(_)
        ));
        assert!(matches!(editor.add_network("  "), CommitOutcome::Invalid(_)));
    }

    #[test]
    fn test_remove_network_is_eager() {
        let mut editor = editor_with_network("Rizon");
        assert_eq!(
            editor.remove_network("Rizon"),
            CommitOutcome::DeleteNetwork("Rizon".to_string())
        );
        assert!(editor.doc.as_ref().unwrap().networks.is_empty());
        assert_eq!(editor.remove_network("Rizon"), CommitOutcome::Noop);
    }

    #[test]
    fn test_toggle_network_bool_is_eager() {
        let mut editor = editor_with_network("Rizon");
        cursor_to(
            &mut editor,
            &SettingsItem::Network {
                name: "Rizon".to_string(),
                field: NetworkField::Ssl,
            },
        );

        match editor.toggle_current() {
            CommitOutcome::PersistNetwork(_, network) => assert!(network.ssl),
            other => panic!("expected persist, got {:?}", other),
        }
    }

    #[test]
    fn test_load_clears_dirty_and_edit() {
        let mut editor = editor_with_network("Rizon");
        cursor_to(&mut editor, &SettingsItem::Scalar(ScalarField::Nickname));
        editor.editing = Some("half-typed".to_string());
        editor.dirty = true;

        editor.load(AgentConfig::default());
        assert!(!editor.dirty);
        assert!(editor.editing.is_none());
    }
}
