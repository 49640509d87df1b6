// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// Errors crossing the agent HTTP boundary.
///
/// Read-path (polling) callers log these and keep their previous state;
/// write-path callers turn them into a transient notification.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("agent returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl AgentError {
    /// Short human message for the notification line.
    pub fn summary(&self) -> String {
        match self {
            AgentError::Transport(e) => {
                if e.is_timeout() {
                    "agent timed out".to_string()
                } else if e.is_connect() {
                    "agent unreachable".to_string()
                } else {
                    "request failed".to_string()
                }
            }
            AgentError::Status { status, .. } => format!("agent error (HTTP {})", status),
            AgentError::Decode(_) => "bad response from agent".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_summary_includes_code() {
        let err = AgentError::Status {
            status: 404,
            message: "Transfer not found".to_string(),
        };
        assert!(err.summary().contains("404"));
        assert!(err.to_string().contains("Transfer not found"));
    }

    #[test]
    fn test_decode_summary_is_short() {
        let err = AgentError::Decode("missing field `transfers`".to_string());
        assert_eq!(err.summary(), "bad response from agent");
    }
}
