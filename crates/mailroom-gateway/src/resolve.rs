//! Destination resolution: which chat a request is addressed to.

use std::collections::HashMap;

use thiserror::Error;

/// A resolved delivery target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTarget {
    /// Human-facing routing key, used in logs and error payloads.
    pub label: String,
    /// Opaque recipient identifier for the Bot API.
    pub id: String,
}

/// Lookup failure: the offending label plus every label the directory knows,
/// sorted, for client-facing diagnostics.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("chat label {label:?} not found")]
pub struct UnknownLabel {
    pub label: String,
    pub labels: Vec<String>,
}

/// Maps an optional route label to a delivery target.
///
/// One capability, two implementations, chosen at route-registration time:
/// the bare message route uses [`FixedChat`], the labelled route a
/// [`ChatDirectory`].
pub trait ResolveChat: Send + Sync {
    fn resolve(&self, label: Option<&str>) -> Result<ChatTarget, UnknownLabel>;
}

/// Always resolves to one configured chat. Never fails.
pub struct FixedChat {
    target: ChatTarget,
}

impl FixedChat {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            target: ChatTarget {
                label: "default".to_string(),
                id: id.into(),
            },
        }
    }
}

impl ResolveChat for FixedChat {
    fn resolve(&self, _label: Option<&str>) -> Result<ChatTarget, UnknownLabel> {
        Ok(self.target.clone())
    }
}

/// Immutable label → chat-id map built once at startup.
pub struct ChatDirectory {
    chats: HashMap<String, String>,
    labels: Vec<String>,
}

impl ChatDirectory {
    pub fn new(chats: HashMap<String, String>) -> Self {
        let mut labels: Vec<String> = chats.keys().cloned().collect();
        labels.sort();
        Self { chats, labels }
    }
}

impl ResolveChat for ChatDirectory {
    /// Case-sensitive exact match; an empty or unknown label fails with the
    /// full sorted label list attached.
    fn resolve(&self, label: Option<&str>) -> Result<ChatTarget, UnknownLabel> {
        let label = label.unwrap_or_default();
        if !label.is_empty() {
            if let Some(id) = self.chats.get(label) {
                return Ok(ChatTarget {
                    label: label.to_string(),
                    id: id.clone(),
                });
            }
        }
        Err(UnknownLabel {
            label: label.to_string(),
            labels: self.labels.clone(),
        })
    }
}
