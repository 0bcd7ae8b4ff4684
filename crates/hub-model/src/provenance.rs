use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportId(Uuid);

impl ReportId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where the rows of a report came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// Submitted by a sending client.
    Client { organization: String, client: String },
    /// Built by a test fixture.
    Test,
    /// Derived from another report by an action (`copy`, `filter: ...`, `merge`, ...).
    Report { id: ReportId, action: String },
}

impl Source {
    pub fn client(organization: impl Into<String>, client: impl Into<String>) -> Self {
        Source::Client {
            organization: organization.into(),
            client: client.into(),
        }
    }

    pub fn derived(id: ReportId, action: impl Into<String>) -> Self {
        Source::Report {
            id,
            action: action.into(),
        }
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            Source::Report { action, .. } => Some(action),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Client {
                organization,
                client,
            } => write!(f, "client {organization}.{client}"),
            Source::Test => f.write_str("test"),
            Source::Report { id, action } => write!(f, "{action} of {id}"),
        }
    }
}
