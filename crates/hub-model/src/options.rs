//! Configuration options for report processing.

use serde::{Deserialize, Serialize};

use crate::batch::UsTimeZone;

/// What to do when individual rows fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Drop failing rows, keep the rest, and report every failure.
    #[default]
    Collect,
    /// Abort on the first failing row.
    FailFast,
}

/// Options shared by normalization, ingestion and scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Zone whose midnight anchors date-only DATETIME input.
    pub reference_time_zone: UsTimeZone,

    /// Row failure handling during ingestion and output.
    pub row_errors: RowErrorPolicy,

    /// Minimum minutes between a reference time and the next batch; see
    /// [`OrganizationService::next_batch_time`](crate::OrganizationService::next_batch_time).
    pub min_batch_spacing_minutes: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            reference_time_zone: UsTimeZone::Central,
            row_errors: RowErrorPolicy::Collect,
            min_batch_spacing_minutes: 0,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reference_time_zone(mut self, zone: UsTimeZone) -> Self {
        self.reference_time_zone = zone;
        self
    }

    #[must_use]
    pub fn with_row_errors(mut self, policy: RowErrorPolicy) -> Self {
        self.row_errors = policy;
        self
    }

    #[must_use]
    pub fn with_min_batch_spacing(mut self, minutes: u32) -> Self {
        self.min_batch_spacing_minutes = minutes;
        self
    }
}
