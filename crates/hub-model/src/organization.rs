//! Sending and receiving parties.
//!
//! An organization owns its services (receivers) and clients (senders).
//! Services and clients carry the owning organization's name only so they can
//! report a fully-qualified `organization.name`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::batch::Batch;
use crate::error::{HubError, Result, SchemaError};
use crate::options::EngineOptions;

pub const DEFAULT_MEMBER_NAME: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Format {
    #[default]
    Csv,
    Hl7,
    Hl7Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transforms {
    #[serde(default)]
    pub deidentify: bool,
}

/// A receiver of reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationService {
    pub name: String,
    pub topic: String,
    pub schema: String,
    /// Filter call expressions, e.g. `matches(ordering_facility_state, AZ)`.
    #[serde(default)]
    pub jurisdictional_filter: Vec<String>,
    #[serde(default)]
    pub transforms: Transforms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub format: Format,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<Batch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Back-reference to the owner, filled in when the catalog is built.
    #[serde(skip)]
    pub organization_name: String,
}

impl OrganizationService {
    pub fn new(name: impl Into<String>, topic: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topic: topic.into(),
            schema: schema.into(),
            jurisdictional_filter: Vec::new(),
            transforms: Transforms::default(),
            address: None,
            format: Format::default(),
            batch: None,
            description: None,
            organization_name: String::new(),
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.jurisdictional_filter = filters;
        self
    }

    #[must_use]
    pub fn with_deidentify(mut self, deidentify: bool) -> Self {
        self.transforms.deidentify = deidentify;
        self
    }

    #[must_use]
    pub fn with_batch(mut self, batch: Batch) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.organization_name, self.name)
    }

    /// When this service's next batch goes out, or `None` if it does not batch.
    ///
    /// The schedule is pushed back by `options.min_batch_spacing_minutes`.
    pub fn next_batch_time(
        &self,
        now: DateTime<FixedOffset>,
        options: &EngineOptions,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        let Some(batch) = &self.batch else {
            return Ok(None);
        };
        batch
            .next_batch_time_with_spacing(now, options.min_batch_spacing_minutes)
            .map(Some)
            .map_err(|error| match error {
                HubError::Schema(SchemaError::ImproperBatch { reason }) => {
                    SchemaError::InvalidBatch {
                        service: self.full_name(),
                        reason,
                    }
                    .into()
                }
                other => other,
            })
    }
}

/// A sender of reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationClient {
    pub name: String,
    #[serde(default)]
    pub format: Format,
    pub topic: String,
    pub schema: String,
    #[serde(skip)]
    pub organization_name: String,
}

impl OrganizationClient {
    pub fn new(name: impl Into<String>, topic: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: Format::default(),
            topic: topic.into(),
            schema: schema.into(),
            organization_name: String::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.organization_name, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub services: Vec<OrganizationService>,
    #[serde(default)]
    pub clients: Vec<OrganizationClient>,
}

impl Organization {
    pub fn new(
        name: impl Into<String>,
        services: Vec<OrganizationService>,
        clients: Vec<OrganizationClient>,
    ) -> Self {
        let mut organization = Self {
            name: name.into(),
            description: None,
            services,
            clients,
        };
        organization.link_members();
        organization
    }

    /// Point every service and client back at this organization.
    pub fn link_members(&mut self) {
        for service in &mut self.services {
            service.organization_name = self.name.clone();
        }
        for client in &mut self.clients {
            client.organization_name = self.name.clone();
        }
    }

    pub fn find_service(&self, name: &str) -> Option<&OrganizationService> {
        self.services
            .iter()
            .find(|service| service.name.eq_ignore_ascii_case(name))
    }

    pub fn find_client(&self, name: &str) -> Option<&OrganizationClient> {
        self.clients
            .iter()
            .find(|client| client.name.eq_ignore_ascii_case(name))
    }
}

/// Split `org.member` into its parts; a bare `org` names `org.default`.
///
/// Returns `None` for blank names and names with more than two parts.
pub fn parse_qualified_name(name: &str) -> Option<(&str, &str)> {
    if name.trim().is_empty() {
        return None;
    }
    let mut parts = name.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(org), Some(member), None) => Some((org, member)),
        (Some(org), None, None) => Some((org, DEFAULT_MEMBER_NAME)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchOperation, UsTimeZone};
    use chrono::{TimeZone, Utc};
    use chrono_tz::America;

    fn hourly_service(number_per_day: u32) -> OrganizationService {
        let mut org = Organization::new(
            "az-phd",
            vec![
                OrganizationService::new("elr", "covid-19", "az").with_batch(Batch::new(
                    BatchOperation::Merge,
                    number_per_day,
                    "04:05",
                    UsTimeZone::Arizona,
                )),
            ],
            Vec::new(),
        );
        org.link_members();
        org.services.remove(0)
    }

    #[test]
    fn members_know_their_owner() {
        let org = Organization::new(
            "phd1",
            vec![OrganizationService::new("elr", "test", "one")],
            vec![OrganizationClient::new("sender", "test", "one")],
        );
        assert_eq!(org.services[0].full_name(), "phd1.elr");
        assert_eq!(org.clients[0].full_name(), "phd1.sender");
        assert!(org.find_service("ELR").is_some());
    }

    #[test]
    fn qualified_names() {
        assert_eq!(parse_qualified_name("phd1.elr"), Some(("phd1", "elr")));
        assert_eq!(parse_qualified_name("simple_report"), Some(("simple_report", "default")));
        assert_eq!(parse_qualified_name("a.b.c"), None);
        assert_eq!(parse_qualified_name(" "), None);
    }

    #[test]
    fn next_batch_honours_configured_spacing() {
        let service = hourly_service(24);
        // 17:03 in Phoenix, two minutes before the 17:05 tick.
        let now = Utc.with_ymd_and_hms(2020, 10, 2, 0, 3, 0).unwrap().fixed_offset();

        let next = service.next_batch_time(now, &EngineOptions::default()).unwrap();
        let expected = America::Phoenix.with_ymd_and_hms(2020, 10, 1, 17, 5, 0).unwrap();
        assert_eq!(next, Some(expected.fixed_offset()));

        let spaced = EngineOptions::new().with_min_batch_spacing(5);
        let next = service.next_batch_time(now, &spaced).unwrap();
        let expected = America::Phoenix.with_ymd_and_hms(2020, 10, 1, 18, 5, 0).unwrap();
        assert_eq!(next, Some(expected.fixed_offset()));
    }

    #[test]
    fn next_batch_without_policy_or_with_a_bad_one() {
        let now = Utc::now().fixed_offset();
        let unbatched = OrganizationService::new("elr", "covid-19", "az");
        assert_eq!(unbatched.next_batch_time(now, &EngineOptions::default()).unwrap(), None);

        let error = hourly_service(7)
            .next_batch_time(now, &EngineOptions::default())
            .unwrap_err();
        assert!(matches!(
            error,
            HubError::Schema(SchemaError::InvalidBatch { ref service, .. }) if service == "az-phd.elr"
        ));
    }
}
