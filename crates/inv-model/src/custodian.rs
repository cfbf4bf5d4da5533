//! Custodians (resguardantes) and the auditors running the session.

use serde::{Deserialize, Serialize};

use crate::wire::{lenient_opt_string, lenient_string};

/// A person accountable for assets and physical locations.
///
/// The name identifies the custodian within one session only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Custodian {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,

    /// Home area id.
    #[serde(default, deserialize_with = "lenient_string")]
    pub area: String,

    /// Location labels such as `"OFICINA 3"`.
    #[serde(default)]
    pub locations: Vec<String>,

    /// Single-location field kept by older snapshots.
    #[serde(
        rename = "locationWithId",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_with_id: Option<String>,
}

impl Custodian {
    pub fn new(name: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            area: area.into(),
            locations: Vec::new(),
            location_with_id: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.push(location.into());
        self
    }

    /// Location labels to account for, honoring the legacy single field.
    pub fn location_labels(&self) -> Vec<&str> {
        if self.locations.is_empty() {
            self.location_with_id.as_deref().into_iter().collect()
        } else {
            self.locations.iter().map(String::as_str).collect()
        }
    }

    /// The location recorded for this custodian when no precise one is chosen.
    pub fn registered_location(&self) -> Option<&str> {
        self.location_with_id
            .as_deref()
            .or_else(|| self.locations.first().map(String::as_str))
            .filter(|loc| !loc.trim().is_empty())
    }
}

/// The custodian currently receiving located assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCustodian {
    #[serde(flatten)]
    pub custodian: Custodian,

    /// Location picked at scan time; overrides the registered location.
    #[serde(rename = "preciseLocation", default, skip_serializing_if = "Option::is_none")]
    pub precise_location: Option<String>,
}

impl ActiveCustodian {
    pub fn new(custodian: Custodian) -> Self {
        Self {
            custodian,
            precise_location: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.custodian.name
    }

    /// Location stamped on assets located under this custodian.
    pub fn effective_location(&self) -> Option<String> {
        self.precise_location
            .as_deref()
            .filter(|loc| !loc.trim().is_empty())
            .or_else(|| self.custodian.registered_location())
            .map(str::to_string)
    }
}

/// An allow-listed auditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verifier {
    #[serde(deserialize_with = "lenient_string")]
    pub number: String,
    pub name: String,
}

impl Verifier {
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_location_prefers_legacy_field() {
        let mut custodian = Custodian::new("ANA", "10").with_location("OFICINA 2");
        assert_eq!(custodian.registered_location(), Some("OFICINA 2"));

        custodian.location_with_id = Some("BODEGA 1".to_string());
        assert_eq!(custodian.registered_location(), Some("BODEGA 1"));
    }

    #[test]
    fn test_location_labels_legacy_fallback() {
        let mut custodian = Custodian::new("ANA", "10");
        assert!(custodian.location_labels().is_empty());

        custodian.location_with_id = Some("SALA 4".to_string());
        assert_eq!(custodian.location_labels(), vec!["SALA 4"]);
    }

    #[test]
    fn test_effective_location() {
        let custodian = Custodian::new("ANA", "10").with_location("OFICINA 1");
        let mut active = ActiveCustodian::new(custodian);
        assert_eq!(active.effective_location().as_deref(), Some("OFICINA 1"));

        active.precise_location = Some("OFICINA 3".to_string());
        assert_eq!(active.effective_location().as_deref(), Some("OFICINA 3"));

        active.precise_location = Some("  ".to_string());
        assert_eq!(active.effective_location().as_deref(), Some("OFICINA 1"));
    }

    #[test]
    fn test_active_custodian_flattens() {
        let active = ActiveCustodian {
            custodian: Custodian::new("ANA", "10"),
            precise_location: Some("SALA 1".into()),
        };
        let json = serde_json::to_value(&active).unwrap();
        assert_eq!(json["name"], "ANA");
        assert_eq!(json["preciseLocation"], "SALA 1");
    }
}
