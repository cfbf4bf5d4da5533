//! Serde helpers for the persisted snapshot format.
//!
//! Snapshots written by earlier releases store flags as `"SI"`/`"NO"`
//! strings and spreadsheet cells as whatever JSON type the sheet produced
//! (strings, numbers or `null`). These helpers keep that format readable.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serializer};
use std::fmt;

/// `bool` stored as `"SI"` / `"NO"`.
pub mod yes_no {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "SI" } else { "NO" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(serde_json::Value::String(s)) => {
                matches!(s.trim().to_uppercase().as_str(), "SI" | "SÍ" | "YES" | "TRUE")
            }
            Some(serde_json::Value::Bool(b)) => b,
            _ => false,
        })
    }
}

/// `bool` stored as `"Si"` / `"No"` (additional-item personal flag).
pub mod si_no {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Si" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        super::yes_no::deserialize(deserializer)
    }
}

/// Deserialize any scalar cell value (string, number, bool, null) into a `String`.
pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(LenientString)
}

/// Like [`lenient_string`], but empty and `null` values become `None`.
pub fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = deserializer.deserialize_any(LenientString)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Treat an explicit `null` as the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

struct LenientString;

impl<'de> Visitor<'de> for LenientString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(LenientString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Probe {
        #[serde(with = "yes_no", default)]
        flag: bool,
        #[serde(deserialize_with = "lenient_string", default)]
        cell: String,
        #[serde(deserialize_with = "lenient_opt_string", default)]
        maybe: Option<String>,
    }

    #[test]
    fn test_yes_no_round_trip() {
        let probe = Probe {
            flag: true,
            cell: "x".to_string(),
            maybe: None,
        };
        let json = serde_json::to_string(&probe).unwrap();
        assert!(json.contains("\"flag\":\"SI\""));
        let back: Probe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, probe);
    }

    #[test]
    fn test_lenient_cells() {
        let probe: Probe =
            serde_json::from_str(r#"{"flag":"NO","cell":12345,"maybe":""}"#).unwrap();
        assert!(!probe.flag);
        assert_eq!(probe.cell, "12345");
        assert_eq!(probe.maybe, None);

        let probe: Probe = serde_json::from_str(r#"{"cell":null,"maybe":7}"#).unwrap();
        assert_eq!(probe.cell, "");
        assert_eq!(probe.maybe.as_deref(), Some("7"));
    }
}
