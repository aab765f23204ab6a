//! Field lookup over backend JSON objects.
//!
//! The backend names the same field differently across endpoints (`_id` or
//! `id`, `labourId` or `targetId`), and one document may carry several of
//! those names at once. Types decode through [`WireObject`] and take the first
//! usable value from an ordered list of names, so a repeated field never fails
//! the document.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub(crate) struct WireObject(Map<String, Value>);

impl<'de> Deserialize<'de> for WireObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::deserialize(deserializer).map(Self)
    }
}

impl WireObject {
    fn values<'a>(&'a self, keys: &'a [&'a str]) -> impl Iterator<Item = &'a Value> + 'a {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .filter(|value| !value.is_null())
    }

    /// Strings, numbers, and populated refs (`{ "_id": ... }`) all yield an id.
    pub(crate) fn string(&self, keys: &[&str]) -> Option<String> {
        self.values(keys).find_map(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Object(map) => map
                .get("_id")
                .or_else(|| map.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
    }

    pub(crate) fn text(&self, keys: &[&str]) -> Option<String> {
        self.values(keys)
            .find_map(Value::as_str)
            .map(str::to_string)
    }

    pub(crate) fn number(&self, keys: &[&str]) -> Option<f64> {
        self.values(keys).find_map(|value| match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
    }

    pub(crate) fn count(&self, keys: &[&str]) -> Option<u32> {
        self.values(keys)
            .find_map(Value::as_u64)
            .and_then(|value| u32::try_from(value).ok())
    }

    /// Array items that decode as `T`; the rest are dropped.
    pub(crate) fn items<T: DeserializeOwned>(&self, keys: &[&str]) -> Vec<T> {
        self.values(keys)
            .find_map(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| T::deserialize(item).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// RFC 3339 timestamps; anything else reads as absent.
    pub(crate) fn timestamp(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        self.values(keys)
            .filter_map(Value::as_str)
            .find_map(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|at| at.with_timezone(&Utc))
    }
}
