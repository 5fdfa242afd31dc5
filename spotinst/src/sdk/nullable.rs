//! Three-state optional for API request fields
//!
//! The API distinguishes a field that is left out of the request (keep the
//! current value) from a field sent as `null` (clear it). `Option` cannot
//! carry that difference, so every optional model field is a `Nullable`.
//! Model fields pair it with
//! `#[serde(skip_serializing_if = "Nullable::is_omitted")]`, and the model's
//! container-level `#[serde(default)]` makes missing response fields
//! `Omitted`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Nullable<T> {
    /// Not sent at all
    #[default]
    Omitted,
    /// Sent as JSON null
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    /// Create semantics: an absent value is left out of the request
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Nullable::Value(v),
            None => Nullable::Omitted,
        }
    }

    /// Update semantics: an absent value clears the remote field
    pub fn or_null(value: Option<T>) -> Self {
        match value {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, Nullable::Omitted)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Nullable::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable access to the value, inserting a default one first if needed
    pub fn get_or_insert_default(&mut self) -> &mut T
    where
        T: Default,
    {
        if !matches!(self, Nullable::Value(_)) {
            *self = Nullable::Value(T::default());
        }
        match self {
            Nullable::Value(v) => v,
            // just replaced with a value above
            _ => unreachable!(),
        }
    }
}

impl<T: Clone> Nullable<T> {
    pub fn cloned(&self) -> Option<T> {
        self.value().cloned()
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Value(v) => v.serialize(serializer),
            Nullable::Omitted | Nullable::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    struct Capacity {
        #[serde(skip_serializing_if = "Nullable::is_omitted")]
        minimum: Nullable<i64>,
        #[serde(skip_serializing_if = "Nullable::is_omitted")]
        maximum: Nullable<i64>,
        #[serde(skip_serializing_if = "Nullable::is_omitted")]
        target: Nullable<i64>,
    }

    #[test]
    fn omitted_fields_are_skipped_and_null_is_sent() {
        let capacity = Capacity {
            minimum: Nullable::Value(1),
            maximum: Nullable::Null,
            target: Nullable::Omitted,
        };

        assert_eq!(
            serde_json::to_value(&capacity).unwrap(),
            json!({"minimum": 1, "maximum": null})
        );
    }

    #[test]
    fn missing_fields_deserialize_as_omitted() {
        let capacity: Capacity =
            serde_json::from_value(json!({"minimum": 2, "maximum": null})).unwrap();

        assert_eq!(capacity.minimum, Nullable::Value(2));
        assert_eq!(capacity.maximum, Nullable::Null);
        assert!(capacity.target.is_omitted());
    }

    #[test]
    fn create_and_update_semantics_differ_for_absent_values() {
        assert!(Nullable::<i64>::from_option(None).is_omitted());
        assert!(Nullable::<i64>::or_null(None).is_null());
        assert_eq!(Nullable::or_null(Some(3)).into_option(), Some(3));
    }

    #[test]
    fn get_or_insert_default_replaces_null() {
        let mut capacity: Nullable<Capacity> = Nullable::Null;
        capacity.get_or_insert_default().minimum = Nullable::Value(0);
        assert_eq!(capacity.value().unwrap().minimum, Nullable::Value(0));
    }
}
