use super::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stored value of one field: a scalar, or the checked values of a
/// multi-choice group in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::Single(single) => single == value,
            Self::Multiple(values) => values.iter().any(|v| v == value),
        }
    }

    /// Text written into a non-selectable control.
    pub fn joined(&self) -> String {
        match self {
            Self::Single(single) => single.clone(),
            Self::Multiple(values) => values.join(","),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// Captured state of one form page, serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot {
    fields: BTreeMap<String, FieldValue>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Adds `value` to the multi-choice sequence under `name`, promoting a
    /// scalar to a sequence and skipping duplicates.
    pub(crate) fn push_multiple(&mut self, name: &str, value: &str) {
        match self.fields.get_mut(name) {
            Some(FieldValue::Multiple(values)) => {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
            Some(FieldValue::Single(single)) => {
                let mut values = vec![std::mem::take(single)];
                if values[0] != value {
                    values.push(value.to_string());
                }
                self.fields
                    .insert(name.to_string(), FieldValue::Multiple(values));
            }
            None => {
                self.fields.insert(
                    name.to_string(),
                    FieldValue::Multiple(vec![value.to_string()]),
                );
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (name, value) in iter {
            snapshot.insert(name, value);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_a_flat_object() -> Result<()> {
        let snapshot: FormSnapshot = [
            ("name", FieldValue::from("Aya")),
            ("interest", FieldValue::from(vec!["a", "c"])),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            snapshot.to_json()?,
            r#"{"interest":["a","c"],"name":"Aya"}"#
        );
        assert_eq!(FormSnapshot::from_json(&snapshot.to_json()?)?, snapshot);
        Ok(())
    }

    #[test]
    fn non_string_values_are_rejected() {
        assert!(FormSnapshot::from_json(r#"{"age": 3}"#).is_err());
        assert!(FormSnapshot::from_json(r#"["a"]"#).is_err());
        assert!(FormSnapshot::from_json("{not json").is_err());
    }

    #[test]
    fn push_multiple_promotes_and_dedups() {
        let mut snapshot = FormSnapshot::new();
        snapshot.insert("pet", "cat");
        snapshot.push_multiple("pet", "dog");
        snapshot.push_multiple("pet", "cat");
        snapshot.push_multiple("color", "red");
        assert_eq!(snapshot.get("pet"), Some(&FieldValue::from(vec!["cat", "dog"])));
        assert_eq!(snapshot.get("color"), Some(&FieldValue::from(vec!["red"])));
        assert!(snapshot.get("pet").is_some_and(|v| v.contains("dog")));
        assert_eq!(snapshot.get("pet").map(FieldValue::joined).as_deref(), Some("cat,dog"));
    }
}
