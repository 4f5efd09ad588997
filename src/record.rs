//! Flat attribute records extracted from controller XML responses.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Attributes of a single response element (`SENSOR`, `PSItem`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder-style [`Self::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a field that the decoder requires.
    pub fn field(&self, name: &str) -> Result<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingField(name.to_owned()))
    }

    /// Look up an optional field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Collect the attributes of every element named `tag` below the document root.
///
/// Elements are returned in document order. The root element itself is never
/// matched. Documents with a DTD are rejected.
pub fn extract_records(xml: &str, tag: &str) -> Result<Vec<Record>> {
    let doc = roxmltree::Document::parse(xml.trim())?;

    let records: Vec<Record> = doc
        .root_element()
        .descendants()
        .skip(1)
        .filter(|node| node.is_element() && node.has_tag_name(tag))
        .map(|node| {
            node.attributes()
                .map(|attr| (attr.name(), attr.value()))
                .collect::<Record>()
        })
        .collect();

    Ok(records)
}
