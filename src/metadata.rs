//! Metadata attached to a rendered error.
//!
//! Metadata is organised as groups, sections and rows:
//!
//! - groups are rendered as cards
//! - sections are headings within a card
//! - rows are key/value pairs rendered inside a table
//!
//! Primitive row values are shown verbatim; anything else goes through the
//! dumper. Insertion order is preserved at every level.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A key/value pair inside a metadata section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub key: String,
    pub value: Value,
    /// Force the value through the dumper even when it is a primitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump: Option<bool>,
}

impl MetadataRow {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            dump: None,
        }
    }

    pub fn dumped(mut self) -> Self {
        self.dump = Some(true);
        self
    }

    /// Whether the value is shown as-is rather than deep-formatted.
    pub fn is_verbatim(&self) -> bool {
        self.dump != Some(true) && is_primitive(&self.value)
    }
}

/// Whether a value is one of the primitive kinds rendered without the dumper.
pub fn is_primitive(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Bool(_) | Value::Number(_) | Value::Null
    )
}

/// The value stored under a section: a lone row or a sequence of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section {
    One(MetadataRow),
    Many(Vec<MetadataRow>),
}

impl Section {
    pub fn rows(&self) -> &[MetadataRow] {
        match self {
            Section::One(row) => std::slice::from_ref(row),
            Section::Many(rows) => rows,
        }
    }

    fn into_rows(self) -> Vec<MetadataRow> {
        match self {
            Section::One(row) => vec![row],
            Section::Many(rows) => rows,
        }
    }

    /// Append `incoming` after the existing rows. The result is always a
    /// sequence, even when both sides were lone rows.
    pub fn merge(&mut self, incoming: Section) {
        let existing = std::mem::replace(self, Section::Many(Vec::new()));
        let mut rows = existing.into_rows();
        rows.extend(incoming.into_rows());
        *self = Section::Many(rows);
    }
}

impl From<MetadataRow> for Section {
    fn from(row: MetadataRow) -> Self {
        Section::One(row)
    }
}

impl From<Vec<MetadataRow>> for Section {
    fn from(rows: Vec<MetadataRow>) -> Self {
        Section::Many(rows)
    }
}

/// Ordered sections of one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    entries: Vec<(String, Section)>,
}

impl Sections {
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.entries
            .iter()
            .find(|(section, _)| section == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_or_merge(&mut self, name: String, value: Section) {
        match self.entries.iter_mut().find(|(section, _)| *section == name) {
            Some((_, existing)) => existing.merge(value),
            None => self.entries.push((name, value)),
        }
    }
}

impl Serialize for Sections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ordered snapshot of every group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataGroups {
    entries: Vec<(String, Sections)>,
}

impl MetadataGroups {
    pub fn get(&self, name: &str) -> Option<&Sections> {
        self.entries
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, sections)| sections)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sections)> {
        self.entries
            .iter()
            .map(|(name, sections)| (name.as_str(), sections))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn group_mut(&mut self, name: String) -> &mut Sections {
        let index = match self.entries.iter().position(|(group, _)| *group == name) {
            Some(index) => index,
            None => {
                self.entries.push((name, Sections::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

impl Serialize for MetadataGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, sections) in &self.entries {
            map.serialize_entry(name, sections)?;
        }
        map.end()
    }
}

/// Mergeable metadata store owned by one render.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    groups: MetadataGroups,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a group and its sections, merging into existing data.
    ///
    /// A new section is stored verbatim. A section that already exists is
    /// turned into a sequence with the existing rows first and the incoming
    /// rows appended.
    pub fn group<I, S, V>(&mut self, name: impl Into<String>, sections: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Section>,
    {
        let group = self.groups.group_mut(name.into());
        for (section, value) in sections {
            group.insert_or_merge(section.into(), value.into());
        }
        self
    }

    /// Read-only snapshot of every group, section and row.
    pub fn to_json(&self) -> &MetadataGroups {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
