//! Serializable configuration tree.

use super::value::GenericValue;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One entry of a camera's configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigNode {
    pub name: String,
    pub info: String,
    pub label: String,
    pub readonly: bool,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Kind tag plus the payload valid for that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Range {
        value: f32,
        min: f32,
        max: f32,
        step: f32,
    },
    Menu {
        value: String,
        choices: Vec<String>,
    },
    Radio {
        value: String,
        choices: Vec<String>,
    },
    /// `value` is absent when the device reports anything other than 0 or 1.
    Toggle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
    },
    Text {
        value: String,
    },
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "datetime")]
    DateTime {
        value: i64,
    },
    Window {
        children: Children,
    },
    Section {
        children: Children,
    },
}

impl NodeKind {
    /// The `type` tag used in the serialized form.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Range { .. } => "range",
            NodeKind::Menu { .. } => "menu",
            NodeKind::Radio { .. } => "radio",
            NodeKind::Toggle { .. } => "toggle",
            NodeKind::Text { .. } => "text",
            NodeKind::DateTime { .. } => "datetime",
            NodeKind::Window { .. } => "window",
            NodeKind::Section { .. } => "section",
        }
    }
}

impl ConfigNode {
    pub fn children(&self) -> Option<&Children> {
        match &self.kind {
            NodeKind::Window { children } | NodeKind::Section { children } => Some(children),
            _ => None,
        }
    }

    /// Current leaf value in generic form; `None` for containers and for
    /// toggles whose raw value was not 0 or 1.
    pub fn value(&self) -> Option<GenericValue> {
        match &self.kind {
            NodeKind::Range { value, .. } => Some(GenericValue::Number(f64::from(*value))),
            NodeKind::Menu { value, .. }
            | NodeKind::Radio { value, .. }
            | NodeKind::Text { value } => Some(GenericValue::Text(value.clone())),
            NodeKind::Toggle { value } => value.map(GenericValue::Bool),
            NodeKind::DateTime { value } => Some(GenericValue::Number(*value as f64)),
            NodeKind::Window { .. } | NodeKind::Section { .. } => None,
        }
    }

    /// Datetime nodes as a UTC timestamp.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self.kind {
            NodeKind::DateTime { value } => Utc.timestamp_millis_opt(value).single(),
            _ => None,
        }
    }

    /// Depth-first search by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&ConfigNode> {
        if self.name == name {
            return Some(self);
        }
        self.children()?.iter().find_map(|child| child.find(name))
    }

    /// Follow child names from this node, e.g. `["settings", "iso"]`.
    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigNode> {
        path.iter()
            .try_fold(self, |node, segment| node.children()?.get(segment))
    }
}

/// Children of a container, in the order the device reported them.
///
/// Serializes as a map keyed by child name. Inserting a name that is already
/// present replaces that entry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Children(Vec<ConfigNode>);

impl Children {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: ConfigNode) {
        match self.0.iter_mut().find(|existing| existing.name == node.name) {
            Some(existing) => *existing = node,
            None => self.0.push(node),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ConfigNode> {
        self.0.iter().find(|node| node.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigNode> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|node| node.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ConfigNode> for Children {
    fn from_iter<I: IntoIterator<Item = ConfigNode>>(iter: I) -> Self {
        let mut children = Children::new();
        for node in iter {
            children.insert(node);
        }
        children
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = &'a ConfigNode;
    type IntoIter = std::slice::Iter<'a, ConfigNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Children {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for node in &self.0 {
            map.serialize_entry(&node.name, node)?;
        }
        map.end()
    }
}

struct ChildrenVisitor;

impl<'de> Visitor<'de> for ChildrenVisitor {
    type Value = Children;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of child name to config node")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Children, A::Error> {
        let mut children = Children::new();
        while let Some((key, node)) = access.next_entry::<String, ConfigNode>()? {
            if key != node.name {
                return Err(de::Error::custom(format!(
                    "child key '{}' does not match node name '{}'",
                    key, node.name
                )));
            }
            children.insert(node);
        }
        Ok(children)
    }
}

impl<'de> Deserialize<'de> for Children {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ChildrenVisitor)
    }
}
