/*
 * data.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Free-form per-node data attached by stages.
 */

use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Value of a rendering-tree property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    String(String),
    List(Vec<String>),
}

impl PropValue {
    /// Attribute text, or `None` when the attribute should be omitted.
    pub fn to_attr_value(&self) -> Option<String> {
        match self {
            PropValue::Bool(true) => Some(String::new()),
            PropValue::Bool(false) => None,
            PropValue::String(s) => Some(s.clone()),
            PropValue::List(items) => Some(items.join(" ")),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(items: Vec<String>) -> Self {
        PropValue::List(items)
    }
}

/// Ordered element properties (attributes) of a rendering-tree element.
pub type Properties = LinkedHashMap<String, PropValue>;

/// Build a property map from key/value pairs, keeping their order.
pub fn properties<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Properties
where
    K: Into<String>,
    V: Into<PropValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Instructions for the tree-to-rendering-tree conversion.
///
/// A node carrying hints is never rendered as plain text: `name` replaces
/// the element name, `properties` are merged over the defaults and
/// `children` replaces the converted children.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "LinkedHashMap::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl RenderHints {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = Some(children);
        self
    }
}

/// Per-node data bag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<RenderHints>,
    #[serde(default, skip_serializing_if = "LinkedHashMap::is_empty")]
    pub values: LinkedHashMap<String, serde_json::Value>,
}

impl NodeData {
    pub fn is_empty(&self) -> bool {
        self.hints.is_none() && self.values.is_empty()
    }

    pub fn has_hints(&self) -> bool {
        self.hints.is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(|v| v.as_bool())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Hints for this node, created empty on first access.
    pub fn hints_mut(&mut self) -> &mut RenderHints {
        self.hints.get_or_insert_with(RenderHints::default)
    }
}
