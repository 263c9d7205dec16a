//! Authored graph description, the input of [`crate::bake()`].
//!
//! A graph is a list of nodes and a list of parent-to-child edges, the way a node editor
//! stores it. Nothing here is validated; that is the compiler's job.
//!
//! Graphs can be written in YAML:
//!
//! ```yaml
//! nodes:
//!   - { id: root, type: Sequence }
//!   - { id: wait, type: Wait, params: { seconds: "1.5" } }
//! edges:
//!   - { from_id: root, to_id: wait }
//! ```
//!
//! or the equivalent JSON. Editor-style camelCase field names (`fromId`, `toPort`...)
//! are accepted too.

use serde::{Deserialize, Serialize};

use crate::{error::GraphLoadError, params::ParamMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDesc {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Control tag (`Sequence`, `Repeater`...) or the name of an action kind.
    #[serde(rename = "type")]
    pub ty: String,
    /// Sort key among siblings; ties are broken by the edge's port.
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub params: ParamMap,
    #[serde(default, alias = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(alias = "fromId", alias = "outNodeId")]
    pub from_id: String,
    #[serde(default, alias = "fromPort", alias = "outPortIndex")]
    pub from_port: i32,
    #[serde(alias = "toId", alias = "inNodeId")]
    pub to_id: String,
    #[serde(default, alias = "toPort", alias = "inPortIndex")]
    pub to_port: i32,
}

impl GraphNode {
    pub fn new(id: impl ToString, ty: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            ty: ty.to_string(),
            order: 0,
            params: ParamMap::new(),
            display_name: None,
            description: None,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_param(mut self, key: impl ToString, value: impl ToString) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Name shown by tooling, falling back to the type tag.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.ty)
    }
}

impl GraphEdge {
    pub fn new(from_id: impl ToString, to_id: impl ToString) -> Self {
        Self {
            from_id: from_id.to_string(),
            from_port: 0,
            to_id: to_id.to_string(),
            to_port: 0,
        }
    }

    pub fn with_port(mut self, from_port: i32) -> Self {
        self.from_port = from_port;
        self
    }
}

impl GraphDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(src: &str) -> Result<Self, GraphLoadError> {
        Ok(serde_yaml::from_str(src)?)
    }

    pub fn from_json(src: &str) -> Result<Self, GraphLoadError> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn to_yaml(&self) -> Result<String, GraphLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String, GraphLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Appends a node; chainable for building graphs in code.
    pub fn node(mut self, node: GraphNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends an edge from `from_id` to `to_id` on port 0.
    pub fn edge(mut self, from_id: &str, to_id: &str) -> Self {
        self.edges.push(GraphEdge::new(from_id, to_id));
        self
    }

    pub fn find(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
