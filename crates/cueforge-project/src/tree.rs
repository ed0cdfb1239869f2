//! Generic labeled source tree.
//!
//! The compiler consumes a parsed, schema-validated tree of named nodes
//! with string-keyed attributes. The tree is arena-backed: nodes live in
//! one vector and reference each other by [`NodeId`], which gives every
//! node cheap parent links (needed for path-id computation) without any
//! reference cycles.
//!
//! A JSON front end is provided for authoring and tests; any parser that
//! produces the same node/attribute vocabulary can feed the compiler.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{CompileError, CompileResult};
use crate::names::ATTR_ID;

/// Handle to a node in a [`SourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-backed tree of named nodes with string-keyed attributes.
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    nodes: Vec<NodeData>,
}

impl SourceTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root node (a node with no parent) and returns its handle.
    pub fn add_root(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.into(),
            attributes: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Adds a child under `parent`, appended in document order.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.into(),
            attributes: BTreeMap::new(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Sets an attribute on a node, replacing any previous value.
    pub fn set_attr(&mut self, node: NodeId, key: impl Into<String>, value: impl Into<String>) {
        self.nodes[node.0].attributes.insert(key.into(), value.into());
    }

    /// The node's name.
    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    /// The node's parent, if it is not a root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// The node's children in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// An attribute's raw string value.
    pub fn attr(&self, node: NodeId, key: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(key).map(String::as_str)
    }

    /// Describes a node for diagnostics: its name plus its declared id,
    /// if it has one.
    pub fn describe(&self, node: NodeId) -> String {
        match self.attr(node, ATTR_ID) {
            Some(id) => format!("{} {:?}", self.name(node), id),
            None => self.name(node).to_string(),
        }
    }

    /// A required attribute's value.
    pub fn require_attr(&self, node: NodeId, key: &str) -> CompileResult<&str> {
        self.attr(node, key)
            .ok_or_else(|| CompileError::MissingAttribute {
                node: self.describe(node),
                attribute: key.to_string(),
            })
    }

    /// A required attribute parsed as `f32`.
    pub fn attr_f32(&self, node: NodeId, key: &str) -> CompileResult<f32> {
        let raw = self.require_attr(node, key)?;
        raw.parse()
            .map_err(|_| self.invalid_attr(node, key, raw, "a floating point number"))
    }

    /// A required attribute parsed as `i32`.
    pub fn attr_i32(&self, node: NodeId, key: &str) -> CompileResult<i32> {
        let raw = self.require_attr(node, key)?;
        raw.parse()
            .map_err(|_| self.invalid_attr(node, key, raw, "an integer"))
    }

    /// A required attribute parsed as a boolean ("true"/"false"/"1"/"0").
    pub fn attr_bool(&self, node: NodeId, key: &str) -> CompileResult<bool> {
        let raw = self.require_attr(node, key)?;
        Self::parse_bool(raw)
            .ok_or_else(|| self.invalid_attr(node, key, raw, "true, false, 1 or 0"))
    }

    /// An optional boolean attribute with a default for absence.
    pub fn attr_bool_or(&self, node: NodeId, key: &str, default: bool) -> CompileResult<bool> {
        match self.attr(node, key) {
            None => Ok(default),
            Some(raw) => Self::parse_bool(raw)
                .ok_or_else(|| self.invalid_attr(node, key, raw, "true, false, 1 or 0")),
        }
    }

    fn parse_bool(raw: &str) -> Option<bool> {
        match raw {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    fn invalid_attr(&self, node: NodeId, key: &str, value: &str, expected: &str) -> CompileError {
        CompileError::InvalidAttribute {
            node: self.describe(node),
            attribute: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Parses a JSON project document into a tree, returning the root.
    pub fn from_json_str(json: &str) -> CompileResult<(SourceTree, NodeId)> {
        let doc: JsonNode = serde_json::from_str(json)?;
        let mut tree = SourceTree::new();
        let root = tree.add_root(doc.name.clone());
        tree.apply_json(root, &doc);
        Ok((tree, root))
    }

    fn apply_json(&mut self, node: NodeId, json: &JsonNode) {
        for (key, value) in &json.attributes {
            self.set_attr(node, key.clone(), value.to_attr_string());
        }
        for child in &json.children {
            let child_id = self.add_child(node, child.name.clone());
            self.apply_json(child_id, child);
        }
    }
}

/// One node of the JSON project document.
#[derive(Debug, Deserialize)]
struct JsonNode {
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, JsonAttr>,
    #[serde(default)]
    children: Vec<JsonNode>,
}

/// A JSON attribute scalar; normalized to the tree's string values.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonAttr {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl JsonAttr {
    fn to_attr_string(&self) -> String {
        match self {
            JsonAttr::Bool(b) => b.to_string(),
            JsonAttr::Int(i) => i.to_string(),
            JsonAttr::Float(f) => f.to_string(),
            JsonAttr::Str(s) => s.clone(),
        }
    }
}

/// Depth-first traversal restricted to two node-name filters.
///
/// For each child of the current node: if its name equals `branch_name`
/// the walk recurses into it first; if its name equals `leaf_name`,
/// `visit` is invoked on it. A node matching both (nested mix buses) is
/// both recursed into and visited, so descendants are visited before
/// their enclosing branch node. Order is document order; no node is
/// visited twice.
pub fn walk<F>(
    tree: &SourceTree,
    root: NodeId,
    branch_name: &str,
    leaf_name: &str,
    visit: &mut F,
) -> CompileResult<()>
where
    F: FnMut(NodeId) -> CompileResult<()>,
{
    for &child in tree.children(root) {
        if tree.name(child) == branch_name {
            walk(tree, child, branch_name, leaf_name, visit)?;
        }
        if tree.name(child) == leaf_name {
            visit(child)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_visits_leaves_in_document_order() {
        let mut tree = SourceTree::new();
        let root = tree.add_root("Root");
        let group = tree.add_child(root, "Group");
        let a = tree.add_child(group, "Item");
        tree.set_attr(a, "id", "a");
        let b = tree.add_child(group, "Item");
        tree.set_attr(b, "id", "b");
        tree.add_child(root, "Other");
        let c = tree.add_child(root, "Item");
        tree.set_attr(c, "id", "c");

        let mut seen = Vec::new();
        walk(&tree, root, "Group", "Item", &mut |node| {
            seen.push(tree.attr(node, "id").unwrap().to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, ["a", "b", "c"]);
    }

    #[test]
    fn walk_recurses_before_visiting_branch_leaf_nodes() {
        // Nested buses: a node that is both branch and leaf is recursed
        // into first, so inner nodes are visited before outer ones.
        let mut tree = SourceTree::new();
        let root = tree.add_root("Root");
        let outer = tree.add_child(root, "Bus");
        tree.set_attr(outer, "id", "outer");
        let inner = tree.add_child(outer, "Bus");
        tree.set_attr(inner, "id", "inner");

        let mut seen = Vec::new();
        walk(&tree, root, "Bus", "Bus", &mut |node| {
            seen.push(tree.attr(node, "id").unwrap().to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, ["inner", "outer"]);
    }

    #[test]
    fn json_front_end_builds_equivalent_tree() {
        let json = r#"{
            "name": "AudioProject",
            "children": [
                {
                    "name": "MixBus",
                    "attributes": { "id": "master", "gain": 0.5, "muted": false }
                }
            ]
        }"#;
        let (tree, root) = SourceTree::from_json_str(json).unwrap();
        assert_eq!(tree.name(root), "AudioProject");
        let bus = tree.children(root)[0];
        assert_eq!(tree.attr(bus, "id"), Some("master"));
        assert_eq!(tree.attr_f32(bus, "gain").unwrap(), 0.5);
        assert!(!tree.attr_bool(bus, "muted").unwrap());
    }

    #[test]
    fn typed_accessors_report_bad_values() {
        let mut tree = SourceTree::new();
        let root = tree.add_root("Root");
        tree.set_attr(root, "gain", "loud");

        let err = tree.attr_f32(root, "gain").unwrap_err();
        assert!(matches!(err, CompileError::InvalidAttribute { .. }));
        let err = tree.attr_i32(root, "count").unwrap_err();
        assert!(matches!(err, CompileError::MissingAttribute { .. }));
    }
}
