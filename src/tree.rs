//! The configuration tree and dotted-path addressing.
//!
//! Nodes live in an arena owned by [`ConfigTree`] and refer to each other by
//! [`NodeId`]. A node's `parent` is a plain index used for lookups (building
//! a node's path for messages), never for ownership.
//!
//! # Paths
//!
//! A path like `colors.walls.east` is split on `.`; every segment but the
//! last must name a child node, and the last names either a field or a node:
//!
//! - [`select`](ConfigTree::select) accepts both and is used for display and
//!   scoped editing. The empty path selects the root.
//! - [`resolve_leaf`](ConfigTree::resolve_leaf) requires a field and reports
//!   [`NotALeaf`](ConfigError::NotALeaf) for nodes.

use std::fmt;

use crate::error::ConfigError;
use crate::field::Field;

pub const SEPARATOR: char = '.';

/// Index of a node inside its [`ConfigTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a path resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Node(NodeId),
    /// A field, by owning node and position.
    Field(NodeId, usize),
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    hint: Option<String>,
    fields: Vec<Field>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ConfigTree {
    nodes: Vec<Node>,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    /// A tree holding only an empty root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                hint: None,
                fields: Vec::new(),
                children: Vec::new(),
                parent: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, name: &str, hint: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            hint,
            fields: Vec::new(),
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn add_field(&mut self, node: NodeId, field: Field) {
        self.nodes[node.0].fields.push(field);
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn hint(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].hint.as_deref()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn fields(&self, node: NodeId) -> &[Field] {
        &self.nodes[node.0].fields
    }

    pub fn field(&self, node: NodeId, index: usize) -> &Field {
        &self.nodes[node.0].fields[index]
    }

    pub(crate) fn field_mut(&mut self, node: NodeId, index: usize) -> &mut Field {
        &mut self.nodes[node.0].fields[index]
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|child| self.name(*child) == name)
    }

    pub fn field_index(&self, node: NodeId, name: &str) -> Option<usize> {
        self.fields(node).iter().position(|f| f.name() == name)
    }

    /// True when the root holds neither fields nor children.
    pub fn is_empty(&self) -> bool {
        let root = &self.nodes[0];
        root.fields.is_empty() && root.children.is_empty()
    }

    /// Dotted path of a node; empty for the root.
    pub fn path_of(&self, node: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if self.nodes[id.0].parent.is_some() {
                segments.push(self.name(id));
            }
            current = self.nodes[id.0].parent;
        }
        segments.reverse();
        segments.join(".")
    }

    pub fn field_path(&self, node: NodeId, index: usize) -> String {
        join(&self.path_of(node), self.field(node, index).name())
    }

    /// Resolve a path to a node or a field.
    pub fn select(&self, path: &str) -> Result<Selection, ConfigError> {
        if path.is_empty() {
            return Ok(Selection::Node(self.root()));
        }
        let not_found = || ConfigError::PathNotFound(path.to_string());
        let (parents, last) = match path.rsplit_once(SEPARATOR) {
            Some((parents, last)) => (Some(parents), last),
            None => (None, path),
        };

        let mut node = self.root();
        if let Some(parents) = parents {
            for segment in parents.split(SEPARATOR) {
                node = self.child(node, segment).ok_or_else(not_found)?;
            }
        }

        if let Some(index) = self.field_index(node, last) {
            return Ok(Selection::Field(node, index));
        }
        self.child(node, last)
            .map(Selection::Node)
            .ok_or_else(not_found)
    }

    /// Resolve a path that must name a field.
    pub fn resolve_leaf(&self, path: &str) -> Result<(NodeId, usize), ConfigError> {
        match self.select(path)? {
            Selection::Field(node, index) => Ok((node, index)),
            Selection::Node(_) => Err(ConfigError::NotALeaf(path.to_string())),
        }
    }

    /// Every field under `node`, depth-first: a node's own fields, then each
    /// child in declaration order.
    pub fn walk(&self, node: NodeId) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        self.walk_into(node, &mut out);
        out
    }

    fn walk_into(&self, node: NodeId, out: &mut Vec<(NodeId, usize)>) {
        out.extend((0..self.fields(node).len()).map(|i| (node, i)));
        for child in self.children(node) {
            self.walk_into(*child, out);
        }
    }

    pub(crate) fn restore_defaults(&mut self) {
        for node in &mut self.nodes {
            for field in &mut node.fields {
                field.restore_default();
            }
        }
    }

    /// A displayable view of one node.
    pub fn view(&self, node: NodeId) -> NodeView<'_> {
        NodeView { tree: self, node }
    }
}

pub(crate) fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{name}")
    }
}

/// Rendering of one node and everything below it.
///
/// `Display` gives the multi-line tree; [`compact`](NodeView::compact) gives
/// the stored JSON form on one line.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a ConfigTree,
    node: NodeId,
}

impl NodeView<'_> {
    pub fn compact(&self) -> String {
        match crate::persist::snapshot(self.tree, self.node) {
            Ok(map) => serde_json::Value::Object(map).to_string(),
            Err(e) => format!("<{e}>"),
        }
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: NodeId, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        for field in self.tree.fields(node) {
            write!(f, "{indent}{} = {}", field.name(), field.display_value())?;
            if let Some(hint) = field.hint() {
                write!(f, "  # {hint}")?;
            }
            writeln!(f)?;
        }
        for child in self.tree.children(node) {
            write!(f, "{indent}{}:", self.tree.name(*child))?;
            if let Some(hint) = self.tree.hint(*child) {
                write!(f, "  # {hint}")?;
            }
            writeln!(f)?;
            self.write_node(f, *child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.node, 0)
    }
}

impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.view(self.root()).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::discover;
    use crate::fixtures::test::rooms;

    fn tree() -> ConfigTree {
        discover(&rooms()).unwrap()
    }

    #[test]
    fn leaf_path_resolves_to_that_field_only() {
        let tree = tree();
        let (node, index) = tree.resolve_leaf("colors.walls.east").unwrap();
        assert_eq!(tree.path_of(node), "colors.walls");
        assert_eq!(tree.field(node, index).name(), "east");
        assert_eq!(tree.field_path(node, index), "colors.walls.east");
    }

    #[test]
    fn one_segment_short_selects_node() {
        let tree = tree();
        match tree.select("colors.walls").unwrap() {
            Selection::Node(node) => assert_eq!(tree.path_of(node), "colors.walls"),
            other => panic!("Expected node, got {other:?}"),
        }
    }

    #[test]
    fn same_field_name_in_sibling_nodes_is_distinct() {
        let tree = tree();
        let walls = tree.resolve_leaf("colors.walls.east").unwrap();
        let castle = tree.resolve_leaf("colors.castle.east").unwrap();
        assert_ne!(walls.0, castle.0);
    }

    #[test]
    fn empty_path_selects_root() {
        let tree = tree();
        assert_eq!(tree.select("").unwrap(), Selection::Node(tree.root()));
        assert!(matches!(tree.resolve_leaf(""), Err(ConfigError::NotALeaf(_))));
    }

    #[test]
    fn node_is_not_a_leaf() {
        let tree = tree();
        assert!(matches!(
            tree.resolve_leaf("colors.walls"),
            Err(ConfigError::NotALeaf(p)) if p == "colors.walls"
        ));
    }

    #[test]
    fn missing_segments_not_found() {
        let tree = tree();
        for path in ["nope", "colors.nope", "colors.walls.up", "age.x", "colors..walls"] {
            assert!(
                matches!(tree.select(path), Err(ConfigError::PathNotFound(_))),
                "{path} should not resolve"
            );
        }
    }

    #[test]
    fn parent_links_walk_up() {
        let tree = tree();
        let (walls, _) = tree.resolve_leaf("colors.walls.east").unwrap();
        let colors = tree.parent(walls).unwrap();
        assert_eq!(tree.name(colors), "colors");
        assert_eq!(tree.parent(colors), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn walk_is_depth_first() {
        let tree = tree();
        let paths: Vec<String> = tree
            .walk(tree.root())
            .into_iter()
            .map(|(n, i)| tree.field_path(n, i))
            .collect();
        let light = paths.iter().position(|p| p == "colors.light").unwrap();
        let east = paths.iter().position(|p| p == "colors.walls.east").unwrap();
        let castle = paths.iter().position(|p| p == "colors.castle.east").unwrap();
        assert_eq!(paths[0], "age");
        assert!(light < east && east < castle);
    }

    #[test]
    fn display_is_indented_tree() {
        let tree = tree();
        let text = tree.to_string();
        assert!(text.contains("name = Archibald  # Your name\n"));
        assert!(text.contains("colors:  # The colors around you.\n"));
        assert!(text.contains("    walls:  # The colors of the walls of your secret place\n"));
        assert!(text.contains("        east = #ff0000  # The color of the eastern wall\n"));
        assert_eq!(text, tree.to_string());
    }

    #[test]
    fn compact_view_is_one_line() {
        let tree = tree();
        let (walls, _) = tree.resolve_leaf("colors.walls.east").unwrap();
        let compact = tree.view(walls).compact();
        assert!(!compact.contains('\n'));
        assert!(compact.contains(r##""east":"#ff0000""##));
    }

    #[test]
    fn empty_tree() {
        let tree = ConfigTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), "");
        assert_eq!(tree.view(tree.root()).compact(), "{}");
    }
}
