//! # Attribute Paths
//!
//! Every field occurrence in a target record gets a canonical, dotted and
//! bracketed path: `owner.name`, `resources[0].id`, `emails[1]`. These are
//! the keys of a [`ViolationMap`](crate::ViolationMap); the schema-side path
//! normalizer produces the same spelling.
//!
//! ## Arena
//!
//! Nodes live in an [`AttributeTree`] arena and are addressed by [`NodeId`].
//! A node refers to its parent by id, never by owning pointer. Each node's
//! path is computed on first access and cached in a `OnceCell`; it is never
//! recomputed.
//!
//! ## Path rules
//!
//! - A node without ancestors is named by its own wire name.
//! - Otherwise the path starts from the parent's path. A node that sits in
//!   element `N` of a repeated parent appends `[N]` to that scope.
//! - A primitive node (a bare array element with no declaration of its own)
//!   takes the scope as its path. Any other node appends `.` and its wire name.
//! - A path never begins or ends with `.`.
//!
//! ## Flat traversal
//!
//! [`AttributeTree::flatten`] serializes the tree depth first into a token
//! stream. The number of tokens that follow a node and belong to it is
//! exactly [`AttributeTree::subtree_skip_count`], so a linear scan can drop a
//! whole subtree with a single index jump ([`AttributeTree::prune`]).

use std::cell::OnceCell;
use std::fmt::Write as _;

use serde_json::Value;

use crate::descriptor::{FieldDescriptor, FieldShape, TypeDescriptor};

/// Index of a node inside its [`AttributeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The declaration behind a node: Rust name, wire name, required flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDeclaration {
    pub name: String,
    pub wire_name: String,
    pub required: bool,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, wire_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wire_name: wire_name.into(),
            required: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

impl From<&FieldDescriptor> for FieldDeclaration {
    fn from(field: &FieldDescriptor) -> Self {
        Self::new(field.name, field.wire_name).required(field.required)
    }
}

/// One field occurrence in a target's shape.
#[derive(Debug)]
pub struct AttributeNode {
    declaration: FieldDeclaration,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    list_index: Option<usize>,
    is_primitive: bool,
    path: OnceCell<String>,
}

impl AttributeNode {
    pub fn declaration(&self) -> &FieldDeclaration {
        &self.declaration
    }

    pub fn wire_name(&self) -> &str {
        &self.declaration.wire_name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Element index within a repeated parent, if this node belongs to one.
    pub fn list_index(&self) -> Option<usize> {
        self.list_index
    }

    /// True for a bare array element that has no declaration of its own.
    pub fn is_primitive(&self) -> bool {
        self.is_primitive
    }
}

/// A token of the depth-first serialization produced by [`AttributeTree::flatten`].
///
/// A node with children is followed by one `Open`, then each child's tokens
/// followed by a `Next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatEntry {
    Node(NodeId),
    Open,
    Next,
}

/// Arena of [`AttributeNode`]s.
///
/// `NodeId`s are only minted by the tree that owns the node and the arena is
/// append-only, so an id obtained from a tree is always valid for it.
#[derive(Debug, Default)]
pub struct AttributeTree {
    nodes: Vec<AttributeNode>,
    roots: Vec<NodeId>,
}

impl AttributeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tree for a record type against a parsed payload.
    ///
    /// Declared fields become nodes whether or not the payload carries them.
    /// Repeated fields are expanded element by element from the payload, so
    /// list indices always refer to real elements. A record that contains
    /// itself is only expanded as deep as the payload goes.
    pub fn from_descriptor(descriptor: &TypeDescriptor, payload: &Value) -> Self {
        let mut tree = Self::new();
        let mut stack = vec![descriptor.name];
        for field in &descriptor.fields {
            let id = tree.push_root(FieldDeclaration::from(field));
            tree.expand(id, &field.shape, payload.get(field.wire_name), &mut stack);
        }
        tree
    }

    /// Adds a top-level node.
    pub fn push_root(&mut self, declaration: FieldDeclaration) -> NodeId {
        let id = self.push(declaration, None, None, false);
        self.roots.push(id);
        id
    }

    /// Adds a declared field under `parent`. `list_index` is set when the
    /// field belongs to element `N` of a repeated parent.
    pub fn push_child(
        &mut self,
        parent: NodeId,
        declaration: FieldDeclaration,
        list_index: Option<usize>,
    ) -> NodeId {
        self.push(declaration, Some(parent), list_index, false)
    }

    /// Adds a bare element `index` of the repeated field `parent`.
    pub fn push_element(&mut self, parent: NodeId, index: usize) -> NodeId {
        self.push(FieldDeclaration::default(), Some(parent), Some(index), true)
    }

    fn push(
        &mut self,
        declaration: FieldDeclaration,
        parent: Option<NodeId>,
        list_index: Option<usize>,
        is_primitive: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(AttributeNode {
            declaration,
            parent,
            children: Vec::new(),
            list_index,
            is_primitive,
            path: OnceCell::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn expand(
        &mut self,
        id: NodeId,
        shape: &FieldShape,
        value: Option<&Value>,
        stack: &mut Vec<&'static str>,
    ) {
        match shape.peeled() {
            FieldShape::Record(describe) => {
                let descriptor = describe();
                if value.is_none() && stack.contains(&descriptor.name) {
                    return;
                }
                stack.push(descriptor.name);
                for field in &descriptor.fields {
                    let child = self.push_child(id, FieldDeclaration::from(field), None);
                    let nested = value.and_then(|v| v.get(field.wire_name));
                    self.expand(child, &field.shape, nested, stack);
                }
                stack.pop();
            }
            FieldShape::Array(element) => {
                let Some(Value::Array(items)) = value else {
                    return;
                };
                match element.peeled() {
                    FieldShape::Record(describe) => {
                        let descriptor = describe();
                        stack.push(descriptor.name);
                        for (index, item) in items.iter().enumerate() {
                            for field in &descriptor.fields {
                                let child =
                                    self.push_child(id, FieldDeclaration::from(field), Some(index));
                                self.expand(child, &field.shape, item.get(field.wire_name), stack);
                            }
                        }
                        stack.pop();
                    }
                    inner => {
                        for (index, item) in items.iter().enumerate() {
                            let child = self.push_element(id, index);
                            self.expand(child, inner, Some(item), stack);
                        }
                    }
                }
            }
            FieldShape::Map(inner) => {
                let Some(Value::Object(entries)) = value else {
                    return;
                };
                for (key, item) in entries {
                    let child = self.push_child(id, FieldDeclaration::new(key, key), None);
                    self.expand(child, inner, Some(item), stack);
                }
            }
            FieldShape::Primitive(_) | FieldShape::Any | FieldShape::Nullable(_) => {}
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &AttributeNode {
        &self.nodes[id.0]
    }

    /// Enclosing nodes of `id`, outermost first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.node(id).parent;
        while let Some(parent) = cursor {
            chain.push(parent);
            cursor = self.node(parent).parent;
        }
        chain.reverse();
        chain
    }

    /// Canonical path of `id`. Computed once, then served from the node's cache.
    pub fn path(&self, id: NodeId) -> &str {
        self.node(id).path.get_or_init(|| self.compute_path(id))
    }

    fn compute_path(&self, id: NodeId) -> String {
        let node = self.node(id);
        let Some(parent) = node.parent else {
            return node.wire_name().trim_matches('.').to_string();
        };

        let mut scope = self.path(parent).to_string();
        if let Some(index) = node.list_index {
            let _ = write!(scope, "[{index}]");
        }

        if node.is_primitive {
            return scope;
        }

        let full = format!("{scope}.{}", node.wire_name());
        full.trim_matches('.').to_string()
    }

    /// Canonical paths of every node in depth-first order.
    pub fn paths(&self) -> Vec<&str> {
        self.depth_first().into_iter().map(|id| self.path(id)).collect()
    }

    /// Finds the node whose canonical path is `path`.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.depth_first().into_iter().find(|id| self.path(*id) == path)
    }

    fn depth_first(&self) -> Vec<NodeId> {
        self.flatten()
            .into_iter()
            .filter_map(|entry| match entry {
                FlatEntry::Node(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Number of flat tokens that follow `id` and belong to its subtree.
    ///
    /// Zero for a childless node, otherwise `1 + Σ(2 + skip(child))`: one
    /// `Open`, and for each child its own node token, its subtree and a `Next`.
    pub fn subtree_skip_count(&self, id: NodeId) -> usize {
        let children = self.node(id).children();
        if children.is_empty() {
            return 0;
        }

        let mut n = 1 + children.len();
        for child in children {
            n += 1 + self.subtree_skip_count(*child);
        }
        n
    }

    /// Depth-first token stream of the whole tree.
    pub fn flatten(&self) -> Vec<FlatEntry> {
        let mut out = Vec::with_capacity(self.nodes.len() * 3);
        for root in &self.roots {
            self.flatten_into(*root, &mut out);
        }
        out
    }

    fn flatten_into(&self, id: NodeId, out: &mut Vec<FlatEntry>) {
        out.push(FlatEntry::Node(id));
        let children = self.node(id).children();
        if children.is_empty() {
            return;
        }
        out.push(FlatEntry::Open);
        for child in children {
            self.flatten_into(*child, out);
            out.push(FlatEntry::Next);
        }
    }

    /// Walks the flat token stream once, without recursion, and returns the
    /// nodes `keep` accepts. A rejected node's entire subtree is skipped.
    pub fn prune<F>(&self, mut keep: F) -> Vec<NodeId>
    where
        F: FnMut(NodeId, &AttributeNode) -> bool,
    {
        let flat = self.flatten();
        let mut kept = Vec::new();
        let mut i = 0;
        while i < flat.len() {
            match flat[i] {
                FlatEntry::Node(id) if keep(id, self.node(id)) => {
                    kept.push(id);
                    i += 1;
                }
                FlatEntry::Node(id) => i += 1 + self.subtree_skip_count(id),
                FlatEntry::Open | FlatEntry::Next => i += 1,
            }
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Describe;
    use proptest::prelude::*;
    use serde_json::json;

    fn tag() -> TypeDescriptor {
        TypeDescriptor::new(
            "Tag",
            vec![FieldDescriptor::new("label", "label", String::shape()).required(true)],
        )
    }

    fn resource() -> TypeDescriptor {
        TypeDescriptor::new(
            "Resource",
            vec![
                FieldDescriptor::new("id", "id", String::shape()).required(true),
                FieldDescriptor::new("tags", "tags", FieldShape::Array(Box::new(FieldShape::Record(tag)))),
                FieldDescriptor::new("aliases", "aliases", <Vec<String>>::shape()),
            ],
        )
    }

    fn owner() -> TypeDescriptor {
        TypeDescriptor::new(
            "Owner",
            vec![FieldDescriptor::new("name", "name", String::shape())],
        )
    }

    fn inventory() -> TypeDescriptor {
        TypeDescriptor::new(
            "Inventory",
            vec![
                FieldDescriptor::new("owner", "owner", FieldShape::Record(owner)),
                FieldDescriptor::new(
                    "resources",
                    "resources",
                    FieldShape::Array(Box::new(FieldShape::Record(resource))),
                ),
                FieldDescriptor::new("emails", "emails", <Vec<String>>::shape()),
            ],
        )
    }

    fn node_list() -> TypeDescriptor {
        TypeDescriptor::new(
            "NodeList",
            vec![
                FieldDescriptor::new("value", "value", i64::shape()),
                FieldDescriptor::new(
                    "next",
                    "next",
                    FieldShape::Nullable(Box::new(FieldShape::Record(node_list))),
                ),
            ],
        )
    }

    #[test]
    fn root_node_is_named_by_wire_name() {
        let mut tree = AttributeTree::new();
        let id = tree.push_root(FieldDeclaration::new("user_id", "userId"));
        assert_eq!(tree.path(id), "userId");
        assert!(tree.ancestors(id).is_empty());
    }

    #[test]
    fn nested_field_joins_with_dot() {
        let mut tree = AttributeTree::new();
        let owner = tree.push_root(FieldDeclaration::new("owner", "owner"));
        let name = tree.push_child(owner, FieldDeclaration::new("name", "name"), None);
        assert_eq!(tree.path(name), "owner.name");
        assert_eq!(tree.ancestors(name), vec![owner]);
    }

    #[test]
    fn list_element_fields_get_bracketed_index() {
        let mut tree = AttributeTree::new();
        let list = tree.push_root(FieldDeclaration::new("resources", "resources"));
        let id = tree.push_child(list, FieldDeclaration::new("id", "id"), Some(2));
        assert_eq!(tree.path(id), "resources[2].id");
    }

    #[test]
    fn primitive_element_does_not_append_its_name() {
        let mut tree = AttributeTree::new();
        let list = tree.push_root(FieldDeclaration::new("emails", "emails"));
        let second = tree.push_element(list, 1);
        assert_eq!(tree.path(second), "emails[1]");
        assert!(tree.node(second).is_primitive());
    }

    #[test]
    fn paths_never_carry_edge_dots() {
        let mut tree = AttributeTree::new();
        let root = tree.push_root(FieldDeclaration::new("", ""));
        let child = tree.push_child(root, FieldDeclaration::new("x", "x"), None);
        let empty = tree.push_child(child, FieldDeclaration::new("", ""), None);
        assert_eq!(tree.path(root), "");
        assert_eq!(tree.path(child), "x");
        assert_eq!(tree.path(empty), "x");
    }

    #[test]
    fn path_is_cached_after_first_access() {
        let mut tree = AttributeTree::new();
        let root = tree.push_root(FieldDeclaration::new("a", "a"));
        let first = tree.path(root) as *const str;
        let second = tree.path(root) as *const str;
        assert_eq!(first, second);
    }

    #[test]
    fn skip_count_of_childless_node_is_zero() {
        let mut tree = AttributeTree::new();
        let id = tree.push_root(FieldDeclaration::new("a", "a"));
        assert_eq!(tree.subtree_skip_count(id), 0);
    }

    #[test]
    fn skip_count_of_node_with_one_childless_child_is_three() {
        let mut tree = AttributeTree::new();
        let id = tree.push_root(FieldDeclaration::new("a", "a"));
        tree.push_child(id, FieldDeclaration::new("b", "b"), None);
        assert_eq!(tree.subtree_skip_count(id), 3);
    }

    #[test]
    fn skip_count_accumulates_over_grandchildren() {
        let mut tree = AttributeTree::new();
        let a = tree.push_root(FieldDeclaration::new("a", "a"));
        let b = tree.push_child(a, FieldDeclaration::new("b", "b"), None);
        tree.push_child(a, FieldDeclaration::new("c", "c"), None);
        tree.push_child(b, FieldDeclaration::new("d", "d"), None);
        // b: 1 + 1 + 1 = 3; a: 1 + 2 + (1 + 3) + (1 + 0) = 8
        assert_eq!(tree.subtree_skip_count(b), 3);
        assert_eq!(tree.subtree_skip_count(a), 8);
    }

    #[test]
    fn descriptor_tree_expands_payload_arrays() {
        let payload = json!({
            "owner": {"name": "ada"},
            "resources": [
                {"id": "r1", "tags": [{"label": "x"}], "aliases": ["one", "two"]},
                {"id": "r2"}
            ],
            "emails": ["a@example.com", "b@example.com"]
        });
        let tree = AttributeTree::from_descriptor(&inventory(), &payload);
        let paths = tree.paths();
        assert_eq!(
            paths,
            vec![
                "owner",
                "owner.name",
                "resources",
                "resources[0].id",
                "resources[0].tags",
                "resources[0].tags[0].label",
                "resources[0].aliases",
                "resources[0].aliases[0]",
                "resources[0].aliases[1]",
                "resources[1].id",
                "resources[1].tags",
                "resources[1].aliases",
                "emails",
                "emails[0]",
                "emails[1]",
            ]
        );
    }

    #[test]
    fn descriptor_tree_keeps_declared_fields_absent_from_payload() {
        let tree = AttributeTree::from_descriptor(&inventory(), &json!({}));
        assert_eq!(tree.paths(), vec!["owner", "owner.name", "resources", "emails"]);
    }

    #[test]
    fn recursive_records_stop_where_the_payload_stops() {
        let payload = json!({"value": 1, "next": {"value": 2}});
        let tree = AttributeTree::from_descriptor(&node_list(), &payload);
        assert_eq!(
            tree.paths(),
            vec!["value", "next", "next.value", "next.next"]
        );
    }

    #[test]
    fn map_entries_are_named_by_key() {
        let descriptor = TypeDescriptor::new(
            "Labels",
            vec![FieldDescriptor::new(
                "labels",
                "labels",
                <std::collections::BTreeMap<String, String>>::shape(),
            )],
        );
        let tree = AttributeTree::from_descriptor(&descriptor, &json!({"labels": {"env": "prod"}}));
        assert_eq!(tree.paths(), vec!["labels", "labels.env"]);
    }

    #[test]
    fn prune_skips_rejected_subtrees() {
        let payload = json!({
            "owner": {"name": "ada"},
            "resources": [{"id": "r1", "aliases": ["one"]}],
            "emails": ["a@example.com"]
        });
        let tree = AttributeTree::from_descriptor(&inventory(), &payload);
        let kept: Vec<&str> = tree
            .prune(|_, node| node.wire_name() != "resources")
            .into_iter()
            .map(|id| tree.path(id))
            .collect();
        assert_eq!(kept, vec!["owner", "owner.name", "emails", "emails[0]"]);
    }

    #[test]
    fn find_locates_nodes_by_canonical_path() {
        let payload = json!({"resources": [{"id": "r1"}]});
        let tree = AttributeTree::from_descriptor(&inventory(), &payload);
        let id = tree.find("resources[0].id").unwrap();
        assert_eq!(tree.node(id).list_index(), Some(0));
        assert!(tree.find("resources[1].id").is_none());
    }

    fn arbitrary_shape() -> impl Strategy<Value = Vec<(usize, usize)>> {
        // (parent candidate, sibling count) pairs drive a random tree build.
        prop::collection::vec((0usize..16, 0usize..4), 0..24)
    }

    proptest! {
        /// The tokens owned by a node always number exactly its skip count.
        #[test]
        fn flatten_span_matches_skip_count(plan in arbitrary_shape()) {
            let mut tree = AttributeTree::new();
            let root = tree.push_root(FieldDeclaration::new("root", "root"));
            let mut ids = vec![root];
            for (parent, count) in plan {
                let parent = ids[parent % ids.len()];
                for n in 0..count {
                    let id = tree.push_child(parent, FieldDeclaration::new("f", format!("f{n}")), None);
                    ids.push(id);
                }
            }

            let flat = tree.flatten();
            for id in &ids {
                let start = flat.iter().position(|e| *e == FlatEntry::Node(*id)).unwrap();
                let end = start + 1 + tree.subtree_skip_count(*id);
                prop_assert!(end <= flat.len());
                let mut sub = Vec::new();
                tree.flatten_into(*id, &mut sub);
                prop_assert_eq!(&flat[start..end], sub.as_slice());
            }
        }
    }
}
