use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use indextree::{Arena, NodeId};

/// An arena-backed XML tree for one package part.
///
/// Besides the element tree the document keeps the raw text that surrounded
/// the root element in the source (declaration, leading comments, trailing
/// whitespace) so an untouched part serializes back to the same bytes.
#[derive(Debug)]
pub struct XmlDocument {
    arena: Arena<XmlNodeData>,
    root: Option<NodeId>,
    prolog: Option<String>,
    epilog: String,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            prolog: None,
            epilog: String::new(),
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Raw text before the root element, `None` for trees built in memory.
    pub fn prolog(&self) -> Option<&str> {
        self.prolog.as_deref()
    }

    pub fn set_prolog(&mut self, prolog: impl Into<String>) {
        self.prolog = Some(prolog.into());
    }

    pub fn epilog(&self) -> &str {
        &self.epilog
    }

    pub fn set_epilog(&mut self, epilog: impl Into<String>) {
        self.epilog = epilog.into();
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlNodeData> {
        self.arena.get(id).map(|node| node.get())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut XmlNodeData> {
        self.arena.get_mut(id).map(|node| node.get_mut())
    }

    pub fn add_root(&mut self, data: XmlNodeData) -> NodeId {
        let id = self.arena.new_node(data);
        self.root = Some(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    pub fn add_before(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_before(new_node, &mut self.arena);
        new_node
    }

    pub fn add_after(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_after(new_node, &mut self.arena);
        new_node
    }

    /// Move an existing node (with its subtree) to the end of `parent`.
    pub fn reparent(&mut self, parent: NodeId, node: NodeId) {
        node.detach(&mut self.arena);
        parent.append(node, &mut self.arena);
    }

    /// Remove a node together with its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        node.remove_subtree(&mut self.arena);
    }

    /// Deep-copy `source` into a new detached subtree and return its root.
    pub fn clone_subtree(&mut self, source: NodeId) -> Option<NodeId> {
        let data = self.get(source)?.clone();
        let copy = self.arena.new_node(data);
        let children: Vec<NodeId> = self.children(source).collect();
        for child in children {
            if let Some(child_copy) = self.clone_subtree(child) {
                copy.append(child_copy, &mut self.arena);
            }
        }
        Some(copy)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &XName, value: &str) {
        if let Some(node_data) = self.get_mut(node) {
            if let Some(attrs) = node_data.attributes_mut() {
                if let Some(attr) = attrs.iter_mut().find(|a| &a.name == name) {
                    attr.value = value.to_string();
                } else {
                    attrs.push(XAttribute::new(name.clone(), value));
                }
            }
        }
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        parent.children(&self.arena)
    }

    /// The node itself followed by all of its descendants in document order.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    /// The node itself followed by its ancestors up to the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.next_sibling()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.previous_sibling()
    }

    pub fn elements_by_name<'a>(
        &'a self,
        parent: NodeId,
        name: &'a XName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent).filter(move |&child_id| {
            self.get(child_id)
                .and_then(|data| data.name())
                .map(|n| n == name)
                .unwrap_or(false)
        })
    }

    pub fn first_child_named(&self, parent: NodeId, name: &XName) -> Option<NodeId> {
        self.elements_by_name(parent, name).next()
    }

    /// Nearest ancestor (excluding `node` itself) with the given name.
    pub fn ancestor_named(&self, node: NodeId, name: &XName) -> Option<NodeId> {
        self.ancestors(node)
            .skip(1)
            .find(|&id| self.get(id).and_then(|d| d.name()) == Some(name))
    }

    /// Concatenated text of every text node under `node`.
    pub fn inner_text(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|id| self.get(id).and_then(|d| d.text_content()))
            .collect()
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}
