//! Arena-backed HTML tree.
//!
//! html5ever builds into this tree; the normalizer then edits it in place
//! (heading ids, title-cased text, rewritten `src` attributes) before it is
//! serialized back to XHTML.

use html5ever::{LocalName, QualName};

/// Index of a node in its [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element { name: QualName, attrs: Vec<Attribute> },
    Text(String),
    /// Kept so the tree mirrors the input; never serialized.
    Comment(String),
    Doctype,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        }
    }
}

/// Tree whose nodes live in one vector and link to each other by [`NodeId`].
///
/// Detaching a node only unlinks it; its slot stays allocated.
#[derive(Debug)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    pub fn new_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.push(NodeData::Element { name, attrs })
    }

    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn new_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    pub fn new_doctype(&mut self) -> NodeId {
        self.push(NodeData::Doctype)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Link `child` as the last child of `parent`. `child` must be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev = self.get(parent).and_then(|n| n.last_child);

        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.prev = prev;
            node.next = None;
        }
        match prev {
            Some(prev) => {
                if let Some(node) = self.get_mut(prev) {
                    node.next = Some(child);
                }
            }
            None => {
                if let Some(node) = self.get_mut(parent) {
                    node.first_child = Some(child);
                }
            }
        }
        if let Some(node) = self.get_mut(parent) {
            node.last_child = Some(child);
        }
    }

    /// Link `node` immediately before `sibling`. `node` must be detached.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        let Some((parent, prev)) = self.get(sibling).map(|n| (n.parent, n.prev)) else {
            return;
        };

        if let Some(n) = self.get_mut(node) {
            n.parent = parent;
            n.prev = prev;
            n.next = Some(sibling);
        }
        if let Some(n) = self.get_mut(sibling) {
            n.prev = Some(node);
        }
        match (prev, parent) {
            (Some(prev), _) => {
                if let Some(n) = self.get_mut(prev) {
                    n.next = Some(node);
                }
            }
            (None, Some(parent)) => {
                if let Some(n) = self.get_mut(parent) {
                    n.first_child = Some(node);
                }
            }
            (None, None) => {}
        }
    }

    /// Unlink `id` from its parent and siblings. Its own subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some((parent, prev, next)) = self.get(id).map(|n| (n.parent, n.prev, n.next)) else {
            return;
        };

        match prev {
            Some(prev) => {
                if let Some(n) = self.get_mut(prev) {
                    n.next = next;
                }
            }
            None => {
                if let Some(n) = parent.and_then(|p| self.get_mut(p)) {
                    n.first_child = next;
                }
            }
        }
        match next {
            Some(next) => {
                if let Some(n) = self.get_mut(next) {
                    n.prev = prev;
                }
            }
            None => {
                if let Some(n) = parent.and_then(|p| self.get_mut(p)) {
                    n.last_child = prev;
                }
            }
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
            n.prev = None;
            n.next = None;
        }
    }

    /// Append text to `parent`, merging with a trailing text child.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.get(parent).and_then(|n| n.last_child);
        if let Some(NodeData::Text(existing)) = last.and_then(|id| self.get_mut(id)).map(|n| &mut n.data) {
            existing.push_str(text);
            return;
        }
        let node = self.new_text(text);
        self.append_child(parent, node);
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            dom: self,
            next: self.get(id).and_then(|n| n.first_child),
        }
    }

    /// Every node below `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let start = stack.len();
            stack.extend(self.children(id));
            stack[start..].reverse();
        }
        out
    }

    /// Elements below `root` whose tag is one of `tags`, in document order.
    pub fn select(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.tag(id).is_some_and(|t| tags.contains(&t.as_ref())))
            .collect()
    }

    /// First element with the given tag anywhere in the document.
    pub fn first(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.is(id, tag))
    }

    /// Local name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&LocalName> {
        match &self.get(id)?.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        }
    }

    pub fn is(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.as_ref() == tag)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, replacing any existing value. No-op on non-elements.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(NodeData::Element { attrs, .. }) = self.get_mut(id).map(|n| &mut n.data) else {
            return;
        };
        match attrs.iter_mut().find(|a| a.name.local.as_ref() == name) {
            Some(attr) => attr.value = value.to_string(),
            None => attrs.push(Attribute {
                name: QualName::new(None, html5ever::ns!(), LocalName::from(name)),
                value: value.to_string(),
            }),
        }
    }

    /// Content of a text node.
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of every text node below `id`.
    pub fn text(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.as_text(d))
            .collect()
    }

    /// Replace the children of `id` with one text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let children: Vec<_> = self.children(id).collect();
        for child in children {
            self.detach(child);
        }
        let node = self.new_text(text);
        self.append_child(id, node);
    }
}

pub struct Children<'a> {
    dom: &'a Dom,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.dom.get(id).and_then(|n| n.next);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use super::*;

    fn element(dom: &mut Dom, tag: &str) -> NodeId {
        dom.new_element(QualName::new(None, ns!(html), LocalName::from(tag)), vec![])
    }

    #[test]
    fn test_append_and_iterate() {
        let mut dom = Dom::new();
        let div = element(&mut dom, "div");
        let a = element(&mut dom, "p");
        let b = element(&mut dom, "p");
        dom.append_child(dom.root(), div);
        dom.append_child(div, a);
        dom.append_child(div, b);

        assert_eq!(dom.children(div).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(dom.parent(b), Some(div));
    }

    #[test]
    fn test_adjacent_text_merges() {
        let mut dom = Dom::new();
        let p = element(&mut dom, "p");
        dom.append_child(dom.root(), p);
        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.as_text(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_insert_before_and_detach() {
        let mut dom = Dom::new();
        let ul = element(&mut dom, "ul");
        let first = element(&mut dom, "li");
        let second = element(&mut dom, "li");
        let third = element(&mut dom, "li");
        dom.append_child(dom.root(), ul);
        dom.append_child(ul, third);
        dom.insert_before(third, first);
        dom.insert_before(third, second);
        assert_eq!(dom.children(ul).collect::<Vec<_>>(), vec![first, second, third]);

        dom.detach(second);
        assert_eq!(dom.children(ul).collect::<Vec<_>>(), vec![first, third]);
        dom.detach(third);
        dom.detach(first);
        assert_eq!(dom.children(ul).count(), 0);
        assert_eq!(dom.parent(first), None);
    }

    #[test]
    fn test_set_text_replaces_inline_markup() {
        let mut dom = Dom::new();
        let h1 = element(&mut dom, "h1");
        let em = element(&mut dom, "em");
        dom.append_child(dom.root(), h1);
        dom.append_text(h1, "the ");
        dom.append_child(h1, em);
        dom.append_text(em, "title");
        assert_eq!(dom.text(h1), "the title");

        dom.set_text(h1, "The Title");
        assert_eq!(dom.children(h1).count(), 1);
        assert_eq!(dom.text(h1), "The Title");
        assert_eq!(dom.parent(em), None);
    }

    #[test]
    fn test_set_attr_adds_and_replaces() {
        let mut dom = Dom::new();
        let img = element(&mut dom, "img");
        dom.set_attr(img, "src", "a.png");
        dom.set_attr(img, "src", "files/abc.png");
        dom.set_attr(img, "alt", "logo");

        assert_eq!(dom.attr(img, "src"), Some("files/abc.png"));
        assert_eq!(dom.attr(img, "alt"), Some("logo"));
    }

    #[test]
    fn test_select_in_document_order() {
        let mut dom = Dom::new();
        let body = element(&mut dom, "body");
        let h2 = element(&mut dom, "h2");
        let section = element(&mut dom, "section");
        let h1 = element(&mut dom, "h1");
        let h3 = element(&mut dom, "h3");
        dom.append_child(dom.root(), body);
        dom.append_child(body, h2);
        dom.append_child(body, section);
        dom.append_child(section, h1);
        dom.append_child(body, h3);

        assert_eq!(dom.select(body, &["h1", "h2", "h3"]), vec![h2, h1, h3]);
        assert_eq!(dom.first("h1"), Some(h1));
    }
}
