// ── Attr ──────────────────────────────────────────────────────────────────

/// A single `name="value"` attribute on an element.
///
/// Flag attributes (`<input checked>`) carry an empty value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

// ── Node ──────────────────────────────────────────────────────────────────

/// One node of a parsed fragment: an element or a run of text.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    /// Text with entities already decoded.
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }
}

// ── ElementNode ───────────────────────────────────────────────────────────

/// An element instantiation in the tree.
///
/// ```html
/// <input name="firstName" type="text" data-bind-events="keyup change">
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    /// Lower-cased tag name: `"input"`, `"select"`, `"span"`.
    pub tag: String,
    /// Attributes in source order. Names are lower-cased.
    pub attrs: Vec<Attr>,
    pub children: Vec<Node>,
}

impl ElementNode {
    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(Node::as_element)
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(&e.children, out),
        }
    }
}

// ── Fragment ──────────────────────────────────────────────────────────────

/// The top-level parse result: zero or more sibling nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// The first top-level element, if any.
    pub fn root(&self) -> Option<&ElementNode> {
        self.nodes.iter().find_map(Node::as_element)
    }
}

/// Elements that never have children or a closing tag.
pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "input" | "br" | "hr" | "img" | "meta" | "link" | "col" | "area" | "base" | "source" | "wbr"
    )
}
