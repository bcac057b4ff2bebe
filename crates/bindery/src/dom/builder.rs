use bindery_markup::{ElementNode, Fragment, Node};

use crate::dom::document::{ElementId, Tree};

/// Append every node of `fragment` under `parent`, returning the top-level
/// elements created.
pub(crate) fn build(tree: &mut Tree, parent: ElementId, fragment: &Fragment) -> Vec<ElementId> {
    fragment.nodes.iter().filter_map(|node| build_node(tree, parent, node)).collect()
}

fn build_node(tree: &mut Tree, parent: ElementId, node: &Node) -> Option<ElementId> {
    match node {
        Node::Text(text) => {
            tree.push_text(parent, text);
            None
        }
        Node::Element(element) => Some(build_element(tree, parent, element)),
    }
}

fn build_element(tree: &mut Tree, parent: ElementId, node: &ElementNode) -> ElementId {
    let attrs = node.attrs.iter().map(|a| (a.name.clone(), a.value.clone())).collect();
    let id = tree.create(parent, &node.tag, attrs);
    for child in &node.children {
        build_node(tree, id, child);
    }

    match node.tag.as_str() {
        "input" => init_input(tree, id, node),
        "textarea" => tree.el_mut(id).value = node.text(),
        "option" => tree.el_mut(id).checked = node.has_attr("selected"),
        "select" => init_select(tree, id),
        _ => {}
    }
    id
}

// ── Form state ────────────────────────────────────────────────────────────

fn init_input(tree: &mut Tree, id: ElementId, node: &ElementNode) {
    let toggles = node
        .attr("type")
        .is_some_and(|t| t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio"));
    let value = match node.attr("value") {
        Some(v) => v.to_string(),
        // Checkboxes and radios without a value report "on".
        None if toggles => "on".to_string(),
        None => String::new(),
    };
    let data = tree.el_mut(id);
    data.value = value;
    data.checked = node.has_attr("checked");
}

/// A single-choice select always has exactly one selected option when it has
/// any: the last one marked `selected`, else the first.
fn init_select(tree: &mut Tree, id: ElementId) {
    let options = tree.options(id);
    let chosen = options
        .iter()
        .rev()
        .find(|o| tree.el(**o).checked)
        .or_else(|| options.first())
        .copied();
    for option in options {
        tree.el_mut(option).checked = Some(option) == chosen;
    }
}
