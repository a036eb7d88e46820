use crate::adapter::Adapter;
use crate::tree::{AttrValue, AttributeItem, ElementNode, FunctionBody, Node, NodeId, Tree};

pub const BLOCK_TAG: &str = "block";
pub const KEY_FIELD: &str = "_key";

/// Wrap a loop subtree in the platform loop element.
///
/// A fragment root contributes its children directly.
pub fn wrap_subtree(
    tree: &mut Tree,
    subtree: NodeId,
    source: NodeId,
    item: &str,
    index: &str,
    adapter: &Adapter,
) -> NodeId {
    let children = match tree.node(subtree) {
        Node::Fragment(children) => children.clone(),
        _ => vec![subtree],
    };
    tree.alloc(Node::Element(ElementNode {
        tag: BLOCK_TAG.to_string(),
        attributes: vec![
            AttributeItem::expr(&adapter.for_attr, source),
            AttributeItem::string(&adapter.for_item, item),
            AttributeItem::string(&adapter.for_index, index),
            AttributeItem::string(&adapter.key, KEY_FIELD),
        ],
        children,
        self_closing: false,
    }))
}

/// Point the wrapper's loop attribute at `source`.
pub fn bind_wrapper_source(tree: &mut Tree, wrapper: NodeId, source: NodeId) {
    if let Node::Element(el) = tree.node_mut(wrapper) {
        if let Some(AttributeItem::Attribute(attr)) = el.attributes.first_mut() {
            attr.value = AttrValue::Expr(source);
        }
    }
}

/// Replace the callback body with the leading statements followed by `return record`.
pub fn rewrite_callback(tree: &mut Tree, callback: NodeId, leading: &[NodeId], record: NodeId) {
    let ret = tree.alloc(Node::Return(Some(record)));
    let mut stmts = leading.to_vec();
    stmts.push(ret);
    if let Node::Function(func) = tree.node_mut(callback) {
        func.body = FunctionBody::Block(stmts);
    }
}
