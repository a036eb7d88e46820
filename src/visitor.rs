use crate::tree::{
    AttrValue, AttributeItem, ElementNode, FunctionBody, FunctionNode, Node, NodeId, Pattern,
    PropertyItem, PropertyKey, RawCode, Tree,
};

/// The TreeVisitor trait defines the single traversal mechanism over the render tree arena.
///
/// Rules:
/// 1. Traversal order is source order and fixed.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers call the matching `walk_*` function to continue, or skip it to prune.
/// 4. Visitors never mutate; they record node ids and apply edits after the walk.
pub trait TreeVisitor {
    fn visit_node(&mut self, tree: &Tree, id: NodeId) {
        walk_node(self, tree, id);
    }

    fn visit_ident(&mut self, _tree: &Tree, _id: NodeId, _name: &str) {
        // Leaf node
    }

    fn visit_raw(&mut self, _tree: &Tree, _id: NodeId, _raw: &RawCode) {
        // Leaf node
    }

    fn visit_function(&mut self, tree: &Tree, id: NodeId, func: &FunctionNode) {
        walk_function(self, tree, id, func);
    }

    fn visit_block(&mut self, tree: &Tree, _id: NodeId, stmts: &[NodeId]) {
        walk_statements(self, tree, stmts);
    }

    fn visit_element(&mut self, tree: &Tree, _id: NodeId, element: &ElementNode) {
        walk_element(self, tree, element);
    }

    fn visit_pattern(&mut self, _tree: &Tree, _owner: NodeId, _slot: usize, _pattern: &Pattern) {
        // Leaf node
    }
}

pub fn walk_statements<V: TreeVisitor + ?Sized>(visitor: &mut V, tree: &Tree, stmts: &[NodeId]) {
    for stmt in stmts {
        visitor.visit_node(tree, *stmt);
    }
}

pub fn walk_function<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    tree: &Tree,
    id: NodeId,
    func: &FunctionNode,
) {
    for (slot, param) in func.params.iter().enumerate() {
        visitor.visit_pattern(tree, id, slot, param);
    }
    match &func.body {
        FunctionBody::Expr(body) => visitor.visit_node(tree, *body),
        FunctionBody::Block(stmts) => walk_statements(visitor, tree, stmts),
    }
}

pub fn walk_element<V: TreeVisitor + ?Sized>(visitor: &mut V, tree: &Tree, element: &ElementNode) {
    for item in &element.attributes {
        match item {
            AttributeItem::Attribute(attr) => {
                if let AttrValue::Expr(value) = &attr.value {
                    visitor.visit_node(tree, *value);
                }
            }
            AttributeItem::Spread(value) => visitor.visit_node(tree, *value),
        }
    }
    walk_statements(visitor, tree, &element.children);
}

pub fn walk_node<V: TreeVisitor + ?Sized>(visitor: &mut V, tree: &Tree, id: NodeId) {
    match tree.node(id) {
        Node::Ident(name) => visitor.visit_ident(tree, id, name),
        Node::Raw(raw) => visitor.visit_raw(tree, id, raw),
        Node::Function(func) => visitor.visit_function(tree, id, func),
        Node::Element(element) => visitor.visit_element(tree, id, element),
        Node::Block(stmts) => visitor.visit_block(tree, id, stmts),
        Node::Fragment(children) | Node::Array(children) => walk_statements(visitor, tree, children),
        Node::Member { object, .. } => visitor.visit_node(tree, *object),
        Node::Index { object, index } => {
            visitor.visit_node(tree, *object);
            visitor.visit_node(tree, *index);
        }
        Node::Call { callee, args } => {
            visitor.visit_node(tree, *callee);
            walk_statements(visitor, tree, args);
        }
        Node::Object(props) => {
            for prop in props {
                match prop {
                    PropertyItem::Property { key, value, .. } => {
                        if let PropertyKey::Computed(key) = key {
                            visitor.visit_node(tree, *key);
                        }
                        visitor.visit_node(tree, *value);
                    }
                    PropertyItem::Spread(value) => visitor.visit_node(tree, *value),
                }
            }
        }
        Node::Binary { left, right, .. } | Node::Logical { left, right, .. } => {
            visitor.visit_node(tree, *left);
            visitor.visit_node(tree, *right);
        }
        Node::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_node(tree, *test);
            visitor.visit_node(tree, *consequent);
            visitor.visit_node(tree, *alternate);
        }
        Node::Spread(inner)
        | Node::Paren(inner)
        | Node::Container(inner)
        | Node::ExprStmt(inner)
        | Node::Unary {
            argument: inner, ..
        } => visitor.visit_node(tree, *inner),
        Node::Return(value) => {
            if let Some(value) = value {
                visitor.visit_node(tree, *value);
            }
        }
        Node::VarDecl { declarators, .. } => {
            for (slot, declarator) in declarators.iter().enumerate() {
                visitor.visit_pattern(tree, id, slot, &declarator.id);
                if let Some(init) = declarator.init {
                    visitor.visit_node(tree, init);
                }
            }
        }
        Node::If {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_node(tree, *test);
            visitor.visit_node(tree, *consequent);
            if let Some(alternate) = alternate {
                visitor.visit_node(tree, *alternate);
            }
        }
        Node::Literal(_) | Node::Text(_) | Node::Mustache(_) => {}
    }
}
