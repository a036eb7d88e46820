//! Arena IR for render trees.
//!
//! Every node lives in a single `Tree` and is addressed by `NodeId`. Nodes never
//! point back at their parents; traversals pass the parent down explicitly and
//! rewrite through `replace_child`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Expressions
    Ident(String),
    /// Literal source text (strings keep their quotes).
    Literal(String),
    Raw(RawCode),
    Member {
        object: NodeId,
        property: String,
        /// `object?.property`
        optional: bool,
    },
    Index {
        object: NodeId,
        index: NodeId,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Function(FunctionNode),
    Object(Vec<PropertyItem>),
    Array(Vec<NodeId>),
    Spread(NodeId),
    Binary {
        op: String,
        left: NodeId,
        right: NodeId,
    },
    Logical {
        op: String,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: String,
        argument: NodeId,
    },
    Conditional {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    Paren(NodeId),

    // JSX
    Element(ElementNode),
    Fragment(Vec<NodeId>),
    Text(String),
    Container(NodeId),
    /// Lowered text binding, printed as `{{ path }}`.
    Mustache(String),

    // Statements
    Return(Option<NodeId>),
    ExprStmt(NodeId),
    VarDecl {
        kind: String,
        declarators: Vec<Declarator>,
    },
    If {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    Block(Vec<NodeId>),
}

impl Node {
    pub fn is_jsx(&self) -> bool {
        matches!(self, Node::Element(_) | Node::Fragment(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    Arrow,
    Expression { name: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Expr(NodeId),
    Block(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub kind: FunctionKind,
    pub is_async: bool,
    pub is_generator: bool,
    pub params: Vec<Pattern>,
    pub body: FunctionBody,
}

impl FunctionNode {
    /// Names bound by the signature (parameters and a named function expression's own name).
    pub fn bound_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.params.iter().flat_map(Pattern::names).collect();
        if let FunctionKind::Expression { name: Some(name) } = &self.kind {
            names.push(name.clone());
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident(String),
    /// `name: Annotation`
    Typed { name: String, annotation: String },
    Raw(RawCode),
}

impl Pattern {
    pub fn names(&self) -> Vec<String> {
        match self {
            Pattern::Ident(name) | Pattern::Typed { name, .. } => vec![name.clone()],
            Pattern::Raw(raw) => raw.bindings.clone(),
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Pattern::Ident(name) | Pattern::Typed { name, .. } => Some(name),
            Pattern::Raw(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub id: Pattern,
    pub init: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Ident(String),
    Literal(String),
    Computed(NodeId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyItem {
    Property {
        key: PropertyKey,
        value: NodeId,
        shorthand: bool,
    },
    Spread(NodeId),
}

impl PropertyItem {
    pub fn field(name: &str, value: NodeId) -> Self {
        PropertyItem::Property {
            key: PropertyKey::Ident(name.to_string()),
            value,
            shorthand: false,
        }
    }

    pub fn key_name(&self) -> Option<&str> {
        match self {
            PropertyItem::Property {
                key: PropertyKey::Ident(name),
                ..
            } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub attributes: Vec<AttributeItem>,
    pub children: Vec<NodeId>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeItem {
    Attribute(Attribute),
    Spread(NodeId),
}

impl AttributeItem {
    pub fn expr(name: &str, value: NodeId) -> Self {
        AttributeItem::Attribute(Attribute {
            name: name.to_string(),
            value: AttrValue::Expr(value),
        })
    }

    /// A double-quoted string attribute.
    pub fn string(name: &str, value: &str) -> Self {
        AttributeItem::Attribute(Attribute {
            name: name.to_string(),
            value: AttrValue::Literal(format!("\"{}\"", value)),
        })
    }

    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            AttributeItem::Attribute(attr) => Some(attr),
            AttributeItem::Spread(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Empty,
    Literal(String),
    Expr(NodeId),
    /// Lowered attribute binding, printed as `"{{path}}"`.
    Mustache(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW CODE
// ═══════════════════════════════════════════════════════════════════════════════

/// Source the frontend does not model structurally.
///
/// Identifier references are kept as separate parts so renames still reach them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCode {
    pub parts: Vec<RawPart>,
    pub bindings: Vec<String>,
    pub has_jsx: bool,
    pub has_return: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawPart {
    Text(String),
    Ref(String),
}

impl RawCode {
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            RawPart::Ref(name) => Some(name.as_str()),
            RawPart::Text(_) => None,
        })
    }

    pub fn rename(&mut self, from: &str, to: &str) -> usize {
        let mut count = 0;
        for part in &mut self.parts {
            if let RawPart::Ref(name) = part {
                if name == from {
                    *name = to.to_string();
                    count += 1;
                }
            }
        }
        count
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                RawPart::Text(text) | RawPart::Ref(text) => text.as_str(),
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Swap in a new node at `id`, returning the old one.
    pub fn set(&mut self, id: NodeId, node: Node) -> Node {
        std::mem::replace(&mut self.nodes[id.index()], node)
    }

    /// Move the node at `id` to a fresh slot, leaving an empty literal behind.
    pub fn relocate(&mut self, id: NodeId) -> NodeId {
        let node = self.set(id, Node::Literal(String::new()));
        self.alloc(node)
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.alloc(Node::Ident(name.to_string()))
    }

    pub fn call(&mut self, callee: &str, args: Vec<NodeId>) -> NodeId {
        let callee = self.ident(callee);
        self.alloc(Node::Call { callee, args })
    }

    /// Build `a.b.c` from its segments.
    pub fn path<S: AsRef<str>>(&mut self, segments: &[S]) -> NodeId {
        let mut iter = segments.iter();
        let root = iter.next().map(|s| s.as_ref()).unwrap_or_default();
        let mut current = self.ident(root);
        for segment in iter {
            current = self.alloc(Node::Member {
                object: current,
                property: segment.as_ref().to_string(),
                optional: false,
            });
        }
        current
    }

    pub fn strip_parens(&self, mut id: NodeId) -> NodeId {
        while let Node::Paren(inner) = self.node(id) {
            id = *inner;
        }
        id
    }

    /// Decompose a static member chain (`a.b.c`) into its root identifier and properties.
    pub fn static_path(&self, id: NodeId) -> Option<(String, Vec<String>)> {
        match self.node(self.strip_parens(id)) {
            Node::Ident(name) => Some((name.clone(), Vec::new())),
            Node::Member {
                object,
                property,
                optional: false,
            } => {
                let (root, mut props) = self.static_path(*object)?;
                props.push(property.clone());
                Some((root, props))
            }
            _ => None,
        }
    }

    /// Point the direct reference `old` held by `holder` at `new`.
    pub fn replace_child(&mut self, holder: NodeId, old: NodeId, new: NodeId) -> bool {
        let swap = |slot: &mut NodeId| {
            if *slot == old {
                *slot = new;
                true
            } else {
                false
            }
        };
        match self.node_mut(holder) {
            Node::Element(el) => {
                let mut replaced = el.children.iter_mut().fold(false, |acc, c| swap(c) || acc);
                for item in &mut el.attributes {
                    match item {
                        AttributeItem::Attribute(Attribute {
                            value: AttrValue::Expr(value),
                            ..
                        }) => replaced |= swap(value),
                        AttributeItem::Spread(value) => replaced |= swap(value),
                        _ => {}
                    }
                }
                replaced
            }
            Node::Fragment(children) | Node::Array(children) | Node::Block(children) => {
                children.iter_mut().fold(false, |acc, c| swap(c) || acc)
            }
            Node::Call { callee, args } => {
                let replaced = swap(callee);
                args.iter_mut().fold(replaced, |acc, a| swap(a) || acc)
            }
            Node::Member { object, .. } => swap(object),
            Node::Index { object, index } => swap(object) | swap(index),
            Node::Spread(inner)
            | Node::Paren(inner)
            | Node::Container(inner)
            | Node::ExprStmt(inner)
            | Node::Unary {
                argument: inner, ..
            } => swap(inner),
            Node::Return(value) => value.as_mut().map(swap).unwrap_or(false),
            Node::Binary { left, right, .. } | Node::Logical { left, right, .. } => {
                swap(left) | swap(right)
            }
            Node::Conditional {
                test,
                consequent,
                alternate,
            } => swap(test) | swap(consequent) | swap(alternate),
            Node::If {
                test,
                consequent,
                alternate,
            } => {
                let replaced = swap(test) | swap(consequent);
                replaced | alternate.as_mut().map(swap).unwrap_or(false)
            }
            Node::Object(props) => props.iter_mut().fold(false, |acc, prop| {
                let hit = match prop {
                    PropertyItem::Property { key, value, .. } => {
                        let key_hit = match key {
                            PropertyKey::Computed(k) => swap(k),
                            _ => false,
                        };
                        key_hit | swap(value)
                    }
                    PropertyItem::Spread(value) => swap(value),
                };
                hit || acc
            }),
            Node::Function(func) => match &mut func.body {
                FunctionBody::Expr(body) => swap(body),
                FunctionBody::Block(stmts) => stmts.iter_mut().fold(false, |acc, s| swap(s) || acc),
            },
            Node::VarDecl { declarators, .. } => declarators.iter_mut().fold(false, |acc, d| {
                d.init.as_mut().map(swap).unwrap_or(false) || acc
            }),
            Node::Ident(_)
            | Node::Literal(_)
            | Node::Raw(_)
            | Node::Text(_)
            | Node::Mustache(_) => false,
        }
    }

    /// Copy the subtree rooted at `id` into fresh nodes.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let node = self.node(id).clone();
        let cloned = match node {
            Node::Member {
                object,
                property,
                optional,
            } => Node::Member {
                object: self.deep_clone(object),
                property,
                optional,
            },
            Node::Index { object, index } => Node::Index {
                object: self.deep_clone(object),
                index: self.deep_clone(index),
            },
            Node::Call { callee, args } => Node::Call {
                callee: self.deep_clone(callee),
                args: args.into_iter().map(|a| self.deep_clone(a)).collect(),
            },
            Node::Function(mut func) => {
                func.body = match func.body {
                    FunctionBody::Expr(body) => FunctionBody::Expr(self.deep_clone(body)),
                    FunctionBody::Block(stmts) => {
                        FunctionBody::Block(stmts.into_iter().map(|s| self.deep_clone(s)).collect())
                    }
                };
                Node::Function(func)
            }
            Node::Object(props) => Node::Object(
                props
                    .into_iter()
                    .map(|prop| match prop {
                        PropertyItem::Property {
                            key,
                            value,
                            shorthand,
                        } => PropertyItem::Property {
                            key: match key {
                                PropertyKey::Computed(k) => PropertyKey::Computed(self.deep_clone(k)),
                                other => other,
                            },
                            value: self.deep_clone(value),
                            shorthand,
                        },
                        PropertyItem::Spread(value) => PropertyItem::Spread(self.deep_clone(value)),
                    })
                    .collect(),
            ),
            Node::Array(items) => Node::Array(items.into_iter().map(|i| self.deep_clone(i)).collect()),
            Node::Spread(inner) => Node::Spread(self.deep_clone(inner)),
            Node::Binary { op, left, right } => Node::Binary {
                op,
                left: self.deep_clone(left),
                right: self.deep_clone(right),
            },
            Node::Logical { op, left, right } => Node::Logical {
                op,
                left: self.deep_clone(left),
                right: self.deep_clone(right),
            },
            Node::Unary { op, argument } => Node::Unary {
                op,
                argument: self.deep_clone(argument),
            },
            Node::Conditional {
                test,
                consequent,
                alternate,
            } => Node::Conditional {
                test: self.deep_clone(test),
                consequent: self.deep_clone(consequent),
                alternate: self.deep_clone(alternate),
            },
            Node::Paren(inner) => Node::Paren(self.deep_clone(inner)),
            Node::Element(mut el) => {
                el.attributes = el
                    .attributes
                    .into_iter()
                    .map(|item| match item {
                        AttributeItem::Attribute(Attribute {
                            name,
                            value: AttrValue::Expr(value),
                        }) => AttributeItem::Attribute(Attribute {
                            name,
                            value: AttrValue::Expr(self.deep_clone(value)),
                        }),
                        AttributeItem::Spread(value) => AttributeItem::Spread(self.deep_clone(value)),
                        other => other,
                    })
                    .collect();
                el.children = el.children.into_iter().map(|c| self.deep_clone(c)).collect();
                Node::Element(el)
            }
            Node::Fragment(children) => {
                Node::Fragment(children.into_iter().map(|c| self.deep_clone(c)).collect())
            }
            Node::Container(inner) => Node::Container(self.deep_clone(inner)),
            Node::Return(value) => Node::Return(value.map(|v| self.deep_clone(v))),
            Node::ExprStmt(inner) => Node::ExprStmt(self.deep_clone(inner)),
            Node::VarDecl { kind, declarators } => Node::VarDecl {
                kind,
                declarators: declarators
                    .into_iter()
                    .map(|d| Declarator {
                        id: d.id,
                        init: d.init.map(|i| self.deep_clone(i)),
                    })
                    .collect(),
            },
            Node::If {
                test,
                consequent,
                alternate,
            } => Node::If {
                test: self.deep_clone(test),
                consequent: self.deep_clone(consequent),
                alternate: alternate.map(|a| self.deep_clone(a)),
            },
            Node::Block(stmts) => Node::Block(stmts.into_iter().map(|s| self.deep_clone(s)).collect()),
            leaf @ (Node::Ident(_)
            | Node::Literal(_)
            | Node::Raw(_)
            | Node::Text(_)
            | Node::Mustache(_)) => leaf,
        };
        self.alloc(cloned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_path_through_parens() {
        let mut tree = Tree::new();
        let root = tree.path(&["item", "list"]);
        let wrapped = tree.alloc(Node::Paren(root));
        let deeper = tree.alloc(Node::Member {
            object: wrapped,
            property: "rows".to_string(),
            optional: false,
        });
        assert_eq!(
            tree.static_path(deeper),
            Some(("item".to_string(), vec!["list".to_string(), "rows".to_string()]))
        );
    }

    #[test]
    fn test_static_path_rejects_computed() {
        let mut tree = Tree::new();
        let list = tree.ident("list");
        let index = tree.ident("l1");
        let computed = tree.alloc(Node::Index {
            object: list,
            index,
        });
        assert_eq!(tree.static_path(computed), None);
    }

    #[test]
    fn test_replace_child_in_conditional() {
        let mut tree = Tree::new();
        let test = tree.ident("show");
        let consequent = tree.ident("a");
        let alternate = tree.alloc(Node::Literal("null".to_string()));
        let cond = tree.alloc(Node::Conditional {
            test,
            consequent,
            alternate,
        });
        let replacement = tree.ident("b");
        assert!(tree.replace_child(cond, consequent, replacement));
        match tree.node(cond) {
            Node::Conditional { consequent, .. } => assert_eq!(*consequent, replacement),
            other => panic!("unexpected node {:?}", other),
        }
        assert!(!tree.replace_child(cond, consequent, replacement));
    }

    #[test]
    fn test_deep_clone_is_detached() {
        let mut tree = Tree::new();
        let source = tree.path(&["l1", "list"]);
        let copy = tree.deep_clone(source);
        assert_ne!(source, copy);
        if let Node::Member { object, .. } = tree.node(copy).clone() {
            tree.set(object, Node::Ident("other".to_string()));
        }
        assert_eq!(
            tree.static_path(source),
            Some(("l1".to_string(), vec!["list".to_string()]))
        );
    }

    #[test]
    fn test_relocate_moves_node() {
        let mut tree = Tree::new();
        let id = tree.ident("arr");
        let moved = tree.relocate(id);
        assert_eq!(tree.node(moved), &Node::Ident("arr".to_string()));
        assert_eq!(tree.node(id), &Node::Literal(String::new()));
    }
}
