//! Lowering kinds for dynamic expressions inside a loop subtree.

use crate::adapter::Adapter;
use crate::loop_site::LoopScope;
use crate::tree::{Node, NodeId, Tree};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    ItemWhole,
    IndexWhole,
    NestedCarrier,
    StyleValue,
    Generic,
}

/// Where a dynamic leaf sits in the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafPosition<'a> {
    Text,
    Attribute(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafShape {
    Item,
    Index,
    Style,
    Computed,
}

impl LeafShape {
    pub fn kind(self) -> DependencyKind {
        match self {
            LeafShape::Item => DependencyKind::ItemWhole,
            LeafShape::Index => DependencyKind::IndexWhole,
            LeafShape::Style => DependencyKind::StyleValue,
            LeafShape::Computed => DependencyKind::Generic,
        }
    }
}

pub fn classify_leaf(
    tree: &Tree,
    expr: NodeId,
    position: LeafPosition<'_>,
    scope: &LoopScope,
    adapter: &Adapter,
) -> LeafShape {
    match (position, tree.node(tree.strip_parens(expr))) {
        (LeafPosition::Attribute(name), _) if adapter.is_style_attribute(name) => LeafShape::Style,
        (_, Node::Ident(name)) if *name == scope.item => LeafShape::Item,
        (_, Node::Ident(name)) if *name == scope.index => LeafShape::Index,
        _ => LeafShape::Computed,
    }
}

/// How a nested loop's receiver relates to the enclosing site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedSource {
    Item,
    ItemPath(Vec<String>),
    Local(String),
    Unrelated,
}

pub fn classify_nested_source(tree: &Tree, receiver: NodeId, scope: &LoopScope) -> NestedSource {
    match tree.static_path(receiver) {
        Some((root, props)) if root == scope.item && props.is_empty() => NestedSource::Item,
        Some((root, props)) if root == scope.item => NestedSource::ItemPath(props),
        Some((root, props)) if props.is_empty() && scope.locals.contains(&root) => {
            NestedSource::Local(root)
        }
        _ => NestedSource::Unrelated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_template;

    fn scope() -> LoopScope {
        LoopScope {
            item: "l1".to_string(),
            index: "index0".to_string(),
            locals: vec!["a".to_string()],
        }
    }

    fn nested(source: &str) -> NestedSource {
        let parsed = parse_template(source, "test.tsx").unwrap();
        classify_nested_source(&parsed.tree, parsed.root, &scope())
    }

    fn leaf(source: &str, position: LeafPosition<'_>) -> LeafShape {
        let parsed = parse_template(source, "test.tsx").unwrap();
        classify_leaf(&parsed.tree, parsed.root, position, &scope(), &Adapter::ali())
    }

    #[test]
    fn test_nested_sources() {
        assert_eq!(nested("l1"), NestedSource::Item);
        assert_eq!(nested("(l1)"), NestedSource::Item);
        assert_eq!(
            nested("l1.info.rows"),
            NestedSource::ItemPath(vec!["info".to_string(), "rows".to_string()])
        );
        assert_eq!(nested("a"), NestedSource::Local("a".to_string()));
        assert_eq!(nested("a.rows"), NestedSource::Unrelated);
        assert_eq!(nested("list[l1]"), NestedSource::Unrelated);
        assert_eq!(nested("l1[key]"), NestedSource::Unrelated);
    }

    #[test]
    fn test_leaf_shapes() {
        assert_eq!(leaf("l1", LeafPosition::Text), LeafShape::Item);
        assert_eq!(leaf("index0", LeafPosition::Attribute("data-key")), LeafShape::Index);
        assert_eq!(leaf("index0", LeafPosition::Attribute("style")), LeafShape::Style);
        assert_eq!(leaf("l1.name", LeafPosition::Text), LeafShape::Computed);
        assert_eq!(LeafShape::Computed.kind(), DependencyKind::Generic);
    }
}
