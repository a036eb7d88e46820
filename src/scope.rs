use crate::tree::{FunctionBody, FunctionNode, Node, NodeId, Pattern, RawCode, Tree};
use crate::visitor::{walk_function, walk_node, walk_statements, TreeVisitor};
use std::collections::HashSet;

/// Collects identifier references that are free in a subtree.
///
/// Names bound by nested function signatures or by declarations inside nested
/// blocks are not reported.
pub struct ReferenceCollector {
    pub references: Vec<String>,
    scopes: Vec<HashSet<String>>,
}

impl ReferenceCollector {
    pub fn new() -> Self {
        ReferenceCollector {
            references: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn record(&mut self, name: &str) {
        if !self.is_bound(name) && !self.references.iter().any(|r| r == name) {
            self.references.push(name.to_string());
        }
    }
}

impl Default for ReferenceCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeVisitor for ReferenceCollector {
    fn visit_ident(&mut self, _tree: &Tree, _id: NodeId, name: &str) {
        self.record(name);
    }

    fn visit_raw(&mut self, _tree: &Tree, _id: NodeId, raw: &RawCode) {
        let bound: HashSet<&str> = raw.bindings.iter().map(String::as_str).collect();
        for name in raw.references() {
            if !bound.contains(name) {
                self.record(name);
            }
        }
    }

    fn visit_function(&mut self, tree: &Tree, id: NodeId, func: &FunctionNode) {
        let mut scope: HashSet<String> = func.bound_names().into_iter().collect();
        if let FunctionBody::Block(stmts) = &func.body {
            scope.extend(declared_names(tree, stmts));
        }
        self.scopes.push(scope);
        walk_function(self, tree, id, func);
        self.scopes.pop();
    }

    fn visit_pattern(&mut self, tree: &Tree, owner: NodeId, _slot: usize, pattern: &Pattern) {
        if let Pattern::Raw(raw) = pattern {
            self.visit_raw(tree, owner, raw);
        }
    }

    fn visit_block(&mut self, tree: &Tree, _id: NodeId, stmts: &[NodeId]) {
        self.scopes
            .push(declared_names(tree, stmts).into_iter().collect());
        walk_statements(self, tree, stmts);
        self.scopes.pop();
    }
}

/// Free identifier references of the subtree at `id`, in first-occurrence order.
pub fn free_references(tree: &Tree, id: NodeId) -> Vec<String> {
    let mut collector = ReferenceCollector::new();
    collector.visit_node(tree, id);
    collector.references
}

/// Names declared by `var`/`let`/`const` statements directly in `stmts`.
pub fn declared_names(tree: &Tree, stmts: &[NodeId]) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in stmts {
        if let Node::VarDecl { declarators, .. } = tree.node(*stmt) {
            for declarator in declarators {
                names.extend(declarator.id.names());
            }
        }
    }
    names
}

struct JsxFinder {
    found: bool,
}

impl TreeVisitor for JsxFinder {
    fn visit_node(&mut self, tree: &Tree, id: NodeId) {
        if self.found {
            return;
        }
        match tree.node(id) {
            Node::Element(_) | Node::Fragment(_) => self.found = true,
            Node::Raw(raw) if raw.has_jsx => self.found = true,
            _ => walk_node(self, tree, id),
        }
    }
}

pub fn contains_jsx(tree: &Tree, id: NodeId) -> bool {
    let mut finder = JsxFinder { found: false };
    finder.visit_node(tree, id);
    finder.found
}

struct ReturnFinder {
    found: bool,
}

impl TreeVisitor for ReturnFinder {
    fn visit_node(&mut self, tree: &Tree, id: NodeId) {
        match tree.node(id) {
            Node::Return(_) => self.found = true,
            Node::Raw(raw) if raw.has_return => self.found = true,
            _ => walk_node(self, tree, id),
        }
    }

    fn visit_function(&mut self, _tree: &Tree, _id: NodeId, _func: &FunctionNode) {
        // A nested function's returns belong to that function
    }
}

/// Whether `stmts` return from the enclosing function at their own level.
pub fn contains_return(tree: &Tree, stmts: &[NodeId]) -> bool {
    let mut finder = ReturnFinder { found: false };
    walk_statements(&mut finder, tree, stmts);
    finder.found
}

/// Collects the outermost JSX nodes under a set of roots.
pub struct JsxRootCollector {
    pub roots: Vec<NodeId>,
}

impl TreeVisitor for JsxRootCollector {
    fn visit_node(&mut self, tree: &Tree, id: NodeId) {
        if tree.node(id).is_jsx() {
            self.roots.push(id);
        } else {
            walk_node(self, tree, id);
        }
    }
}

pub fn jsx_roots(tree: &Tree, stmts: &[NodeId]) -> Vec<NodeId> {
    let mut collector = JsxRootCollector { roots: Vec::new() };
    walk_statements(&mut collector, tree, stmts);
    collector.roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_template;

    fn refs(source: &str) -> Vec<String> {
        let parsed = parse_template(source, "test.tsx").unwrap();
        free_references(&parsed.tree, parsed.root)
    }

    #[test]
    fn test_member_properties_are_not_references() {
        assert_eq!(refs("item.list.length + offset"), vec!["item", "offset"]);
    }

    #[test]
    fn test_function_params_are_bound() {
        assert_eq!(refs("rows.filter(row => row.id === selected)"), vec!["rows", "selected"]);
    }

    #[test]
    fn test_block_locals_are_bound() {
        assert_eq!(
            refs("() => { const total = base + 1; return total * scale; }"),
            vec!["base", "scale"]
        );
    }

    #[test]
    fn test_object_keys_are_not_references() {
        assert_eq!(refs("({ uri: item.picUrl, [key]: value })"), vec!["item", "key", "value"]);
    }

    #[test]
    fn test_contains_jsx_through_logical() {
        let parsed = parse_template("visible && <View />", "test.tsx").unwrap();
        assert!(contains_jsx(&parsed.tree, parsed.root));
        let parsed = parse_template("visible && label", "test.tsx").unwrap();
        assert!(!contains_jsx(&parsed.tree, parsed.root));
    }
}
