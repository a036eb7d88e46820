use crate::scope::declared_names;
use crate::tree::{FunctionBody, FunctionNode, Node, NodeId, Pattern, RawCode, Tree};
use crate::visitor::{walk_function, walk_statements, TreeVisitor};

/// A pattern held inside a node rather than as a node of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSlot {
    Param(NodeId, usize),
    Declarator(NodeId, usize),
}

/// Collects every reference to `from` that resolves to the binding being renamed.
///
/// Functions and blocks that rebind `from` are skipped along with everything below them.
pub struct RenamerVisitor {
    pub from: String,
    pub to: String,
    pub replacements: Vec<NodeId>,
    pub raw_replacements: Vec<NodeId>,
    pub pattern_replacements: Vec<PatternSlot>,
}

impl RenamerVisitor {
    pub fn new(from: &str, to: &str) -> Self {
        RenamerVisitor {
            from: from.to_string(),
            to: to.to_string(),
            replacements: Vec::new(),
            raw_replacements: Vec::new(),
            pattern_replacements: Vec::new(),
        }
    }

    fn rebinds(&self, tree: &Tree, func: &FunctionNode) -> bool {
        if func.bound_names().iter().any(|n| *n == self.from) {
            return true;
        }
        match &func.body {
            FunctionBody::Block(stmts) => declared_names(tree, stmts).contains(&self.from),
            FunctionBody::Expr(_) => false,
        }
    }

    fn references_from(&self, raw: &RawCode) -> bool {
        raw.references().any(|name| name == self.from)
    }

    pub fn apply(self, tree: &mut Tree) -> usize {
        let mut count = 0;
        for id in &self.replacements {
            tree.set(*id, Node::Ident(self.to.clone()));
            count += 1;
        }
        for id in &self.raw_replacements {
            if let Node::Raw(raw) = tree.node_mut(*id) {
                count += raw.rename(&self.from, &self.to);
            }
        }
        for slot in &self.pattern_replacements {
            let pattern = match (slot, tree.node_mut(slot_owner(*slot))) {
                (PatternSlot::Param(_, index), Node::Function(func)) => func.params.get_mut(*index),
                (PatternSlot::Declarator(_, index), Node::VarDecl { declarators, .. }) => {
                    declarators.get_mut(*index).map(|d| &mut d.id)
                }
                _ => None,
            };
            if let Some(Pattern::Raw(raw)) = pattern {
                count += raw.rename(&self.from, &self.to);
            }
        }
        count
    }
}

fn slot_owner(slot: PatternSlot) -> NodeId {
    match slot {
        PatternSlot::Param(id, _) | PatternSlot::Declarator(id, _) => id,
    }
}

impl TreeVisitor for RenamerVisitor {
    fn visit_ident(&mut self, _tree: &Tree, id: NodeId, name: &str) {
        if name == self.from {
            self.replacements.push(id);
        }
    }

    fn visit_raw(&mut self, _tree: &Tree, id: NodeId, raw: &RawCode) {
        if !raw.bindings.contains(&self.from) && self.references_from(raw) {
            self.raw_replacements.push(id);
        }
    }

    fn visit_function(&mut self, tree: &Tree, id: NodeId, func: &FunctionNode) {
        if self.rebinds(tree, func) {
            return;
        }
        walk_function(self, tree, id, func);
    }

    fn visit_block(&mut self, tree: &Tree, _id: NodeId, stmts: &[NodeId]) {
        if declared_names(tree, stmts).contains(&self.from) {
            return;
        }
        walk_statements(self, tree, stmts);
    }

    fn visit_pattern(&mut self, tree: &Tree, owner: NodeId, slot: usize, pattern: &Pattern) {
        if let Pattern::Raw(raw) = pattern {
            if !raw.bindings.contains(&self.from) && self.references_from(raw) {
                let slot = match tree.node(owner) {
                    Node::Function(_) => PatternSlot::Param(owner, slot),
                    _ => PatternSlot::Declarator(owner, slot),
                };
                self.pattern_replacements.push(slot);
            }
        }
    }
}

/// Rename every reference to `from` under `roots` to `to`, returning the number of rewrites.
pub fn rename_identifier(tree: &mut Tree, roots: &[NodeId], from: &str, to: &str) -> usize {
    if from == to {
        return 0;
    }
    let mut renamer = RenamerVisitor::new(from, to);
    walk_statements(&mut renamer, tree, roots);
    renamer.apply(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{print_node, PrintStyle};
    use crate::parse::parse_template;

    fn renamed(source: &str, from: &str, to: &str) -> (String, usize) {
        let mut parsed = parse_template(source, "test.tsx").unwrap();
        let root = parsed.root;
        let count = rename_identifier(&mut parsed.tree, &[root], from, to);
        (print_node(&parsed.tree, root, PrintStyle::Concise), count)
    }

    #[test]
    fn test_renames_references() {
        let (code, count) = renamed("idx * 100 + offset[idx]", "idx", "index0");
        assert_eq!(code, "index0 * 100 + offset[index0]");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_member_property_untouched() {
        let (code, _) = renamed("item.idx + idx", "idx", "index0");
        assert_eq!(code, "item.idx + index0");
    }

    #[test]
    fn test_reaches_nested_callbacks() {
        let (code, count) = renamed("rows.map(row => row[idx])", "idx", "index1");
        assert_eq!(code, "rows.map((row) => row[index1])");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_skips_shadowing_function() {
        let (code, count) = renamed("rows.map((row, idx) => row[idx])", "idx", "index1");
        assert_eq!(code, "rows.map((row, idx) => row[idx])");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_skips_shadowing_block_local() {
        let (code, _) = renamed(
            "() => { if (ok) { const idx = 1; use(idx); } return idx; }",
            "idx",
            "index2",
        );
        assert_eq!(
            code,
            "() => { if (ok) { const idx = 1; use(idx); } return index2; }"
        );
    }
}
