use tracing::{debug, trace};

use crate::adapter::Adapter;
use crate::classify::{classify_leaf, classify_nested_source, DependencyKind, LeafPosition, LeafShape, NestedSource};
use crate::loop_site::{
    match_loop_site, normalize_callback, LoopBinding, LoopCandidate, LoopScope, LoopSite, NoMatch,
};
use crate::record::RecordBuilder;
use crate::rewrite::{bind_wrapper_source, rewrite_callback, wrap_subtree};
use crate::scope::{contains_jsx, declared_names, free_references, jsx_roots};
use crate::tokens::TokenAllocator;
use crate::tree::{AttrValue, AttributeItem, Node, NodeId, Tree};

// ═══════════════════════════════════════════════════════════════════════════════
// LOWERING CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

pub struct LoweringContext<'a> {
    pub adapter: &'a Adapter,
    pub tokens: &'a mut TokenAllocator,
    pub sites: Vec<LoopSite>,
}

impl<'a> LoweringContext<'a> {
    pub fn new(adapter: &'a Adapter, tokens: &'a mut TokenAllocator) -> Self {
        LoweringContext {
            adapter,
            tokens,
            sites: Vec::new(),
        }
    }
}

/// The loop site whose record receives the dynamic leaves currently being lowered.
struct RecordOwner {
    scope: LoopScope,
    /// Enclosing site scopes, innermost last.
    outer: Vec<LoopScope>,
    record: RecordBuilder,
    site_id: u32,
}

/// A template condition that a nested site renders under.
#[derive(Debug, Clone)]
enum Guard {
    /// `left op <site>`
    Operand { op: String, left: NodeId },
    /// `test ? <site> : ...`
    When(NodeId),
    /// `test ? ... : <site>`
    Unless(NodeId),
}

impl RecordOwner {
    fn depends_on(&self, references: &[String]) -> bool {
        references.iter().any(|name| {
            self.scope.binds(name) || self.outer.iter().any(|scope| scope.binds(name))
        })
    }

    fn path(&self, field: &str) -> String {
        format!("{}.{}", self.scope.item, field)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Lower every list-mapping site under `root`, mutating the tree in place.
///
/// Returns the number of sites lowered. `ctx.sites` ends up sorted by id.
pub fn lower_lists(tree: &mut Tree, root: NodeId, ctx: &mut LoweringContext) -> usize {
    let before = ctx.sites.len();

    match match_loop_site(tree, root) {
        Ok(mut candidate) => {
            // The wrapper takes over the call's slot so `root` stays valid.
            let slot = candidate.call;
            candidate.call = tree.relocate(slot);
            let wrapper = lower_site(tree, candidate, &[], None, ctx);
            let node = tree.set(wrapper, Node::Literal(String::new()));
            tree.set(slot, node);
            if let Some(site) = ctx.sites.iter_mut().find(|site| site.wrapper == wrapper) {
                site.wrapper = slot;
            }
        }
        Err(_) if tree.node(root).is_jsx() => lower_jsx(tree, root, &[], None, ctx),
        Err(_) if contains_jsx(tree, root) => lower_embedded(tree, root, &[], None, ctx),
        Err(reason) => trace!(reason = reason.reason(), "root holds no JSX"),
    }

    ctx.sites.sort_by_key(|site| site.id);
    ctx.sites.len() - before
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAVERSAL
// ═══════════════════════════════════════════════════════════════════════════════

fn lower_jsx(
    tree: &mut Tree,
    id: NodeId,
    guards: &[Guard],
    mut owner: Option<&mut RecordOwner>,
    ctx: &mut LoweringContext,
) {
    let (attributes, children) = match tree.node(id) {
        Node::Element(el) => (el.attributes.clone(), el.children.clone()),
        Node::Fragment(children) => (Vec::new(), children.clone()),
        _ => return,
    };

    for (position, item) in attributes.iter().enumerate() {
        let AttributeItem::Attribute(attr) = item else {
            continue;
        };
        let AttrValue::Expr(value) = attr.value else {
            continue;
        };
        if contains_jsx(tree, value) {
            lower_embedded(tree, value, guards, owner.as_deref_mut(), ctx);
            continue;
        }
        let Some(owner) = owner.as_deref_mut() else {
            continue;
        };
        let leaf = LeafPosition::Attribute(&attr.name);
        if let Some(path) = lower_leaf(tree, value, leaf, owner, ctx.adapter) {
            if let Node::Element(el) = tree.node_mut(id) {
                if let Some(AttributeItem::Attribute(target)) = el.attributes.get_mut(position) {
                    target.value = AttrValue::Mustache(path);
                }
            }
        }
    }

    for child in children {
        lower_child(tree, id, child, guards, owner.as_deref_mut(), ctx);
    }
}

fn lower_child(
    tree: &mut Tree,
    parent: NodeId,
    child: NodeId,
    guards: &[Guard],
    owner: Option<&mut RecordOwner>,
    ctx: &mut LoweringContext,
) {
    let expr = match tree.node(child) {
        Node::Element(_) | Node::Fragment(_) => return lower_jsx(tree, child, guards, owner, ctx),
        Node::Container(expr) => *expr,
        _ => return,
    };

    match match_loop_site(tree, expr) {
        Ok(candidate) => {
            let wrapper = lower_site(tree, candidate, guards, owner, ctx);
            tree.replace_child(parent, child, wrapper);
        }
        Err(NoMatch::NotMapCall) if contains_jsx(tree, expr) => {
            lower_embedded(tree, expr, guards, owner, ctx)
        }
        Err(reason) if contains_jsx(tree, expr) => {
            debug!(reason = reason.reason(), "map call left untouched");
        }
        Err(_) => {
            let Some(owner) = owner else {
                return;
            };
            if let Some(path) = lower_leaf(tree, expr, LeafPosition::Text, owner, ctx.adapter) {
                tree.set(child, Node::Mustache(path));
            }
        }
    }
}

/// Scan a JSX-bearing expression for loop sites in its conditional or logical operands.
///
/// `guards` collects the conditions the operands render under.
fn lower_embedded(
    tree: &mut Tree,
    id: NodeId,
    guards: &[Guard],
    mut owner: Option<&mut RecordOwner>,
    ctx: &mut LoweringContext,
) {
    let operands = match tree.node(id) {
        Node::Element(_) | Node::Fragment(_) => return lower_jsx(tree, id, guards, owner, ctx),
        Node::Conditional {
            test,
            consequent,
            alternate,
        } => vec![
            (*consequent, Some(Guard::When(*test))),
            (*alternate, Some(Guard::Unless(*test))),
        ],
        Node::Logical { op, left, right } => vec![(
            *right,
            Some(Guard::Operand {
                op: op.clone(),
                left: *left,
            }),
        )],
        Node::Paren(inner) => vec![(*inner, None)],
        _ => return,
    };

    for (operand, guard) in operands {
        let mut scoped = guards.to_vec();
        scoped.extend(guard);
        match match_loop_site(tree, operand) {
            Ok(candidate) => {
                let wrapper = lower_site(tree, candidate, &scoped, owner.as_deref_mut(), ctx);
                tree.replace_child(id, operand, wrapper);
            }
            Err(NoMatch::NotMapCall) if contains_jsx(tree, operand) => {
                lower_embedded(tree, operand, &scoped, owner.as_deref_mut(), ctx)
            }
            Err(NoMatch::NotMapCall) => {}
            Err(reason) => debug!(reason = reason.reason(), "map operand left untouched"),
        }
    }
}

/// Lower one dynamic leaf into the owner's record, returning its record-relative path.
fn lower_leaf(
    tree: &mut Tree,
    expr: NodeId,
    position: LeafPosition<'_>,
    owner: &mut RecordOwner,
    adapter: &Adapter,
) -> Option<String> {
    if matches!(tree.node(tree.strip_parens(expr)), Node::Function(_)) {
        return None;
    }
    let references = free_references(tree, expr);
    if !owner.depends_on(&references) {
        return None;
    }

    let shape = classify_leaf(tree, expr, position, &owner.scope, adapter);
    let field = match shape {
        LeafShape::Item => {
            owner.record.note_item_reference(expr);
            owner.scope.item.clone()
        }
        LeafShape::Index | LeafShape::Computed => owner.record.push_dynamic(shape.kind(), expr, expr),
        LeafShape::Style => owner.record.push_style(tree, expr, &adapter.create_style),
    };
    trace!(site = owner.site_id, field = %field, kind = ?shape.kind(), "lowered leaf");
    Some(owner.path(&field))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SITES
// ═══════════════════════════════════════════════════════════════════════════════

fn lower_site(
    tree: &mut Tree,
    candidate: LoopCandidate,
    guards: &[Guard],
    mut owner: Option<&mut RecordOwner>,
    ctx: &mut LoweringContext,
) -> NodeId {
    let tokens = ctx.tokens.allocate();
    debug!(
        site = tokens.id,
        parent = ?owner.as_deref().map(|o| o.site_id),
        "matched loop site"
    );

    let item = normalize_callback(tree, &candidate, &tokens);
    let scope = LoopScope {
        item: item.clone(),
        index: tokens.index_name.clone(),
        locals: declared_names(tree, &candidate.leading),
    };

    for root in jsx_roots(tree, &candidate.leading) {
        lower_jsx(tree, root, &[], None, ctx);
    }

    let outer = match owner.as_deref() {
        Some(parent) => {
            let mut outer = parent.outer.clone();
            outer.push(parent.scope.clone());
            outer
        }
        None => Vec::new(),
    };
    let mut site_owner = RecordOwner {
        scope,
        outer,
        record: RecordBuilder::new(&item, &tokens.key_token),
        site_id: tokens.id,
    };
    lower_jsx(tree, candidate.subtree, &[], Some(&mut site_owner), ctx);

    let (record, schema) = site_owner.record.build(tree);
    rewrite_callback(tree, candidate.callback, &candidate.leading, record);
    let wrapper = wrap_subtree(
        tree,
        candidate.subtree,
        candidate.call,
        &item,
        &tokens.index_name,
        ctx.adapter,
    );

    let binding = match owner.as_deref_mut() {
        Some(parent) => attach_nested(tree, parent, &candidate, guards, wrapper),
        None => LoopBinding::Inline,
    };

    ctx.sites.push(LoopSite {
        id: tokens.id,
        parent: owner.as_deref().map(|o| o.site_id),
        item_name: item,
        index_name: tokens.index_name,
        key_token: tokens.key_token,
        source_expr: candidate.receiver,
        mapping_call: candidate.call,
        callback: candidate.callback,
        wrapper,
        owned_subtree_root: candidate.subtree,
        body_statements: candidate.leading,
        schema,
        binding,
    });
    wrapper
}

/// Move a nested site's mapping call into the enclosing record and bind its wrapper to it.
fn attach_nested(
    tree: &mut Tree,
    owner: &mut RecordOwner,
    candidate: &LoopCandidate,
    guards: &[Guard],
    wrapper: NodeId,
) -> LoopBinding {
    let receiver = candidate.receiver;
    let call = guarded_value(tree, guards, candidate.call);
    let item = owner.scope.item.clone();

    match classify_nested_source(tree, receiver, &owner.scope) {
        NestedSource::Item => {
            if owner.record.merge_item(receiver, call) {
                let source = tree.ident(&item);
                bind_wrapper_source(tree, wrapper, source);
                debug!(site = owner.site_id, "nested loop merged into item");
                return LoopBinding::ItemMerge;
            }
        }
        NestedSource::ItemPath(props) => {
            let path = format!("{}.{}", item, props.join("."));
            if owner.record.merge_item_path(receiver, props, call) {
                let source = tree.deep_clone(receiver);
                bind_wrapper_source(tree, wrapper, source);
                debug!(site = owner.site_id, path = %path, "nested loop merged into item path");
                return LoopBinding::ItemPath(path);
            }
        }
        NestedSource::Local(name) => {
            if owner.record.push_named(receiver, &name, call) {
                let source = tree.path(&[item.as_str(), name.as_str()]);
                bind_wrapper_source(tree, wrapper, source);
                debug!(site = owner.site_id, field = %name, "nested loop carried by local");
                return LoopBinding::Local(name);
            }
        }
        NestedSource::Unrelated => {}
    }

    let field = owner.record.push_dynamic(DependencyKind::Generic, receiver, call);
    let source = tree.ident(&field);
    bind_wrapper_source(tree, wrapper, source);
    debug!(site = owner.site_id, field = %field, "nested loop carried by numbered field");
    LoopBinding::Field(field)
}

/// Re-apply the template conditions around a nested site to the value carrying its call.
fn guarded_value(tree: &mut Tree, guards: &[Guard], call: NodeId) -> NodeId {
    let mut value = call;
    for guard in guards.iter().rev() {
        let node = match guard {
            Guard::Operand { op, left } => {
                let left = tree.deep_clone(*left);
                Node::Logical {
                    op: op.clone(),
                    left: parenthesize(tree, left),
                    right: parenthesize(tree, value),
                }
            }
            Guard::When(test) => {
                let test = tree.deep_clone(*test);
                Node::Conditional {
                    test: parenthesize(tree, test),
                    consequent: value,
                    alternate: tree.alloc(Node::Literal("null".to_string())),
                }
            }
            Guard::Unless(test) => {
                let test = tree.deep_clone(*test);
                Node::Conditional {
                    test: parenthesize(tree, test),
                    consequent: tree.alloc(Node::Literal("null".to_string())),
                    alternate: value,
                }
            }
        };
        value = tree.alloc(node);
    }
    value
}

fn parenthesize(tree: &mut Tree, id: NodeId) -> NodeId {
    match tree.node(id) {
        Node::Logical { .. } | Node::Conditional { .. } => tree.alloc(Node::Paren(id)),
        _ => id,
    }
}
