//! Frontend: parse TSX source with oxc and lower it into the render tree arena.
//!
//! Only the shapes the list pass reasons about are modelled structurally. Everything
//! else becomes a `Raw` node that keeps its source text plus the identifier
//! references inside it, so renames still reach those references.

use lazy_static::lazy_static;
use oxc_allocator::Allocator;
use oxc_ast::ast as js;
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::scope::ScopeFlags;
use regex::Regex;

use crate::tree::{
    AttrValue, Attribute, AttributeItem, Declarator, ElementNode, FunctionBody, FunctionKind,
    FunctionNode, Node, NodeId, Pattern, PropertyItem, PropertyKey, RawCode, RawPart, Tree,
};
use crate::validate::{CompilerError, ERR_SYNTAX};

lazy_static! {
    pub static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

fn source_type() -> SourceType {
    SourceType::default()
        .with_module(true)
        .with_typescript(true)
        .with_jsx(true)
}

#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    pub tree: Tree,
    pub root: NodeId,
}

/// Parse a single JSX-bearing expression into a fresh tree.
pub fn parse_template(source: &str, file_path: &str) -> Result<ParsedTemplate, CompilerError> {
    let allocator = Allocator::default();
    let expr = Parser::new(&allocator, source, source_type())
        .parse_expression()
        .map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            CompilerError::new(
                ERR_SYNTAX,
                &format!("Invalid expression syntax: {}", messages.join("; ")),
                file_path,
                1,
                1,
            )
            .with_context(source)
        })?;

    let mut builder = TreeBuilder {
        src: source,
        tree: Tree::new(),
    };
    let root = builder.expr(&expr);
    Ok(ParsedTemplate {
        tree: builder.tree,
        root,
    })
}

/// Locate the JSX a component renders: the shallowest `return <jsx>` or concise arrow body.
///
/// Returns the byte range of that expression within `source`.
pub fn find_render_root(source: &str, file_path: &str) -> Result<Option<(u32, u32)>, CompilerError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type()).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(CompilerError::new(
            ERR_SYNTAX,
            &format!("Invalid module syntax: {}", messages.join("; ")),
            file_path,
            1,
            1,
        ));
    }

    let mut finder = RenderRootFinder {
        depth: 0,
        best: None,
    };
    finder.visit_program(&ret.program);
    Ok(finder.best.map(|(_, span)| (span.start, span.end)))
}

/// 1-based line and column of a byte offset.
pub fn line_column(source: &str, offset: u32) -> (u32, u32) {
    let prefix = &source[..(offset as usize).min(source.len())];
    let line = prefix.matches('\n').count() as u32 + 1;
    let column = prefix.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) as u32 + 1;
    (line, column)
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDER ROOT
// ═══════════════════════════════════════════════════════════════════════════════

struct RenderRootFinder {
    depth: u32,
    best: Option<(u32, Span)>,
}

fn is_jsx_expression(expr: &js::Expression<'_>) -> bool {
    match expr {
        js::Expression::JSXElement(_) | js::Expression::JSXFragment(_) => true,
        js::Expression::ParenthesizedExpression(paren) => is_jsx_expression(&paren.expression),
        _ => false,
    }
}

/// An identifier or `this` reached through non-optional member accesses.
fn plain_receiver(expr: &js::Expression<'_>) -> bool {
    match expr {
        js::Expression::Identifier(_) | js::Expression::ThisExpression(_) => true,
        js::Expression::StaticMemberExpression(mem) => !mem.optional && plain_receiver(&mem.object),
        js::Expression::ComputedMemberExpression(mem) => !mem.optional && plain_receiver(&mem.object),
        _ => false,
    }
}

impl RenderRootFinder {
    fn offer(&mut self, span: Span) {
        if self.best.map_or(true, |(depth, _)| self.depth < depth) {
            self.best = Some((self.depth, span));
        }
    }
}

impl<'a> Visit<'a> for RenderRootFinder {
    fn visit_function(&mut self, func: &js::Function<'a>, flags: ScopeFlags) {
        self.depth += 1;
        walk::walk_function(self, func, flags);
        self.depth -= 1;
    }

    fn visit_arrow_function_expression(&mut self, func: &js::ArrowFunctionExpression<'a>) {
        self.depth += 1;
        if func.expression {
            if let Some(js::Statement::ExpressionStatement(stmt)) = func.body.statements.first() {
                if is_jsx_expression(&stmt.expression) {
                    self.offer(stmt.expression.span());
                }
            }
        }
        walk::walk_arrow_function_expression(self, func);
        self.depth -= 1;
    }

    fn visit_return_statement(&mut self, stmt: &js::ReturnStatement<'a>) {
        if let Some(argument) = &stmt.argument {
            if is_jsx_expression(argument) {
                self.offer(argument.span());
            }
        }
        walk::walk_return_statement(self, stmt);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct RawCollector {
    references: Vec<(Span, String)>,
    bindings: Vec<(Span, String)>,
    has_jsx: bool,
    has_return: bool,
    function_depth: u32,
}

impl<'a> Visit<'a> for RawCollector {
    fn visit_identifier_reference(&mut self, ident: &js::IdentifierReference<'a>) {
        self.references.push((ident.span, ident.name.to_string()));
    }

    fn visit_binding_identifier(&mut self, ident: &js::BindingIdentifier<'a>) {
        self.bindings.push((ident.span, ident.name.to_string()));
    }

    fn visit_function(&mut self, func: &js::Function<'a>, flags: ScopeFlags) {
        self.function_depth += 1;
        walk::walk_function(self, func, flags);
        self.function_depth -= 1;
    }

    fn visit_arrow_function_expression(&mut self, func: &js::ArrowFunctionExpression<'a>) {
        self.function_depth += 1;
        walk::walk_arrow_function_expression(self, func);
        self.function_depth -= 1;
    }

    fn visit_return_statement(&mut self, stmt: &js::ReturnStatement<'a>) {
        if self.function_depth == 0 {
            self.has_return = true;
        }
        walk::walk_return_statement(self, stmt);
    }

    fn visit_jsx_element(&mut self, el: &js::JSXElement<'a>) {
        self.has_jsx = true;
        walk::walk_jsx_element(self, el);
    }

    fn visit_jsx_fragment(&mut self, frag: &js::JSXFragment<'a>) {
        self.has_jsx = true;
        walk::walk_jsx_fragment(self, frag);
    }
}

fn contains(outer: Span, inner: Span) -> bool {
    inner.start >= outer.start && inner.end <= outer.end
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

struct TreeBuilder<'s> {
    src: &'s str,
    tree: Tree,
}

impl<'s> TreeBuilder<'s> {
    fn slice(&self, span: Span) -> &'s str {
        &self.src[span.start as usize..span.end as usize]
    }

    fn slice_between(&self, start: u32, end: u32) -> &'s str {
        if start >= end {
            return "";
        }
        &self.src[start as usize..end as usize]
    }

    fn raw_code(&self, span: Span, collector: &RawCollector) -> RawCode {
        let mut references: Vec<&(Span, String)> = collector
            .references
            .iter()
            .filter(|(s, _)| contains(span, *s))
            .collect();
        references.sort_by_key(|(s, _)| s.start);

        let mut parts = Vec::new();
        let mut cursor = span.start;
        for (s, name) in references {
            if s.start < cursor || self.slice(*s) != name.as_str() {
                continue;
            }
            if s.start > cursor {
                parts.push(RawPart::Text(self.slice_between(cursor, s.start).to_string()));
            }
            parts.push(RawPart::Ref(name.clone()));
            cursor = s.end;
        }
        if cursor < span.end {
            parts.push(RawPart::Text(self.slice_between(cursor, span.end).to_string()));
        }

        let mut bindings: Vec<String> = Vec::new();
        for (s, name) in &collector.bindings {
            if contains(span, *s) && !bindings.contains(name) {
                bindings.push(name.clone());
            }
        }

        RawCode {
            parts,
            bindings,
            has_jsx: collector.has_jsx,
            has_return: collector.has_return,
        }
    }

    fn raw_expr(&mut self, expr: &js::Expression<'_>) -> NodeId {
        let mut collector = RawCollector::default();
        collector.visit_expression(expr);
        let raw = self.raw_code(expr.span(), &collector);
        self.tree.alloc(Node::Raw(raw))
    }

    fn raw_stmt(&mut self, stmt: &js::Statement<'_>) -> NodeId {
        let mut collector = RawCollector::default();
        collector.visit_statement(stmt);
        let raw = self.raw_code(stmt.span(), &collector);
        self.tree.alloc(Node::Raw(raw))
    }

    // ─── Expressions ─────────────────────────────────────────────────────────────

    fn expr(&mut self, expr: &js::Expression<'_>) -> NodeId {
        match expr {
            js::Expression::Identifier(ident) => self.tree.ident(&ident.name),
            js::Expression::BooleanLiteral(_)
            | js::Expression::NullLiteral(_)
            | js::Expression::NumericLiteral(_)
            | js::Expression::BigIntLiteral(_)
            | js::Expression::StringLiteral(_)
            | js::Expression::RegExpLiteral(_) => {
                let text = self.slice(expr.span()).to_string();
                self.tree.alloc(Node::Literal(text))
            }
            js::Expression::StaticMemberExpression(mem) if !mem.optional => {
                let object = self.expr(&mem.object);
                self.tree.alloc(Node::Member {
                    object,
                    property: mem.property.name.to_string(),
                    optional: false,
                })
            }
            js::Expression::ComputedMemberExpression(mem) if !mem.optional => {
                let object = self.expr(&mem.object);
                let index = self.expr(&mem.expression);
                self.tree.alloc(Node::Index { object, index })
            }
            js::Expression::CallExpression(call) if !call.optional => {
                // Type arguments sit between the callee and `(`
                let between = self.slice_between(call.callee.span().end, call.span.end);
                if !between.trim_start().starts_with('(') {
                    return self.raw_expr(expr);
                }
                let callee = self.expr(&call.callee);
                let args = self.arguments(&call.arguments);
                self.tree.alloc(Node::Call { callee, args })
            }
            js::Expression::ChainExpression(chain) => match &chain.expression {
                js::ChainElement::CallExpression(call) => self
                    .optional_method_call(call)
                    .unwrap_or_else(|| self.raw_expr(expr)),
                _ => self.raw_expr(expr),
            },
            js::Expression::ArrayExpression(arr) => {
                if arr
                    .elements
                    .iter()
                    .any(|e| matches!(e, js::ArrayExpressionElement::Elision(_)))
                {
                    return self.raw_expr(expr);
                }
                let mut items = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    let id = match element {
                        js::ArrayExpressionElement::SpreadElement(spread) => {
                            let inner = self.expr(&spread.argument);
                            self.tree.alloc(Node::Spread(inner))
                        }
                        _ => self.expr(element.to_expression()),
                    };
                    items.push(id);
                }
                self.tree.alloc(Node::Array(items))
            }
            js::Expression::ObjectExpression(obj) => self.object(obj).unwrap_or_else(|| self.raw_expr(expr)),
            js::Expression::UnaryExpression(unary) => {
                let argument = self.expr(&unary.argument);
                self.tree.alloc(Node::Unary {
                    op: unary.operator.as_str().to_string(),
                    argument,
                })
            }
            js::Expression::BinaryExpression(bin) => {
                let left = self.expr(&bin.left);
                let right = self.expr(&bin.right);
                self.tree.alloc(Node::Binary {
                    op: bin.operator.as_str().to_string(),
                    left,
                    right,
                })
            }
            js::Expression::LogicalExpression(logical) => {
                let left = self.expr(&logical.left);
                let right = self.expr(&logical.right);
                self.tree.alloc(Node::Logical {
                    op: logical.operator.as_str().to_string(),
                    left,
                    right,
                })
            }
            js::Expression::ConditionalExpression(cond) => {
                let test = self.expr(&cond.test);
                let consequent = self.expr(&cond.consequent);
                let alternate = self.expr(&cond.alternate);
                self.tree.alloc(Node::Conditional {
                    test,
                    consequent,
                    alternate,
                })
            }
            js::Expression::ParenthesizedExpression(paren) => {
                let inner = self.expr(&paren.expression);
                self.tree.alloc(Node::Paren(inner))
            }
            js::Expression::ArrowFunctionExpression(arrow) => {
                self.arrow(arrow).unwrap_or_else(|| self.raw_expr(expr))
            }
            js::Expression::FunctionExpression(func) => {
                self.function(func).unwrap_or_else(|| self.raw_expr(expr))
            }
            js::Expression::JSXElement(el) => self.element(el),
            js::Expression::JSXFragment(frag) => self.fragment(frag),
            _ => self.raw_expr(expr),
        }
    }

    fn object(&mut self, obj: &js::ObjectExpression<'_>) -> Option<NodeId> {
        let mut props = Vec::with_capacity(obj.properties.len());
        for prop in &obj.properties {
            match prop {
                js::ObjectPropertyKind::ObjectProperty(p) => {
                    if !matches!(p.kind, js::PropertyKind::Init) || p.method {
                        return None;
                    }
                    let key = if p.computed {
                        PropertyKey::Computed(self.expr(p.key.as_expression()?))
                    } else {
                        match &p.key {
                            js::PropertyKey::StaticIdentifier(id) => PropertyKey::Ident(id.name.to_string()),
                            js::PropertyKey::StringLiteral(_) | js::PropertyKey::NumericLiteral(_) => {
                                PropertyKey::Literal(self.slice(p.key.span()).to_string())
                            }
                            _ => return None,
                        }
                    };
                    let value = self.expr(&p.value);
                    props.push(PropertyItem::Property {
                        key,
                        value,
                        shorthand: p.shorthand,
                    });
                }
                js::ObjectPropertyKind::SpreadProperty(spread) => {
                    let inner = self.expr(&spread.argument);
                    props.push(PropertyItem::Spread(inner));
                }
            }
        }
        Some(self.tree.alloc(Node::Object(props)))
    }

    fn arguments(&mut self, arguments: &[js::Argument<'_>]) -> Vec<NodeId> {
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            let id = match arg {
                js::Argument::SpreadElement(spread) => {
                    let inner = self.expr(&spread.argument);
                    self.tree.alloc(Node::Spread(inner))
                }
                _ => self.expr(arg.to_expression()),
            };
            args.push(id);
        }
        args
    }

    /// `receiver?.method(args)` where the receiver itself has no optional links.
    fn optional_method_call(&mut self, call: &js::CallExpression<'_>) -> Option<NodeId> {
        if call.optional {
            return None;
        }
        let js::Expression::StaticMemberExpression(mem) = &call.callee else {
            return None;
        };
        if !mem.optional || !plain_receiver(&mem.object) {
            return None;
        }
        let between = self.slice_between(call.callee.span().end, call.span.end);
        if !between.trim_start().starts_with('(') {
            return None;
        }
        let object = self.expr(&mem.object);
        let callee = self.tree.alloc(Node::Member {
            object,
            property: mem.property.name.to_string(),
            optional: true,
        });
        let args = self.arguments(&call.arguments);
        Some(self.tree.alloc(Node::Call { callee, args }))
    }

    // ─── Functions ───────────────────────────────────────────────────────────────

    fn params(&mut self, params: &js::FormalParameters<'_>) -> Vec<Pattern> {
        let mut collector = RawCollector::default();
        collector.visit_formal_parameters(params);

        let mut patterns: Vec<Pattern> = params
            .items
            .iter()
            .map(|param| match &param.pattern {
                js::BindingPattern::BindingIdentifier(ident) => self
                    .plain_param(ident.name.as_str(), param.span)
                    .unwrap_or_else(|| Pattern::Raw(self.raw_code(param.span, &collector))),
                _ => Pattern::Raw(self.raw_code(param.span, &collector)),
            })
            .collect();
        if let Some(rest) = &params.rest {
            patterns.push(Pattern::Raw(self.raw_code(rest.span, &collector)));
        }
        patterns
    }

    /// An identifier parameter, optionally annotated. Defaults and `?` markers are not modelled.
    fn plain_param(&self, name: &str, span: Span) -> Option<Pattern> {
        let text = self.slice(span);
        let rest = text.strip_prefix(name)?.trim();
        if rest.is_empty() {
            return Some(Pattern::Ident(name.to_string()));
        }
        let annotation = rest.strip_prefix(':')?.trim();
        if annotation.is_empty() || annotation.replace("=>", "").contains('=') {
            return None;
        }
        Some(Pattern::Typed {
            name: name.to_string(),
            annotation: annotation.to_string(),
        })
    }

    fn arrow(&mut self, arrow: &js::ArrowFunctionExpression<'_>) -> Option<NodeId> {
        if !arrow.body.directives.is_empty() {
            return None;
        }
        // Type parameters and return annotations are not modelled
        let prefix = self.slice_between(arrow.span.start, arrow.params.span.start);
        let infix = self.slice_between(arrow.params.span.end, arrow.body.span.start);
        if prefix.contains('<') || infix.contains(':') {
            return None;
        }

        let params = self.params(&arrow.params);
        let body = if arrow.expression {
            match arrow.body.statements.first() {
                Some(js::Statement::ExpressionStatement(stmt)) => {
                    FunctionBody::Expr(self.expr(&stmt.expression))
                }
                _ => return None,
            }
        } else {
            FunctionBody::Block(self.statements(&arrow.body.statements))
        };
        Some(self.tree.alloc(Node::Function(FunctionNode {
            kind: FunctionKind::Arrow,
            is_async: arrow.r#async,
            is_generator: false,
            params,
            body,
        })))
    }

    fn function(&mut self, func: &js::Function<'_>) -> Option<NodeId> {
        let body = func.body.as_ref()?;
        if !body.directives.is_empty() {
            return None;
        }
        let prefix = self.slice_between(func.span.start, func.params.span.start);
        let infix = self.slice_between(func.params.span.end, body.span.start);
        if prefix.contains('<') || infix.contains(':') {
            return None;
        }

        let params = self.params(&func.params);
        let stmts = self.statements(&body.statements);
        Some(self.tree.alloc(Node::Function(FunctionNode {
            kind: FunctionKind::Expression {
                name: func.id.as_ref().map(|id| id.name.to_string()),
            },
            is_async: func.r#async,
            is_generator: func.generator,
            params,
            body: FunctionBody::Block(stmts),
        })))
    }

    // ─── Statements ──────────────────────────────────────────────────────────────

    fn statements(&mut self, stmts: &[js::Statement<'_>]) -> Vec<NodeId> {
        stmts.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    fn stmt(&mut self, stmt: &js::Statement<'_>) -> NodeId {
        match stmt {
            js::Statement::ReturnStatement(ret) => {
                let value = ret.argument.as_ref().map(|arg| self.expr(arg));
                self.tree.alloc(Node::Return(value))
            }
            js::Statement::ExpressionStatement(es) => {
                let inner = self.expr(&es.expression);
                self.tree.alloc(Node::ExprStmt(inner))
            }
            js::Statement::VariableDeclaration(decl) => {
                self.var_decl(decl).unwrap_or_else(|| self.raw_stmt(stmt))
            }
            js::Statement::IfStatement(s) => {
                let test = self.expr(&s.test);
                let consequent = self.stmt(&s.consequent);
                let alternate = s.alternate.as_ref().map(|alt| self.stmt(alt));
                self.tree.alloc(Node::If {
                    test,
                    consequent,
                    alternate,
                })
            }
            js::Statement::BlockStatement(block) => {
                let body = self.statements(&block.body);
                self.tree.alloc(Node::Block(body))
            }
            _ => self.raw_stmt(stmt),
        }
    }

    fn var_decl(&mut self, decl: &js::VariableDeclaration<'_>) -> Option<NodeId> {
        let kind = match decl.kind {
            js::VariableDeclarationKind::Var => "var",
            js::VariableDeclarationKind::Let => "let",
            js::VariableDeclarationKind::Const => "const",
            _ => return None,
        };

        let mut declarators = Vec::with_capacity(decl.declarations.len());
        for d in &decl.declarations {
            let head_end = d.init.as_ref().map(|init| init.span().start).unwrap_or(d.span.end);
            let head = self.slice_between(d.span.start, head_end);
            let head = head.trim_end().trim_end_matches('=').trim_end();
            let head_span = Span::new(d.span.start, d.span.start + head.len() as u32);

            let id = if IDENT_RE.is_match(head) {
                Pattern::Ident(head.to_string())
            } else {
                let mut collector = RawCollector::default();
                collector.visit_binding_pattern(&d.id);
                Pattern::Raw(self.raw_code(head_span, &collector))
            };
            let init = d.init.as_ref().map(|init| self.expr(init));
            declarators.push(Declarator { id, init });
        }

        Some(self.tree.alloc(Node::VarDecl {
            kind: kind.to_string(),
            declarators,
        }))
    }

    // ─── JSX ─────────────────────────────────────────────────────────────────────

    fn element(&mut self, el: &js::JSXElement<'_>) -> NodeId {
        let tag = self.slice(el.opening_element.name.span()).to_string();
        let attributes = el
            .opening_element
            .attributes
            .iter()
            .map(|item| self.attribute(item))
            .collect();
        let children = self.children(&el.children);
        self.tree.alloc(Node::Element(ElementNode {
            tag,
            attributes,
            children,
            self_closing: el.closing_element.is_none(),
        }))
    }

    fn fragment(&mut self, frag: &js::JSXFragment<'_>) -> NodeId {
        let children = self.children(&frag.children);
        self.tree.alloc(Node::Fragment(children))
    }

    fn attribute(&mut self, item: &js::JSXAttributeItem<'_>) -> AttributeItem {
        match item {
            js::JSXAttributeItem::Attribute(attr) => {
                let name = self.slice(attr.name.span()).to_string();
                let value = match &attr.value {
                    None => AttrValue::Empty,
                    Some(js::JSXAttributeValue::StringLiteral(s)) => {
                        AttrValue::Literal(self.slice(s.span).to_string())
                    }
                    Some(js::JSXAttributeValue::ExpressionContainer(container)) => {
                        match container.expression.as_expression() {
                            Some(expr) => AttrValue::Expr(self.expr(expr)),
                            None => AttrValue::Literal(self.slice(container.span).to_string()),
                        }
                    }
                    Some(js::JSXAttributeValue::Element(el)) => AttrValue::Expr(self.element(el)),
                    Some(js::JSXAttributeValue::Fragment(frag)) => AttrValue::Expr(self.fragment(frag)),
                };
                AttributeItem::Attribute(Attribute { name, value })
            }
            js::JSXAttributeItem::SpreadAttribute(spread) => AttributeItem::Spread(self.expr(&spread.argument)),
        }
    }

    fn children(&mut self, children: &[js::JSXChild<'_>]) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            let id = match child {
                js::JSXChild::Text(text) => {
                    let raw = self.slice(text.span).to_string();
                    self.tree.alloc(Node::Text(raw))
                }
                js::JSXChild::Element(el) => self.element(el),
                js::JSXChild::Fragment(frag) => self.fragment(frag),
                js::JSXChild::ExpressionContainer(container) => match container.expression.as_expression() {
                    Some(expr) => {
                        let inner = self.expr(expr);
                        self.tree.alloc(Node::Container(inner))
                    }
                    // `{/* comment */}`
                    None => {
                        let raw = self.slice(container.span).to_string();
                        self.tree.alloc(Node::Text(raw))
                    }
                },
                js::JSXChild::Spread(spread) => {
                    let mut collector = RawCollector::default();
                    collector.visit_expression(&spread.expression);
                    let raw = self.raw_code(spread.span, &collector);
                    self.tree.alloc(Node::Raw(raw))
                }
            };
            out.push(id);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("a\nbc", 0), (1, 1));
        assert_eq!(line_column("a\nbc", 3), (2, 2));
    }

    #[test]
    fn test_render_root_prefers_outermost_return() {
        let source = "export default function List({ rows }) {\n  const cell = (r) => <Cell value={r} />;\n  return (<View>{rows.map(r => <Row />)}</View>);\n}\n";
        let (start, end) = find_render_root(source, "List.tsx").unwrap().unwrap();
        assert_eq!(
            &source[start as usize..end as usize],
            "(<View>{rows.map(r => <Row />)}</View>)"
        );
    }

    #[test]
    fn test_render_root_absent() {
        assert_eq!(find_render_root("const a = 1;", "a.ts").unwrap(), None);
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_template("<View>{</View>", "broken.tsx").unwrap_err();
        assert_eq!(err.code, ERR_SYNTAX);
        assert_eq!(err.file, "broken.tsx");
    }
}
