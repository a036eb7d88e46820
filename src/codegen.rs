//! Printer for the render tree.
//!
//! Renders the arena back to TSX source after lowering. Structure the frontend
//! kept as `Raw` is printed verbatim.

use crate::tree::{
    AttrValue, AttributeItem, Declarator, ElementNode, FunctionBody, FunctionKind, FunctionNode,
    Node, NodeId, Pattern, PropertyItem, PropertyKey, Tree,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintStyle {
    /// Two-space indented objects and blocks.
    #[default]
    Pretty,
    /// Everything on one line.
    Concise,
}

pub fn print_node(tree: &Tree, id: NodeId, style: PrintStyle) -> String {
    let mut printer = Printer {
        tree,
        style,
        indent: 0,
        out: String::new(),
    };
    printer.node(id);
    printer.out
}

struct Printer<'t> {
    tree: &'t Tree,
    style: PrintStyle,
    indent: usize,
    out: String,
}

impl<'t> Printer<'t> {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn list(&mut self, items: &[NodeId]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.node(*item);
        }
    }

    fn pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Ident(name) => self.push(name),
            Pattern::Typed { name, annotation } => {
                self.push(name);
                self.push(": ");
                self.push(annotation);
            }
            Pattern::Raw(raw) => self.push(&raw.text()),
        }
    }

    fn node(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.node(id) {
            Node::Ident(name) => self.push(name),
            Node::Literal(text) | Node::Text(text) => self.push(text),
            Node::Raw(raw) => self.push(&raw.text()),
            Node::Member {
                object,
                property,
                optional,
            } => {
                self.node(*object);
                self.push(if *optional { "?." } else { "." });
                self.push(property);
            }
            Node::Index { object, index } => {
                self.node(*object);
                self.push("[");
                self.node(*index);
                self.push("]");
            }
            Node::Call { callee, args } => {
                self.node(*callee);
                self.push("(");
                self.list(args);
                self.push(")");
            }
            Node::Function(func) => self.function(func),
            Node::Object(props) => self.object(props),
            Node::Array(items) => {
                self.push("[");
                self.list(items);
                self.push("]");
            }
            Node::Spread(inner) => {
                self.push("...");
                self.node(*inner);
            }
            Node::Binary { op, left, right } | Node::Logical { op, left, right } => {
                self.node(*left);
                self.push(&format!(" {} ", op));
                self.node(*right);
            }
            Node::Unary { op, argument } => {
                self.push(op);
                if op.chars().all(|c| c.is_ascii_alphabetic()) {
                    self.push(" ");
                }
                self.node(*argument);
            }
            Node::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.node(*test);
                self.push(" ? ");
                self.node(*consequent);
                self.push(" : ");
                self.node(*alternate);
            }
            Node::Paren(inner) => {
                self.push("(");
                self.node(*inner);
                self.push(")");
            }
            Node::Element(el) => self.element(el),
            Node::Fragment(children) => {
                self.push("<>");
                for child in children {
                    self.node(*child);
                }
                self.push("</>");
            }
            Node::Container(inner) => {
                self.push("{");
                self.node(*inner);
                self.push("}");
            }
            Node::Mustache(path) => self.push(&format!("{{{{ {} }}}}", path)),
            Node::Return(value) => match value {
                Some(value) => {
                    self.push("return ");
                    self.node(*value);
                    self.push(";");
                }
                None => self.push("return;"),
            },
            Node::ExprStmt(inner) => {
                self.node(*inner);
                self.push(";");
            }
            Node::VarDecl { kind, declarators } => self.var_decl(kind, declarators),
            Node::If {
                test,
                consequent,
                alternate,
            } => {
                self.push("if (");
                self.node(*test);
                self.push(") ");
                self.node(*consequent);
                if let Some(alternate) = alternate {
                    self.push(" else ");
                    self.node(*alternate);
                }
            }
            Node::Block(stmts) => self.block(stmts),
        }
    }

    fn function(&mut self, func: &FunctionNode) {
        if func.is_async {
            self.push("async ");
        }
        match &func.kind {
            FunctionKind::Arrow => {
                self.params(&func.params);
                self.push(" => ");
                match &func.body {
                    FunctionBody::Expr(body) => {
                        let wrap = matches!(self.tree.node(*body), Node::Object(_));
                        if wrap {
                            self.push("(");
                        }
                        self.node(*body);
                        if wrap {
                            self.push(")");
                        }
                    }
                    FunctionBody::Block(stmts) => self.block(stmts),
                }
            }
            FunctionKind::Expression { name } => {
                self.push("function");
                if func.is_generator {
                    self.push("*");
                }
                if let Some(name) = name {
                    self.push(" ");
                    self.push(name);
                }
                self.params(&func.params);
                self.push(" ");
                match &func.body {
                    FunctionBody::Block(stmts) => self.block(stmts),
                    FunctionBody::Expr(body) => {
                        self.push("{ return ");
                        self.node(*body);
                        self.push("; }");
                    }
                }
            }
        }
    }

    fn params(&mut self, params: &[Pattern]) {
        self.push("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.pattern(param);
        }
        self.push(")");
    }

    fn block(&mut self, stmts: &[NodeId]) {
        if stmts.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        match self.style {
            PrintStyle::Concise => {
                for stmt in stmts {
                    self.push(" ");
                    self.node(*stmt);
                }
                self.push(" }");
            }
            PrintStyle::Pretty => {
                self.indent += 1;
                for stmt in stmts {
                    self.newline();
                    self.node(*stmt);
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
        }
    }

    fn object(&mut self, props: &[PropertyItem]) {
        if props.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for (i, prop) in props.iter().enumerate() {
            match self.style {
                PrintStyle::Concise => self.push(if i == 0 { " " } else { ", " }),
                PrintStyle::Pretty => {
                    if i > 0 {
                        self.push(",");
                    }
                    self.newline();
                }
            }
            self.property(prop);
        }
        self.indent -= 1;
        match self.style {
            PrintStyle::Concise => self.push(" }"),
            PrintStyle::Pretty => {
                self.newline();
                self.push("}");
            }
        }
    }

    fn property(&mut self, prop: &PropertyItem) {
        match prop {
            PropertyItem::Property {
                key,
                value,
                shorthand,
            } => {
                if let (true, PropertyKey::Ident(name)) = (*shorthand, key) {
                    if matches!(self.tree.node(*value), Node::Ident(v) if v == name) {
                        self.push(name);
                        return;
                    }
                }
                match key {
                    PropertyKey::Ident(name) | PropertyKey::Literal(name) => self.push(name),
                    PropertyKey::Computed(key) => {
                        self.push("[");
                        self.node(*key);
                        self.push("]");
                    }
                }
                self.push(": ");
                self.node(*value);
            }
            PropertyItem::Spread(value) => {
                self.push("...");
                self.node(*value);
            }
        }
    }

    fn var_decl(&mut self, kind: &str, declarators: &[Declarator]) {
        self.push(kind);
        self.push(" ");
        for (i, declarator) in declarators.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.pattern(&declarator.id);
            if let Some(init) = declarator.init {
                self.push(" = ");
                self.node(init);
            }
        }
        self.push(";");
    }

    fn element(&mut self, el: &ElementNode) {
        self.push("<");
        self.push(&el.tag);
        for item in &el.attributes {
            self.push(" ");
            match item {
                AttributeItem::Attribute(attr) => {
                    self.push(&attr.name);
                    match &attr.value {
                        AttrValue::Empty => {}
                        AttrValue::Literal(text) => {
                            self.push("=");
                            self.push(text);
                        }
                        AttrValue::Expr(value) => {
                            self.push("={");
                            self.node(*value);
                            self.push("}");
                        }
                        AttrValue::Mustache(path) => self.push(&format!("=\"{{{{{}}}}}\"", path)),
                    }
                }
                AttributeItem::Spread(value) => {
                    self.push("{...");
                    self.node(*value);
                    self.push("}");
                }
            }
        }
        if el.self_closing && el.children.is_empty() {
            self.push(" />");
            return;
        }
        self.push(">");
        for child in &el.children {
            self.node(*child);
        }
        self.push("</");
        self.push(&el.tag);
        self.push(">");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_template;
    use pretty_assertions::assert_eq;

    fn roundtrip(source: &str, style: PrintStyle) -> String {
        let parsed = parse_template(source, "test.tsx").unwrap();
        print_node(&parsed.tree, parsed.root, style)
    }

    #[test]
    fn test_concise_jsx() {
        let source = r#"<View className="row" hidden {...rest}>{label}<Text>hi</Text><Image src={url} /></View>"#;
        assert_eq!(roundtrip(source, PrintStyle::Concise), source);
    }

    #[test]
    fn test_concise_expressions() {
        assert_eq!(
            roundtrip("cond ? !flag : typeof x === 'string' && [a, ...b]", PrintStyle::Concise),
            "cond ? !flag : typeof x === 'string' && [a, ...b]"
        );
        assert_eq!(
            roundtrip("list.map(x => ({ x, y: x.y, [k]: 1 }))", PrintStyle::Concise),
            "list.map((x) => ({ x, y: x.y, [k]: 1 }))"
        );
    }

    #[test]
    fn test_pretty_blocks() {
        let printed = roundtrip("function (a) { const b = { c: a }; return b; }", PrintStyle::Pretty);
        assert_eq!(
            printed,
            "function(a) {\n  const b = {\n    c: a\n  };\n  return b;\n}"
        );
    }

    #[test]
    fn test_optional_method_calls() {
        assert_eq!(
            roundtrip("rows?.map(r => r.id)", PrintStyle::Concise),
            "rows?.map((r) => r.id)"
        );
        assert_eq!(roundtrip("page.data?.rows(2)", PrintStyle::Concise), "page.data?.rows(2)");
        assert_eq!(roundtrip("a?.b.c(d)", PrintStyle::Concise), "a?.b.c(d)");
    }

    #[test]
    fn test_raw_is_verbatim() {
        assert_eq!(
            roundtrip("`${a}-${b}` + x?.y", PrintStyle::Concise),
            "`${a}-${b}` + x?.y"
        );
    }
}
