use crate::record::RecordSchema;
use crate::renamer::rename_identifier;
use crate::scope::contains_return;
use crate::tokens::SiteTokens;
use crate::tree::{FunctionBody, Node, NodeId, Pattern, Tree};
use serde::Serialize;

pub const MAP_METHOD: &str = "map";
pub const DEFAULT_ITEM_NAME: &str = "item";

// ═══════════════════════════════════════════════════════════════════════════════
// MATCHING
// ═══════════════════════════════════════════════════════════════════════════════

/// A `receiver.map(callback)` call whose callback returns a single JSX subtree.
#[derive(Debug, Clone)]
pub struct LoopCandidate {
    pub call: NodeId,
    pub receiver: NodeId,
    pub callback: NodeId,
    pub item_param: Option<String>,
    pub index_param: Option<String>,
    /// Statements before the trailing `return`.
    pub leading: Vec<NodeId>,
    /// Returned JSX with parens removed.
    pub subtree: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
    NotMapCall,
    ArgumentShape,
    NotFunction,
    AsyncOrGenerator,
    ParameterShape,
    BodyShape,
    NotJsx,
}

impl NoMatch {
    pub fn reason(self) -> &'static str {
        match self {
            NoMatch::NotMapCall => "not a map call",
            NoMatch::ArgumentShape => "map takes exactly one plain argument",
            NoMatch::NotFunction => "callback is not a function literal",
            NoMatch::AsyncOrGenerator => "callback is async or a generator",
            NoMatch::ParameterShape => "callback needs at most two identifier parameters",
            NoMatch::BodyShape => "callback body is not statements followed by one return",
            NoMatch::NotJsx => "callback does not return JSX",
        }
    }
}

pub fn match_loop_site(tree: &Tree, expr: NodeId) -> Result<LoopCandidate, NoMatch> {
    let call = tree.strip_parens(expr);
    let Node::Call { callee, args } = tree.node(call) else {
        return Err(NoMatch::NotMapCall);
    };
    let Node::Member { object, property, .. } = tree.node(tree.strip_parens(*callee)) else {
        return Err(NoMatch::NotMapCall);
    };
    if property != MAP_METHOD {
        return Err(NoMatch::NotMapCall);
    }
    let [argument] = args.as_slice() else {
        return Err(NoMatch::ArgumentShape);
    };
    if matches!(tree.node(*argument), Node::Spread(_)) {
        return Err(NoMatch::ArgumentShape);
    }

    let callback = tree.strip_parens(*argument);
    let Node::Function(func) = tree.node(callback) else {
        return Err(NoMatch::NotFunction);
    };
    if func.is_async || func.is_generator {
        return Err(NoMatch::AsyncOrGenerator);
    }
    if func.params.len() > 2 {
        return Err(NoMatch::ParameterShape);
    }
    let mut names = Vec::with_capacity(2);
    for param in &func.params {
        match param.as_ident() {
            Some(name) => names.push(name.to_string()),
            None => return Err(NoMatch::ParameterShape),
        }
    }

    let (leading, result) = match &func.body {
        FunctionBody::Expr(body) => (Vec::new(), *body),
        FunctionBody::Block(stmts) => {
            let Some((last, leading)) = stmts.split_last() else {
                return Err(NoMatch::BodyShape);
            };
            let Node::Return(Some(value)) = tree.node(*last) else {
                return Err(NoMatch::BodyShape);
            };
            if contains_return(tree, leading) {
                return Err(NoMatch::BodyShape);
            }
            (leading.to_vec(), *value)
        }
    };

    let subtree = tree.strip_parens(result);
    if !tree.node(subtree).is_jsx() {
        return Err(NoMatch::NotJsx);
    }

    let mut names = names.into_iter();
    Ok(LoopCandidate {
        call,
        receiver: *object,
        callback,
        item_param: names.next(),
        index_param: names.next(),
        leading,
        subtree,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Fix the callback signature to `(item, indexN)` and rename the old index parameter.
///
/// Returns the item name.
pub fn normalize_callback(tree: &mut Tree, candidate: &LoopCandidate, tokens: &SiteTokens) -> String {
    let item = candidate
        .item_param
        .clone()
        .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());

    if let Some(index) = &candidate.index_param {
        let roots = match tree.node(candidate.callback) {
            Node::Function(func) => match &func.body {
                FunctionBody::Expr(body) => vec![*body],
                FunctionBody::Block(stmts) => stmts.clone(),
            },
            _ => Vec::new(),
        };
        rename_identifier(tree, &roots, index, &tokens.index_name);
    }

    if let Node::Function(func) = tree.node_mut(candidate.callback) {
        func.params = vec![
            Pattern::Ident(item.clone()),
            Pattern::Ident(tokens.index_name.clone()),
        ];
    }
    item
}

// ═══════════════════════════════════════════════════════════════════════════════
// SITES
// ═══════════════════════════════════════════════════════════════════════════════

/// Names visible to the subtree of one loop site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopScope {
    pub item: String,
    pub index: String,
    pub locals: Vec<String>,
}

impl LoopScope {
    pub fn binds(&self, name: &str) -> bool {
        self.item == name || self.index == name || self.locals.iter().any(|l| l == name)
    }
}

/// How a wrapper's loop attribute reaches its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "kebab-case")]
pub enum LoopBinding {
    /// The loop attribute holds the mapping call itself.
    Inline,
    ItemMerge,
    ItemPath(String),
    Local(String),
    Field(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopSite {
    pub id: u32,
    pub parent: Option<u32>,
    pub item_name: String,
    pub index_name: String,
    pub key_token: String,
    pub source_expr: NodeId,
    pub mapping_call: NodeId,
    pub callback: NodeId,
    pub wrapper: NodeId,
    pub owned_subtree_root: NodeId,
    pub body_statements: Vec<NodeId>,
    pub schema: RecordSchema,
    pub binding: LoopBinding,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_template;

    fn check(source: &str) -> Result<LoopCandidate, NoMatch> {
        let parsed = parse_template(source, "test.tsx").unwrap();
        match_loop_site(&parsed.tree, parsed.root)
    }

    #[test]
    fn test_matches_concise_arrow() {
        let candidate = check("arr.map((val, idx) => <item data-value={val} />)").unwrap();
        assert_eq!(candidate.item_param.as_deref(), Some("val"));
        assert_eq!(candidate.index_param.as_deref(), Some("idx"));
        assert!(candidate.leading.is_empty());
    }

    #[test]
    fn test_matches_block_with_leading_statements() {
        let candidate =
            check("list.map(function (row) { const label = row.name; return (<Text>{label}</Text>); })")
                .unwrap();
        assert_eq!(candidate.leading.len(), 1);
        assert_eq!(candidate.index_param, None);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(check("arr.filter(x => <View />)").unwrap_err(), NoMatch::NotMapCall);
        assert_eq!(check("arr.map(render)").unwrap_err(), NoMatch::NotFunction);
        assert_eq!(check("arr.map(fn, ctx)").unwrap_err(), NoMatch::ArgumentShape);
        assert_eq!(check("arr.map((a, b, c) => <View />)").unwrap_err(), NoMatch::ParameterShape);
        assert_eq!(check("arr.map(({ id }) => <View />)").unwrap_err(), NoMatch::ParameterShape);
        assert_eq!(check("arr.map((...rest) => <View />)").unwrap_err(), NoMatch::ParameterShape);
        assert_eq!(check("arr.map(async x => <View />)").unwrap_err(), NoMatch::AsyncOrGenerator);
        assert_eq!(check("arr.map(x => x.name)").unwrap_err(), NoMatch::NotJsx);
        assert_eq!(
            check("arr.map(x => { if (x) { return <A />; } return <B />; })").unwrap_err(),
            NoMatch::BodyShape
        );
        assert_eq!(check("arr.map(x => { <A />; })").unwrap_err(), NoMatch::BodyShape);
    }
}
