#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::adapter::Adapter;
use crate::loop_site::LoopSite;
use crate::record::{DYNAMIC_PREFIX, STYLE_PREFIX};
use crate::rewrite::{BLOCK_TAG, KEY_FIELD};
use crate::tree::{AttrValue, AttributeItem, FunctionBody, Node, NodeId, Pattern, PropertyItem, Tree};

// ═══════════════════════════════════════════════════════════════════════════════
// INVARIANT CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const INV_CALLBACK_ARITY: &str = "LIST001";
pub const INV_RECORD_PREFIX: &str = "LIST002";
pub const INV_RECORD_FIELDS: &str = "LIST003";
pub const INV_WRAPPER_SHAPE: &str = "LIST004";
pub const INV_SITE_ORDER: &str = "LIST005";
pub const ERR_SYNTAX: &str = "LIST-ERR-SYNTAX";
pub const ERR_ADAPTER: &str = "LIST-ERR-ADAPTER";
pub const ERR_OPTIONS: &str = "LIST-ERR-OPTIONS";

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        INV_CALLBACK_ARITY => "Lowered callbacks take exactly (item, index).",
        INV_RECORD_PREFIX => "Every record starts with the item field followed by _key.",
        INV_RECORD_FIELDS => {
            "Record fields are unique and _d/_s fields are numbered contiguously from 0."
        }
        INV_WRAPPER_SHAPE => {
            "Loop wrappers are <block> elements carrying the four loop attributes in order."
        }
        INV_SITE_ORDER => "Loop site ids strictly increase in discovery order.",
        ERR_SYNTAX => "Templates must be valid TSX.",
        ERR_ADAPTER => "Loop attributes come from a known platform adapter.",
        ERR_OPTIONS => "Compile options are valid JSON.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message} ({file}:{line}:{column})")]
pub struct CompilerError {
    pub code: String,
    pub error_type: String,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        Self::with_details(code, message, file, line, column, None, vec![])
    }

    pub fn with_details(
        code: &str,
        message: &str,
        file: &str,
        line: u32,
        column: u32,
        context: Option<String>,
        hints: Vec<String>,
    ) -> Self {
        let error_type = if code.contains("-ERR-") {
            "COMPILER_INPUT_ERROR"
        } else {
            "COMPILER_INVARIANT_VIOLATION"
        };
        CompilerError {
            code: code.to_string(),
            error_type: error_type.to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            line,
            column,
            context,
            hints,
        }
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// VERIFICATION (Return Result, first violation wins)
// ═══════════════════════════════════════════════════════════════════════════════

fn site_error(code: &str, site: &LoopSite, message: &str, file: &str) -> CompilerError {
    CompilerError::new(code, &format!("Loop site {}: {}", site.id, message), file, 1, 1)
}

fn verify_callback(tree: &Tree, site: &LoopSite, file: &str) -> Result<NodeId, CompilerError> {
    let Node::Function(func) = tree.node(site.callback) else {
        return Err(site_error(INV_CALLBACK_ARITY, site, "callback is not a function.", file));
    };
    let expected = [site.item_name.as_str(), site.index_name.as_str()];
    let params: Vec<Option<&str>> = func.params.iter().map(Pattern::as_ident).collect();
    if params != expected.map(Some) {
        return Err(site_error(
            INV_CALLBACK_ARITY,
            site,
            &format!("expected parameters ({}, {}).", expected[0], expected[1]),
            file,
        ));
    }

    let last = match &func.body {
        FunctionBody::Block(stmts) => stmts.last().copied(),
        FunctionBody::Expr(_) => None,
    };
    match last.map(|id| tree.node(id)) {
        Some(Node::Return(Some(record))) if matches!(tree.node(*record), Node::Object(_)) => Ok(*record),
        _ => Err(site_error(
            INV_RECORD_PREFIX,
            site,
            "callback does not end in a record return.",
            file,
        )),
    }
}

fn verify_record(tree: &Tree, site: &LoopSite, record: NodeId, file: &str) -> Result<(), CompilerError> {
    let Node::Object(props) = tree.node(record) else {
        return Err(site_error(INV_RECORD_PREFIX, site, "record is not an object.", file));
    };
    let names: Vec<Option<&str>> = props.iter().map(PropertyItem::key_name).collect();
    if names.len() < 2 || names[0] != Some(site.item_name.as_str()) || names[1] != Some(KEY_FIELD) {
        return Err(site_error(
            INV_RECORD_PREFIX,
            site,
            &format!("record must start with {} and {}.", site.item_name, KEY_FIELD),
            file,
        ));
    }

    let mut seen = HashSet::new();
    let mut dynamic = 0;
    let mut style = 0;
    for name in names {
        let Some(name) = name else {
            return Err(site_error(INV_RECORD_FIELDS, site, "record has a non-static key.", file));
        };
        if !seen.insert(name) {
            return Err(site_error(
                INV_RECORD_FIELDS,
                site,
                &format!("duplicate record field '{}'.", name),
                file,
            ));
        }
        let numbered = [(DYNAMIC_PREFIX, &mut dynamic), (STYLE_PREFIX, &mut style)];
        for (prefix, counter) in numbered {
            if let Some(n) = name.strip_prefix(prefix).and_then(|n| n.parse::<usize>().ok()) {
                if n != *counter {
                    return Err(site_error(
                        INV_RECORD_FIELDS,
                        site,
                        &format!("field '{}' is out of sequence.", name),
                        file,
                    ));
                }
                *counter += 1;
            }
        }
    }
    Ok(())
}

fn verify_wrapper(tree: &Tree, site: &LoopSite, adapter: &Adapter, file: &str) -> Result<(), CompilerError> {
    let Node::Element(el) = tree.node(site.wrapper) else {
        return Err(site_error(INV_WRAPPER_SHAPE, site, "wrapper is not an element.", file));
    };
    if el.tag != BLOCK_TAG {
        return Err(site_error(
            INV_WRAPPER_SHAPE,
            site,
            &format!("wrapper tag is <{}>.", el.tag),
            file,
        ));
    }

    let attrs: Vec<_> = el.attributes.iter().filter_map(AttributeItem::as_attribute).collect();
    let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
    if attrs.len() != el.attributes.len() || names != adapter.loop_attributes() {
        let expected = adapter.loop_attributes().join(", ");
        return Err(site_error(
            INV_WRAPPER_SHAPE,
            site,
            &format!("wrapper attributes are [{}].", names.join(", ")),
            file,
        )
        .with_hints(vec![format!("Expected [{}].", expected)]));
    }

    let quoted = |text: &str| format!("\"{}\"", text);
    let expected = [
        quoted(&site.item_name),
        quoted(&site.index_name),
        quoted(KEY_FIELD),
    ];
    let literals: Vec<Option<&str>> = attrs[1..]
        .iter()
        .map(|attr| match &attr.value {
            AttrValue::Literal(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    let expected: Vec<Option<&str>> = expected.iter().map(|s| Some(s.as_str())).collect();
    if literals != expected || !matches!(attrs[0].value, AttrValue::Expr(_)) {
        return Err(site_error(
            INV_WRAPPER_SHAPE,
            site,
            "wrapper attribute values do not match the site.",
            file,
        ));
    }
    Ok(())
}

/// Check the shape every lowered site must have.
pub fn verify_lowering(
    tree: &Tree,
    sites: &[LoopSite],
    adapter: &Adapter,
    file: &str,
) -> Result<(), CompilerError> {
    let mut previous: Option<u32> = None;
    for site in sites {
        if previous.is_some_and(|prev| site.id <= prev) {
            return Err(site_error(INV_SITE_ORDER, site, "site ids are not increasing.", file));
        }
        previous = Some(site.id);

        let record = verify_callback(tree, site, file)?;
        verify_record(tree, site, record, file)?;
        verify_wrapper(tree, site, adapter, file)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_and_guarantee() {
        let err = CompilerError::new(INV_RECORD_PREFIX, "bad record", "List.tsx", 3, 7);
        assert_eq!(err.to_string(), "[LIST002] bad record (List.tsx:3:7)");
        assert_eq!(err.error_type, "COMPILER_INVARIANT_VIOLATION");
        assert!(err.guarantee.contains("_key"));
    }

    #[test]
    fn test_input_errors_are_typed() {
        let err = CompilerError::new(ERR_SYNTAX, "oops", "a.tsx", 1, 1);
        assert_eq!(err.error_type, "COMPILER_INPUT_ERROR");
    }
}
