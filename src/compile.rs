#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::Adapter;
use crate::codegen::{print_node, PrintStyle};
use crate::loop_site::{LoopBinding, LoopSite};
use crate::parse::{find_render_root, line_column, parse_template};
use crate::record::ItemSource;
use crate::tokens::TokenAllocator;
use crate::transform::{lower_lists, LoweringContext};
use crate::tree::Tree;
use crate::validate::{verify_lowering, CompilerError, ERR_OPTIONS};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// A preset name (`"ali"`, `"wechat"`, `"bytedance"`) or a full adapter object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdapterChoice {
    Preset(String),
    Custom(Adapter),
}

impl AdapterChoice {
    pub fn resolve(&self, file_path: &str) -> Result<Adapter, CompilerError> {
        match self {
            AdapterChoice::Preset(name) => Adapter::by_name(name).map_err(|mut e| {
                e.file = file_path.to_string();
                e
            }),
            AdapterChoice::Custom(adapter) => Ok(adapter.clone()),
        }
    }
}

impl Default for AdapterChoice {
    fn default() -> Self {
        AdapterChoice::Preset("ali".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub adapter: AdapterChoice,
    /// First loop site id. Pass the previous call's `nextId` to number across components.
    pub start_id: u32,
    pub style: PrintStyle,
    pub verify: bool,
    pub file_path: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            adapter: AdapterChoice::default(),
            start_id: 0,
            style: PrintStyle::default(),
            verify: true,
            file_path: "<anonymous>".to_string(),
        }
    }
}

impl CompileOptions {
    pub fn from_json(json: &str) -> Result<Self, CompilerError> {
        if json.trim().is_empty() {
            return Ok(CompileOptions::default());
        }
        serde_json::from_str(json).map_err(|e| {
            CompilerError::new(
                ERR_OPTIONS,
                &format!("Options parse error: {}", e),
                "<options>",
                e.line() as u32,
                e.column() as u32,
            )
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteReport {
    pub id: u32,
    pub parent: Option<u32>,
    pub item_name: String,
    pub index_name: String,
    pub key_token: String,
    /// Printed receiver of the mapping call.
    pub source: String,
    pub fields: Vec<String>,
    pub item_source: ItemSource,
    pub binding: LoopBinding,
}

impl SiteReport {
    fn from_site(tree: &Tree, site: &LoopSite) -> Self {
        SiteReport {
            id: site.id,
            parent: site.parent,
            item_name: site.item_name.clone(),
            index_name: site.index_name.clone(),
            key_token: site.key_token.clone(),
            source: print_node(tree, site.source_expr, PrintStyle::Concise),
            fields: site.schema.field_names(),
            item_source: site.schema.item_source.clone(),
            binding: site.binding.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub code: String,
    pub sites: Vec<SiteReport>,
    pub next_id: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse, lower, verify and print one JSX expression.
pub fn compile_template(source: &str, options: &CompileOptions) -> Result<CompileResult, CompilerError> {
    let adapter = options.adapter.resolve(&options.file_path)?;
    let mut parsed = parse_template(source, &options.file_path)?;

    let mut tokens = TokenAllocator::starting_at(options.start_id);
    let mut ctx = LoweringContext::new(&adapter, &mut tokens);
    lower_lists(&mut parsed.tree, parsed.root, &mut ctx);
    let sites = ctx.sites;

    if options.verify {
        verify_lowering(&parsed.tree, &sites, &adapter, &options.file_path)?;
    }
    debug!(file = %options.file_path, sites = sites.len(), "lowered template");

    Ok(CompileResult {
        code: print_node(&parsed.tree, parsed.root, options.style),
        sites: sites
            .iter()
            .map(|site| SiteReport::from_site(&parsed.tree, site))
            .collect(),
        next_id: tokens.peek(),
    })
}

/// Compile the JSX a component renders and splice it back into the module source.
pub fn compile_component(source: &str, options: &CompileOptions) -> Result<CompileResult, CompilerError> {
    let Some((start, end)) = find_render_root(source, &options.file_path)? else {
        debug!(file = %options.file_path, "no render root");
        return Ok(CompileResult {
            code: source.to_string(),
            sites: Vec::new(),
            next_id: options.start_id,
        });
    };

    let (start, end) = (start as usize, end as usize);
    let mut result = compile_template(&source[start..end], options).map_err(|mut e| {
        let (line, column) = line_column(source, start as u32);
        e.line += line - 1;
        if e.line == line {
            e.column += column - 1;
        }
        e
    })?;

    let mut code = source.to_string();
    code.replace_range(start..end, &result.code);
    result.code = code;
    Ok(result)
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn to_napi(e: CompilerError) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[cfg(feature = "napi")]
#[napi]
pub fn compile_template_native(code: String, options_json: Option<String>) -> napi::Result<String> {
    let options = CompileOptions::from_json(options_json.as_deref().unwrap_or("")).map_err(to_napi)?;
    let result = compile_template(&code, &options).map_err(to_napi)?;
    serde_json::to_string(&result)
        .map_err(|e| napi::Error::from_reason(format!("Result serialize error: {}", e)))
}

#[cfg(feature = "napi")]
#[napi]
pub fn compile_component_native(code: String, options_json: Option<String>) -> napi::Result<String> {
    let options = CompileOptions::from_json(options_json.as_deref().unwrap_or("")).map_err(to_napi)?;
    let result = compile_component(&code, &options).map_err(to_napi)?;
    serde_json::to_string(&result)
        .map_err(|e| napi::Error::from_reason(format!("Result serialize error: {}", e)))
}
