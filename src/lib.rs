//! # List Lowering Ground Truth
//!
//! Rewrites `collection.map(callback)` children of a JSX render tree into loop
//! wrappers for miniapp template dialects, whose renderer can only bind to fields
//! of precomputed data.
//!
//! ## Lowering Invariants
//!
//! 1. **Wrapper**: every lowered site becomes
//!    `<block a:for={...} a:for-item="item" a:for-index="indexN" a:key="_key">`.
//!    Attribute names come from the platform `Adapter`.
//!
//! 2. **Callback Signature**: the mapping callback is rewritten to exactly `(item, indexN)`.
//!    References to the old index parameter are renamed throughout the callback,
//!    nested callbacks included, unless a nested scope rebinds the name.
//!
//! 3. **Record Shape**: the callback returns `{ item: ..., _key: _keyN, ...slots }`.
//!    - `_d0, _d1, …` hold index and generic values.
//!    - `_s0, _s1, …` hold `__create_style__(...)` values and are numbered separately.
//!    - A nested loop over the item (or `item.path`) folds into the item field.
//!    - A nested loop over a local of the callback takes the local's name.
//!
//! 4. **Template Paths**: dynamic leaves become `{{ item.field }}` in text and
//!    `"{{item.field}}"` in attributes. Page-level expressions are untouched.
//!
//! 5. **Numbering**: site ids are allocated in pre-order from a caller-owned
//!    `TokenAllocator`. The same input and start id always give the same output.
//!
//! 6. **Opportunistic**: shapes that do not match are left exactly as written.

mod adapter;
mod classify;
mod codegen;
mod compile;
mod loop_site;
mod parse;
mod record;
mod renamer;
mod rewrite;
mod scope;
mod tokens;
mod transform;
mod tree;
mod validate;
mod visitor;

#[cfg(test)]
mod list_tests;

pub use adapter::Adapter;
pub use classify::DependencyKind;
pub use codegen::{print_node, PrintStyle};
pub use compile::{compile_component, compile_template, AdapterChoice, CompileOptions, CompileResult, SiteReport};
pub use loop_site::{LoopBinding, LoopSite};
pub use parse::{find_render_root, parse_template, ParsedTemplate};
pub use record::{DependencySlot, ItemSource, RecordSchema};
pub use tokens::{SiteTokens, TokenAllocator};
pub use transform::{lower_lists, LoweringContext};
pub use tree::{Node, NodeId, Tree};
pub use validate::*;

#[cfg(feature = "napi")]
pub use compile::{compile_component_native, compile_template_native};
