use crate::classify::DependencyKind;
use crate::rewrite::KEY_FIELD;
use crate::tree::{Node, NodeId, PropertyItem, Tree};
use regex::Regex;
use serde::Serialize;

lazy_static::lazy_static! {
    static ref RESERVED_FIELD_RE: Regex = Regex::new(r"^_[ds]\d+$").unwrap();
}

pub const DYNAMIC_PREFIX: &str = "_d";
pub const STYLE_PREFIX: &str = "_s";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySlot {
    pub kind: DependencyKind,
    pub source: NodeId,
    pub field_name: String,
    pub sequence_index: usize,
}

/// How the record's item field was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ItemSource {
    Raw,
    Merged,
    ShallowMerged { paths: Vec<Vec<String>> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSchema {
    pub item_field: String,
    pub item_source: ItemSource,
    pub key_field: String,
    pub slots: Vec<DependencySlot>,
}

impl RecordSchema {
    /// Field names in record order. Slots folded into the item field are not repeated.
    pub fn field_names(&self) -> Vec<String> {
        let mut names = vec![self.item_field.clone(), self.key_field.clone()];
        names.extend(
            self.slots
                .iter()
                .filter(|slot| slot.field_name != self.item_field)
                .map(|slot| slot.field_name.clone()),
        );
        names
    }
}

#[derive(Debug, Clone)]
enum ItemValue {
    Raw,
    Merged(NodeId),
    Paths(Vec<(Vec<String>, NodeId)>),
}

/// Accumulates the per-iteration record of one loop site.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    item: String,
    key_token: String,
    item_value: ItemValue,
    slots: Vec<DependencySlot>,
    fields: Vec<(String, NodeId)>,
    next_dynamic: usize,
    next_style: usize,
}

impl RecordBuilder {
    pub fn new(item: &str, key_token: &str) -> Self {
        RecordBuilder {
            item: item.to_string(),
            key_token: key_token.to_string(),
            item_value: ItemValue::Raw,
            slots: Vec::new(),
            fields: Vec::new(),
            next_dynamic: 0,
            next_style: 0,
        }
    }

    fn push_slot(&mut self, kind: DependencyKind, source: NodeId, field_name: String) {
        let sequence_index = self.slots.len();
        self.slots.push(DependencySlot {
            kind,
            source,
            field_name,
            sequence_index,
        });
    }

    /// Add a `_dN` field holding `value`.
    pub fn push_dynamic(&mut self, kind: DependencyKind, source: NodeId, value: NodeId) -> String {
        let name = format!("{}{}", DYNAMIC_PREFIX, self.next_dynamic);
        self.next_dynamic += 1;
        self.push_slot(kind, source, name.clone());
        self.fields.push((name.clone(), value));
        name
    }

    /// Add a `_sN` field holding `createStyle(source)`.
    pub fn push_style(&mut self, tree: &mut Tree, source: NodeId, create_style: &str) -> String {
        let name = format!("{}{}", STYLE_PREFIX, self.next_style);
        self.next_style += 1;
        let value = tree.call(create_style, vec![source]);
        self.push_slot(DependencyKind::StyleValue, source, name.clone());
        self.fields.push((name.clone(), value));
        name
    }

    pub fn note_item_reference(&mut self, source: NodeId) {
        if !self
            .slots
            .iter()
            .any(|slot| slot.kind == DependencyKind::ItemWhole)
        {
            self.push_slot(DependencyKind::ItemWhole, source, self.item.clone());
        }
    }

    /// Replace the item value with a nested mapping call.
    pub fn merge_item(&mut self, source: NodeId, call: NodeId) -> bool {
        if !matches!(self.item_value, ItemValue::Raw) {
            return false;
        }
        self.item_value = ItemValue::Merged(call);
        self.push_slot(DependencyKind::NestedCarrier, source, self.item.clone());
        true
    }

    /// Override `item.<path>` with a nested mapping call inside a shallow copy of the item.
    pub fn merge_item_path(&mut self, source: NodeId, path: Vec<String>, call: NodeId) -> bool {
        if matches!(self.item_value, ItemValue::Raw) {
            self.item_value = ItemValue::Paths(Vec::new());
        }
        let ItemValue::Paths(entries) = &mut self.item_value else {
            return false;
        };
        let overlaps = entries.iter().any(|(existing, _)| {
            let shared = existing.len().min(path.len());
            existing[..shared] == path[..shared]
        });
        if overlaps {
            return false;
        }
        entries.push((path, call));
        self.push_slot(DependencyKind::NestedCarrier, source, self.item.clone());
        true
    }

    /// Add a field named after a local binding.
    pub fn push_named(&mut self, source: NodeId, name: &str, value: NodeId) -> bool {
        let taken = name == self.item
            || name == KEY_FIELD
            || RESERVED_FIELD_RE.is_match(name)
            || self.fields.iter().any(|(field, _)| field == name);
        if taken {
            return false;
        }
        self.push_slot(DependencyKind::NestedCarrier, source, name.to_string());
        self.fields.push((name.to_string(), value));
        true
    }

    /// Emit the record object literal and its schema.
    pub fn build(self, tree: &mut Tree) -> (NodeId, RecordSchema) {
        let (item_value, item_source) = match self.item_value {
            ItemValue::Raw => (tree.ident(&self.item), ItemSource::Raw),
            ItemValue::Merged(call) => (call, ItemSource::Merged),
            ItemValue::Paths(entries) => {
                let paths = entries.iter().map(|(path, _)| path.clone()).collect();
                let value = build_override(tree, &[self.item.clone()], &entries);
                (value, ItemSource::ShallowMerged { paths })
            }
        };

        let key_value = tree.ident(&self.key_token);
        let mut props = vec![
            PropertyItem::field(&self.item, item_value),
            PropertyItem::field(KEY_FIELD, key_value),
        ];
        props.extend(
            self.fields
                .iter()
                .map(|(name, value)| PropertyItem::field(name, *value)),
        );
        let record = tree.alloc(Node::Object(props));

        let schema = RecordSchema {
            item_field: self.item,
            item_source,
            key_field: KEY_FIELD.to_string(),
            slots: self.slots,
        };
        (record, schema)
    }
}

/// `{ ...base, prop: call }`, nesting one shallow copy per path segment.
fn build_override(tree: &mut Tree, base: &[String], entries: &[(Vec<String>, NodeId)]) -> NodeId {
    let spread_source = tree.path(base);
    let mut props = vec![PropertyItem::Spread(spread_source)];

    let mut heads: Vec<&String> = Vec::new();
    for (path, _) in entries {
        if let Some(head) = path.first() {
            if !heads.contains(&head) {
                heads.push(head);
            }
        }
    }

    for head in heads {
        let group: Vec<(Vec<String>, NodeId)> = entries
            .iter()
            .filter(|(path, _)| path.first() == Some(head))
            .map(|(path, call)| (path[1..].to_vec(), *call))
            .collect();
        let value = match group.as_slice() {
            [(rest, call)] if rest.is_empty() => *call,
            _ => {
                let mut nested_base = base.to_vec();
                nested_base.push(head.clone());
                build_override(tree, &nested_base, &group)
            }
        };
        props.push(PropertyItem::field(head, value));
    }
    tree.alloc(Node::Object(props))
}
