//! Wire codec for the launcher service.
//!
//! Outbound calls are rendered as S-expression text.  Listing replies are
//! read generically with [`sexpr::parse_all`] and then normalised
//! structurally: a reply may arrive wrapped in one redundant list layer, and
//! both shapes decode to the same items.

use std::fmt;

use super::item::{Action, Item};
use super::sexpr::{self, Expr, Node, ParseError};

/// Capability name of the launcher's "list items" call.
pub const GET_ITEMS: &str = "get_items";

/// Field names accepted as an item's display label, in order of preference.
const LABEL_KEYS: &[&str] = &["label", "title", "name"];

const ON_CLICK_KEY: &str = "on_click";

// ───────────────────────────────────────── addressing ────────

/// Address of a service process inside the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAddr {
    Pid(u64),
}

impl Default for ServiceAddr {
    /// The launcher service's well-known address.
    fn default() -> Self {
        Self::Pid(0)
    }
}

impl fmt::Display for ServiceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAddr::Pid(pid) => write!(f, "(pid {pid})"),
        }
    }
}

// ───────────────────────────────────────── encoding ──────────

/// `(call <target> '<expression>)`
pub fn encode_call(target: ServiceAddr, expression: &Expr) -> String {
    format!("(call {target} {})", Expr::quoted(expression.clone()))
}

/// The `(:get_items)` message sent to the launcher service.
pub fn get_items_message() -> Expr {
    Expr::List(vec![Expr::keyword(GET_ITEMS)])
}

/// `(eval '<action>)`, with the action relayed exactly as it was received.
pub fn encode_eval(action: &Action) -> String {
    format!("(eval '{})", action.source())
}

// ───────────────────────────────────────── decoding ──────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed reply: {0}")]
    Syntax(#[from] ParseError),
    #[error("listing entry {index} is not a record: {found}")]
    NotARecord { index: usize, found: String },
    #[error("listing entry {index} has key `:{key}` without a value")]
    DanglingKey { index: usize, key: String },
    #[error("listing entry {index} has no label field")]
    MissingLabel { index: usize },
    #[error("listing entry {index} has a label that is not text: {found}")]
    BadLabel { index: usize, found: String },
    #[error("listing entry {index} ({label:?}) has no :on_click field")]
    MissingOnClick { index: usize, label: String },
}

/// Decode a reply to the `get_items` call into items, in reply order.
pub fn decode_listing(text: &str) -> Result<Vec<Item>, DecodeError> {
    let forms = sexpr::parse_all(text)?;
    if let [only] = &forms[..] {
        if only.is_nil() {
            return Ok(Vec::new());
        }
    }

    listing_entries(&forms)
        .iter()
        .enumerate()
        .map(|(index, node)| decode_item(text, index, node))
        .collect()
}

/// Find the list of records inside the top-level forms, peeling at most one
/// redundant wrapping layer.
fn listing_entries(forms: &[Node]) -> &[Node] {
    let mut entries = match forms {
        [only] if !is_record(only) => only.as_list().unwrap_or(forms),
        _ => forms,
    };

    if let [only] = entries {
        if let Some(inner) = only.as_list() {
            if !is_record(only) && inner.iter().all(is_record) {
                entries = inner;
            }
        }
    }
    entries
}

/// A record is a property list `(:k v ...)` or an association list
/// `((:k v) ...)`.
fn is_record(node: &Node) -> bool {
    let Some(items) = node.as_list() else {
        return false;
    };
    match items.first() {
        None => false,
        Some(first) if first.as_keyword().is_some() => true,
        Some(_) => items.iter().all(|pair| pair_key(pair).is_some()),
    }
}

/// Key of an association-list pair `(:k v)`.
fn pair_key(node: &Node) -> Option<&str> {
    match node.as_list()? {
        [key, _] => key.as_keyword(),
        _ => None,
    }
}

/// Collect `(key, value)` fields of a record, in source order.
fn record_fields<'n>(
    src: &str,
    index: usize,
    node: &'n Node,
) -> Result<Vec<(&'n str, &'n Node)>, DecodeError> {
    let not_a_record = || DecodeError::NotARecord {
        index,
        found: node.source(src).to_string(),
    };
    if !is_record(node) {
        return Err(not_a_record());
    }
    let items = node.as_list().ok_or_else(not_a_record)?;

    if items.first().and_then(Node::as_keyword).is_some() {
        let mut fields = Vec::with_capacity(items.len() / 2);
        let mut iter = items.iter();
        while let Some(key_node) = iter.next() {
            let key = key_node.as_keyword().ok_or_else(not_a_record)?;
            let value = iter.next().ok_or_else(|| DecodeError::DanglingKey {
                index,
                key: key.to_string(),
            })?;
            fields.push((key, value));
        }
        Ok(fields)
    } else {
        items
            .iter()
            .map(|pair| match (pair_key(pair), pair.as_list()) {
                (Some(key), Some([_, value])) => Ok((key, value)),
                _ => Err(not_a_record()),
            })
            .collect()
    }
}

fn decode_item(src: &str, index: usize, node: &Node) -> Result<Item, DecodeError> {
    let fields = record_fields(src, index, node)?;
    let field = |name: &str| fields.iter().find(|(key, _)| *key == name).map(|(_, v)| *v);

    let label_node = LABEL_KEYS
        .iter()
        .find_map(|key| field(key))
        .ok_or(DecodeError::MissingLabel { index })?;
    let label = match label_node.to_expr() {
        Expr::String(s) | Expr::Symbol(s) | Expr::Keyword(s) => s,
        _ => {
            return Err(DecodeError::BadLabel {
                index,
                found: label_node.source(src).to_string(),
            })
        }
    };

    let on_click = field(ON_CLICK_KEY).ok_or_else(|| DecodeError::MissingOnClick {
        index,
        label: label.clone(),
    })?;

    Ok(Item {
        label,
        on_click: Action::new(on_click.to_expr(), on_click.source(src)),
    })
}
