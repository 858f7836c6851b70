/// The per-node rewrite rule and the post-order document transform.
///
/// A document is parsed into an owned `serde_json::Value` first and then
/// consumed by `rewrite_document`, which rebuilds every object bottom-up and
/// hands each one to `rewrite_node` once all of its children are final. The
/// rule sees only the node itself plus the `RewriteContext` for the file.
use crate::fixups::FixupTable;
use crate::message_code::MessageCode;
use serde_json::{Map, Value};

/// A node the rule cannot rewrite. Aborts the file like a parse error.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("'{key}' must be an object to receive message code {code}, found {found}")]
    NotAnObject {
        key: &'static str,
        code: String,
        found: String,
    },
}

/// Key holding the message-type enumeration in every message schema.
pub const MESSAGE_TYPES_KEY: &str = "n1:MessageTypes";

/// Keys dropped from a node whose `properties` wrapped a `$ref`.
const WRAPPER_KEYS: [&str; 4] = ["additionalProperties", "properties", "type", "patternProperties"];

/// Per-file inputs to the rewrite rule. Built once before traversal and
/// never mutated.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    code: Option<&'a MessageCode>,
    fixups: &'a FixupTable,
}

impl<'a> RewriteContext<'a> {
    pub fn new(code: Option<&'a MessageCode>, fixups: &'a FixupTable) -> Self {
        Self { code, fixups }
    }
}

/// Rewrite a whole document, children before parents.
pub fn rewrite_document(doc: Value, ctx: &RewriteContext<'_>) -> Result<Value, RuleError> {
    match doc {
        Value::Object(map) => {
            let children = map
                .into_iter()
                .map(|(key, value)| Ok((key, rewrite_document(value, ctx)?)))
                .collect::<Result<Map<String, Value>, RuleError>>()?;
            Ok(Value::Object(rewrite_node(children, ctx)?))
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| rewrite_document(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        scalar => Ok(scalar),
    }
}

/// Apply the rule to one object whose descendants are already rewritten.
///
/// Runs the fix-up table, message-type injection, `$ref` unwrapping and
/// description trimming in that order. Absent keys are skipped silently.
pub fn rewrite_node(
    mut node: Map<String, Value>,
    ctx: &RewriteContext<'_>,
) -> Result<Map<String, Value>, RuleError> {
    for field in ctx.fixups.apply(&mut node) {
        tracing::trace!(field = %field, "applied fix-up");
    }

    if let Some(code) = ctx.code {
        inject_message_type(&mut node, code)?;
    }

    if unwrap_reference(&mut node) {
        tracing::trace!(reference = %node["$ref"], "unwrapped $ref");
    }

    normalize_description(&mut node);

    Ok(node)
}

/// Pin the message-type enumeration to the file's code.
fn inject_message_type(node: &mut Map<String, Value>, code: &MessageCode) -> Result<(), RuleError> {
    match node.get_mut(MESSAGE_TYPES_KEY) {
        Some(Value::Object(types)) => {
            types.insert("enum".into(), Value::Array(vec![code.as_str().into()]));
            tracing::trace!(code = %code, "injected message type enum");
            Ok(())
        }
        Some(other) => Err(RuleError::NotAnObject {
            key: MESSAGE_TYPES_KEY,
            code: code.to_string(),
            found: other.to_string(),
        }),
        None => Ok(()),
    }
}

/// Collapse `{"properties": {"$": {"$ref": r}, "#": ...}, ...}` to `{"$ref": r}`.
/// Returns true when the node was collapsed.
fn unwrap_reference(node: &mut Map<String, Value>) -> bool {
    let reference = match node.get("properties").and_then(Value::as_object) {
        Some(props) if props.contains_key("#") => {
            props.get("$").and_then(|wrapped| wrapped.get("$ref")).cloned()
        }
        _ => None,
    };
    let Some(reference) = reference else {
        return false;
    };

    node.insert("$ref".into(), reference);
    for key in WRAPPER_KEYS {
        node.shift_remove(key);
    }
    true
}

/// Trim a string description; drop it when nothing is left.
fn normalize_description(node: &mut Map<String, Value>) {
    let trimmed = match node.get("description") {
        Some(Value::String(desc)) => desc.trim_matches(is_blank).to_string(),
        _ => return,
    };
    if trimmed.is_empty() {
        node.shift_remove("description");
        tracing::trace!("removed blank description");
    } else {
        node.insert("description".into(), Value::String(trimmed));
    }
}

/// Unicode whitespace plus the ASCII separators U+001C..U+001F, which
/// earlier conversions also treated as blank.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
