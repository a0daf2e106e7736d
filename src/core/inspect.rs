//! Value inspector: renders arbitrary evaluator results as readable text.
//!
//! Cycle-safe over self-referencing value graphs, deterministic over mappings
//! (keys sorted case-insensitively, not in insertion order), and total: it
//! never fails, degrading to a partial or empty string instead.

use std::collections::HashSet;

use super::value::Value;

/// Marker emitted for a composite value encountered twice in one traversal.
pub const CIRCULAR_MARKER: &str = "[circular]";

/// Display tag used for opaque objects whose own tag could not be computed.
const GENERIC_TAG: &str = "[object Object]";

/// Render a value as display text.
///
/// With `simple` set, opaque host objects render as their native string
/// conversion; otherwise they get a verbose multi-line property dump, with
/// nested values rendered in simple mode to bound the output.
///
/// # Examples
///
/// ```
/// use bevy_repl::core::{format_value, Value};
///
/// let v = Value::map(vec![
///     ("b".to_string(), Value::number(2.0)),
///     ("a".to_string(), Value::number(1.0)),
/// ]);
/// assert_eq!(format_value(&v, true), "{a: 1, b: 2}");
/// ```
pub fn format_value(value: &Value, simple: bool) -> String {
    let mut visited = HashSet::new();
    format_inner(value, simple, &mut visited)
}

/// The recursive worker. `visited` holds the identity of every composite on
/// the path from the outermost call and is never reset mid-traversal, so a
/// node reachable twice (diamond or cycle) renders as the circular marker.
fn format_inner(value: &Value, simple: bool, visited: &mut HashSet<usize>) -> String {
    if let Some(id) = value.identity() {
        if visited.contains(&id) {
            return CIRCULAR_MARKER.to_string();
        }
    }

    match value {
        Value::Str(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        Value::List(list) => {
            if let Some(id) = value.identity() {
                visited.insert(id);
            }
            let Ok(items) = list.read() else {
                return String::new();
            };
            let parts: Vec<String> = items
                .iter()
                .map(|item| format_inner(item, simple, visited))
                .collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Map(map) => {
            if let Some(id) = value.identity() {
                visited.insert(id);
            }
            let Ok(pairs) = map.read() else {
                return String::new();
            };
            let mut sorted: Vec<&(String, Value)> = pairs.iter().collect();
            sorted.sort_by_key(|(name, _)| name.to_lowercase());
            let parts: Vec<String> = sorted
                .iter()
                .map(|(name, item)| format!("{}: {}", name, format_inner(item, simple, visited)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        Value::Number(n) => number_literal(*n),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Function { source } => source.clone(),
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Opaque(object) => {
            if simple {
                // Native string conversion; a failed conversion is stored
                // as an empty string upstream.
                return object.display().to_string();
            }

            if let Some(id) = value.identity() {
                visited.insert(id);
            }
            let tag = object.tag().unwrap_or(GENERIC_TAG);
            let Ok(props) = object.props().read() else {
                return tag.to_string();
            };
            let mut sorted: Vec<&(String, Result<Value, _>)> = props.iter().collect();
            sorted.sort_by_key(|(name, _)| name.to_lowercase());

            // Failed property reads are skipped, not surfaced; nested values
            // render in simple mode so one dump stays one level deep.
            let parts: Vec<String> = sorted
                .iter()
                .filter_map(|(name, read)| {
                    read.as_ref()
                        .ok()
                        .map(|item| format!("{}: {}", name, format_inner(item, true, visited)))
                })
                .collect();
            format!("{}{{\n{}\n}}", tag, parts.join(",\n"))
        }
    }
}

/// Format a number the way a dynamic-language console prints it:
/// no trailing `.0`, `NaN`, and signed `Infinity`.
fn number_literal(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{OpaqueValue, PropertyError};

    #[test]
    fn test_primitives() {
        assert_eq!(format_value(&Value::Null, true), "null");
        assert_eq!(format_value(&Value::Undefined, true), "undefined");
        assert_eq!(format_value(&Value::Bool(true), true), "true");
        assert_eq!(format_value(&Value::Bool(false), true), "false");
        assert_eq!(format_value(&Value::number(42.0), true), "42");
        assert_eq!(format_value(&Value::number(0.5), true), "0.5");
        assert_eq!(format_value(&Value::number(-0.0), true), "0");
        assert_eq!(format_value(&Value::number(f64::NAN), true), "NaN");
        assert_eq!(format_value(&Value::number(f64::INFINITY), true), "Infinity");
        assert_eq!(
            format_value(&Value::number(f64::NEG_INFINITY), true),
            "-Infinity"
        );
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(format_value(&Value::str("hello"), true), "\"hello\"");
        assert_eq!(
            format_value(&Value::str("say \"hi\""), true),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_list() {
        let v = Value::list(vec![
            Value::number(1.0),
            Value::str("two"),
            Value::Null,
        ]);
        assert_eq!(format_value(&v, true), "[1, \"two\", null]");
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_value(&Value::list(Vec::new()), true), "[]");
    }

    #[test]
    fn test_map_keys_sorted_case_insensitively() {
        let v = Value::map(vec![
            ("b".to_string(), Value::number(2.0)),
            ("a".to_string(), Value::number(1.0)),
        ]);
        assert_eq!(format_value(&v, true), "{a: 1, b: 2}");

        let v = Value::map(vec![
            ("Zebra".to_string(), Value::number(1.0)),
            ("apple".to_string(), Value::number(2.0)),
            ("Mango".to_string(), Value::number(3.0)),
        ]);
        assert_eq!(format_value(&v, true), "{apple: 2, Mango: 3, Zebra: 1}");
    }

    #[test]
    fn test_function_renders_source() {
        let v = Value::function("(lambda (x) (* x x))");
        assert_eq!(format_value(&v, true), "(lambda (x) (* x x))");
    }

    #[test]
    fn test_self_referencing_list_terminates() {
        let v = Value::list(vec![Value::number(1.0)]);
        if let Value::List(list) = &v {
            list.write().unwrap().push(v.clone());
        }
        assert_eq!(format_value(&v, true), "[1, [circular]]");
    }

    #[test]
    fn test_transitive_cycle_terminates() {
        let inner = Value::map(vec![("x".to_string(), Value::number(1.0))]);
        let outer = Value::list(vec![inner.clone()]);
        if let Value::Map(map) = &inner {
            map.write().unwrap().push(("back".to_string(), outer.clone()));
        }
        assert_eq!(format_value(&outer, true), "[{back: [circular], x: 1}]");
    }

    #[test]
    fn test_shared_node_marked_on_second_occurrence() {
        let shared = Value::list(vec![Value::number(7.0)]);
        let v = Value::list(vec![shared.clone(), shared]);
        assert_eq!(format_value(&v, true), "[[7], [circular]]");
    }

    #[test]
    fn test_opaque_simple_uses_native_string() {
        let v = Value::opaque(
            OpaqueValue::new("[object Window]", "Window").with_prop("a", Value::number(1.0)),
        );
        assert_eq!(format_value(&v, true), "Window");
    }

    #[test]
    fn test_opaque_verbose_dump() {
        let v = Value::opaque(
            OpaqueValue::new("[object Window]", "Window")
                .with_prop("b", Value::number(2.0))
                .with_prop("a", Value::str("x")),
        );
        assert_eq!(
            format_value(&v, false),
            "[object Window]{\na: \"x\",\nb: 2\n}"
        );
    }

    #[test]
    fn test_opaque_failed_props_skipped() {
        let v = Value::opaque(
            OpaqueValue::new("[object Secure]", "Secure")
                .with_prop("ok", Value::number(1.0))
                .with_failed_prop("locked", PropertyError::NotImplemented)
                .with_failed_prop("broken", PropertyError::Access("denied".into())),
        );
        assert_eq!(format_value(&v, false), "[object Secure]{\nok: 1\n}");
    }

    #[test]
    fn test_opaque_untagged_falls_back_to_generic_tag() {
        let v = Value::opaque(OpaqueValue::untagged("?").with_prop("a", Value::number(1.0)));
        assert_eq!(format_value(&v, false), "[object Object]{\na: 1\n}");
    }

    #[test]
    fn test_opaque_nested_in_verbose_dump_stays_simple() {
        let inner = Value::opaque(OpaqueValue::new("[object Inner]", "Inner"));
        let v = Value::opaque(OpaqueValue::new("[object Outer]", "Outer").with_prop("child", inner));
        assert_eq!(format_value(&v, false), "[object Outer]{\nchild: Inner\n}");
    }
}
