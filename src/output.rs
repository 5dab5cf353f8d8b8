//! JSON output serialization for query results.
//!
//! Provides compact output via [`to_json()`] and pretty-printed output
//! via [`to_json_pretty()`]. Output is deterministic: object keys are
//! sorted at the printing boundary (the values themselves keep
//! unspecified iteration order). Expression references have no JSON
//! form and render as null.

use crate::value::{Number, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null | Value::Expref(_) => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(Number::Int(n)) => n.to_string(),
            Value::Number(Number::Float(n)) => n.to_string(),
            Value::String(s) => format!("\"{}\"", self.escape_string(s)),
            Value::Array(items) => self.print_array(items, indent),
            Value::Object(map) => self.print_object(map, indent),
        }
    }

    fn print_array(&self, items: &[Value], indent: usize) -> String {
        if items.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            let mut result = "[\n".to_string();
            let rendered: Vec<String> = items
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        self.indent(indent + 1),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&rendered.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push(']');
            result
        } else {
            let rendered: Vec<String> = items.iter().map(|v| self.print_value(v, indent)).collect();
            format!("[{}]", rendered.join(","))
        }
    }

    fn print_object(
        &self,
        map: &std::collections::HashMap<String, Value>,
        indent: usize,
    ) -> String {
        if map.is_empty() {
            return "{}".to_string();
        }

        // Sort keys for deterministic output
        let mut keys: Vec<_> = map.keys().collect();
        keys.sort();

        if self.pretty {
            let mut result = "{\n".to_string();
            let rendered: Vec<String> = keys
                .iter()
                .filter_map(|k| map.get(*k).map(|v| (k, v)))
                .map(|(k, v)| {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        self.escape_string(k),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&rendered.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push('}');
            result
        } else {
            let rendered: Vec<String> = keys
                .iter()
                .filter_map(|k| map.get(*k).map(|v| (k, v)))
                .map(|(k, v)| {
                    format!("\"{}\":{}", self.escape_string(k), self.print_value(v, indent))
                })
                .collect();
            format!("{{{}}}", rendered.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        s.chars()
            .flat_map(|c| match c {
                '"' => vec!['\\', '"'],
                '\\' => vec!['\\', '\\'],
                '\n' => vec!['\\', 'n'],
                '\r' => vec!['\\', 'r'],
                '\t' => vec!['\\', 't'],
                c if c.is_control() => {
                    // Unicode escape for control chars
                    format!("\\u{:04x}", c as u32).chars().collect()
                }
                c => vec![c],
            })
            .collect()
    }
}

/// Converts a value to its compact JSON representation: no extra
/// whitespace, sorted object keys, full string escaping.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a value to pretty-printed JSON with 2-space indentation.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
