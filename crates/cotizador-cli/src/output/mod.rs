pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields of the result, with nested objects flattened as `parent.child`.
/// The amortization schedule is left out; see [`schedule_rows`].
pub(crate) fn summary_fields(result: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut fields = Vec::new();
    for (key, val) in result {
        match (key.as_str(), val) {
            ("schedule", _) => {}
            (_, Value::Object(inner)) => {
                for (child, child_val) in inner {
                    fields.push((format!("{}.{}", key, child), child_val.clone()));
                }
            }
            _ => fields.push((key.clone(), val.clone())),
        }
    }
    fields
}

/// Amortization rows, whether the schedule is a bare row array or a
/// full schedule object carrying `rows`.
pub(crate) fn schedule_rows(result: &Map<String, Value>) -> Option<&[Value]> {
    match result.get("schedule")? {
        Value::Array(rows) => Some(rows),
        Value::Object(schedule) => match schedule.get("rows") {
            Some(Value::Array(rows)) => Some(rows),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
