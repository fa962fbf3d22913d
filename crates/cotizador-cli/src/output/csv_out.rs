use serde_json::{Map, Value};
use std::io;

use super::{format_scalar, schedule_rows, summary_fields};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write the quote as CSV to stdout: the amortization rows when the plan
/// has a schedule, otherwise `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .and_then(Value::as_object);

    match (result, value) {
        (Some(result), _) => match schedule_rows(result) {
            Some(rows) if !rows.is_empty() => write_rows(&mut wtr, rows),
            _ => write_pairs(&mut wtr, result),
        },
        (None, Value::Object(map)) => write_pairs(&mut wtr, map),
        (None, _) => {
            let _ = wtr.write_record([format_scalar(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_pairs(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in summary_fields(map) {
        let _ = wtr.write_record([key, format_scalar(&val)]);
    }
}

fn write_rows(wtr: &mut StdoutWriter<'_>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_scalar).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&record);
    }
}
