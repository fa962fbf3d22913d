use serde_json::Value;

use super::format_scalar;

/// Fields tried in order; the first non-null one is printed alone.
const PRIORITY_KEYS: [&str; 4] = [
    "monthly_payment",
    "total_price",
    "financed_amount",
    "base_price",
];

/// Print just the headline figure of the quote.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", format_scalar(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
