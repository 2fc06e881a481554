use rust_decimal::Decimal;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use crate::output::format::format_money;

/// Fields rendered as money with thousands separators. Everything else prints
/// raw, so month counts and flags stay untouched.
const MONEY_KEYS: &[&str] = &[
    "emi",
    "total_principal",
    "total_interest",
    "total_amount",
    "new_total_interest",
    "new_total_amount",
    "interest_saved",
    "total_prepayment_made",
    "total_payment",
    "principal_component",
    "interest_component",
    "remaining_balance",
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_field_table(map);
            }
        }
        Value::Array(arr) => print_schedule_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        // A full analysis: summary, optional comparison, then the schedule.
        Value::Object(res_map) if res_map.contains_key("summary") => {
            if let Some(Value::Object(summary)) = res_map.get("summary") {
                println!("Loan Summary");
                print_field_table(summary);
            }
            if let Some(Value::Object(prepayment)) = res_map.get("prepayment") {
                println!("\nPrepayment Impact");
                print_field_table(prepayment);
            }
            if let Some(Value::Array(schedule)) = res_map.get("schedule") {
                println!("\nAmortisation Schedule");
                print_schedule_table(schedule);
            }
        }
        Value::Object(res_map) => print_field_table(res_map),
        _ => print_field_table(envelope),
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    // Print methodology
    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_field_table(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_field(key, val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_schedule_table(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Month", "Payment", "Principal", "Interest", "Balance", ""]);

    let mut any_prepayment = false;
    for row in rows {
        if let Value::Object(map) = row {
            let flagged = map
                .get("is_prepayment_month")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            any_prepayment |= flagged;
            builder.push_record([
                map.get("month").map(format_value).unwrap_or_default(),
                money_cell(map, "total_payment"),
                money_cell(map, "principal_component"),
                money_cell(map, "interest_component"),
                money_cell(map, "remaining_balance"),
                if flagged { "*".to_string() } else { String::new() },
            ]);
        }
    }

    println!("{}", Table::from(builder));
    if any_prepayment {
        println!("* prepayment month");
    }
}

fn money_cell(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key)
        .map(|v| format_field(key, v))
        .unwrap_or_default()
}

fn format_field(key: &str, value: &Value) -> String {
    if MONEY_KEYS.contains(&key) {
        if let Some(amount) = decimal_of(value) {
            return format_money(amount);
        }
    }
    format_value(value)
}

/// Decimals cross the JSON boundary as strings; tolerate plain numbers too.
fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
