use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
///
/// Scenario projections get one row per path; any other result becomes a
/// field/value table. Long trajectories are summarized rather than dumped —
/// the CSV format is the one meant for charting.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        Value::Object(res_map) if is_scenario_output(res_map) => {
            print_scenario_table(res_map);
        }
        Value::Object(res_map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in res_map {
                builder.push_record([key.as_str(), &format_value(val)]);
            }
            println!("{}", Table::from(builder));
        }
        _ => {
            print_flat_object(&Value::Object(envelope.clone()));
        }
    }

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

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn is_scenario_output(map: &serde_json::Map<String, Value>) -> bool {
    ["low", "base", "high"].iter().all(|k| map.contains_key(*k))
}

fn print_scenario_table(map: &serde_json::Map<String, Value>) {
    let columns = [
        "annual_rate_pct",
        "final_balance",
        "depletion_month",
        "total_growth",
        "total_cash_flow",
    ];

    let mut builder = Builder::default();
    let mut header = vec!["Scenario".to_string()];
    header.extend(columns.iter().map(|c| c.to_string()));
    builder.push_record(header);

    for key in ["low", "base", "high"] {
        if let Some(Value::Object(path)) = map.get(key) {
            let mut row = vec![key.to_string()];
            row.extend(
                columns
                    .iter()
                    .map(|c| path.get(*c).map(format_value).unwrap_or_default()),
            );
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) if arr.len() > 12 => format!("[{} points]", arr.len()),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
