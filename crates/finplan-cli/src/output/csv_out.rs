use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// A scenario projection is pivoted into `month,low,base,high` rows, ready
/// to chart; depleted paths leave their column empty past the depletion
/// month. Everything else becomes two-column field/value rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                if let Some(paths) = scenario_trajectories(result) {
                    write_trajectories_csv(&mut wtr, &paths);
                } else {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in result {
                        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                    }
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Extract the three per-scenario trajectories as month-indexed balances.
fn scenario_trajectories(result: &serde_json::Map<String, Value>) -> Option<[Vec<String>; 3]> {
    let mut out: [Vec<String>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for (i, key) in ["low", "base", "high"].iter().enumerate() {
        let path = result.get(*key)?.as_object()?;
        let trajectory = path.get("trajectory")?.as_array()?;
        for point in trajectory {
            let balance = point.as_object()?.get("balance")?;
            out[i].push(format_csv_value(balance));
        }
    }
    Some(out)
}

fn write_trajectories_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, paths: &[Vec<String>; 3]) {
    let _ = wtr.write_record(["month", "low", "base", "high"]);
    let months = paths.iter().map(|p| p.len()).max().unwrap_or(0);
    for m in 0..months {
        let row = [
            m.to_string(),
            paths[0].get(m).cloned().unwrap_or_default(),
            paths[1].get(m).cloned().unwrap_or_default(),
            paths[2].get(m).cloned().unwrap_or_default(),
        ];
        let _ = wtr.write_record(&row);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
