use serde_json::{Map, Value};

/// Print the one answer a caller usually wants from each command.
///
/// * price: the unrounded price followed by premium, par or discount
/// * yield: the annual YTM, with `(not converged)` appended when the
///   iteration cap was hit
/// * sensitivity: `rate price` lines of the market-rate curve
/// * explain: the substituted formula
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => println!("{}", headline(map)),
        other => println!("{}", scalar(other)),
    }
}

fn headline(map: &Map<String, Value>) -> String {
    if let Some(formula) = map.get("formula") {
        return scalar(formula);
    }

    if let Some(ytm) = map.get("ytm") {
        let converged = map
            .get("converged")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        return if converged {
            scalar(ytm)
        } else {
            format!("{} (not converged)", scalar(ytm))
        };
    }

    if let Some(Value::Array(points)) = map.get("market_curve") {
        return points
            .iter()
            .map(|p| format!("{} {}", scalar(&p["rate_percent"]), scalar(&p["price"])))
            .collect::<Vec<_>>()
            .join("\n");
    }

    if let Some(price) = map.get("price") {
        return match map.get("price_status") {
            Some(status) => format!("{} {}", scalar(price), scalar(status)),
            None => scalar(price),
        };
    }

    map.iter()
        .next()
        .map(|(key, val)| format!("{key}: {}", scalar(val)))
        .unwrap_or_default()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
