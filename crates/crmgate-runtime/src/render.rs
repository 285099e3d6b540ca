//! Turns structured backend responses into caller-facing text

use crmgate_core::{GatewayResult, ResponseFormat};
use serde_json::{Map, Value as JsonValue};

const NATURAL_KEYS: &[&str] = &["natural_response", "response", "answer", "message", "summary"];
const TABLE_KEYS: &[&str] = &["table_data", "table", "data", "results", "records"];

/// Render a natural-language query response in the requested format.
///
/// A missing half falls back to the other one; if neither is present the
/// body is pretty-printed.
pub fn render_natural_query(body: &JsonValue, format: ResponseFormat) -> GatewayResult<String> {
    if let JsonValue::String(s) = body {
        return Ok(finish(s));
    }

    let natural = NATURAL_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(JsonValue::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let table = TABLE_KEYS
        .iter()
        .find_map(|key| body.get(*key).filter(|v| !v.is_null()))
        .map(render_table)
        .filter(|s| !s.trim().is_empty());

    let text = match (format, natural, table) {
        (ResponseFormat::Both, Some(n), Some(t)) => format!("{}\n\n{}", n, t),
        (ResponseFormat::Table, _, Some(t)) => t,
        (ResponseFormat::Natural, Some(n), _) => n,
        (_, Some(n), None) => n,
        (_, None, Some(t)) => t,
        (_, None, None) => serde_json::to_string_pretty(body)?,
    };
    Ok(finish(&text))
}

/// Render a generic tool-call response
pub fn render_tool_result(body: &JsonValue) -> GatewayResult<String> {
    let text = match body {
        JsonValue::String(s) => s.clone(),
        JsonValue::Object(map) => {
            if let Some(text) = ["result", "message"]
                .iter()
                .find_map(|key| map.get(*key).and_then(JsonValue::as_str))
            {
                text.to_string()
            } else if let Some(rows) = ["result", "data"].iter().find_map(|key| {
                map.get(*key).filter(|v| v.is_array() || v.is_object())
            }) {
                render_table(rows)
            } else {
                serde_json::to_string_pretty(body)?
            }
        }
        JsonValue::Array(_) => render_table(body),
        other => other.to_string(),
    };
    Ok(finish(&text))
}

/// Pipe-table rendering of records; scalars one per line; strings verbatim
pub fn render_table(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) if items.iter().all(JsonValue::is_object) && !items.is_empty() => {
            let rows: Vec<&Map<String, JsonValue>> = items.iter().filter_map(JsonValue::as_object).collect();
            records_table(&rows)
        }
        JsonValue::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join("\n"),
        JsonValue::Object(map) => {
            map.iter().map(|(k, v)| format!("{}: {}", k, cell(v))).collect::<Vec<_>>().join("\n")
        }
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn records_table(rows: &[&Map<String, JsonValue>]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("| {} |", columns.iter().map(|c| escape(c)).collect::<Vec<_>>().join(" | ")));
    lines.push(format!("|{}|", vec![" --- "; columns.len()].join("|")));
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| row.get(*c).map(|v| escape(&cell(v))).unwrap_or_default())
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

fn cell(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn finish(text: &str) -> String {
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> JsonValue {
        json!({
            "natural_response": "You have 2 new leads.  \n",
            "table_data": [
                {"email": "ada@example.com", "name": "Ada"},
                {"email": "bob@example.com", "name": "Bob | Jr"}
            ]
        })
    }

    #[test]
    fn both_concatenates_natural_then_table() {
        let text = render_natural_query(&sample(), ResponseFormat::Both).unwrap();
        assert!(text.starts_with("You have 2 new leads."));
        assert!(text.contains("\n\n| email | name |"));
        assert!(text.contains("| bob@example.com | Bob \\| Jr |"));
        assert_eq!(text, text.trim_end());
    }

    #[test]
    fn single_formats_pick_one_half() {
        let table = render_natural_query(&sample(), ResponseFormat::Table).unwrap();
        assert!(table.starts_with("| email | name |"));
        assert!(!table.contains("new leads"));

        let natural = render_natural_query(&sample(), ResponseFormat::Natural).unwrap();
        assert_eq!(natural, "You have 2 new leads.");
    }

    #[test]
    fn missing_half_falls_back() {
        let only_text = json!({"message": "No leads found."});
        assert_eq!(render_natural_query(&only_text, ResponseFormat::Table).unwrap(), "No leads found.");

        let only_rows = json!({"data": ["a", "b"]});
        assert_eq!(render_natural_query(&only_rows, ResponseFormat::Natural).unwrap(), "a\nb");
    }

    #[test]
    fn unknown_shape_is_pretty_printed() {
        let body = json!({"count": 3});
        let text = render_natural_query(&body, ResponseFormat::Both).unwrap();
        assert!(text.contains("\"count\": 3"));
    }

    #[test]
    fn ragged_rows_union_columns() {
        let rows = json!([{"a": 1}, {"a": 2, "b": null}, {"c": "x"}]);
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "| a | b | c |");
        assert_eq!(lines[1], "| --- | --- | --- |");
        assert_eq!(lines[2], "| 1 |  |  |");
        assert_eq!(lines[4], "|  |  | x |");
    }

    #[test]
    fn tool_results() {
        assert_eq!(render_tool_result(&json!("done\n\n")).unwrap(), "done");
        assert_eq!(render_tool_result(&json!({"result": "3 leads"})).unwrap(), "3 leads");
        let rows = render_tool_result(&json!({"data": [{"name": "Ada"}]})).unwrap();
        assert_eq!(rows, "| name |\n| --- |\n| Ada |");
        let raw = render_tool_result(&json!({"total": 0})).unwrap();
        assert!(raw.contains("\"total\": 0"));
    }
}
