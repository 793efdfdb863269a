//! Markup for the analysis region.
//!
//! Only engine result fields reach the markup, and every one of them is
//! escaped. Raw event content never does.

use serde_json::Value;

use crate::model::AnalysisResult;

#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Strings render as-is; any other JSON value renders as its JSON text.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn push_row(out: &mut String, class: &str, label: &str, value: Option<&Value>) {
    if let Some(value) = value.and_then(display_value) {
        out.push_str(&format!(
            "<p class=\"{class}\"><strong>{label}:</strong> {}</p>",
            escape_html(&value)
        ));
    }
}

#[must_use]
pub fn analysis_markup(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<p class=\"mode\">{}</p>",
        escape_html(&result.mode)
    ));
    push_row(&mut out, "level", "Level", result.fus_level.as_ref());
    push_row(
        &mut out,
        "invariant",
        "Affected invariant",
        result.affected_invariant.as_ref(),
    );
    push_row(
        &mut out,
        "perturbation",
        "Perturbation",
        result.perturbation_type.as_ref(),
    );
    push_row(
        &mut out,
        "temperament",
        "Temperament",
        result.temperament_hint.as_ref(),
    );

    out.push_str("<p class=\"summary\">");
    let lines: Vec<String> = result.summary.lines().map(escape_html).collect();
    out.push_str(&lines.join("<br>"));
    out.push_str("</p>");
    out
}

/// Plain paragraph for fixed status messages.
#[must_use]
pub fn message_markup(message: &str) -> String {
    format!("<p class=\"status\">{}</p>", escape_html(message))
}
