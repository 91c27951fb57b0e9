use crate::model::ReportData;

/// Render the report as one pretty-printed JSON document.
pub fn render_json_report(data: &ReportData) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}
