/// Wire types for the Google Sheets v4 values API.
/// Endpoint: {base}/v4/spreadsheets/{id}/values/{range}?key={key}
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub major_dimension: String,
    /// Absent entirely when the requested range is empty.
    pub values: Option<Vec<Vec<Value>>>,
}

impl ValueRange {
    /// Cells as plain strings. Trailing empty cells are omitted by the API, so
    /// rows can be ragged.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

pub(crate) fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringifies_mixed_cells() {
        let raw = r#"{
            "range": "'Ali''s 32'!A1:Z1000",
            "majorDimension": "ROWS",
            "values": [["Arena", "Team 1 Number"], [1, null, true, "x"]]
        }"#;
        let parsed: ValueRange = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.major_dimension, "ROWS");
        let rows = parsed.into_rows();
        assert_eq!(rows[0], vec!["Arena", "Team 1 Number"]);
        assert_eq!(rows[1], vec!["1", "", "true", "x"]);
    }

    #[test]
    fn missing_values_means_no_rows() {
        let parsed: ValueRange = serde_json::from_str(r#"{"range": "A1:Z1000"}"#).unwrap();
        assert!(parsed.into_rows().is_empty());
    }
}
