use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One CSV row before numeric fields have been interpreted.
#[derive(Debug, Deserialize)]
pub(crate) struct RuleRow {
    pub(crate) id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) keywords: Option<String>,
    pub(crate) department_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) priority: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) confidence_weight: Option<String>,
}

impl RuleRow {
    pub(crate) fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .map(|raw| raw.split([',', ';']).collect())
            .unwrap_or_default()
    }
}

/// Rows paired with their 1-based line number in the source file.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<(u64, RuleRow)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        let row: RuleRow = record.deserialize(Some(&headers))?;
        rows.push((line, row));
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
