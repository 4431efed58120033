//! Bulk loading of matching rules from CSV exports.
//!
//! Expected header: `id,keywords,department_id,priority,confidence_weight`. Keywords are
//! separated by commas or semicolons inside the (quoted) field. Blank priority and weight
//! cells take the same defaults as rules created through the catalog.

mod parser;

use crate::workflows::triage::catalog::DEFAULT_CONFIDENCE_WEIGHT;
use crate::workflows::triage::domain::{normalize_keywords, DepartmentId, MatchingRule, RuleId};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;

#[derive(Debug)]
pub enum RuleImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RuleImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleImportError::Io(err) => write!(f, "failed to read rule export: {}", err),
            RuleImportError::Csv(err) => write!(f, "invalid rule CSV data: {}", err),
        }
    }
}

impl std::error::Error for RuleImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuleImportError::Io(err) => Some(err),
            RuleImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RuleImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RuleImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A row that could not become a rule. The rest of the file still imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub rule_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleImport {
    pub rules: Vec<MatchingRule>,
    pub rejected: Vec<RejectedRow>,
}

pub struct RuleImporter;

impl RuleImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RuleImport, RuleImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RuleImport, RuleImportError> {
        let mut import = RuleImport::default();

        for (line, row) in parser::parse_rows(reader)? {
            match build_rule(&row) {
                Ok(rule) => import.rules.push(rule),
                Err(reason) => {
                    warn!(line, rule_id = %row.id, %reason, "skipping unusable rule row");
                    import.rejected.push(RejectedRow {
                        line,
                        rule_id: row.id.clone(),
                        reason,
                    });
                }
            }
        }

        Ok(import)
    }
}

fn build_rule(row: &parser::RuleRow) -> Result<MatchingRule, String> {
    if row.id.is_empty() {
        return Err("missing rule id".to_string());
    }
    if row.department_id.is_empty() {
        return Err("missing department id".to_string());
    }

    let keywords = normalize_keywords(row.keyword_list());
    if keywords.is_empty() {
        return Err("no keywords".to_string());
    }

    let priority = match row.priority.as_deref() {
        None => 1,
        Some(raw) => match raw.parse::<u32>() {
            Ok(value) if value >= 1 => value,
            _ => return Err(format!("unparseable priority '{raw}'")),
        },
    };

    let confidence_weight = match row.confidence_weight.as_deref() {
        None => DEFAULT_CONFIDENCE_WEIGHT,
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && (0.0..=1.0).contains(&value) => value,
            _ => return Err(format!("unparseable confidence weight '{raw}'")),
        },
    };

    Ok(MatchingRule {
        id: RuleId(row.id.clone()),
        keywords,
        department_id: DepartmentId(row.department_id.clone()),
        priority,
        confidence_weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EXPORT: &str = "\
id,keywords,department_id,priority,confidence_weight
1,\"chest pain, heart, palpitations\",2,1,0.9
2,headache;migraine,4,high,0.85
3,,3,2,0.8
4,\"Rash, ITCHING\",5,,0.85
5,fever,1,3,1.4
";

    #[test]
    fn imports_valid_rows_and_reports_rejected_lines() {
        let import = RuleImporter::from_reader(Cursor::new(EXPORT)).expect("csv parses");

        let ids: Vec<&str> = import.rules.iter().map(|rule| rule.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(
            import.rules[0].keywords,
            vec!["chest pain", "heart", "palpitations"]
        );
        assert_eq!(import.rules[1].keywords, vec!["rash", "itching"]);
        assert_eq!(import.rules[1].priority, 1, "blank priority defaults to 1");

        let rejected: Vec<(u64, &str)> = import
            .rejected
            .iter()
            .map(|row| (row.line, row.rule_id.as_str()))
            .collect();
        assert_eq!(rejected, vec![(3, "2"), (4, "3"), (6, "5")]);
        assert!(import.rejected[0].reason.contains("priority"));
        assert!(import.rejected[2].reason.contains("confidence weight"));
    }

    #[test]
    fn missing_columns_fail_the_import() {
        let err = RuleImporter::from_reader(Cursor::new("id,keywords\n1,heart\n"))
            .expect_err("department column required");
        assert!(matches!(err, RuleImportError::Csv(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RuleImporter::from_path("/nonexistent/rules.csv").expect_err("no such file");
        assert!(matches!(err, RuleImportError::Io(_)));
    }
}
