use serde::{Deserialize, Serialize};

use super::super::domain::{DepartmentId, MatchingRule, RuleId};

/// Reason a rule was left out of a scan. Recoverable: the remaining rules still score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MalformedRule {
    #[error("rule {rule_id} has no usable keywords")]
    NoKeywords { rule_id: RuleId },
    #[error("rule {rule_id} has priority {priority}; priorities start at 1")]
    InvalidPriority { rule_id: RuleId, priority: u32 },
    #[error("rule {rule_id} has confidence weight {weight}; expected a value in [0, 1]")]
    InvalidConfidenceWeight { rule_id: RuleId, weight: f64 },
}

/// Audit entry for a rule that matched at least one keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScore {
    pub rule_id: RuleId,
    pub department_id: DepartmentId,
    pub priority: u32,
    pub matched_keywords: Vec<String>,
    pub total_keywords: usize,
    pub confidence: f64,
}

/// Keywords the scan actually uses: lower-cased, blanks excluded.
pub(crate) fn effective_keywords(rule: &MatchingRule) -> Vec<String> {
    rule.keywords
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

pub(crate) fn validate_rule(rule: &MatchingRule) -> Result<Vec<String>, MalformedRule> {
    if rule.priority == 0 {
        return Err(MalformedRule::InvalidPriority {
            rule_id: rule.id.clone(),
            priority: rule.priority,
        });
    }

    let weight = rule.confidence_weight;
    if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
        return Err(MalformedRule::InvalidConfidenceWeight {
            rule_id: rule.id.clone(),
            weight,
        });
    }

    let keywords = effective_keywords(rule);
    if keywords.is_empty() {
        return Err(MalformedRule::NoKeywords {
            rule_id: rule.id.clone(),
        });
    }

    Ok(keywords)
}

/// Score one validated rule against the lower-cased haystack. `None` means no keyword hit.
pub(crate) fn score_rule(
    rule: &MatchingRule,
    keywords: Vec<String>,
    haystack: &str,
) -> Option<RuleScore> {
    let total_keywords = keywords.len();
    let matched_keywords: Vec<String> = keywords
        .into_iter()
        .filter(|keyword| haystack.contains(keyword.as_str()))
        .collect();

    if matched_keywords.is_empty() || total_keywords == 0 {
        return None;
    }

    let coverage = matched_keywords.len() as f64 / total_keywords as f64;
    Some(RuleScore {
        rule_id: rule.id.clone(),
        department_id: rule.department_id.clone(),
        priority: rule.priority,
        matched_keywords,
        total_keywords,
        confidence: coverage * rule.confidence_weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(keywords: &[&str], priority: u32, weight: f64) -> MatchingRule {
        MatchingRule {
            id: RuleId::from("r"),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            department_id: DepartmentId::from("2"),
            priority,
            confidence_weight: weight,
        }
    }

    #[test]
    fn substring_hits_are_not_limited_to_word_boundaries() {
        let rule = rule(&["heart"], 1, 1.0);
        let keywords = validate_rule(&rule).expect("valid rule");
        let score = score_rule(&rule, keywords, "heartburn after meals").expect("matches");
        assert_eq!(score.matched_keywords, vec!["heart".to_string()]);
        assert_eq!(score.confidence, 1.0);
    }

    #[test]
    fn raw_keywords_are_lowercased_before_matching() {
        let rule = rule(&["Chest Pain", "HEART"], 1, 0.9);
        let keywords = validate_rule(&rule).expect("valid rule");
        let score = score_rule(&rule, keywords, "experiencing chest pain").expect("matches");
        assert_eq!(score.total_keywords, 2);
        assert!((score.confidence - 0.45).abs() < 1e-12);
    }

    #[test]
    fn blank_only_keywords_are_malformed() {
        let rule = rule(&["", "   "], 1, 0.5);
        assert!(matches!(
            validate_rule(&rule),
            Err(MalformedRule::NoKeywords { .. })
        ));
    }

    #[test]
    fn out_of_range_weight_and_zero_priority_are_malformed() {
        assert!(matches!(
            validate_rule(&rule(&["rash"], 1, 1.5)),
            Err(MalformedRule::InvalidConfidenceWeight { .. })
        ));
        assert!(matches!(
            validate_rule(&rule(&["rash"], 1, f64::NAN)),
            Err(MalformedRule::InvalidConfidenceWeight { .. })
        ));
        assert!(matches!(
            validate_rule(&rule(&["rash"], 0, 0.5)),
            Err(MalformedRule::InvalidPriority { priority: 0, .. })
        ));
    }
}
