//! Validated drafts for the reference data the matching engine reads.

use serde::{Deserialize, Serialize};

use super::domain::{
    normalize_keywords, Department, DepartmentId, Doctor, DoctorId, MatchingRule, RuleId,
};
use super::intake::looks_like_email;

/// Default weight offered by the rule editor.
pub const DEFAULT_CONFIDENCE_WEIGHT: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("keywords are required")]
    MissingKeywords,
    #[error("priority must be at least 1")]
    InvalidPriority,
    #[error("confidence weight {0} must be between 0 and 1")]
    InvalidConfidenceWeight(f64),
    #[error("department id is required")]
    MissingDepartment,
    #[error("name is required")]
    MissingName,
    #[error("email '{0}' is not a valid address")]
    InvalidEmail(String),
}

/// Keywords as sent by clients: either a list or one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordInput {
    List(Vec<String>),
    Text(String),
}

impl KeywordInput {
    pub fn normalized(&self) -> Vec<String> {
        match self {
            KeywordInput::List(keywords) => normalize_keywords(keywords),
            KeywordInput::Text(text) => normalize_keywords(text.split(',')),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDraft {
    pub keywords: KeywordInput,
    pub department_id: DepartmentId,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_confidence_weight")]
    pub confidence_weight: f64,
}

fn default_priority() -> u32 {
    1
}

fn default_confidence_weight() -> f64 {
    DEFAULT_CONFIDENCE_WEIGHT
}

impl RuleDraft {
    pub fn into_rule(self, id: RuleId) -> Result<MatchingRule, CatalogError> {
        let keywords = self.keywords.normalized();
        if keywords.is_empty() {
            return Err(CatalogError::MissingKeywords);
        }
        if self.department_id.as_str().trim().is_empty() {
            return Err(CatalogError::MissingDepartment);
        }
        if self.priority == 0 {
            return Err(CatalogError::InvalidPriority);
        }
        let weight = self.confidence_weight;
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(CatalogError::InvalidConfidenceWeight(weight));
        }

        Ok(MatchingRule {
            id,
            keywords,
            department_id: self.department_id,
            priority: self.priority,
            confidence_weight: weight,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorDraft {
    pub name: String,
    pub email: String,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

impl DoctorDraft {
    pub fn into_doctor(self, id: DoctorId) -> Result<Doctor, CatalogError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::MissingName);
        }
        let email = self.email.trim().to_string();
        if !looks_like_email(&email) {
            return Err(CatalogError::InvalidEmail(email));
        }
        if self.department_id.as_str().trim().is_empty() {
            return Err(CatalogError::MissingDepartment);
        }

        Ok(Doctor {
            id,
            name,
            email,
            department_id: self.department_id,
            specialization: self
                .specialization
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            is_available: self.is_available,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl DepartmentDraft {
    pub fn into_department(self, id: DepartmentId) -> Result<Department, CatalogError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::MissingName);
        }

        Ok(Department {
            id,
            name,
            description: self.description,
            is_active: self.is_active,
        })
    }
}
