pub mod rules_import;
pub mod triage;
