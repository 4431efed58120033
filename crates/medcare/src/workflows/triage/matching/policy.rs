use super::super::domain::{DepartmentId, Doctor, DoctorId};
use super::rules::RuleScore;

/// Whether `candidate` displaces the current best match.
///
/// Higher confidence wins outright; an exact tie goes to the numerically lower priority.
/// Anything else keeps the incumbent, so the earliest rule in input order holds equal ground.
pub(crate) fn outranks(candidate: &RuleScore, incumbent: &RuleScore) -> bool {
    if candidate.confidence > incumbent.confidence {
        return true;
    }

    #[allow(clippy::float_cmp)]
    let tied = candidate.confidence == incumbent.confidence;
    tied && candidate.priority < incumbent.priority
}

pub(crate) fn best_score(scores: &[RuleScore]) -> Option<&RuleScore> {
    let mut best: Option<&RuleScore> = None;
    for score in scores {
        match best {
            Some(incumbent) if !outranks(score, incumbent) => {}
            _ => best = Some(score),
        }
    }
    best
}

/// First available doctor of the department, in roster order.
pub(crate) fn select_doctor(doctors: &[Doctor], department_id: &DepartmentId) -> Option<DoctorId> {
    doctors
        .iter()
        .find(|doctor| doctor.is_available && &doctor.department_id == department_id)
        .map(|doctor| doctor.id.clone())
}

/// Round to the nearest hundredth and keep the result inside `[0, 1]`.
pub(crate) fn round_confidence(confidence: f64) -> f64 {
    let rounded = (confidence * 100.0).round() / 100.0;
    rounded.clamp(0.0, 1.0)
}
