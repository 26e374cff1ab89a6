//! Transition detection between consecutive membership observations.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::membership::{MembershipResult, Transition};

/// Classifies a membership change.
///
/// | was inside | is inside | result |
/// |---|---|---|
/// | false | true | `Enter` |
/// | true | false | `Exit` |
/// | true | true | `Inside` |
/// | false | false | `None` |
pub fn classify(is_inside: bool, was_inside: bool) -> Transition {
    match (was_inside, is_inside) {
        (false, true) => Transition::Enter,
        (true, false) => Transition::Exit,
        (true, true) => Transition::Inside,
        (false, false) => Transition::None,
    }
}

/// Fills in the transition of every result given the geofences the actor
/// was inside at the previous observation.
pub fn apply_transitions(results: &mut [MembershipResult], previously_inside: &HashSet<Uuid>) {
    for result in results.iter_mut() {
        result.transition = classify(
            result.inside,
            previously_inside.contains(&result.geofence_id),
        );
    }
}
