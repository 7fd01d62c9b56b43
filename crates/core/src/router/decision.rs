use crate::event::{ClassifyError, IngestionEvent};

use super::machine::RunState;
use super::types::RoutingDecision;

/// Classify an event into a routing decision.
///
/// Pure and deterministic: the same event and threshold always produce
/// the same decision. Drives the decision state machine to its terminal
/// state.
pub fn classify(
    event: &IngestionEvent,
    size_threshold: u64,
) -> Result<RoutingDecision, ClassifyError> {
    match RunState::run_to_completion(event, size_threshold) {
        RunState::Decided { decision } => Ok(decision),
        RunState::Rejected { error } => Err(error),
        // run_to_completion only returns terminal states
        other => unreachable!("non-terminal state {:?}", other),
    }
}
