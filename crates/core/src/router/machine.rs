use crate::event::{ClassifyError, IngestionEvent, Tier};

use super::types::{InvocationPath, RoutingDecision, UnitSelection};

/// Decision states of a run, traversed in order.
///
/// `SizeCheck` picks the invocation path, `TierCheck` places the event on
/// the tier axis (the terminal tier short-circuits straight to the model
/// load), `FormatCheck` places it on the format axis. Any state can drop
/// into `Rejected` and no state ever falls back to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    SizeCheck,
    TierCheck {
        path: InvocationPath,
    },
    FormatCheck {
        path: InvocationPath,
        tier: Tier,
    },
    /// Classification finished; a unit is selected.
    Decided {
        decision: RoutingDecision,
    },
    /// Classification failed; the run is terminal without an invocation.
    Rejected {
        error: ClassifyError,
    },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Decided { .. } | RunState::Rejected { .. })
    }

    /// Advance one decision state.
    ///
    /// The boundary value routes to the fast path: `file_size <= threshold`.
    pub fn step(self, event: &IngestionEvent, size_threshold: u64) -> RunState {
        match self {
            RunState::SizeCheck => {
                let path = if event.file_size <= size_threshold {
                    InvocationPath::Fast
                } else {
                    InvocationPath::Batch
                };
                RunState::TierCheck { path }
            }
            RunState::TierCheck { path } => match event.tier() {
                // Terminal tier bypasses the format and size axes.
                Ok(Tier::Application) => RunState::Decided {
                    decision: RoutingDecision {
                        selection: UnitSelection::ModelLoad,
                        next_tier: None,
                    },
                },
                Ok(tier) => RunState::FormatCheck { path, tier },
                Err(error) => RunState::Rejected { error },
            },
            RunState::FormatCheck { path, tier } => match event.data_format() {
                Ok(format) => {
                    let selection = match path {
                        InvocationPath::Fast => UnitSelection::FastConvert { tier, format },
                        InvocationPath::Batch => UnitSelection::BatchConvert { tier, format },
                    };
                    RunState::Decided {
                        decision: RoutingDecision {
                            selection,
                            next_tier: tier.next(),
                        },
                    }
                }
                Err(error) => RunState::Rejected { error },
            },
            terminal => terminal,
        }
    }

    /// Drive the machine from `SizeCheck` to a terminal state.
    pub fn run_to_completion(event: &IngestionEvent, size_threshold: u64) -> RunState {
        let mut state = RunState::SizeCheck;
        while !state.is_terminal() {
            state = state.step(event, size_threshold);
        }
        state
    }
}
