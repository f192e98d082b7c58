pub mod engine;
pub mod states;

pub use engine::{HurTransitionError, HurWorkflow};
pub use states::{
    next_status, HurAction, HurActionKind, TransitionOutcome, FORWARD_SEQUENCE, REJECTION_COMMENT,
};
