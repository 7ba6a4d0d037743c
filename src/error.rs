//! Planner failures surfaced to callers.

use thiserror::Error;

use crate::common::Position;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("agent {agent}: no path from {from:?} to {to:?}")]
    Unreachable {
        agent: usize,
        from: Position,
        to: Position,
    },

    #[error("agent {agent}: position {position:?} is outside the grid or blocked")]
    InvalidPosition { agent: usize, position: Position },

    #[error("task or drop cell {position:?} is outside the grid or blocked")]
    InvalidTask { position: Position },

    #[error("expected {expected} agents, found {found}")]
    AgentCount { expected: usize, found: usize },

    #[error("agent {agent} has neither tasks nor a goal")]
    MissingGoal { agent: usize },
}

pub type PlanResult<T> = Result<T, PlanError>;
