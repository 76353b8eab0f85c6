//! Predicate outcomes reported to the host scheduler.

use std::fmt;

use serde::Serialize;

use crate::error::SchedulerError;

/// Result of a pre-filter or filter call.
///
/// `Unschedulable` is a normal negative answer for one node. `Error` during
/// pre-filter fails the whole cycle; during filter it only excludes that node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "reason", rename_all = "snake_case")]
pub enum PredicateStatus {
    Success,
    Unschedulable(String),
    Error(String),
}

impl PredicateStatus {
    pub fn unschedulable(reason: impl Into<String>) -> Self {
        Self::Unschedulable(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Unschedulable(reason) | Self::Error(reason) => Some(reason),
        }
    }
}

impl From<SchedulerError> for PredicateStatus {
    fn from(err: SchedulerError) -> Self {
        Self::Error(err.to_string())
    }
}

impl fmt::Display for PredicateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Unschedulable(reason) => write!(f, "Unschedulable: {reason}"),
            Self::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}
