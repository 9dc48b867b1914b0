// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for `ToolchainCluster` resources.
//!
//! # Condition Format
//!
//! - `type`: `Ready` or `Offline`
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the status last changed
//! - `lastUpdatedTime`: RFC3339 timestamp of the probe that produced the condition
//!
//! # Example
//!
//! ```rust,no_run
//! use toolchain_common::reconcilers::status::create_condition;
//!
//! let condition = create_condition(
//!     "Ready",
//!     "True",
//!     "ClusterReady",
//!     "/healthz responded with ok"
//! );
//! ```

use chrono::Utc;

use crate::crd::Condition;

/// Create a new condition with both timestamps set to the current time.
///
/// # Example
///
/// ```rust,no_run
/// # use toolchain_common::reconcilers::status::create_condition;
/// let condition = create_condition("Offline", "True", "ClusterNotReachable", "cluster is not reachable");
/// assert_eq!(condition.r#type, "Offline");
/// assert_eq!(condition.status, "True");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    create_condition_at(condition_type, status, reason, message, &Utc::now().to_rfc3339())
}

/// Create a new condition stamped with `timestamp` (RFC3339).
#[must_use]
pub fn create_condition_at(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    timestamp: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(timestamp.to_string()),
        last_updated_time: Some(timestamp.to_string()),
    }
}

/// Find a condition by type in a list of conditions.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Carry `lastTransitionTime` over from `previous` into `current`.
///
/// A freshly computed condition keeps its own timestamp unless a previous
/// condition has the same type and the same status, in which case the
/// previous transition time is copied. Conditions absent from `current` are
/// dropped.
///
/// # Example
///
/// ```
/// # use toolchain_common::reconcilers::status::{create_condition_at, preserve_transition_times};
/// let previous = vec![create_condition_at("Ready", "True", "ClusterReady", "ok", "2020-01-01T00:00:00Z")];
/// let mut current = vec![create_condition_at("Ready", "True", "ClusterReady", "ok", "2024-05-01T10:00:00Z")];
///
/// preserve_transition_times(&previous, &mut current);
/// assert_eq!(current[0].last_transition_time.as_deref(), Some("2020-01-01T00:00:00Z"));
/// assert_eq!(current[0].last_updated_time.as_deref(), Some("2024-05-01T10:00:00Z"));
/// ```
pub fn preserve_transition_times(previous: &[Condition], current: &mut [Condition]) {
    for condition in current.iter_mut() {
        let unchanged = previous
            .iter()
            .find(|p| p.r#type == condition.r#type && p.status == condition.status);
        if let Some(time) = unchanged.and_then(|p| p.last_transition_time.clone()) {
            condition.last_transition_time = Some(time);
        }
    }
}

/// Compare two lists of conditions for semantic equality.
///
/// Types, statuses, reasons and messages are compared; timestamps are not.
/// Order does not matter.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        find_condition(current, &new_cond.r#type).is_some_and(|curr_cond| {
            curr_cond.status == new_cond.status
                && curr_cond.reason == new_cond.reason
                && curr_cond.message == new_cond.message
        })
    })
}
