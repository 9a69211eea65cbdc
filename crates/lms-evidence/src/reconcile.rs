//! Roster / completion reconciliation
//!
//! `completed` and `not_completed` always partition the roster's emails.

use std::collections::BTreeSet;

use drata_client::Roster;
use serde::Serialize;

use crate::completions::CompletionSet;

/// Sets derived from one roster snapshot and the completion set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSets {
    /// On the roster and in the completion set
    pub completed: BTreeSet<String>,
    /// On the roster but not in the completion set
    pub not_completed: BTreeSet<String>,
    /// In the completion set with no roster record
    pub unmatched_completions: BTreeSet<String>,
}

impl MatchSets {
    /// Partition the roster by completion-set membership
    pub fn compute(roster: &Roster, completions: &CompletionSet) -> Self {
        let mut sets = MatchSets::default();

        for email in roster.emails() {
            if completions.contains(email) {
                sets.completed.insert(email.to_string());
            } else {
                sets.not_completed.insert(email.to_string());
            }
        }

        sets.unmatched_completions = completions
            .iter()
            .filter(|email| !roster.contains(email))
            .map(str::to_string)
            .collect();

        sets
    }
}
