use serde::Serialize;

use crate::models::profile::Profile;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionStep {
    pub label: &'static str,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionReport {
    pub steps: Vec<CompletionStep>,
    pub completed: usize,
    pub total: usize,
    /// Whole percent, rounded down.
    pub percent: u8,
}

/// Checklist shown on the dashboard. A missing profile has every step open.
pub fn completion_report(profile: Option<&Profile>) -> CompletionReport {
    let steps = vec![
        CompletionStep {
            label: "Basic Info",
            completed: profile.is_some_and(|p| !p.name.is_empty() && !p.role.is_empty()),
        },
        CompletionStep {
            label: "Experience",
            completed: profile.is_some_and(|p| p.years_of_experience > 0 && !p.location.is_empty()),
        },
        CompletionStep {
            label: "Interview Rate",
            completed: profile
                .is_some_and(|p| p.interview_rate > 0 && !p.interview_rate_currency.is_empty()),
        },
        CompletionStep {
            label: "Published Profile",
            completed: profile.is_some_and(|p| p.is_published),
        },
    ];

    let completed = steps.iter().filter(|s| s.completed).count();
    let total = steps.len();
    CompletionReport {
        percent: (completed * 100 / total) as u8,
        steps,
        completed,
        total,
    }
}
