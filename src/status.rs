// Status normalization.
//
// Project statuses arrive as free text ("on-going", "ONGOING", "Under
// Procurement - Stage 2", ...). This module collapses them into the fixed
// seven-value taxonomy the rest of the system renders. There is exactly one
// pattern table; screens must not grow their own.
use serde::{Deserialize, Serialize};

/// Closed set of project states. Adding a value is a breaking change for
/// downstream consumers, which render these with fixed labels and colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalStatus {
    Completed,
    Ongoing,
    NotStarted,
    Stalled,
    UnderProcurement,
    Suspended,
    Other,
}

/// Substring patterns checked in priority order; the first group with any
/// match wins, so multi-match strings resolve deterministically.
///
/// Ordering notes:
/// - "procurement" first, so "procurement completed" stays a procurement
///   stage rather than a completed project;
/// - "not started" before anything that could match its tail;
/// - "stall" ahead of "suspend" (a string naming both is treated as
///   stalled; the two remain distinct buckets).
const PATTERNS: &[(&[&str], CanonicalStatus)] = &[
    (&["procurement"], CanonicalStatus::UnderProcurement),
    (
        &["not started", "not-started", "not commenced", "yet to start"],
        CanonicalStatus::NotStarted,
    ),
    (&["completed", "complete"], CanonicalStatus::Completed),
    (&["stall"], CanonicalStatus::Stalled),
    (&["suspend"], CanonicalStatus::Suspended),
    (
        &["ongoing", "on-going", "on going", "in progress", "in-progress"],
        CanonicalStatus::Ongoing,
    ),
];

impl CanonicalStatus {
    pub const ALL: [CanonicalStatus; 7] = [
        CanonicalStatus::Completed,
        CanonicalStatus::Ongoing,
        CanonicalStatus::NotStarted,
        CanonicalStatus::Stalled,
        CanonicalStatus::UnderProcurement,
        CanonicalStatus::Suspended,
        CanonicalStatus::Other,
    ];

    /// Fixed display label, also the wire label the UI renders.
    pub fn label(self) -> &'static str {
        match self {
            CanonicalStatus::Completed => "Completed",
            CanonicalStatus::Ongoing => "Ongoing",
            CanonicalStatus::NotStarted => "Not Started",
            CanonicalStatus::Stalled => "Stalled",
            CanonicalStatus::UnderProcurement => "Under Procurement",
            CanonicalStatus::Suspended => "Suspended",
            CanonicalStatus::Other => "Other",
        }
    }

    /// Map an arbitrary status string to its canonical value.
    ///
    /// Total and pure: case-insensitive substring matching over `PATTERNS`,
    /// anything unmatched (including empty input) is `Other`. Feeding a
    /// canonical label back in returns the same value.
    pub fn normalize(raw: &str) -> CanonicalStatus {
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() {
            return CanonicalStatus::Other;
        }
        for (needles, status) in PATTERNS {
            if needles.iter().any(|n| lowered.contains(n)) {
                return *status;
            }
        }
        CanonicalStatus::Other
    }
}
