use serde::Serialize;

use super::params::Transition;
use crate::eligibility::timestamp::Timestamp;

/// Half-open interval `[start, end)` during which a group was held without a break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeldRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl HeldRange {
    /// Whole days between the range boundaries.
    pub fn days(&self) -> i64 {
        self.start.days_until(&self.end)
    }
}

/// One decoded log entry about the group under consideration.
#[derive(Debug, Clone)]
pub(crate) struct LogEvent {
    pub timestamp: Timestamp,
    pub transition: Transition,
}

struct OpenRange {
    start: Timestamp,
    expiry: Option<Timestamp>,
    /// Last entry that showed the group as held.
    confirmed: Timestamp,
}

/// Rebuild the disjoint ranges during which the group was held up to `deadline`.
pub(crate) fn held_ranges(mut events: Vec<LogEvent>, deadline: &Timestamp) -> Vec<HeldRange> {
    events.retain(|event| &event.timestamp <= deadline);
    events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let mut ranges = Vec::new();
    let mut open: Option<OpenRange> = None;

    for event in events {
        if let Some(current) = open.take() {
            match current.expiry {
                Some(expiry) if expiry <= event.timestamp => ranges.push(HeldRange {
                    start: current.start,
                    end: expiry,
                }),
                _ => open = Some(current),
            }
        }

        let Transition {
            had_before,
            has_after,
            expiry,
        } = event.transition;

        open = match (open, has_after) {
            (None, true) => Some(OpenRange {
                start: event.timestamp.clone(),
                expiry,
                confirmed: event.timestamp,
            }),
            // The log says the group had lapsed without an entry recording it; the
            // earlier range can only be trusted up to its last confirmation.
            (Some(current), true) if !had_before => {
                ranges.push(HeldRange {
                    start: current.start,
                    end: current.confirmed,
                });
                Some(OpenRange {
                    start: event.timestamp.clone(),
                    expiry,
                    confirmed: event.timestamp,
                })
            }
            (Some(current), true) => Some(OpenRange {
                start: current.start,
                expiry,
                confirmed: event.timestamp,
            }),
            (Some(current), false) => {
                ranges.push(HeldRange {
                    start: current.start,
                    end: event.timestamp,
                });
                None
            }
            (None, false) => None,
        };
    }

    if let Some(current) = open {
        let end = match current.expiry {
            Some(expiry) if &expiry < deadline => expiry,
            _ => deadline.clone(),
        };
        ranges.push(HeldRange {
            start: current.start,
            end,
        });
    }

    ranges.retain(|range| range.start < range.end);
    ranges
}
