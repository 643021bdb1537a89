//! Contiguous daily calendar sequences.
//!
//! Used as the driving side of a left-outer merge against sparse activity so
//! days without deliveries or issuances still show up with zero counts.

use std::iter::FusedIterator;

use chrono::NaiveDate;

use warehouse_core::{AnalyticsError, AnalyticsResult};

/// Lazy iterator over consecutive dates, both endpoints included.
///
/// Consuming it does not restart it; clone it first to enumerate twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSeries {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

/// Daily series from `start` through `end` inclusive.
///
/// Fails with [`AnalyticsError::InvalidRange`] when `start > end`.
pub fn date_series(start: NaiveDate, end: NaiveDate) -> AnalyticsResult<DateSeries> {
    if start > end {
        return Err(AnalyticsError::invalid_range(start, end));
    }
    Ok(DateSeries {
        next: Some(start),
        end,
    })
}

impl Iterator for DateSeries {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.end {
            current.succ_opt()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map_or(0, |d| (self.end - d).num_days() as usize + 1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateSeries {}

impl FusedIterator for DateSeries {}
