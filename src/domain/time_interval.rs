use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::common::{days_in_month, DateWindow};

const MAX_OCCURRENCES_PER_WINDOW: usize = 64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

/// A recurrence step: `every` units of `unit`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub const fn new(every: u32, unit: TimeUnit) -> Self {
        Self { every, unit }
    }

    pub fn label(&self) -> String {
        match (self.every, self.unit) {
            (1, TimeUnit::Day) => "Daily".into(),
            (1, TimeUnit::Week) => "Weekly".into(),
            (2, TimeUnit::Week) => "Bi-weekly".into(),
            (1, TimeUnit::Month) => "Monthly".into(),
            (3, TimeUnit::Month) => "Quarterly".into(),
            (1, TimeUnit::Year) => "Yearly".into(),
            (n, unit) => format!("Every {} {:?}{}", n, unit, if n > 1 { "s" } else { "" }),
        }
    }

    /// Date of the `index`-th occurrence counted from `anchor` (index 0 is the anchor).
    ///
    /// Month and year steps are always measured from the anchor, so a 31st anchor
    /// lands on the last day of short months without drifting afterwards.
    pub fn nth_occurrence(&self, anchor: NaiveDate, index: u32) -> NaiveDate {
        let steps = i64::from(index) * i64::from(self.every);
        match self.unit {
            TimeUnit::Day => anchor + Duration::days(steps),
            TimeUnit::Week => anchor + Duration::weeks(steps),
            TimeUnit::Month => shift_month(anchor, steps),
            TimeUnit::Year => shift_month(anchor, steps * 12),
        }
    }

    /// Index of the first occurrence on or after `date`.
    pub fn first_index_on_or_after(&self, anchor: NaiveDate, date: NaiveDate) -> u32 {
        if date <= anchor || self.every == 0 {
            return 0;
        }
        let estimate = match self.unit {
            TimeUnit::Day | TimeUnit::Week => {
                let step_days = match self.unit {
                    TimeUnit::Day => i64::from(self.every),
                    _ => i64::from(self.every) * 7,
                };
                (date - anchor).num_days() / step_days
            }
            TimeUnit::Month | TimeUnit::Year => {
                let step_months = match self.unit {
                    TimeUnit::Month => i64::from(self.every),
                    _ => i64::from(self.every) * 12,
                };
                let months = i64::from(date.year() - anchor.year()) * 12
                    + i64::from(date.month())
                    - i64::from(anchor.month());
                (months / step_months - 1).max(0)
            }
        };
        let mut index = u32::try_from(estimate.max(0)).unwrap_or(u32::MAX);
        while self.nth_occurrence(anchor, index) < date {
            index += 1;
        }
        index
    }

    /// All occurrences anchored at `anchor` that fall inside `window`, bounded by `until`.
    pub fn occurrences_in(
        &self,
        anchor: NaiveDate,
        window: DateWindow,
        until: Option<NaiveDate>,
    ) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        if self.every == 0 {
            if window.contains(anchor) && until.map_or(true, |end| anchor <= end) {
                dates.push(anchor);
            }
            return dates;
        }
        let from = window.start.max(anchor);
        let mut index = self.first_index_on_or_after(anchor, from);
        while dates.len() < MAX_OCCURRENCES_PER_WINDOW {
            let candidate = self.nth_occurrence(anchor, index);
            if candidate >= window.end || until.is_some_and(|end| candidate > end) {
                break;
            }
            dates.push(candidate);
            index += 1;
        }
        dates
    }
}

fn shift_month(date: NaiveDate, months: i64) -> NaiveDate {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = total.div_euclid(12) as i32;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_steps_clamp_without_drift() {
        let monthly = TimeInterval::new(1, TimeUnit::Month);
        let anchor = date(2024, 1, 31);
        assert_eq!(monthly.nth_occurrence(anchor, 1), date(2024, 2, 29));
        assert_eq!(monthly.nth_occurrence(anchor, 2), date(2024, 3, 31));
        assert_eq!(monthly.nth_occurrence(anchor, 11), date(2024, 12, 31));
        assert_eq!(monthly.nth_occurrence(anchor, 13), date(2025, 2, 28));
    }

    #[test]
    fn first_index_skips_past_occurrences() {
        let biweekly = TimeInterval::new(2, TimeUnit::Week);
        let anchor = date(2024, 1, 1);
        let index = biweekly.first_index_on_or_after(anchor, date(2024, 2, 1));
        assert_eq!(biweekly.nth_occurrence(anchor, index), date(2024, 2, 12));
        assert_eq!(biweekly.first_index_on_or_after(anchor, date(2023, 6, 1)), 0);
    }

    #[test]
    fn occurrences_respect_window_and_end() {
        let weekly = TimeInterval::new(1, TimeUnit::Week);
        let window = DateWindow::new(date(2024, 3, 1), date(2024, 4, 1)).unwrap();
        let dates = weekly.occurrences_in(date(2024, 2, 2), window, Some(date(2024, 3, 20)));
        assert_eq!(
            dates,
            vec![date(2024, 3, 1), date(2024, 3, 8), date(2024, 3, 15)]
        );
    }

    #[test]
    fn labels_common_cadences() {
        assert_eq!(TimeInterval::new(2, TimeUnit::Week).label(), "Bi-weekly");
        assert_eq!(TimeInterval::new(4, TimeUnit::Day).label(), "Every 4 Days");
    }
}
