use tracing::debug;

use crate::domain::{IncomeSource, MonthKey, Paycheck};

/// Projects the paycheck occurrences of every active source that fall in `period`.
///
/// Paychecks are ordered by date; same-day paychecks keep the order of `sources`.
pub fn project_paychecks(sources: &[IncomeSource], period: MonthKey) -> Vec<Paycheck> {
    let mut paychecks: Vec<Paycheck> = sources
        .iter()
        .filter(|source| source.is_active)
        .flat_map(|source| {
            source
                .pay_dates_in(period)
                .into_iter()
                .map(move |date| Paycheck::from_source(source, date))
        })
        .collect();
    paychecks.sort_by_key(|paycheck| paycheck.date);
    debug!(%period, count = paychecks.len(), "projected paychecks");
    paychecks
}
