//! Rental price derivation.
//!
//! A rental is billed per calendar day between its start and end dates, with a
//! floor of one day: same-day and inverted ranges are charged as a single day
//! rather than rejected.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Number of days charged for a rental from `start` to `end`, never less than 1.
pub fn billable_days(start: NaiveDate, end: NaiveDate) -> i64 {
    // ---
    (end - start).num_days().max(1)
}

/// Total price of a rental at `daily_rate`, computed once at booking time.
pub fn rental_total(start: NaiveDate, end: NaiveDate, daily_rate: Decimal) -> Decimal {
    // ---
    Decimal::from(billable_days(start, end)) * daily_rate
}
