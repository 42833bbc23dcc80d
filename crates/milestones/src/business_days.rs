use crate::date::CalendarDate;

const BUSINESS_DAYS_PER_WEEK: i64 = 5;

/// Number of business days (Monday to Friday, no holidays) after `start` up
/// to and including `end`.
///
/// Returns 0 when `end` is not after `start`. Callers pick the argument
/// order from the milestone that is expected to happen first.
pub fn business_days_between(start: CalendarDate, end: CalendarDate) -> u32 {
    let days = end.days_since(start);
    if days <= 0 {
        return 0;
    }

    let full_weeks = days / 7;
    let start_weekday = i64::from(start.weekday().num_days_from_monday());
    let remainder: i64 = (1..=days % 7)
        .filter(|offset| (start_weekday + offset) % 7 < BUSINESS_DAYS_PER_WEEK)
        .map(|_| 1)
        .sum();

    let count = full_weeks * BUSINESS_DAYS_PER_WEEK + remainder;
    u32::try_from(count).unwrap_or(u32::MAX)
}
