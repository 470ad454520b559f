//! Project-level properties, decoded purely from property-store keys. The
//! same routine serves every generation since the stores normalize to the
//! same key space once parsed.

use crate::decode::props::{keys, Props};
use crate::model::{ProjectFile, ScheduleFrom, TimeUnit};

pub(crate) fn apply(props: &Props, file: &mut ProjectFile) {
    let p = &mut file.properties;

    p.start_date = props.timestamp(keys::PROJECT_START_DATE);
    p.finish_date = props.timestamp(keys::PROJECT_FINISH_DATE);
    p.status_date = props.timestamp(keys::STATUS_DATE);
    p.schedule_from = if props.short(keys::SCHEDULE_FROM) == 1 {
        ScheduleFrom::Finish
    } else {
        ScheduleFrom::Start
    };
    if props.has(keys::DEFAULT_START_TIME) {
        p.default_start_time = props.time(keys::DEFAULT_START_TIME);
    }
    if props.has(keys::DURATION_UNITS) {
        p.default_duration_units = TimeUnit::from_code(props.byte(keys::DURATION_UNITS));
    }

    // Working-time settings keep their defaults when absent or zero; a
    // zero here would wreck every duration conversion downstream.
    let minutes_per_day = props.int(keys::MINUTES_PER_DAY);
    if minutes_per_day != 0 {
        p.minutes_per_day = minutes_per_day;
    }
    let minutes_per_week = props.int(keys::MINUTES_PER_WEEK);
    if minutes_per_week != 0 {
        p.minutes_per_week = minutes_per_week;
    }
    let days_per_month = props.int(keys::DAYS_PER_MONTH);
    if days_per_month != 0 {
        p.days_per_month = days_per_month;
    }

    let symbol = props.unicode_string(keys::CURRENCY_SYMBOL);
    if !symbol.is_empty() {
        p.currency_symbol = Some(symbol);
    }
    if props.has(keys::CURRENCY_DIGITS) {
        p.currency_digits = Some(props.short(keys::CURRENCY_DIGITS));
    }
}
