use chrono::prelude::*;
use chrono_tz::Tz;

/// Millis between the start of two consecutive days is not constant
/// because of DST, so the bounds of calendar days are always computed
/// in the reference timezone.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> Option<i64> {
    // Midnight does not exist on some DST transition days, fall back to the first valid hour
    (0..3)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.timestamp_millis())
}

pub fn local_date(timestamp_millis: i64, tz: &Tz) -> Option<NaiveDate> {
    Utc.timestamp_millis_opt(timestamp_millis)
        .single()
        .map(|dt| dt.with_timezone(tz).date_naive())
}

/// Bounds of the calendar day containing `now`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayBounds {
    pub yesterday_start: i64,
    pub today_start: i64,
    pub tomorrow_start: i64,
}

pub fn day_bounds(now: i64, tz: &Tz) -> Option<DayBounds> {
    let today = local_date(now, tz)?;
    Some(DayBounds {
        yesterday_start: start_of_day(today.pred_opt()?, tz)?,
        today_start: start_of_day(today, tz)?,
        tomorrow_start: start_of_day(today.succ_opt()?, tz)?,
    })
}

/// The first occurrence of the wall clock `time` in `tz` strictly after `after`.
/// Days where `time` does not exist (DST gap) are skipped.
pub fn next_daily_fire_time(after: i64, time: NaiveTime, tz: &Tz) -> Option<i64> {
    let mut date = local_date(after, tz)?;
    for _ in 0..3 {
        if let Some(fire) = tz.from_local_datetime(&date.and_time(time)).earliest() {
            let fire = fire.timestamp_millis();
            if fire > after {
                return Some(fire);
            }
        }
        date = date.succ_opt()?;
    }
    None
}

pub fn format_date(timestamp_millis: i64, tz: &Tz) -> String {
    match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.with_timezone(tz).format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

pub fn format_datetime(timestamp_millis: i64, tz: &Tz) -> String {
    match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        None => String::new(),
    }
}

pub fn format_time(timestamp_millis: i64, tz: &Tz) -> String {
    match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.with_timezone(tz).format("%H:%M").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HOUR: i64 = 1000 * 60 * 60;

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn it_computes_day_bounds_in_utc() {
        // Sun Feb 21 2021 13:00:00 UTC
        let now = 1613912400000;
        let bounds = day_bounds(now, &chrono_tz::UTC).unwrap();
        assert_eq!(bounds.today_start, 1613865600000);
        assert_eq!(bounds.yesterday_start, 1613865600000 - 24 * HOUR);
        assert_eq!(bounds.tomorrow_start, 1613865600000 + 24 * HOUR);
    }

    #[test]
    fn it_computes_day_bounds_in_other_timezones() {
        // Sun Feb 21 2021 00:00:00 GMT+0100
        let oslo_midnight = 1613862000000;
        let bounds = day_bounds(oslo_midnight + HOUR, &chrono_tz::Europe::Oslo).unwrap();
        assert_eq!(bounds.today_start, oslo_midnight);

        // Same instant is still saturday in New York
        let bounds = day_bounds(oslo_midnight + HOUR, &chrono_tz::America::New_York).unwrap();
        assert!(bounds.today_start < oslo_midnight);
    }

    #[test]
    fn day_bounds_follow_dst_transitions() {
        // Sun Mar 28 2021 12:00:00 GMT+0200, the day Oslo moves to summer time
        let now = 1616925600000;
        let bounds = day_bounds(now, &chrono_tz::Europe::Oslo).unwrap();
        assert_eq!(bounds.tomorrow_start - bounds.today_start, 23 * HOUR);
    }

    #[test]
    fn next_fire_time_is_today_when_not_passed() {
        // Sun Feb 21 2021 08:00:00 UTC
        let now = 1613894400000;
        assert_eq!(
            next_daily_fire_time(now, nine(), &chrono_tz::UTC),
            Some(now + HOUR)
        );
    }

    #[test]
    fn next_fire_time_is_tomorrow_when_passed_or_equal() {
        // Sun Feb 21 2021 09:00:00 UTC
        let fire = 1613898000000;
        assert_eq!(
            next_daily_fire_time(fire, nine(), &chrono_tz::UTC),
            Some(fire + 24 * HOUR)
        );
        assert_eq!(
            next_daily_fire_time(fire + 1, nine(), &chrono_tz::UTC),
            Some(fire + 24 * HOUR)
        );
    }

    #[test]
    fn next_fire_time_skips_nonexistent_wall_clock_time() {
        // Sat Mar 27 2021 12:00:00 GMT+0100, 02:30 does not exist in Oslo the next day
        let now = 1616842800000;
        let half_past_two = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let fire = next_daily_fire_time(now, half_past_two, &chrono_tz::Europe::Oslo).unwrap();
        assert_eq!(format_datetime(fire, &chrono_tz::Europe::Oslo), "2021-03-29 02:30");
    }

    #[test]
    fn it_formats_dates() {
        let now = 1613912400000;
        assert_eq!(format_date(now, &chrono_tz::UTC), "2021-02-21");
        assert_eq!(format_datetime(now, &chrono_tz::UTC), "2021-02-21 13:00");
        assert_eq!(format_time(now, &chrono_tz::Europe::Oslo), "14:00");
    }
}
