//! Month-grid and day-bucket derivations over fetched appointments.
//!
//! Everything here is pure: callers pass in "today" and the reference
//! date, so the view layer owns the clock and month navigation simply
//! recomputes the whole grid from a new reference date.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::models::Appointment;

/// One cell of the month grid.
#[derive(Debug, Clone)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub appointments: Vec<Appointment>,
}

/// Appointments partitioned for the agenda panel. An appointment lands
/// in at most one of the three lists.
#[derive(Debug, Clone, Default)]
pub struct AppointmentBuckets {
    pub today: Vec<Appointment>,
    pub tomorrow: Vec<Appointment>,
    pub selected: Vec<Appointment>,
}

impl AppointmentBuckets {
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.tomorrow.is_empty() && self.selected.is_empty()
    }
}

/// Local calendar date of an appointment, `None` when the backend gave
/// us no usable timestamp. Bucketing and the grid both key on this, so
/// an appointment at 23:30 UTC can still land on the next local day.
pub fn local_day(appointment: &Appointment) -> Option<NaiveDate> {
    appointment
        .date
        .map(|d| d.with_timezone(&Local).date_naive())
}

fn first_of_month(reference: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(reference.year(), reference.month(), 1).unwrap_or(reference)
}

fn last_of_month(reference: NaiveDate) -> NaiveDate {
    next_month(reference) - Duration::days(1)
}

/// First day of the month preceding `reference`'s month.
pub fn prev_month(reference: NaiveDate) -> NaiveDate {
    let (year, month) = match reference.month() {
        1 => (reference.year() - 1, 12),
        m => (reference.year(), m - 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(reference)
}

/// First day of the month following `reference`'s month.
pub fn next_month(reference: NaiveDate) -> NaiveDate {
    let (year, month) = match reference.month() {
        12 => (reference.year() + 1, 1),
        m => (reference.year(), m + 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(reference)
}

/// Build the grid of weeks covering `reference`'s month: from the
/// Sunday on/before the 1st through the Saturday on/after the last
/// day, so the result is always a whole number of 7-day weeks.
///
/// Each day carries the appointments whose local calendar date matches,
/// in time-of-day order. Dateless appointments are skipped.
pub fn month_grid(
    reference: NaiveDate,
    today: NaiveDate,
    appointments: &[Appointment],
) -> Vec<CalendarDay> {
    let first = first_of_month(reference);
    let last = last_of_month(reference);

    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    let end = last + Duration::days(i64::from(6 - last.weekday().num_days_from_sunday()));

    let mut days = Vec::with_capacity(42);
    let mut date = start;
    while date <= end {
        days.push(CalendarDay {
            date,
            is_current_month: date.year() == reference.year() && date.month() == reference.month(),
            is_today: date == today,
            appointments: appointments_on(appointments, date),
        });
        date += Duration::days(1);
    }
    days
}

/// Partition appointments into today / tomorrow / selected-date lists,
/// in that order of precedence. The selected list stays empty when the
/// selected date is today or tomorrow so nothing shows up twice.
pub fn bucket_appointments(
    appointments: &[Appointment],
    selected: NaiveDate,
    today: NaiveDate,
) -> AppointmentBuckets {
    let tomorrow = today + Duration::days(1);
    let mut buckets = AppointmentBuckets::default();

    for appointment in appointments {
        let Some(day) = local_day(appointment) else {
            tracing::debug!(id = appointment.id, "appointment without a date, not bucketed");
            continue;
        };
        if day == today {
            buckets.today.push(appointment.clone());
        } else if day == tomorrow {
            buckets.tomorrow.push(appointment.clone());
        } else if day == selected && selected != today && selected != tomorrow {
            buckets.selected.push(appointment.clone());
        }
    }

    sort_by_time(&mut buckets.today);
    sort_by_time(&mut buckets.tomorrow);
    sort_by_time(&mut buckets.selected);
    buckets
}

fn appointments_on(appointments: &[Appointment], date: NaiveDate) -> Vec<Appointment> {
    let mut on_day: Vec<Appointment> = appointments
        .iter()
        .filter(|a| local_day(a) == Some(date))
        .cloned()
        .collect();
    sort_by_time(&mut on_day);
    on_day
}

/// Ascending by instant; within one local day that is time-of-day
/// order. Stable, so equal times keep their fetch order.
fn sort_by_time(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| a.date.cmp(&b.date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn appt(id: u64, y: i32, m: u32, d: u32, hour: u32, min: u32) -> Appointment {
        // Built through Local so the expected calendar day is stable
        // no matter which timezone the test host runs in.
        let date = Local
            .with_ymd_and_hms(y, m, d, hour, min, 0)
            .single()
            .map(|dt| dt.with_timezone(&Utc));
        Appointment {
            id,
            title: Some(format!("Appointment {id}")),
            location: None,
            date,
            client_id: None,
            realtor_id: 1,
            property_id: None,
            notes: None,
        }
    }

    fn dateless(id: u64) -> Appointment {
        Appointment { date: None, ..appt(id, 2024, 1, 1, 9, 0) }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grid_is_whole_weeks_and_covers_the_month() {
        for (y, m) in [(2024, 2), (2024, 12), (2025, 1), (2023, 2), (2024, 6)] {
            let reference = day(y, m, 15);
            let grid = month_grid(reference, day(2024, 1, 1), &[]);
            assert_eq!(grid.len() % 7, 0, "{y}-{m} grid not whole weeks");
            assert!(grid.iter().any(|c| c.date == day(y, m, 1)));
            assert!(grid.iter().any(|c| c.date == last_of_month(reference)));
        }
    }

    #[test]
    fn leap_february_2024_spans_sunday_to_saturday() {
        let grid = month_grid(day(2024, 2, 10), day(2024, 2, 10), &[]);
        // Feb 1 2024 is a Thursday; the grid opens on Sun Jan 28 and
        // closes on Sat Mar 2, five whole weeks.
        assert_eq!(grid.len(), 35);
        assert_eq!(grid.first().unwrap().date, day(2024, 1, 28));
        assert_eq!(grid.last().unwrap().date, day(2024, 3, 2));
        assert!(grid.iter().any(|c| c.date == day(2024, 2, 29)));
    }

    #[test]
    fn current_month_and_today_flags() {
        let grid = month_grid(day(2024, 2, 10), day(2024, 2, 10), &[]);
        for cell in &grid {
            assert_eq!(
                cell.is_current_month,
                cell.date.month() == 2,
                "{}",
                cell.date
            );
            assert_eq!(cell.is_today, cell.date == day(2024, 2, 10));
        }
        assert_eq!(grid.iter().filter(|c| c.is_today).count(), 1);
    }

    #[test]
    fn appointment_lands_only_on_its_calendar_day() {
        let appointments = vec![appt(1, 2024, 2, 29, 10, 30), appt(2, 2024, 2, 14, 9, 0)];
        let grid = month_grid(day(2024, 2, 1), day(2024, 2, 1), &appointments);
        for cell in &grid {
            let expected: Vec<u64> = appointments
                .iter()
                .filter(|a| local_day(a) == Some(cell.date))
                .map(|a| a.id)
                .collect();
            let actual: Vec<u64> = cell.appointments.iter().map(|a| a.id).collect();
            assert_eq!(actual, expected, "{}", cell.date);
        }
    }

    #[test]
    fn dateless_appointment_never_appears_in_grid() {
        let grid = month_grid(day(2024, 2, 1), day(2024, 2, 1), &[dateless(9)]);
        assert!(grid.iter().all(|c| c.appointments.is_empty()));
    }

    #[test]
    fn grid_day_appointments_sorted_by_time() {
        let appointments = vec![
            appt(1, 2024, 6, 3, 16, 0),
            appt(2, 2024, 6, 3, 9, 15),
            appt(3, 2024, 6, 3, 12, 0),
        ];
        let grid = month_grid(day(2024, 6, 1), day(2024, 6, 1), &appointments);
        let cell = grid.iter().find(|c| c.date == day(2024, 6, 3)).unwrap();
        let ids: Vec<u64> = cell.appointments.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn today_and_tomorrow_are_disjoint() {
        let today = day(2024, 6, 10);
        let appointments = vec![appt(1, 2024, 6, 10, 10, 30), appt(2, 2024, 6, 11, 10, 30)];
        let buckets = bucket_appointments(&appointments, day(2024, 6, 20), today);
        assert_eq!(buckets.today.iter().map(|a| a.id).collect::<Vec<_>>(), [1]);
        assert_eq!(
            buckets.tomorrow.iter().map(|a| a.id).collect::<Vec<_>>(),
            [2]
        );
        assert!(buckets.selected.is_empty());
    }

    #[test]
    fn selected_equal_to_today_collapses_into_today_bucket() {
        let today = day(2024, 6, 10);
        let appointments = vec![appt(1, 2024, 6, 10, 10, 30)];
        let buckets = bucket_appointments(&appointments, today, today);
        assert_eq!(buckets.today.len(), 1);
        assert!(buckets.selected.is_empty());
    }

    #[test]
    fn selected_equal_to_tomorrow_collapses_into_tomorrow_bucket() {
        let today = day(2024, 6, 10);
        let appointments = vec![appt(1, 2024, 6, 11, 8, 0)];
        let buckets = bucket_appointments(&appointments, day(2024, 6, 11), today);
        assert_eq!(buckets.tomorrow.len(), 1);
        assert!(buckets.selected.is_empty());
    }

    #[test]
    fn selected_bucket_holds_other_days_in_time_order() {
        let today = day(2024, 6, 10);
        let appointments = vec![
            appt(1, 2024, 6, 25, 15, 0),
            appt(2, 2024, 6, 25, 9, 0),
            appt(3, 2024, 6, 26, 9, 0),
            dateless(4),
        ];
        let buckets = bucket_appointments(&appointments, day(2024, 6, 25), today);
        assert!(buckets.today.is_empty());
        assert!(buckets.tomorrow.is_empty());
        assert_eq!(
            buckets.selected.iter().map(|a| a.id).collect::<Vec<_>>(),
            [2, 1]
        );
    }

    #[test]
    fn month_navigation_round_trips() {
        let reference = day(2024, 1, 31);
        assert_eq!(next_month(reference), day(2024, 2, 1));
        assert_eq!(prev_month(reference), day(2023, 12, 1));
        assert_eq!(prev_month(next_month(reference)), day(2024, 1, 1));
    }
}
