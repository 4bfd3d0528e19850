// libs/appointment-cell/src/services/calendar.rs
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Appointment, AppointmentError};

pub const WEEKS_PER_GRID: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_past: bool,
    pub appointments: Vec<Appointment>,
}

/// Six Sunday-first weeks covering a month; leading and trailing cells
/// spill into the neighbouring months and carry no appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<CalendarCell>>,
}

impl CalendarMonth {
    pub fn build(
        year: i32,
        month: u32,
        appointments: &[Appointment],
        today: NaiveDate,
    ) -> Result<Self, AppointmentError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(AppointmentError::InvalidMonth { year, month })?;
        let lead = first.weekday().num_days_from_sunday() as i64;
        let grid_start = first - Duration::days(lead);

        let weeks = (0..WEEKS_PER_GRID)
            .map(|week| {
                (0..DAYS_PER_WEEK)
                    .map(|day| {
                        let date = grid_start + Duration::days((week * DAYS_PER_WEEK + day) as i64);
                        let in_month = date.month() == month && date.year() == year;
                        let day_appointments = if in_month {
                            appointments
                                .iter()
                                .filter(|a| a.appointment_date.date_naive() == date)
                                .cloned()
                                .collect()
                        } else {
                            Vec::new()
                        };

                        CalendarCell {
                            date,
                            in_month,
                            is_past: date < today,
                            appointments: day_appointments,
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(Self { year, month, weeks })
    }

    pub fn days_in_month(&self) -> usize {
        self.weeks.iter().flatten().filter(|c| c.in_month).count()
    }

    /// `(year, month)` after this one, wrapping December into January.
    pub fn next(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }

    pub fn previous(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    /// First and last date shown on the grid.
    pub fn span(&self) -> (NaiveDate, NaiveDate) {
        let first = self.weeks[0][0].date;
        (first, first + Duration::days((WEEKS_PER_GRID * DAYS_PER_WEEK - 1) as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn appointment_on(y: i32, m: u32, d: u32, h: u32) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            birth_center_id: Uuid::new_v4(),
            service_id: None,
            appointment_date: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            status: AppointmentStatus::Pending,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn test_grid_starts_on_sunday_before_first() {
        // March 2025 starts on a Saturday.
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let cal = CalendarMonth::build(2025, 3, &[], today).unwrap();

        assert_eq!(cal.weeks.len(), 6);
        assert!(cal.weeks.iter().all(|w| w.len() == 7));
        assert_eq!(cal.weeks[0][0].date, NaiveDate::from_ymd_opt(2025, 2, 23).unwrap());
        assert!(!cal.weeks[0][5].in_month);
        assert!(cal.weeks[0][6].in_month);
        assert_eq!(cal.days_in_month(), 31);
    }

    #[test]
    fn test_appointments_attach_to_their_day_only_in_month() {
        let appts = vec![
            appointment_on(2025, 3, 14, 9),
            appointment_on(2025, 3, 14, 13),
            appointment_on(2025, 2, 28, 9),
        ];
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let cal = CalendarMonth::build(2025, 3, &appts, today).unwrap();

        let cells: Vec<_> = cal.weeks.iter().flatten().collect();
        let march_14 = cells
            .iter()
            .find(|c| c.date == NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
            .unwrap();
        assert_eq!(march_14.appointments.len(), 2);

        let feb_28 = cells
            .iter()
            .find(|c| c.date == NaiveDate::from_ymd_opt(2025, 2, 28).unwrap())
            .unwrap();
        assert!(feb_28.appointments.is_empty());
        assert!(feb_28.is_past);
    }

    #[test]
    fn test_navigation_wraps_year() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let december = CalendarMonth::build(2024, 12, &[], today).unwrap();
        assert_eq!(december.next(), (2025, 1));

        let january = CalendarMonth::build(2025, 1, &[], today).unwrap();
        assert_eq!(january.previous(), (2024, 12));
    }

    #[test]
    fn test_invalid_month_rejected() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(matches!(
            CalendarMonth::build(2025, 13, &[], today),
            Err(AppointmentError::InvalidMonth { month: 13, .. })
        ));
    }
}
