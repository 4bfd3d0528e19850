// libs/appointment-cell/src/services/timeslot.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde_json::Value;

use crate::models::{Appointment, AppointmentError, StoredSlot, Timeslot, TimeslotConfig};

/// Contiguous `[start, end)` slots from `start_hour:00` stepping by the
/// interval while the slot start is before `end_hour:00`. Inputs are not
/// validated: an empty range, a zero interval or a range past the calendar's
/// limits yields no slots.
pub fn generate_timeslots(date: NaiveDate, config: &TimeslotConfig) -> Vec<Timeslot> {
    if config.interval_minutes == 0 || config.start_hour >= config.end_hour {
        return Vec::new();
    }

    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let step = Duration::minutes(config.interval_minutes as i64);
    let (Some(mut current), Some(end)) = (
        midnight.checked_add_signed(Duration::hours(config.start_hour as i64)),
        midnight.checked_add_signed(Duration::hours(config.end_hour as i64)),
    ) else {
        return Vec::new();
    };

    let mut slots = Vec::new();
    while current < end {
        let Some(next) = current.checked_add_signed(step) else {
            break;
        };
        slots.push(Timeslot::new(current, next));
        current = next;
    }

    slots
}

/// Flag every slot intersecting any appointment's window as booked, whatever
/// its status; everything else becomes available.
pub fn mark_booked(slots: &mut [Timeslot], appointments: &[Appointment]) {
    let windows: Vec<_> = appointments.iter().map(Appointment::window).collect();

    for slot in slots.iter_mut() {
        slot.booked = windows.iter().any(|w| w.overlaps(slot.start, slot.end));
        slot.available = !slot.booked;
    }
}

/// Flip one slot's availability. Booked slots cannot be toggled.
pub fn toggle_slot(slots: &mut [Timeslot], index: usize) -> Result<bool, AppointmentError> {
    let slot = slots
        .get_mut(index)
        .ok_or(AppointmentError::SlotOutOfRange(index))?;

    if slot.booked {
        return Err(AppointmentError::SlotBooked(index));
    }

    slot.available = !slot.available;
    Ok(slot.available)
}

/// Mark every non-booked slot available or unavailable.
pub fn set_all(slots: &mut [Timeslot], available: bool) {
    for slot in slots.iter_mut().filter(|s| !s.booked) {
        slot.available = available;
    }
}

/// Non-booked slots become available exactly when their start is selected.
pub fn apply_selection(slots: &mut [Timeslot], selected_starts: &[DateTime<Utc>]) {
    for slot in slots.iter_mut().filter(|s| !s.booked) {
        slot.available = selected_starts.contains(&slot.start);
    }
}

pub fn available_slots(slots: &[Timeslot]) -> Vec<StoredSlot> {
    slots
        .iter()
        .filter(|s| s.available && !s.booked)
        .map(|s| StoredSlot { start: s.start, end: s.end })
        .collect()
}

/// JSON text stored in the `timeslots.slots` column.
pub fn serialize_available(slots: &[Timeslot]) -> Result<String, AppointmentError> {
    Ok(serde_json::to_string(&available_slots(slots))?)
}

/// Decode a stored `slots` column, which may hold the JSON text or, on
/// jsonb columns, the array itself.
pub fn parse_stored_slots(raw: &Value) -> Result<Vec<StoredSlot>, AppointmentError> {
    match raw {
        Value::String(text) if text.trim().is_empty() => Ok(Vec::new()),
        Value::String(text) => Ok(serde_json::from_str(text)?),
        Value::Null => Ok(Vec::new()),
        other => Ok(serde_json::from_value(other.clone())?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_uneven_range_keeps_last_partial_step() {
        let config = TimeslotConfig { start_hour: 9, end_hour: 10, interval_minutes: 45 };
        let slots = generate_timeslots(day(), &config);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].start, Utc.with_ymd_and_hms(2025, 3, 14, 9, 45, 0).unwrap());
        assert_eq!(slots[1].end, Utc.with_ymd_and_hms(2025, 3, 14, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_zero_interval_is_empty() {
        let config = TimeslotConfig { start_hour: 9, end_hour: 17, interval_minutes: 0 };
        assert!(generate_timeslots(day(), &config).is_empty());
    }

    #[test]
    fn test_out_of_calendar_range_is_empty() {
        let config = TimeslotConfig { start_hour: 0, end_hour: u32::MAX, interval_minutes: 60 };
        assert!(generate_timeslots(day(), &config).is_empty());
    }

    #[test]
    fn test_parse_stored_slots_accepts_text_and_array() {
        let text = json!("[{\"start\":\"2025-03-14T09:00:00.000Z\",\"end\":\"2025-03-14T09:30:00.000Z\"}]");
        let parsed = parse_stored_slots(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].start, Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap());

        let array = json!([{ "start": "2025-03-14T10:00:00Z", "end": "2025-03-14T10:30:00Z" }]);
        assert_eq!(parse_stored_slots(&array).unwrap().len(), 1);

        assert!(parse_stored_slots(&Value::Null).unwrap().is_empty());
    }
}
