// libs/appointment-cell/src/services/availability.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, DayAvailability, DayView, Timeslot, TimeslotConfig,
    APPOINTMENT_WINDOW_MINUTES,
};
use crate::services::appointment::{filter_timestamp, AppointmentService};
use crate::services::timeslot::{
    apply_selection, available_slots, generate_timeslots, mark_booked, parse_stored_slots,
    serialize_available, set_all, toggle_slot,
};

/// Key of a day in the `timeslots` table: midnight UTC of that date.
fn day_key(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
    appointments: AppointmentService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            appointments: AppointmentService::new(config),
        }
    }

    /// Appointments whose window can reach any of `slots`.
    async fn appointments_reaching(
        &self,
        birth_center_id: Uuid,
        slots: &[Timeslot],
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let (Some(first), Some(last)) = (
            slots.iter().map(|s| s.start).min(),
            slots.iter().map(|s| s.end).max(),
        ) else {
            return Ok(Vec::new());
        };

        self.appointments.list_between(
            birth_center_id,
            first - Duration::minutes(APPOINTMENT_WINDOW_MINUTES),
            last,
            auth_token,
        ).await
    }

    /// The day's generated grid with booked slots flagged.
    pub async fn open_day(
        &self,
        birth_center_id: Uuid,
        date: NaiveDate,
        config: TimeslotConfig,
        auth_token: &str,
    ) -> Result<DayView, AppointmentError> {
        debug!("Opening {} for birth center {} with {:?}", date, birth_center_id, config);

        let mut slots = generate_timeslots(date, &config);
        let appointments = self.appointments_reaching(birth_center_id, &slots, auth_token).await?;
        mark_booked(&mut slots, &appointments);

        Ok(DayView {
            birth_center_id,
            date,
            config,
            slots,
        })
    }

    /// Upsert the day's available slots, replacing whatever was saved for the
    /// same birth center and date.
    async fn persist(
        &self,
        birth_center_id: Uuid,
        date: NaiveDate,
        slots: &[Timeslot],
        auth_token: &str,
    ) -> Result<DayAvailability, AppointmentError> {
        let row = json!({
            "birth_center_id": birth_center_id,
            "date": day_key(date).to_rfc3339(),
            "slots": serialize_available(slots)?
        });

        let _: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/timeslots?on_conflict=birth_center_id,date",
            Some(auth_token),
            Some(json!([row])),
            Some(SupabaseClient::merge_duplicates()),
        ).await?;

        let saved = DayAvailability {
            birth_center_id,
            date,
            slots: available_slots(slots),
        };
        info!(
            "Saved {} available slots for birth center {} on {}",
            saved.slots.len(),
            birth_center_id,
            date
        );

        Ok(saved)
    }

    /// Persist the staff selection for a day. Booked slots are never saved.
    pub async fn save_day(
        &self,
        birth_center_id: Uuid,
        date: NaiveDate,
        config: TimeslotConfig,
        selected_starts: &[DateTime<Utc>],
        auth_token: &str,
    ) -> Result<DayAvailability, AppointmentError> {
        let mut view = self.open_day(birth_center_id, date, config, auth_token).await?;
        apply_selection(&mut view.slots, selected_starts);

        self.persist(birth_center_id, date, &view.slots, auth_token).await
    }

    /// Flip one slot of the saved selection and persist the result. With
    /// nothing saved yet, every free slot starts out available.
    pub async fn toggle_day_slot(
        &self,
        birth_center_id: Uuid,
        date: NaiveDate,
        config: TimeslotConfig,
        index: usize,
        auth_token: &str,
    ) -> Result<DayAvailability, AppointmentError> {
        let mut view = self.open_day(birth_center_id, date, config, auth_token).await?;

        if let Some(saved) = self.saved_day(birth_center_id, date, auth_token).await? {
            let starts: Vec<_> = saved.slots.iter().map(|s| s.start).collect();
            apply_selection(&mut view.slots, &starts);
        }

        let now_available = toggle_slot(&mut view.slots, index)?;
        debug!("Slot {} on {} is now available: {}", index, date, now_available);

        self.persist(birth_center_id, date, &view.slots, auth_token).await
    }

    /// Mark every free slot of the day available or unavailable and persist.
    pub async fn set_day(
        &self,
        birth_center_id: Uuid,
        date: NaiveDate,
        config: TimeslotConfig,
        available: bool,
        auth_token: &str,
    ) -> Result<DayAvailability, AppointmentError> {
        let mut view = self.open_day(birth_center_id, date, config, auth_token).await?;
        set_all(&mut view.slots, available);

        self.persist(birth_center_id, date, &view.slots, auth_token).await
    }

    pub async fn saved_day(
        &self,
        birth_center_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Option<DayAvailability>, AppointmentError> {
        let path = format!(
            "/rest/v1/timeslots?birth_center_id=eq.{}&date=eq.{}",
            birth_center_id,
            filter_timestamp(day_key(date))
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, Some(auth_token), None).await?;

        let Some(row) = result.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(DayAvailability {
            birth_center_id,
            date,
            slots: parse_stored_slots(&row["slots"])?,
        }))
    }

    /// Slots a patient can still book: the saved selection for the day, or the
    /// default hourly grid, minus anything overlapping an appointment that is
    /// still on. Cancelled appointments free their window here.
    pub async fn open_slots_for_patient(
        &self,
        birth_center_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Timeslot>, AppointmentError> {
        let mut slots = match self.saved_day(birth_center_id, date, auth_token).await? {
            Some(saved) => saved
                .slots
                .into_iter()
                .map(|s| Timeslot::new(s.start, s.end))
                .collect(),
            None => generate_timeslots(date, &TimeslotConfig::PATIENT_DEFAULT),
        };

        let mut appointments = self.appointments_reaching(birth_center_id, &slots, auth_token).await?;
        appointments.retain(|a| !a.is_cancelled());

        mark_booked(&mut slots, &appointments);
        slots.retain(|s| !s.booked);

        Ok(slots)
    }
}
