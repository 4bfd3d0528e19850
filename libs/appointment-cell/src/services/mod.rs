pub mod appointment;
pub mod availability;
pub mod calendar;
pub mod notification;
pub mod timeslot;

pub use appointment::AppointmentService;
pub use availability::AvailabilityService;
pub use calendar::CalendarMonth;
pub use notification::NotificationService;
