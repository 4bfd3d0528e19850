pub mod patient;
pub mod preferred;

pub use patient::PatientService;
pub use preferred::PreferredCenterService;
