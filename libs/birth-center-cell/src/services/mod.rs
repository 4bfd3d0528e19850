pub mod birth_center;
pub mod catalog;
pub mod geo;

pub use birth_center::BirthCenterService;
pub use catalog::ServiceCatalogService;
