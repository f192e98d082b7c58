pub mod actor;
pub mod campaign;
pub mod finance;
pub mod hur;
pub mod organization;
