// Domain layer - sensor readings, status and dashboard state
pub mod dashboard;
pub mod history;
pub mod reading;
pub mod status;
