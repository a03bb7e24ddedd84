// Application layer - polling and proxy use cases
pub mod latest_reading;
pub mod polling_controller;
pub mod proxy_service;
pub mod reading_source;
