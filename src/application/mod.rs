/// Application layer: services and use cases over the infrastructure seams
pub mod services;
pub mod use_cases;
