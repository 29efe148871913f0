// src/application/mod.rs
pub mod error;
pub mod services;

// Re-export key services for easier imports
pub use services::config_service_impl::ConfigServiceImpl;
pub use services::event_service::EventServiceImpl;
pub use services::generation_service_impl::GenerationServiceImpl;
