//! Common test utilities and helpers
//!
//! Shared in-memory fakes and fixtures for the integration tests.

pub mod mock_services;
pub mod test_fixtures;
