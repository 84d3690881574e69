//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They receive their collaborators (key store, summarizer) explicitly.

pub mod api_key_service;
pub mod summarizer;
pub mod validation_service;
