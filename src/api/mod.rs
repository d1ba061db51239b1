//! HTTP client for the answers API.

pub mod client;

pub use client::{AnswersClient, ApiError};
