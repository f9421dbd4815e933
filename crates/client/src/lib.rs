//! Client for the events plan API.
//!
//! - [`api::ApiClient`] -- Login, schedule reads and description patches.
//! - [`schedule::ScheduleView`] -- Local copy of a schedule scope with live search.
//! - [`upload::UploadOrchestrator`] -- Batch photo upload with bounded retry.

pub mod api;
pub mod error;
pub mod schedule;
pub mod upload;
