//! Domain logic shared by the events plan server and client.
//!
//! Nothing in this crate performs I/O; database access lives in
//! `eventplan-db` and HTTP in `eventplan-api` / `eventplan-client`.

pub mod error;
pub mod patch;
pub mod photo;
pub mod roles;
pub mod search;
pub mod types;
