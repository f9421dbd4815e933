//! Row models and request DTOs, one module per table.

pub mod category;
pub mod event;
pub mod link;
pub mod photo;
pub mod setting;
