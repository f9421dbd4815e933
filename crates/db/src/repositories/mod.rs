//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod event_repo;
pub mod link_repo;
pub mod photo_repo;
pub mod schedule_repo;
pub mod setting_repo;

pub use category_repo::CategoryRepo;
pub use event_repo::EventRepo;
pub use link_repo::LinkRepo;
pub use photo_repo::PhotoRepo;
pub use schedule_repo::ScheduleRepo;
pub use setting_repo::SettingRepo;
