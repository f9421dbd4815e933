//! Read-side assembly of the schedule: categories with their events, and
//! each event with its links and photos.
//!
//! Every read costs four queries regardless of size; rows are grouped in
//! memory keeping the order the queries return.

use std::collections::HashMap;

use eventplan_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CategoryWithEvents};
use crate::models::event::{Event, EventWithRelations};
use crate::repositories::{CategoryRepo, EventRepo, LinkRepo, PhotoRepo};

/// Assembles nested schedule views.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Categories of one month with their events.
    pub async fn month(pool: &PgPool, month: i32) -> Result<Vec<CategoryWithEvents>, sqlx::Error> {
        let categories = CategoryRepo::list_by_month(pool, month).await?;
        Self::assemble(pool, categories).await
    }

    /// Every category of the year, ordered by month then `sort_order`.
    pub async fn all(pool: &PgPool) -> Result<Vec<CategoryWithEvents>, sqlx::Error> {
        let categories = CategoryRepo::list_all(pool).await?;
        Self::assemble(pool, categories).await
    }

    /// One event with its links and photos.
    pub async fn event(pool: &PgPool, id: DbId) -> Result<Option<EventWithRelations>, sqlx::Error> {
        let Some(event) = EventRepo::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let mut related = Self::attach(pool, vec![event]).await?;
        Ok(related.pop())
    }

    /// Attach links and photos to a list of events, keeping their order.
    pub async fn attach(
        pool: &PgPool,
        events: Vec<Event>,
    ) -> Result<Vec<EventWithRelations>, sqlx::Error> {
        let ids: Vec<DbId> = events.iter().map(|e| e.id).collect();

        let mut links = HashMap::<DbId, Vec<_>>::new();
        for link in LinkRepo::list_by_event_ids(pool, &ids).await? {
            links.entry(link.event_id).or_default().push(link);
        }
        let mut photos = HashMap::<DbId, Vec<_>>::new();
        for photo in PhotoRepo::list_by_event_ids(pool, &ids).await? {
            photos.entry(photo.event_id).or_default().push(photo);
        }

        Ok(events
            .into_iter()
            .map(|event| EventWithRelations {
                links: links.remove(&event.id).unwrap_or_default(),
                photos: photos.remove(&event.id).unwrap_or_default(),
                event,
            })
            .collect())
    }

    async fn assemble(
        pool: &PgPool,
        categories: Vec<Category>,
    ) -> Result<Vec<CategoryWithEvents>, sqlx::Error> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let category_ids: Vec<DbId> = categories.iter().map(|c| c.id).collect();
        let events = EventRepo::list_by_category_ids(pool, &category_ids).await?;
        let events = Self::attach(pool, events).await?;

        let mut by_category = HashMap::<DbId, Vec<EventWithRelations>>::new();
        for event in events {
            by_category
                .entry(event.event.category_id)
                .or_default()
                .push(event);
        }

        Ok(categories
            .into_iter()
            .map(|category| {
                let events = by_category.remove(&category.id).unwrap_or_default();
                CategoryWithEvents::new(category, events)
            })
            .collect())
    }
}
