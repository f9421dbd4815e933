//! Local copy of one schedule scope (a month or the whole year).
//!
//! The groups are never patched in place: every change builds a new `Vec`
//! and swaps it in with a single assignment, so a reader never sees a
//! half-applied update.

use eventplan_core::search::{filter_groups, EventGroup};
use eventplan_core::types::DbId;
use eventplan_db::models::category::CategoryWithEvents;
use eventplan_db::models::event::EventWithRelations;
use eventplan_db::models::photo::Photo;

use crate::api::ApiClient;
use crate::error::ClientError;

/// Which part of the schedule a view holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Month(i32),
    Year,
}

/// Cached schedule for one [`Scope`].
#[derive(Debug, Clone)]
pub struct ScheduleView {
    scope: Scope,
    groups: Vec<CategoryWithEvents>,
}

impl ScheduleView {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            groups: Vec::new(),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn groups(&self) -> &[CategoryWithEvents] {
        &self.groups
    }

    /// Replace the whole cache.
    pub fn replace(&mut self, groups: Vec<CategoryWithEvents>) {
        self.groups = groups;
    }

    /// Fetch the scope from the server and replace the cache.
    ///
    /// On error the previous cache is kept.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ClientError> {
        let groups = match self.scope {
            Scope::Month(month) => api.fetch_month(month).await?,
            Scope::Year => api.fetch_year().await?,
        };
        self.replace(groups);
        Ok(())
    }

    /// Filter the cache by a free-text query. A blank query returns
    /// everything.
    pub fn search(&self, query: &str) -> Vec<CategoryWithEvents> {
        filter_groups(&self.groups, query)
    }

    /// Find a cached event.
    pub fn event(&self, id: DbId) -> Option<&EventWithRelations> {
        self.groups
            .iter()
            .flat_map(|g| g.events.iter())
            .find(|e| e.event.id == id)
    }

    /// Take the server's copy of an event as authoritative.
    ///
    /// The event replaces any cached copy. When its category changed it moves
    /// to the new group (if that group is in this view), placed by
    /// `(sort_order, id)`.
    pub fn reconcile_event(&mut self, updated: EventWithRelations) {
        let id = updated.event.id;
        let target = updated.event.category_id;
        let mut updated = Some(updated);

        let groups = self
            .groups
            .iter()
            .map(|group| {
                let mut events: Vec<EventWithRelations> = group
                    .events
                    .iter()
                    .filter(|e| e.event.id != id)
                    .cloned()
                    .collect();
                if group.id == target {
                    if let Some(event) = updated.take() {
                        let key = (event.event.sort_order, event.event.id);
                        let at = events
                            .iter()
                            .position(|e| (e.event.sort_order, e.event.id) > key)
                            .unwrap_or(events.len());
                        events.insert(at, event);
                    }
                }
                group.with_events(events)
            })
            .collect();
        self.groups = groups;
    }

    /// Drop an event from the cache.
    pub fn remove_event(&mut self, id: DbId) {
        let groups = self
            .groups
            .iter()
            .map(|group| {
                group.with_events(
                    group
                        .events
                        .iter()
                        .filter(|e| e.event.id != id)
                        .cloned()
                        .collect(),
                )
            })
            .collect();
        self.groups = groups;
    }

    /// Merge freshly uploaded photos into their event, newest first.
    pub fn add_photos(&mut self, event_id: DbId, photos: &[Photo]) {
        let Some(event) = self.event(event_id) else {
            return;
        };
        let mut event = event.clone();
        let mut merged: Vec<Photo> = photos.iter().rev().cloned().collect();
        merged.extend(event.photos.into_iter());
        event.photos = merged;
        self.reconcile_event(event);
    }
}
