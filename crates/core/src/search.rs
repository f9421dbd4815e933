//! Live search over an already-loaded schedule.
//!
//! The schedule is a sequence of groups (categories), each holding an ordered
//! list of events. Filtering keeps only the groups with at least one matching
//! event and, inside each group, only the matching events. Relative order is
//! preserved. An empty or whitespace-only query returns the input unchanged.
//!
//! Everything here is pure and synchronous so callers can re-run it on every
//! keystroke; debouncing belongs to the caller.

/// An event that exposes its searchable text fields.
pub trait SearchableEvent {
    /// Name, responsible, location, description and date label, in any order.
    /// `None` entries never match.
    fn searchable_fields(&self) -> [Option<&str>; 5];
}

/// A group of events that can be rebuilt with a subset of its events.
pub trait EventGroup: Sized {
    type Event: SearchableEvent + Clone;

    fn events(&self) -> &[Self::Event];

    /// A copy of this group holding `events` instead of its own.
    fn with_events(&self, events: Vec<Self::Event>) -> Self;
}

/// Case-fold a query once, or `None` when it is blank.
pub fn fold_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Whether `event` matches an already case-folded, non-empty query.
pub fn event_matches<E: SearchableEvent>(event: &E, folded_query: &str) -> bool {
    event
        .searchable_fields()
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(folded_query))
}

/// Filter grouped events by a free-text query.
pub fn filter_groups<G: EventGroup + Clone>(groups: &[G], query: &str) -> Vec<G> {
    let Some(folded) = fold_query(query) else {
        return groups.to_vec();
    };

    groups
        .iter()
        .filter_map(|group| {
            let matching: Vec<G::Event> = group
                .events()
                .iter()
                .filter(|event| event_matches(*event, &folded))
                .cloned()
                .collect();
            (!matching.is_empty()).then(|| group.with_events(matching))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Ev {
        name: String,
        event_date: Option<String>,
        responsible: Option<String>,
        location: Option<String>,
        description: Option<String>,
    }

    impl SearchableEvent for Ev {
        fn searchable_fields(&self) -> [Option<&str>; 5] {
            [
                Some(self.name.as_str()),
                self.responsible.as_deref(),
                self.location.as_deref(),
                self.description.as_deref(),
                self.event_date.as_deref(),
            ]
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Group {
        name: String,
        events: Vec<Ev>,
    }

    impl EventGroup for Group {
        type Event = Ev;

        fn events(&self) -> &[Ev] {
            &self.events
        }

        fn with_events(&self, events: Vec<Ev>) -> Self {
            Group {
                name: self.name.clone(),
                events,
            }
        }
    }

    fn ev(name: &str, location: &str) -> Ev {
        Ev {
            name: name.to_string(),
            location: Some(location.to_string()),
            ..Default::default()
        }
    }

    fn schedule() -> Vec<Group> {
        vec![
            Group {
                name: "Январь".into(),
                events: vec![ev("Конференция", "Зал А"), ev("Семинар", "Зал Б")],
            },
            Group {
                name: "Февраль".into(),
                events: vec![Ev {
                    name: "Олимпиада".into(),
                    responsible: Some("Иванов И.И.".into()),
                    event_date: Some("15-20 февраля".into()),
                    description: Some("Региональный этап".into()),
                    ..Default::default()
                }],
            },
        ]
    }

    #[test]
    fn blank_query_is_identity() {
        let groups = schedule();
        assert_eq!(filter_groups(&groups, ""), groups);
        assert_eq!(filter_groups(&groups, "   \t"), groups);
    }

    #[test]
    fn cyrillic_case_insensitive_partial_match() {
        let result = filter_groups(&schedule(), "зал а");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Январь");
        assert_eq!(result[0].events, vec![ev("Конференция", "Зал А")]);
    }

    #[test]
    fn every_field_is_searched() {
        for query in ["олимп", "иванов", "20 февр", "РЕГИОНАЛЬНЫЙ"] {
            let result = filter_groups(&schedule(), query);
            assert_eq!(result.len(), 1, "query {query:?}");
            assert_eq!(result[0].name, "Февраль");
        }
    }

    #[test]
    fn absent_fields_never_match() {
        let event = Ev {
            name: "Встреча".into(),
            ..Default::default()
        };
        assert!(!event_matches(&event, "none"));
        assert!(event_matches(&event, "встр"));
    }

    #[test]
    fn groups_without_matches_are_dropped_and_order_kept() {
        let groups = vec![
            Group {
                name: "A".into(),
                events: vec![ev("x1", "room"), ev("y", "hall"), ev("x2", "room")],
            },
            Group {
                name: "B".into(),
                events: vec![ev("z", "yard")],
            },
            Group {
                name: "C".into(),
                events: vec![ev("x3", "room")],
            },
        ];

        let result = filter_groups(&groups, "ROOM");
        let names: Vec<_> = result.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
        let events: Vec<_> = result[0].events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(events, ["x1", "x2"]);
    }

    #[test]
    fn no_match_yields_empty() {
        assert!(filter_groups(&schedule(), "nothing like this").is_empty());
    }

    #[test]
    fn query_is_trimmed_before_matching() {
        let result = filter_groups(&schedule(), "  семинар  ");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].events[0].name, "Семинар");
    }
}
