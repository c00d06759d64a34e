use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Partial update. Outer `None`: key absent, keep the stored value.
/// `Some(None)`: explicit `null`, clear it. `Some(Some(v))`: replace.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
}

// Only runs when the key is in the payload, so `null` becomes `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl Todo {
    pub fn apply(&mut self, changes: UpdateTodo, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        self.updated_at = now;
    }
}

/// One page of an id-ordered listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// 1-based position of the first item on this page, if any.
    pub fn first_position(&self) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some((self.current_page - 1) * self.per_page + 1)
        }
    }

    pub fn last_position(&self) -> Option<usize> {
        self.first_position().map(|first| first + self.items.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Todo {
        Todo {
            id: 1,
            title: Some("Buy milk".to_string()),
            description: Some("2%".to_string()),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_keeps_fields_absent_from_update() {
        let created = Utc::now();
        let mut todo = sample(created);
        let later = created + chrono::Duration::seconds(5);

        todo.apply(
            UpdateTodo {
                description: Some(Some("whole".to_string())),
                ..Default::default()
            },
            later,
        );

        assert_eq!(todo.title.as_deref(), Some("Buy milk"));
        assert_eq!(todo.description.as_deref(), Some("whole"));
        assert_eq!(todo.created_at, created);
        assert_eq!(todo.updated_at, later);
    }

    #[test]
    fn test_explicit_null_clears_and_absent_keeps() {
        let now = Utc::now();
        let mut todo = sample(now);
        todo.due_date = NaiveDate::from_ymd_opt(2026, 11, 1);

        let changes: UpdateTodo =
            serde_json::from_str(r#"{"due_date": null, "title": "Buy bread"}"#).unwrap();
        assert_eq!(changes.due_date, Some(None));
        assert!(changes.description.is_none());

        todo.apply(changes, now);
        assert!(todo.due_date.is_none());
        assert_eq!(todo.title.as_deref(), Some("Buy bread"));
        assert_eq!(todo.description.as_deref(), Some("2%"));
    }

    #[test]
    fn test_page_bounds() {
        let page = Page {
            items: vec![6, 7],
            current_page: 2,
            per_page: 5,
            total: 7,
        };
        assert_eq!(page.last_page(), 2);
        assert_eq!(page.first_position(), Some(6));
        assert_eq!(page.last_position(), Some(7));
    }

    #[test]
    fn test_empty_page_has_no_bounds() {
        let page: Page<u64> = Page {
            items: vec![],
            current_page: 3,
            per_page: 5,
            total: 0,
        };
        assert_eq!(page.last_page(), 1);
        assert_eq!(page.first_position(), None);
        assert_eq!(page.last_position(), None);
    }
}
