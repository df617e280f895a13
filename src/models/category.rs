use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::schema::{Column, ConstraintViolation, Entity, TableSchema};

pub const NAME_MAX_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 255;

/// The `categories` table.
pub const CATEGORIES: TableSchema = TableSchema {
    name: "categories",
    columns: &[
        Column::primary_key("id"),
        Column::text("name", NAME_MAX_LEN, false),
        Column::text("description", DESCRIPTION_MAX_LEN, true),
        Column::timestamp("created_at", false),
        Column::timestamp("updated_at", true),
    ],
};

/// A classification bucket for inventory items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    const SCHEMA: &'static TableSchema = &CATEGORIES;
}

/// Current instant at the resolution the database stores (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The `updated_at` to write for a modification happening at `now`.
///
/// Always strictly after `previous`, even when the clock has not advanced.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn check(&self) -> Result<(), ConstraintViolation> {
        CATEGORIES.check_text("name", Some(self.name.as_str()))?;
        CATEGORIES.check_text("description", self.description.as_deref())
    }
}

/// Partial update. Absent fields are left alone; `"description": null`
/// clears the description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryChanges {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

fn present<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(de).map(Some)
}

impl CategoryChanges {
    pub fn check(&self) -> Result<(), ConstraintViolation> {
        if let Some(name) = &self.name {
            CATEGORIES.check_text("name", Some(name.as_str()))?;
        }
        if let Some(description) = &self.description {
            CATEGORIES.check_text("description", description.as_deref())?;
        }
        Ok(())
    }

    /// Applies the changes in place and refreshes `updated_at`.
    pub fn apply(self, category: &mut Category, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = description;
        }
        category.updated_at = next_updated_at(category.updated_at, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::ViolationKind;

    fn electronics(at: DateTime<Utc>) -> Category {
        Category {
            id: 1,
            name: "Electronics".to_string(),
            description: Some("Gadgets".to_string()),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn schema_matches_categories_table() {
        let schema = Category::SCHEMA;
        assert_eq!(schema.name, "categories");
        let names: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["id", "name", "description", "created_at", "updated_at"]
        );
        assert!(schema.column("id").unwrap().primary_key);
        assert!(!schema.column("name").unwrap().nullable);
        assert!(schema.column("description").unwrap().nullable);
        assert!(!schema.column("created_at").unwrap().nullable);
        assert!(schema.column("updated_at").unwrap().nullable);
    }

    #[test]
    fn name_length_bound() {
        let ok = NewCategory {
            name: "a".repeat(NAME_MAX_LEN),
            description: None,
        };
        assert!(ok.check().is_ok());

        let too_long = NewCategory {
            name: "a".repeat(NAME_MAX_LEN + 1),
            description: None,
        };
        let err = too_long.check().unwrap_err();
        assert_eq!(err.column, "name");
        assert_eq!(
            err.kind,
            ViolationKind::TooLong {
                max: 50,
                actual: 51
            }
        );
    }

    #[test]
    fn description_length_bound() {
        let too_long = NewCategory {
            name: "Books".to_string(),
            description: Some("d".repeat(DESCRIPTION_MAX_LEN + 1)),
        };
        assert_eq!(too_long.check().unwrap_err().column, "description");
    }

    #[test]
    fn updated_at_strictly_increases_even_without_clock_progress() {
        let t = now();
        assert_eq!(next_updated_at(t, t), t + Duration::microseconds(1));
        assert_eq!(
            next_updated_at(t, t - Duration::seconds(5)),
            t + Duration::microseconds(1)
        );
        let later = t + Duration::seconds(1);
        assert_eq!(next_updated_at(t, later), later);
    }

    #[test]
    fn apply_merges_and_touches() {
        let t = now();
        let mut category = electronics(t);

        CategoryChanges {
            name: Some("Electronics & Audio".to_string()),
            description: None,
        }
        .apply(&mut category, t);

        assert_eq!(category.name, "Electronics & Audio");
        assert_eq!(category.description.as_deref(), Some("Gadgets"));
        assert_eq!(category.created_at, t);
        assert!(category.updated_at > category.created_at);
    }

    #[test]
    fn explicit_null_clears_description_absent_keeps_it() {
        let cleared: CategoryChanges = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let untouched: CategoryChanges = serde_json::from_str(r#"{"name": "Toys"}"#).unwrap();
        assert_eq!(untouched.description, None);

        let mut category = electronics(now());
        cleared.apply(&mut category, now());
        assert_eq!(category.description, None);
    }

    #[test]
    fn serializes_with_rfc3339_timestamps() {
        let t = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_value(electronics(t)).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Electronics");
        assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
    }
}
