//! Club domain entity

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Club {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub league: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Club {
    pub fn new(input: NewClub) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            city: input.city,
            country: input.country,
            league: input.league,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: ClubChanges) {
        if let Some(v) = changes.name {
            self.name = v;
        }
        if let Some(v) = changes.city {
            self.city = v;
        }
        if let Some(v) = changes.country {
            self.country = v;
        }
        if let Some(v) = changes.league {
            self.league = v;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewClub {
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub league: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClubChanges {
    pub name: Option<String>,
    pub city: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub league: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClubFilter {
    pub country: Option<String>,
    pub league: Option<String>,
    /// Matches name or city, case-insensitive substring.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClubSortField {
    CreatedAt,
    Name,
    City,
    Country,
}

impl ClubSortField {
    pub const DEFAULT_SORT: &'static str = "createdAt";

    pub const ALLOWED: &'static [(&'static str, ClubSortField)] = &[
        ("createdAt", Self::CreatedAt),
        ("created_at", Self::CreatedAt),
        ("name", Self::Name),
        ("city", Self::City),
        ("country", Self::Country),
    ];
}
