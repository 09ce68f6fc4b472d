//! Player domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Availability of a represented player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Active,
    Injured,
    Inactive,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Injured => "injured",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "injured" => Ok(Self::Injured),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!(
                "unknown player status '{other}' (expected active, injured or inactive)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub status: PlayerStatus,
    pub club_id: Option<String>,
    /// Whole currency units.
    pub market_value: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    pub fn new(input: NewPlayer) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            position: input.position,
            nationality: input.nationality,
            status: input.status.unwrap_or_default(),
            club_id: input.club_id,
            market_value: input.market_value,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Applies a partial update and bumps `updated_at`.
    pub fn apply(&mut self, changes: PlayerChanges) {
        if let Some(v) = changes.first_name {
            self.first_name = v;
        }
        if let Some(v) = changes.last_name {
            self.last_name = v;
        }
        if let Some(v) = changes.position {
            self.position = v;
        }
        if let Some(v) = changes.nationality {
            self.nationality = v;
        }
        if let Some(v) = changes.status {
            self.status = v;
        }
        if let Some(v) = changes.club_id {
            self.club_id = v;
        }
        if let Some(v) = changes.market_value {
            self.market_value = v;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub status: Option<PlayerStatus>,
    pub club_id: Option<String>,
    pub market_value: Option<i64>,
}

/// Partial update. Outer `None` leaves a field alone; `Some(None)` clears an
/// optional field.
#[derive(Debug, Clone, Default)]
pub struct PlayerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<Option<String>>,
    pub nationality: Option<Option<String>>,
    pub status: Option<PlayerStatus>,
    pub club_id: Option<Option<String>>,
    pub market_value: Option<Option<i64>>,
}

impl PlayerChanges {
    /// The club this update assigns, if it assigns one.
    pub fn assigned_club(&self) -> Option<&str> {
        self.club_id.as_ref().and_then(|c| c.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFilter {
    pub status: Option<PlayerStatus>,
    pub club_id: Option<String>,
    pub position: Option<String>,
    /// Matches first or last name, case-insensitive substring.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSortField {
    CreatedAt,
    FirstName,
    LastName,
    MarketValue,
    Position,
    Status,
}

impl PlayerSortField {
    pub const DEFAULT_SORT: &'static str = "createdAt";

    /// Sort names accepted from clients.
    pub const ALLOWED: &'static [(&'static str, PlayerSortField)] = &[
        ("createdAt", Self::CreatedAt),
        ("created_at", Self::CreatedAt),
        ("firstName", Self::FirstName),
        ("first_name", Self::FirstName),
        ("lastName", Self::LastName),
        ("last_name", Self::LastName),
        ("marketValue", Self::MarketValue),
        ("market_value", Self::MarketValue),
        ("position", Self::Position),
        ("status", Self::Status),
    ];
}
