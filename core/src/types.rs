//! Wire models for the expense API.
//!
//! # Design
//! Write-side shapes (`Expense`, `Genre`) carry no identity; read-side shapes
//! (`ExpenseWithId`, `GenreWithId`) add the server-assigned fields. An expense
//! refers to its genre by name only, so referential integrity is entirely the
//! server's concern. These types mirror the mock-server's schema but are
//! defined independently; integration tests catch drift between the two.

use serde::{Deserialize, Serialize};

/// An expense as sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Opaque date string, e.g. `"2025-01-15"`. Not parsed locally.
    pub date: String,
    pub genre: String,
    pub amount: i64,
}

impl Expense {
    pub fn new(date: impl Into<String>, genre: impl Into<String>, amount: i64) -> Self {
        Self {
            date: date.into(),
            genre: genre.into(),
            amount,
        }
    }
}

/// An expense as returned by `GET /expenses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseWithId {
    pub id: i64,
    pub date: String,
    pub genre: String,
    pub amount: i64,
}

impl ExpenseWithId {
    pub fn new(id: i64, date: impl Into<String>, genre: impl Into<String>, amount: i64) -> Self {
        Self {
            id,
            date: date.into(),
            genre: genre.into(),
            amount,
        }
    }

    /// The write-side view of this record, without its id.
    pub fn expense(&self) -> Expense {
        Expense {
            date: self.date.clone(),
            genre: self.genre.clone(),
            amount: self.amount,
        }
    }

    /// True when every field shared with `expense` is equal.
    pub fn matches(&self, expense: &Expense) -> bool {
        self.date == expense.date && self.genre == expense.genre && self.amount == expense.amount
    }
}

/// A genre as sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A genre as returned by `GET /genres`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreWithId {
    pub id: i64,
    pub name: String,
    /// Server-assigned creation timestamp, kept as the raw string.
    #[serde(rename = "created_at")]
    pub created_at: String,
}

impl GenreWithId {
    pub fn new(id: i64, name: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: created_at.into(),
        }
    }

    pub fn genre(&self) -> Genre {
        Genre {
            name: self.name.clone(),
        }
    }
}

/// The `{message, error}` envelope returned by every mutating endpoint.
///
/// Both fields are optional on the wire. When `error` is present it decides
/// the outcome, whatever `message` says.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
