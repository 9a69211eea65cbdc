//! Personnel roster snapshot
//!
//! A roster is keyed by lowercased email. Each fetch produces a new,
//! independent snapshot; nothing is cached between fetches.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::RosterError;

/// One personnel entry as returned by the platform
#[derive(Debug, Clone, PartialEq)]
pub struct PersonnelRecord {
    /// Platform identifier, carried as a string whether the API sent a
    /// string or an integer. `None` when the entry had no usable id.
    pub id: Option<String>,
    /// Email exactly as the platform sent it
    pub email: String,
    /// Every field of the entry, passed through untouched
    pub fields: Map<String, Value>,
}

impl PersonnelRecord {
    /// Build a record from one element of the `data` array.
    ///
    /// Returns `None` for entries without a non-empty string `email`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        let email = fields
            .get("email")
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())?
            .to_string();
        let id = match fields.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Some(PersonnelRecord {
            id,
            email,
            fields: fields.clone(),
        })
    }

    /// Lowercased email used as the roster key
    pub fn normalized_email(&self) -> String {
        self.email.to_lowercase()
    }
}

/// Personnel keyed by lowercased email
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    by_email: HashMap<String, PersonnelRecord>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from records in response order.
    ///
    /// When two records share a lowercased email the later one wins.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PersonnelRecord>,
    {
        let mut roster = Roster::new();
        for record in records {
            roster.insert(record);
        }
        roster
    }

    /// Build a roster from a `GET /api/personnel` response body.
    ///
    /// A body without `data` is an empty roster. Entries that cannot be
    /// matched by email are dropped.
    pub fn from_response(body: &Value) -> Result<Self, RosterError> {
        let object = body.as_object().ok_or(RosterError::NotAnObject)?;

        let entries = match object.get("data") {
            None | Some(Value::Null) => return Ok(Roster::new()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(RosterError::DataNotArray),
        };

        Ok(Self::from_records(
            entries.iter().filter_map(PersonnelRecord::from_value),
        ))
    }

    pub fn insert(&mut self, record: PersonnelRecord) {
        self.by_email.insert(record.normalized_email(), record);
    }

    /// Look up by email, case-insensitively
    pub fn get(&self, email: &str) -> Option<&PersonnelRecord> {
        self.by_email.get(&email.to_lowercase())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.get(email).is_some()
    }

    /// Lowercased emails present in this snapshot
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.by_email.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}
