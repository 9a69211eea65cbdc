//! Completion source reader
//!
//! Turns an LMS export into the set of lowercased emails of users who
//! completed the training. Two document shapes are accepted:
//!
//! - a top-level array of emails or `{"email": ...}` objects
//! - an object holding such an array under `emails`, `users` or
//!   `completed` (first key present with an array value wins)

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;

use crate::error::FormatError;

/// Keys searched, in order, when the export is an object
pub const USER_LIST_KEYS: [&str; 3] = ["emails", "users", "completed"];

/// Shape of an LMS export, resolved once at parse time
#[derive(Debug, Clone, PartialEq)]
pub enum LmsDocument {
    ArrayOfEmails(Vec<Value>),
    ObjectWithEmailsKey(Vec<Value>),
    ObjectWithUsersKey(Vec<Value>),
    ObjectWithCompletedKey(Vec<Value>),
    /// An object with no array under any known key
    ObjectWithoutUserList,
    /// Any other top-level JSON value
    Unrecognized,
}

impl LmsDocument {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(entries) => LmsDocument::ArrayOfEmails(entries),
            Value::Object(mut object) => {
                for key in USER_LIST_KEYS {
                    if let Some(Value::Array(entries)) = object.remove(key) {
                        return match key {
                            "emails" => LmsDocument::ObjectWithEmailsKey(entries),
                            "users" => LmsDocument::ObjectWithUsersKey(entries),
                            _ => LmsDocument::ObjectWithCompletedKey(entries),
                        };
                    }
                }
                LmsDocument::ObjectWithoutUserList
            }
            _ => LmsDocument::Unrecognized,
        }
    }

    /// The user list this document carries
    pub fn entries(self) -> Result<Vec<Value>, FormatError> {
        match self {
            LmsDocument::ArrayOfEmails(entries)
            | LmsDocument::ObjectWithEmailsKey(entries)
            | LmsDocument::ObjectWithUsersKey(entries)
            | LmsDocument::ObjectWithCompletedKey(entries) => Ok(entries),
            LmsDocument::ObjectWithoutUserList => Err(FormatError::MissingUserList),
            LmsDocument::Unrecognized => Err(FormatError::UnrecognizedDocument),
        }
    }
}

/// Lowercased emails of users who completed the training
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    emails: BTreeSet<String>,
}

impl CompletionSet {
    /// Build a set from raw emails, normalizing case
    pub fn from_emails<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CompletionSet {
            emails: emails.into_iter().map(|e| e.as_ref().to_lowercase()).collect(),
        }
    }

    /// `email` must already be lowercased
    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(email)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.emails.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Parse an LMS export that is already in memory.
///
/// Any unusable entry fails the whole parse.
pub fn parse_completions(value: Value) -> Result<CompletionSet, FormatError> {
    let entries = LmsDocument::classify(value).entries()?;

    let mut emails = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        emails.push(entry_email(index, entry)?);
    }
    Ok(CompletionSet::from_emails(emails))
}

/// Read and parse the LMS export at `path`
pub fn read_completions(path: &Path) -> Result<CompletionSet, FormatError> {
    let content = std::fs::read_to_string(path).map_err(|source| FormatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content)?;
    parse_completions(value)
}

fn entry_email(index: usize, entry: &Value) -> Result<&str, FormatError> {
    match entry {
        Value::String(email) => Ok(email.as_str()),
        Value::Object(fields) => match fields.get("email") {
            Some(Value::String(email)) => Ok(email.as_str()),
            Some(_) => Err(FormatError::MalformedEntry {
                index,
                reason: "`email` is not a string".to_string(),
            }),
            None => Err(FormatError::MalformedEntry {
                index,
                reason: "object has no `email` field".to_string(),
            }),
        },
        other => Err(FormatError::MalformedEntry {
            index,
            reason: format!("expected an email or an object, got {}", other),
        }),
    }
}
