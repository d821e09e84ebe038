//! Form input sanitizing and field validation

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::book_instance::{BookInstanceStatus, NewBookInstance};

/// HTML-escape a string for safe storage and display
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Trim then escape
pub fn sanitize(input: &str) -> String {
    escape(input.trim())
}

/// Parse the calendar date of an ISO 8601 value.
///
/// Accepts extended (`2026-10-14`) and basic (`20261014`) dates, optionally
/// followed by `T` and a time of day (`09:30`, `09:30:00.5`) with an optional
/// `Z` or `±hh[:mm]` offset. The time is checked and then dropped.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let (date, time) = match value.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (value, None),
    };
    let date = parse_calendar_date(date)?;
    match time {
        Some(time) => parse_time_of_day(time).map(|_| date),
        None => Some(date),
    }
}

fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let format = match value.len() {
        10 => "%Y-%m-%d",
        8 if value.bytes().all(|b| b.is_ascii_digit()) => "%Y%m%d",
        _ => return None,
    };
    NaiveDate::parse_from_str(value, format).ok()
}

fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let local = strip_utc_offset(value)?;
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(local, format).ok())
}

/// Local part of a time, or `None` if the offset is malformed
fn strip_utc_offset(value: &str) -> Option<&str> {
    if let Some(local) = value.strip_suffix('Z') {
        return Some(local);
    }
    let Some(at) = value.rfind(['+', '-']) else {
        return Some(value);
    };
    let offset = value[at + 1..].as_bytes();
    let valid = match offset.len() {
        2 | 4 => offset.iter().all(u8::is_ascii_digit),
        5 => offset
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 2 { *b == b':' } else { b.is_ascii_digit() }),
        _ => false,
    };
    valid.then(|| &value[..at])
}

/// A single failed field rule, reported back to the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub msg: String,
    pub value: String,
}

impl FieldError {
    pub fn new(field: &'static str, msg: &str, value: &str) -> Self {
        Self {
            field,
            msg: msg.to_string(),
            value: value.to_string(),
        }
    }
}

pub const BOOK_REQUIRED: &str = "Book must be specified";
pub const BOOK_UNKNOWN: &str = "Selected book does not exist";
pub const IMPRINT_REQUIRED: &str = "Imprint must be specified";
pub const STATUS_INVALID: &str = "Invalid status";
pub const DATE_INVALID: &str = "Invalid date";

/// Raw book copy form as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookInstanceForm {
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: String,
}

/// Book copy form after sanitizing; what gets echoed back on a rejected submit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct BookInstanceInput {
    #[validate(
        length(min = 1, message = "Book must be specified"),
        custom(function = "validate_book_id")
    )]
    pub book: String,
    #[validate(length(min = 1, message = "Imprint must be specified"))]
    pub imprint: String,
    #[validate(custom(function = "validate_status"))]
    pub status: String,
    #[validate(custom(function = "validate_due_back"))]
    pub due_back: String,
}

/// Order in which field errors are reported
const FIELD_ORDER: [&str; 4] = ["book", "imprint", "status", "due_back"];

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

// An empty book is reported by the length rule alone
fn validate_book_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || Uuid::parse_str(value).is_ok() {
        Ok(())
    } else {
        Err(rule_error("book_id", BOOK_UNKNOWN))
    }
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    BookInstanceStatus::from_form(value)
        .map(|_| ())
        .ok_or_else(|| rule_error("status", STATUS_INVALID))
}

fn validate_due_back(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || parse_iso_date(value).is_some() {
        Ok(())
    } else {
        Err(rule_error("iso8601", DATE_INVALID))
    }
}

impl BookInstanceForm {
    pub fn sanitize(&self) -> BookInstanceInput {
        BookInstanceInput {
            book: sanitize(&self.book),
            imprint: sanitize(&self.imprint),
            status: escape(&self.status),
            due_back: self.due_back.trim().to_string(),
        }
    }
}

impl BookInstanceInput {
    /// Apply the field rules; errors come back in form order.
    ///
    /// Referential checks against the store happen in the service.
    pub fn check(&self) -> Result<NewBookInstance, Vec<FieldError>> {
        self.validate().map_err(|errors| self.field_errors(&errors))?;

        let rejected = |field: &'static str, msg: &str, value: &str| vec![FieldError::new(field, msg, value)];
        let book_id = Uuid::parse_str(&self.book).map_err(|_| rejected("book", BOOK_UNKNOWN, &self.book))?;
        let status = BookInstanceStatus::from_form(&self.status)
            .ok_or_else(|| rejected("status", STATUS_INVALID, &self.status))?;
        let due_back = match self.due_back.as_str() {
            "" => None,
            value => Some(parse_iso_date(value).ok_or_else(|| rejected("due_back", DATE_INVALID, value))?),
        };

        Ok(NewBookInstance {
            book_id,
            imprint: self.imprint.clone(),
            status,
            due_back,
        })
    }

    fn value_of(&self, field: &str) -> &str {
        match field {
            "book" => &self.book,
            "imprint" => &self.imprint,
            "status" => &self.status,
            _ => &self.due_back,
        }
    }

    /// First failed rule of each field, in form order
    fn field_errors(&self, errors: &ValidationErrors) -> Vec<FieldError> {
        let by_field = errors.field_errors();
        FIELD_ORDER
            .iter()
            .filter_map(|&field| {
                let error = by_field.get(field)?.first()?;
                let msg = error.message.as_deref().unwrap_or(&*error.code);
                Some(FieldError::new(field, msg, self.value_of(field)))
            })
            .collect()
    }
}
