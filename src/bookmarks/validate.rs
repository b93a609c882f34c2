//! Request checks that run before anything reaches the repository.
//!
//! Each check either passes or fails with an [`ApiError`]. Checks are run in
//! slice order and the first failure ends the request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

use super::model::{Bookmark, BookmarkChanges, BookmarkInput, NewBookmark};
use super::repository::BookmarkRepository;
use crate::error::ApiError;

pub type Check = fn(&BookmarkInput) -> Result<(), ApiError>;

/// Host-ish text, a 2-4 letter suffix, then an optional path. Matches
/// anywhere in the value.
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[-a-z0-9@:%_+.~#?&/=]{2,256}\.[a-z]{2,4}\b(/[-a-z0-9@:%_+.~#?&/=]*)?")
        .expect("Invalid URL regex")
});

const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Url,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Url => "url",
        }
    }

    fn value<'a>(&self, input: &'a BookmarkInput) -> Option<&'a str> {
        match self {
            Field::Title => input.title.as_deref(),
            Field::Url => input.url.as_deref(),
        }
    }
}

pub const REQUIRED_ON_CREATE: &[Field] = &[Field::Title, Field::Url];

/// Presence, then format.
pub const CREATE_CHECKS: &[Check] = &[ensure_required, validate_url, validate_rating];

pub const UPDATE_CHECKS: &[Check] = &[validate_url, validate_rating, reject_empty_title, ensure_changes];

pub fn run(input: &BookmarkInput, checks: &[Check]) -> Result<(), ApiError> {
    checks.iter().try_for_each(|check| check(input))
}

pub fn ensure_fields(input: &BookmarkInput, required: &[Field]) -> Result<(), ApiError> {
    for field in required {
        match field.value(input) {
            Some(value) if !value.is_empty() => {}
            _ => return Err(ApiError::validation(format!("{} is required", field.name()))),
        }
    }
    Ok(())
}

fn ensure_required(input: &BookmarkInput) -> Result<(), ApiError> {
    ensure_fields(input, REQUIRED_ON_CREATE)
}

pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

pub fn validate_url(input: &BookmarkInput) -> Result<(), ApiError> {
    match input.url.as_deref() {
        Some(url) if !is_valid_url(url) => Err(ApiError::validation("invalid url format")),
        _ => Ok(()),
    }
}

/// Accepts JSON integers, integral floats and integer strings (`5`, `5.0`
/// or `"5"`).
pub fn parse_rating(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn validate_rating(input: &BookmarkInput) -> Result<(), ApiError> {
    let Some(value) = &input.rating else {
        return Ok(());
    };

    match parse_rating(value) {
        Some(rating) if RATING_RANGE.contains(&rating) => Ok(()),
        _ => Err(ApiError::validation("rating must be between 1-5")),
    }
}

pub fn reject_empty_title(input: &BookmarkInput) -> Result<(), ApiError> {
    match input.title.as_deref() {
        Some("") => Err(ApiError::validation("title must be at least 1 character long")),
        _ => Ok(()),
    }
}

pub fn ensure_changes(input: &BookmarkInput) -> Result<(), ApiError> {
    if input.title.is_none() && input.url.is_none() && input.desc.is_none() && input.rating.is_none() {
        return Err(ApiError::validation(
            "request body must contain one of 'title', 'url', 'desc' or 'rating'",
        ));
    }
    Ok(())
}

pub fn parse_bookmark_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation("invalid bookmark id"))
}

/// Resolves a `:bookmark_id` path segment to a stored bookmark.
pub async fn ensure_bookmark(repo: &dyn BookmarkRepository, raw_id: &str) -> Result<Bookmark, ApiError> {
    let id = parse_bookmark_id(raw_id)?;

    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("unable to find bookmark with id {}", id)))
}

/// Neutralizes markup by escaping tag delimiters. Ampersands and quotes in
/// plain text are left alone so URLs and prose are stored as sent.
pub fn sanitize(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }

    output
}

/// Sanitized insert payload. Call after [`CREATE_CHECKS`] passed.
pub fn into_new_bookmark(input: BookmarkInput) -> NewBookmark {
    NewBookmark {
        title: input.title.as_deref().map(sanitize).unwrap_or_default(),
        url: input.url.as_deref().map(sanitize).unwrap_or_default(),
        desc: input.desc.as_deref().map(sanitize),
        rating: input.rating.as_ref().and_then(parse_rating),
    }
}

/// Sanitized update payload. Call after [`UPDATE_CHECKS`] passed.
pub fn into_changes(input: BookmarkInput) -> BookmarkChanges {
    BookmarkChanges {
        title: input.title.as_deref().map(sanitize),
        url: input.url.as_deref().map(sanitize),
        desc: input.desc.as_deref().map(sanitize),
        rating: input.rating.as_ref().and_then(parse_rating),
    }
}
