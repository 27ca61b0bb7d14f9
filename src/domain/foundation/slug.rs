//! Article slug value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::ValidationError;

/// Longest slug accepted from the outside world.
pub const MAX_SLUG_LEN: usize = 200;

/// URL-safe identifier of an article or draft.
///
/// Lowercase ASCII letters, digits and single `-` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleSlug(String);

impl ArticleSlug {
    /// Validates and wraps a slug.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::empty_field("article_slug"));
        }
        if value.len() > MAX_SLUG_LEN {
            return Err(ValidationError::too_long("article_slug", MAX_SLUG_LEN));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(ValidationError::invalid_format(
                "article_slug",
                "only lowercase letters, digits and '-' are allowed",
            ));
        }
        if value.starts_with('-') || value.ends_with('-') || value.contains("--") {
            return Err(ValidationError::invalid_format(
                "article_slug",
                "dashes must separate words",
            ));
        }

        Ok(Self(value))
    }

    /// Derives a slug from a markdown file name.
    ///
    /// `2024-01-15-My_Draft Post.md` becomes `my-draft-post`. Returns `None`
    /// for non-markdown files or names with nothing slug-worthy left.
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name.strip_suffix(".md")?;
        let stem = strip_date_prefix(stem);

        let mut slug = String::with_capacity(stem.len());
        for c in stem.chars() {
            let c = match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            };
            if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
                continue;
            }
            if c == '-' && slug.ends_with('-') {
                continue;
            }
            slug.push(c);
        }

        let slug = slug.trim_matches('-');
        if slug.len() > MAX_SLUG_LEN {
            return None;
        }
        Self::new(slug).ok()
    }

    /// Returns the slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Strips a leading `YYYY-MM-DD-` date prefix if present.
fn strip_date_prefix(stem: &str) -> &str {
    let bytes = stem.as_bytes();
    let has_prefix = bytes.len() > 11
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[8..10].iter().all(u8::is_ascii_digit);

    if has_prefix {
        &stem[11..]
    } else {
        stem
    }
}

impl fmt::Display for ArticleSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArticleSlug {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArticleSlug {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ArticleSlug> for String {
    fn from(slug: ArticleSlug) -> Self {
        slug.0
    }
}
