//! Contact details pulled out of resume text
//!
//! Pattern matching is a best-effort heuristic. The phone pattern in
//! particular is permissive: it will happily read a date range such as
//! `2019-2023` as a number and can miss formats with unusual grouping.
//!
//! Phone numbers are normalised by dropping every whitespace character,
//! not just spaces, so tabs and non-breaking spaces from PDF text go too.

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Strategy for reading contact details out of plain text.
pub trait ContactExtractor: Send + Sync {
    fn extract_contact(&self, text: &str) -> ContactInfo;
}

pub struct RegexContactExtractor {
    email_regex: Regex,
    phone_regex: Regex,
}

impl Default for RegexContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexContactExtractor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,10}")
            .expect("Invalid email regex");

        // country code, area code, subscriber number
        let phone_regex = Regex::new(r"(\+?\d{1,3}[-.\s]?)?(\(?\d{2,4}\)?[-.\s]?)?(\d{3,4}[-.\s]?\d{4})")
            .expect("Invalid phone regex");

        Self {
            email_regex,
            phone_regex,
        }
    }

    pub fn find_email(&self, text: &str) -> Option<String> {
        self.email_regex.find(text).map(|m| m.as_str().to_string())
    }

    pub fn find_phone(&self, text: &str) -> Option<String> {
        let captures = self.phone_regex.captures(text)?;
        let raw: String = (1..=3)
            .filter_map(|group| captures.get(group))
            .map(|m| m.as_str())
            .collect();

        Some(
            raw.chars()
                .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
                .collect(),
        )
    }
}

impl ContactExtractor for RegexContactExtractor {
    fn extract_contact(&self, text: &str) -> ContactInfo {
        ContactInfo {
            email: self.find_email(text),
            phone: self.find_phone(text),
        }
    }
}
