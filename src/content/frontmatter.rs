//! Front-matter parsing

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Custom deserializer for the tags field, which may arrive either as a
/// comma-separated string or as a YAML list. Both forms normalize to a
/// list of strings here so nothing downstream sees the ambiguity.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrList;

    impl<'de> Visitor<'de> for StringOrList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a comma-separated string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            // A blank string means "no tags", not one empty tag
            if value.trim().is_empty() {
                return Ok(Vec::new());
            }
            Ok(value.split(',').map(|tag| tag.trim().to_string()).collect())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            self.visit_str(&value)
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut tags = Vec::new();
            while let Some(tag) = seq.next_element::<String>()? {
                tags.push(tag);
            }
            Ok(tags)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrList)
}

/// Front-matter data from a blog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "imageUrl", alias = "image")]
    pub image_url: Option<String>,
    /// Explicit slug, preferred over the file name when present
    pub slug: Option<String>,
    #[serde(deserialize_with = "string_or_list", default)]
    pub tags: Vec<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Split a document into front-matter and body.
    /// Returns (front_matter, remaining_content).
    ///
    /// A document may start with a `---` delimited YAML block; everything
    /// after the closing delimiter is the body. Documents without such a
    /// block, or where the `---` lines are thematic breaks rather than
    /// metadata, yield default metadata and the full text as body. A block
    /// that is structurally front-matter but is not valid YAML is an error.
    pub fn parse(content: &str) -> Result<(Self, &str), serde_yaml::Error> {
        let content = content.trim_start();
        if !content.starts_with("---") {
            return Ok((FrontMatter::default(), content));
        }

        let rest = content[3..].trim_start_matches(['\n', '\r']);
        let Some(end_pos) = rest.find("\n---") else {
            // No closing delimiter, so no front-matter
            return Ok((FrontMatter::default(), content));
        };

        let block = &rest[..end_pos];
        let body = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        if block.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }
        if !looks_like_yaml(block) {
            // `---` used as a markdown separator, not a metadata block
            return Ok((FrontMatter::default(), content));
        }

        let front = serde_yaml::from_str(block)?;
        Ok((front, body))
    }

    /// Parse the date field into a calendar date
    pub fn parse_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date_value)
    }
}

/// Check whether a delimited block has `key: value` structure.
///
/// Markdown bodies legitimately contain `---` thematic breaks; the text
/// between two of them is only treated as metadata when at least one line
/// looks like a YAML mapping entry.
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return false;
        }
        match line.split_once(':') {
            Some((key, value)) => {
                // A plain identifier key, and a colon that is not part of a
                // URL (the value after a bare scheme colon has no space)
                !key.is_empty()
                    && key
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                    && (value.is_empty() || value.starts_with(' '))
            }
            None => false,
        }
    })
}

/// Parse a date string in the formats that show up in real front-matter
fn parse_date_value(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // Full RFC 3339 timestamps, e.g. exported from a CMS
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    None
}
