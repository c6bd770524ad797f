//! Search request models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::client::HalError;

/// Lower year bound used by the date filter when `before` is not given
pub const EARLIEST_YEAR: i32 = 1900;

/// Field used by the submission date range filter
pub const SUBMITTED_YEAR_FIELD: &str = "submittedDateY_i";

/// Response formats accepted by the HAL search API (`wt` parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Format {
    #[default]
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "xml")]
    Xml,
    #[serde(rename = "xml-tei")]
    XmlTei,
    #[serde(rename = "bibtex")]
    Bibtex,
    #[serde(rename = "csv")]
    Csv,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::Xml,
        Format::XmlTei,
        Format::Bibtex,
        Format::Csv,
    ];

    /// Wire token sent as `wt`
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::XmlTei => "xml-tei",
            Format::Bibtex => "bibtex",
            Format::Csv => "csv",
        }
    }

    /// File extension for a body in this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml | Format::XmlTei => "xml",
            Format::Bibtex => "bib",
            Format::Csv => "csv",
        }
    }

    fn tokens() -> Vec<&'static str> {
        Self::ALL.iter().map(Format::as_str).collect()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| HalError::invalid_choice("format", s, &Self::tokens()))
    }
}

/// Sort order for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            other => Err(HalError::invalid_choice(
                "sort_order",
                other,
                &["asc", "desc"],
            )),
        }
    }
}

/// Parameters for a single search call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text Solr query
    pub query: String,

    /// Overrides the client's default format
    pub format: Option<Format>,

    /// Fields to return (`fl`), order preserved
    pub include_fields: Option<Vec<String>>,

    /// Field to sort on
    pub sort_by: Option<String>,

    /// Only used together with `sort_by`
    pub sort_order: Option<SortOrder>,

    /// Upper slot of the submission year filter
    pub before: Option<i32>,

    /// Lower slot of the submission year filter
    pub after: Option<i32>,

    /// Number of rows to return
    pub rows: u64,

    /// Index of the first row (`start`)
    pub offset: u64,
}

impl SearchParams {
    /// Create parameters for a query, everything else left at defaults
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the response format
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Replace the list of returned fields
    pub fn include_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Append one returned field
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.include_fields
            .get_or_insert_with(Vec::new)
            .push(field.into());
        self
    }

    /// Set the sort field
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    /// Set the sort order
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    pub fn before(mut self, year: i32) -> Self {
        self.before = Some(year);
        self
    }

    pub fn after(mut self, year: i32) -> Self {
        self.after = Some(year);
        self
    }

    pub fn rows(mut self, rows: u64) -> Self {
        self.rows = rows;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

/// Ordered query string handed to the HTTP layer
///
/// Serializes as a sequence of pairs, which is what `reqwest`'s `.query()`
/// expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: &'static str, value: impl ToString) {
        self.0.push((name, value.to_string()));
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Parameter names in emission order
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(key, _)| *key).collect()
    }
}

/// Build the `fq` submission year filter.
///
/// Returns `None` when neither bound is set. A missing `after` becomes
/// `current_year` and a missing `before` becomes [`EARLIEST_YEAR`]; `after`
/// always fills the first slot of the range.
pub fn date_range_filter(
    before: Option<i32>,
    after: Option<i32>,
    current_year: i32,
) -> Option<String> {
    if before.is_none() && after.is_none() {
        return None;
    }
    let after = after.unwrap_or(current_year);
    let before = before.unwrap_or(EARLIEST_YEAR);
    Some(format!("{}:[{} TO {}]", SUBMITTED_YEAR_FIELD, after, before))
}
