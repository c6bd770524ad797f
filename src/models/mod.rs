//! Request models for the HAL search API.

mod search;

pub use search::{
    date_range_filter, Format, QueryParams, SearchParams, SortOrder, EARLIEST_YEAR,
    SUBMITTED_YEAR_FIELD,
};
