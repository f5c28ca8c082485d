//! Filter state for a feed and the conversion from raw input widgets.

use crate::error::FilterError;
use chrono::NaiveDate;
use url::Url;

const LOCAL_ORIGIN: &str = "http://localhost/";

/// Current query parameters of a feed.
///
/// Unset filters are empty strings. The query builder never sends them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Free-text query
    pub q: String,
    /// Genre id
    pub genres: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
    pub season: String,
    /// Format filter, sent as `type`
    pub format: String,
    pub status: String,
    /// Sort key, sent as `order_by` (or `filter` on the top feed)
    pub order_by: String,
    /// Sort direction
    pub sort: String,
    /// Current page, 1-based
    pub page: u32,
}

impl FilterState {
    /// Defaults for a feed sorted by `order_by` in direction `sort`
    pub fn with_sort(order_by: &str, sort: &str) -> Self {
        Self {
            order_by: order_by.to_string(),
            sort: sort.to_string(),
            page: 1,
            ..Default::default()
        }
    }

    /// Filter values in serialization order, keyed by their API names
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("q", self.q.as_str()),
            ("genres", self.genres.as_str()),
            ("start_date", self.start_date.as_str()),
            ("end_date", self.end_date.as_str()),
            ("season", self.season.as_str()),
            ("type", self.format.as_str()),
            ("status", self.status.as_str()),
            ("order_by", self.order_by.as_str()),
            ("sort", self.sort.as_str()),
        ]
    }

    /// Copy the values of the filter widgets into this state.
    ///
    /// The sort direction is forced back to descending, like the filter panel
    /// does. On error the state is left untouched.
    pub fn apply(&mut self, input: &FilterInput) -> Result<(), FilterError> {
        let (start_date, end_date) = year_range(&input.year)?;

        self.q = input.search.trim().to_string();
        self.genres = input.genre.clone();
        self.start_date = start_date;
        self.end_date = end_date;
        self.season = input.season.clone();
        self.format = input.format.clone();
        self.status = input.status.clone();
        self.order_by = input.sort.clone();
        self.sort = "desc".to_string();

        Ok(())
    }
}

/// Raw values of the browse feed's filter widgets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
    pub search: String,
    pub genre: String,
    /// Single year (`2020`) or range (`2010_2019`, `2010-2019`)
    pub year: String,
    pub season: String,
    pub format: String,
    pub status: String,
    pub sort: String,
}

impl FilterInput {
    /// Widget values that correspond to `state`
    pub fn from_state(state: &FilterState) -> Self {
        let year = match (state.start_date.get(..4), state.end_date.get(..4)) {
            (Some(start), Some(end)) if start == end => start.to_string(),
            (Some(start), Some(end)) => format!("{start}_{end}"),
            _ => String::new(),
        };

        Self {
            search: state.q.clone(),
            genre: state.genres.clone(),
            year,
            season: state.season.clone(),
            format: state.format.clone(),
            status: state.status.clone(),
            sort: state.order_by.clone(),
        }
    }

    /// Set one widget by name, as typed in `key=value` form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), FilterError> {
        let slot = match key {
            "q" | "search" | "query" => &mut self.search,
            "genre" | "genres" => &mut self.genre,
            "year" => &mut self.year,
            "season" => &mut self.season,
            "format" | "type" => &mut self.format,
            "status" => &mut self.status,
            "sort" | "order_by" => &mut self.sort,
            other => return Err(FilterError::UnknownKey(other.to_string())),
        };
        *slot = value.to_string();
        Ok(())
    }
}

/// Expand a year filter into a `(start_date, end_date)` pair.
///
/// Empty input yields two empty strings. A single year covers January 1st
/// through December 31st of that year; a range covers the start year's first
/// day through the end year's last day.
pub fn year_range(year: &str) -> Result<(String, String), FilterError> {
    let year = year.trim();
    if year.is_empty() {
        return Ok((String::new(), String::new()));
    }

    let (start, end) = match year.split_once(['_', '-']) {
        Some((start, end)) => (start, end),
        None => (year, year),
    };

    let invalid = || FilterError::InvalidYear(year.to_string());
    let start: i32 = start.trim().parse().map_err(|_| invalid())?;
    let end: i32 = end.trim().parse().map_err(|_| invalid())?;

    let first = NaiveDate::from_ymd_opt(start, 1, 1).ok_or_else(invalid)?;
    let last = NaiveDate::from_ymd_opt(end, 12, 31).ok_or_else(invalid)?;
    if first > last {
        return Err(invalid());
    }

    Ok((
        first.format("%Y-%m-%d").to_string(),
        last.format("%Y-%m-%d").to_string(),
    ))
}

/// Location the header search bar navigates to, or `None` for blank input.
pub fn nav_search_location(input: &str) -> Option<String> {
    let query = input.trim();
    if query.is_empty() {
        return None;
    }
    Some(format!("browse.html?search={}", urlencoding::encode(query)))
}

/// Search text carried by a browse location's `search` parameter.
///
/// `location` may be relative (`browse.html?search=...`); it is resolved
/// against a local origin so only its query string is read.
pub fn initial_search_from_location(location: &str) -> Option<String> {
    let parsed = Url::parse(LOCAL_ORIGIN).ok()?.join(location).ok()?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "search")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
