//! Shared query infrastructure: the [`Query`] trait, [`QueryCommon`] fields, and sorting.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use url::Url;

use crate::types::ResourceKind;

/// Wire format of `filter[postedDate]` values.
pub const POSTED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format of `filter[lastModifiedDate]` values (Eastern wall-clock time).
pub const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Trait implemented by all query builders. Provides URL serialization and
/// shared builder methods for pagination, date filtering, and sorting.
pub trait Query: Clone {
    /// The resource family this query lists.
    const KIND: ResourceKind;

    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a reference to the common query fields.
    fn common(&self) -> &QueryCommon;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Sets the page number (1-indexed).
    fn with_page(mut self, page: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().page = page;
        self
    }

    /// Sets the number of results per page (the API accepts 5 to 250).
    fn with_page_size(mut self, page_size: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().page_size = Some(page_size);
        self
    }

    /// Full-text search term.
    fn with_search_term(mut self, term: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common().search_term = Some(term.to_string());
        self
    }

    /// Filters by agency acronym (e.g. `FDA`).
    fn with_agency_id(mut self, agency_id: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common().agency_id = Some(agency_id.to_string());
        self
    }

    /// Posted on or after this date.
    fn with_posted_from(mut self, date: NaiveDate) -> Self
    where
        Self: Sized,
    {
        self.get_common().posted_from = Some(date);
        self
    }

    /// Posted on or before this date.
    fn with_posted_to(mut self, date: NaiveDate) -> Self
    where
        Self: Sized,
    {
        self.get_common().posted_to = Some(date);
        self
    }

    /// Last modified at or after this Eastern wall-clock time.
    fn with_modified_from(mut self, at: NaiveDateTime) -> Self
    where
        Self: Sized,
    {
        self.get_common().modified_from = Some(at);
        self
    }

    /// Last modified at or before this Eastern wall-clock time.
    fn with_modified_to(mut self, at: NaiveDateTime) -> Self
    where
        Self: Sized,
    {
        self.get_common().modified_to = Some(at);
        self
    }

    /// Sets the sort field.
    fn with_sort_field(mut self, field: SortField) -> Self
    where
        Self: Sized,
    {
        self.get_common().sort_field = field;
        self
    }

    /// Sets the sort direction (ascending or descending).
    fn with_sort_direction(mut self, sort_direction: SortDirection) -> Self
    where
        Self: Sized,
    {
        self.get_common().sort_direction = sort_direction;
        self
    }
}

/// Sort order for API results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (oldest first). This is the default, and the only
    /// direction a last-modified cursor can advance through.
    #[default]
    Asc,
    /// Descending order (newest first).
    Desc,
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// Fields the list endpoints can sort by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    LastModifiedDate,
    PostedDate,
    Title,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LastModifiedDate => "lastModifiedDate",
            Self::PostedDate => "postedDate",
            Self::Title => "title",
        };
        f.write_str(s)
    }
}

/// Fields shared by all query types: pagination, reserved filters, and sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCommon {
    /// Page number (1-indexed). Defaults to 1.
    pub page: u32,
    /// Results per page. `None` uses the API default.
    pub page_size: Option<u32>,
    pub search_term: Option<String>,
    pub agency_id: Option<String>,
    pub posted_from: Option<NaiveDate>,
    pub posted_to: Option<NaiveDate>,
    /// Inclusive lower bound on last-modified time, Eastern wall clock.
    pub modified_from: Option<NaiveDateTime>,
    pub modified_to: Option<NaiveDateTime>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl Default for QueryCommon {
    fn default() -> QueryCommon {
        QueryCommon {
            page: 1,
            page_size: None,
            search_term: None,
            agency_id: None,
            posted_from: None,
            posted_to: None,
            modified_from: None,
            modified_to: None,
            sort_field: SortField::LastModifiedDate,
            sort_direction: SortDirection::Asc,
        }
    }
}

impl QueryCommon {
    /// Appends the common pagination, filter and sort parameters to the URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(term) = &self.search_term {
                pairs.append_pair("filter[searchTerm]", term);
            }
            if let Some(agency_id) = &self.agency_id {
                pairs.append_pair("filter[agencyId]", agency_id);
            }
            if let Some(date) = self.posted_from {
                pairs.append_pair(
                    "filter[postedDate][ge]",
                    &date.format(POSTED_DATE_FORMAT).to_string(),
                );
            }
            if let Some(date) = self.posted_to {
                pairs.append_pair(
                    "filter[postedDate][le]",
                    &date.format(POSTED_DATE_FORMAT).to_string(),
                );
            }
            if let Some(at) = self.modified_from {
                pairs.append_pair(
                    "filter[lastModifiedDate][ge]",
                    &at.format(LAST_MODIFIED_FORMAT).to_string(),
                );
            }
            if let Some(at) = self.modified_to {
                pairs.append_pair(
                    "filter[lastModifiedDate][le]",
                    &at.format(LAST_MODIFIED_FORMAT).to_string(),
                );
            }
            if let Some(page_size) = self.page_size {
                pairs.append_pair("page[size]", &page_size.to_string());
            }
            pairs.append_pair("page[number]", &self.page.to_string());
            pairs.append_pair(
                "sort",
                &format!(
                    "{}{}",
                    match self.sort_direction {
                        SortDirection::Asc => "",
                        SortDirection::Desc => "-",
                    },
                    self.sort_field
                ),
            );
        }
        url
    }
}
