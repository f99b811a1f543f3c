//! This modules defines the common functionality for paging data.
//!
//! Paging is stateless: each request counts and slices the transaction table
//! again, so pages reflect the database at the time of the request.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    transaction::{Transaction, count_transactions, get_transactions_slice},
};

/// The config for pagination
///
/// Built with [PaginationConfig::new] so the default page size always fits
/// under the maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    default_page_size: u64,
    max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Create a pagination config, checking that the default fits under the maximum.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if `default_page_size` is zero or
    /// larger than `max_page_size`.
    pub fn new(default_page_size: u64, max_page_size: u64) -> Result<Self, Error> {
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(Error::InvalidArgument(format!(
                "the default page size must be between 1 and the max page size {max_page_size}, \
                got {default_page_size}"
            )));
        }

        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }

    /// The number of items per page when not specified in a request.
    pub fn default_page_size(&self) -> u64 {
        self.default_page_size
    }

    /// The largest page size a request may ask for.
    ///
    /// Larger requests are rejected with [Error::InvalidArgument].
    pub fn max_page_size(&self) -> u64 {
        self.max_page_size
    }
}

/// The raw paging parameters of a request.
///
/// Clients may use either a 1-based `page` with a page `size`, or an
/// `offset` with a `limit`. When both styles are given, `offset` and `limit`
/// take precedence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    /// The 1-based page number.
    pub page: Option<i64>,
    /// The number of items per page.
    pub size: Option<i64>,
    /// The number of items to skip.
    pub offset: Option<i64>,
    /// The maximum number of items to return.
    pub limit: Option<i64>,
}

/// A validated request for one page of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    offset: u64,
    limit: u64,
}

impl PageRequest {
    /// Create a request for at most `limit` items starting at `offset`.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if `offset` is negative, if `limit`
    /// is not positive, or if `limit` is larger than the configured maximum.
    pub fn new(offset: i64, limit: i64, config: &PaginationConfig) -> Result<Self, Error> {
        if offset < 0 {
            return Err(Error::InvalidArgument(format!(
                "offset must not be negative, got {offset}"
            )));
        }

        if limit <= 0 {
            return Err(Error::InvalidArgument(format!(
                "limit must be positive, got {limit}"
            )));
        }

        let offset = offset.unsigned_abs();
        let limit = limit.unsigned_abs();

        if limit > config.max_page_size {
            return Err(Error::InvalidArgument(format!(
                "limit must be at most {}, got {limit}",
                config.max_page_size
            )));
        }

        Ok(Self { offset, limit })
    }

    /// Resolve the paging parameters of a request, filling in defaults from `config`.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if `page` is less than one or any of
    /// the checks in [PageRequest::new] fail.
    pub fn from_query(query: PageQuery, config: &PaginationConfig) -> Result<Self, Error> {
        let default_limit = i64::try_from(config.default_page_size).unwrap_or(i64::MAX);
        let limit = query.limit.or(query.size).unwrap_or(default_limit);

        let offset = match (query.offset, query.page) {
            (Some(offset), _) => offset,
            (None, Some(page)) if page < 1 => {
                return Err(Error::InvalidArgument(format!(
                    "page must be at least 1, got {page}"
                )));
            }
            (None, Some(page)) => (page - 1)
                .checked_mul(limit.max(0))
                .ok_or_else(|| Error::InvalidArgument(format!("page {page} is too large")))?,
            (None, None) => 0,
        };

        Self::new(offset, limit, config)
    }

    /// The number of items to skip.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The maximum number of items in the page.
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// One page of items together with the metadata needed to fetch the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items in this page, at most `size` of them.
    pub items: Vec<T>,
    /// The total number of items at the time of the request.
    pub total: u64,
    /// The 1-based number of this page.
    pub page: u64,
    /// The requested page size.
    pub size: u64,
    /// The number of pages of `size` items needed to hold `total` items.
    pub pages: u64,
    /// The number of items before this page.
    pub offset: u64,
}

impl<T> Page<T> {
    /// Whether there are more items after this page.
    pub fn has_next(&self) -> bool {
        self.offset + (self.items.len() as u64) < self.total
    }
}

/// Get one page of transactions in ascending ID order.
///
/// The count and the slice are read in the same SQL transaction so that
/// `total` agrees with `items`.
///
/// # Errors
/// Returns an [Error::SqlError] if the database cannot be read.
pub fn get_transaction_page(
    request: PageRequest,
    connection: &Connection,
) -> Result<Page<Transaction>, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let total = count_transactions(&sql_transaction)?;
    let items = get_transactions_slice(request.offset, request.limit, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(Page {
        items,
        total,
        page: request.offset / request.limit + 1,
        size: request.limit,
        pages: total.div_ceil(request.limit),
        offset: request.offset,
    })
}
