//! Offset and limit pagination primitives.
//!
//! List endpoints accept `skip` and `limit` query parameters. This crate
//! validates them once at the edge so adapters receive a [`PageParams`] that is
//! always within bounds and can be handed straight to SQL `OFFSET`/`LIMIT`
//! clauses or applied to in-memory collections.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of items returned when the caller does not supply a limit.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest page a caller may request.
pub const MAX_LIMIT: u32 = 1000;

/// Errors raised when raw paging parameters are out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// `skip` was negative.
    #[error("skip must not be negative (got {skip})")]
    NegativeSkip {
        /// Rejected value.
        skip: i64,
    },
    /// `skip` does not fit the supported offset range.
    #[error("skip must not exceed {max} (got {skip})")]
    SkipTooLarge {
        /// Rejected value.
        skip: i64,
        /// Largest accepted offset.
        max: u32,
    },
    /// `limit` was zero, negative or above [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max} (got {limit})")]
    LimitOutOfRange {
        /// Rejected value.
        limit: i64,
        /// Largest accepted limit.
        max: u32,
    },
}

impl PaginationError {
    /// Name of the query parameter that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NegativeSkip { .. } | Self::SkipTooLarge { .. } => "skip",
            Self::LimitOutOfRange { .. } => "limit",
        }
    }
}

/// Validated offset/limit pair.
///
/// # Examples
/// ```
/// use pagination::PageParams;
///
/// let page = PageParams::from_raw(Some(20), Some(10)).expect("valid page");
/// assert_eq!(page.skip(), 20);
/// assert_eq!(page.limit(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageParams {
    skip: u32,
    limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    /// Build a page from already-unsigned values.
    ///
    /// # Errors
    /// Returns [`PaginationError::LimitOutOfRange`] when `limit` is zero or
    /// larger than [`MAX_LIMIT`].
    pub fn new(skip: u32, limit: u32) -> Result<Self, PaginationError> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PaginationError::LimitOutOfRange {
                limit: i64::from(limit),
                max: MAX_LIMIT,
            });
        }
        Ok(Self { skip, limit })
    }

    /// Build a page from optional signed query values, applying defaults.
    ///
    /// # Errors
    /// Returns a [`PaginationError`] naming the offending parameter.
    pub fn from_raw(skip: Option<i64>, limit: Option<i64>) -> Result<Self, PaginationError> {
        let skip = match skip {
            None => 0,
            Some(value) if value < 0 => return Err(PaginationError::NegativeSkip { skip: value }),
            Some(value) => u32::try_from(value).map_err(|_| PaginationError::SkipTooLarge {
                skip: value,
                max: u32::MAX,
            })?,
        };
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(value) => u32::try_from(value)
                .ok()
                .filter(|candidate| (1..=MAX_LIMIT).contains(candidate))
                .ok_or(PaginationError::LimitOutOfRange {
                    limit: value,
                    max: MAX_LIMIT,
                })?,
        };
        Ok(Self { skip, limit })
    }

    /// Number of items to skip.
    #[must_use]
    pub const fn skip(&self) -> u32 {
        self.skip
    }

    /// Maximum number of items to return.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Offset as the signed type SQL drivers expect.
    #[must_use]
    pub fn offset_i64(&self) -> i64 {
        i64::from(self.skip)
    }

    /// Limit as the signed type SQL drivers expect.
    #[must_use]
    pub fn limit_i64(&self) -> i64 {
        i64::from(self.limit)
    }

    /// Apply the page to an already ordered collection.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageParams;
    ///
    /// let page = PageParams::new(1, 2).expect("valid page");
    /// assert_eq!(page.apply(vec![1, 2, 3, 4]), vec![2, 3]);
    /// ```
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for paging validation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_when_values_missing() {
        let page = PageParams::from_raw(None, None).expect("defaults are valid");
        assert_eq!(page, PageParams::default());
        assert_eq!(page.limit(), DEFAULT_LIMIT);
        assert_eq!(page.skip(), 0);
    }

    #[rstest]
    #[case(Some(-1), None, "skip")]
    #[case(None, Some(0), "limit")]
    #[case(None, Some(-5), "limit")]
    #[case(None, Some(1001), "limit")]
    fn rejects_out_of_range_values(
        #[case] skip: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] field: &str,
    ) {
        let err = PageParams::from_raw(skip, limit).expect_err("invalid page");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn skip_beyond_offset_range_is_rejected() {
        let err = PageParams::from_raw(Some(i64::MAX), None).expect_err("skip too large");
        assert!(matches!(err, PaginationError::SkipTooLarge { .. }));
    }

    #[rstest]
    fn apply_slices_the_requested_window() {
        let page = PageParams::from_raw(Some(2), Some(2)).expect("valid page");
        assert_eq!(page.apply(vec!['a', 'b', 'c', 'd', 'e']), vec!['c', 'd']);
    }

    #[rstest]
    fn apply_past_the_end_is_empty() {
        let page = PageParams::from_raw(Some(10), None).expect("valid page");
        assert!(page.apply(vec![1, 2, 3]).is_empty());
    }

    #[rstest]
    fn sql_conversions_preserve_values() {
        let page = PageParams::new(7, 9).expect("valid page");
        assert_eq!(page.offset_i64(), 7);
        assert_eq!(page.limit_i64(), 9);
    }

    #[rstest]
    fn page_serialises_as_plain_object() {
        let page = PageParams::new(3, 4).expect("valid page");
        let value = serde_json::to_value(page).expect("serialise page");
        assert_eq!(value, serde_json::json!({ "skip": 3, "limit": 4 }));
    }
}
