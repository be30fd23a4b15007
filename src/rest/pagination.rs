//! Pagination driver.
//!
//! eBay collection endpoints return one page per call, addressed by `limit`
//! and `offset`. A [`Paginator`] walks those pages lazily and yields a single
//! stream of [`PageItem`]s: page-level metadata once per distinct value,
//! every record in upstream order, and a closing total.
//!
//! # Example
//!
//! ```rust,ignore
//! use ebay_rest::rest::resources::Search;
//! use ebay_rest::rest::PageItem;
//!
//! let mut pages = api.paginate(Search::keywords("lamp"), Some(500))?;
//! while let Some(item) = pages.next().await {
//!     match item? {
//!         PageItem::Record(record) => println!("{}", record["title"]),
//!         PageItem::Info(info) => println!("info: {info:?}"),
//!         PageItem::Total { records_yielded, records_available } => {
//!             println!("{records_yielded} of {records_available}");
//!         }
//!     }
//! }
//! ```
//!
//! The sequence is single-use. Dropping it early skips the closing total;
//! nothing is held between pages.

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::api::Api;
use crate::error::{Error, Result};
use crate::reference::MAX_PAGE_SIZE;
use crate::rest::PagedEndpoint;

/// Page-level fields that control paging and are never reported as info.
pub const PAGINATION_CONTROLS: &[&str] =
    &["href", "limit", "next", "offset", "prev", "total", "warnings"];

/// One element of a paginated sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    /// A normalized record.
    Record(Value),
    /// Page-level fields other than the records and the pagination controls.
    Info(Map<String, Value>),
    /// Closing summary, produced once when the sequence completes.
    Total {
        /// Records actually yielded.
        records_yielded: u64,
        /// The last upstream `total`, or zero when none was observed.
        records_available: u64,
    },
}

/// Paging state, independent of how pages are fetched.
#[derive(Debug, Clone)]
pub(crate) struct PageCursor {
    limit: Option<u64>,
    offset: u64,
    yielded: u64,
    total: Option<u64>,
    record_key: Option<String>,
    seen_info: Vec<Map<String, Value>>,
    pages: u64,
    done: bool,
}

impl PageCursor {
    pub(crate) const fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            offset: 0,
            yielded: 0,
            total: None,
            record_key: None,
            seen_info: Vec::new(),
            pages: 0,
            done: false,
        }
    }

    pub(crate) const fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) const fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) const fn is_first_page(&self) -> bool {
        self.pages == 0
    }

    /// Records to request on the next page.
    pub(crate) fn page_size(&self) -> u32 {
        let cap = u64::from(MAX_PAGE_SIZE);
        let wanted = self
            .limit
            .map_or(cap, |limit| limit.saturating_sub(self.yielded).min(cap));
        u32::try_from(wanted).unwrap_or(MAX_PAGE_SIZE)
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.yielded >= limit)
    }

    pub(crate) fn total(&self) -> PageItem {
        PageItem::Total {
            records_yielded: self.yielded,
            records_available: self.total.unwrap_or(0),
        }
    }

    /// Consumes one fetched page and returns the items it contributes.
    pub(crate) fn consume(&mut self, page: &Value) -> Vec<PageItem> {
        let requested = u64::from(self.page_size());
        self.pages += 1;

        let Value::Object(fields) = page else {
            tracing::debug!("page is not an object; ending pagination");
            self.done = true;
            return Vec::new();
        };

        if let Some(total) = fields.get("total").and_then(Value::as_u64) {
            self.total = Some(total);
        }
        if self.record_key.is_none() {
            self.record_key = fields
                .iter()
                .find(|(key, value)| !PAGINATION_CONTROLS.contains(&key.as_str()) && value.is_array())
                .map(|(key, _)| key.clone());
        }

        let mut items = Vec::new();
        let info: Map<String, Value> = fields
            .iter()
            .filter(|(key, _)| {
                !PAGINATION_CONTROLS.contains(&key.as_str())
                    && self.record_key.as_deref() != Some(key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !info.is_empty() && !self.seen_info.contains(&info) {
            self.seen_info.push(info.clone());
            items.push(PageItem::Info(info));
        }

        let records = self
            .record_key
            .as_deref()
            .and_then(|key| fields.get(key))
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);
        let count = records.len() as u64;
        for record in records {
            if self.limit_reached() {
                break;
            }
            items.push(PageItem::Record(record.clone()));
            self.yielded += 1;
        }
        self.offset += count;

        tracing::debug!(
            page = self.pages,
            records = count,
            offset = self.offset,
            total = ?self.total,
            "consumed page"
        );

        if self.limit_reached()
            || count == 0
            || count < requested
            || self.total.is_some_and(|total| self.offset >= total)
        {
            self.done = true;
        }
        items
    }
}

/// A lazy, single-use sequence over every page of a [`PagedEndpoint`].
///
/// Created by [`Api::paginate`]. The rate governor is consulted before the
/// first page only.
#[derive(Debug)]
pub struct Paginator<E: PagedEndpoint> {
    api: Api,
    endpoint: E,
    cursor: PageCursor,
    pending: VecDeque<PageItem>,
    finished: bool,
}

impl<E: PagedEndpoint> Paginator<E> {
    /// Validates the caller's arguments and prepares the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPagination`] if the endpoint carries an
    /// explicit offset or `limit` is not a positive integer.
    pub(crate) fn new(api: Api, endpoint: E, limit: Option<i64>) -> Result<Self> {
        if let Some(offset) = endpoint.offset() {
            return Err(Error::InvalidPagination {
                reason: format!("offset {offset} is managed by the paginator and must not be set"),
            });
        }
        let limit = match limit {
            None => None,
            Some(limit) => Some(u64::try_from(limit).ok().filter(|l| *l > 0).ok_or_else(
                || Error::InvalidPagination {
                    reason: format!("limit must be a positive integer, got {limit}"),
                },
            )?),
        };
        Ok(Self {
            api,
            endpoint,
            cursor: PageCursor::new(limit),
            pending: VecDeque::new(),
            finished: false,
        })
    }

    /// Returns the next item, fetching a page when needed.
    ///
    /// After an error is returned the sequence is over.
    pub async fn next(&mut self) -> Option<Result<PageItem>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            if self.finished {
                return None;
            }
            if self.cursor.is_done() {
                self.finished = true;
                return Some(Ok(self.cursor.total()));
            }

            let page_request = self
                .endpoint
                .with_page(self.cursor.page_size(), self.cursor.offset());
            let gate = self.cursor.is_first_page();
            match self.api.call_page(&page_request, gate).await {
                Ok(page) => {
                    let items = self.cursor.consume(&page);
                    self.pending.extend(items);
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }

    /// Drains the sequence, keeping records only.
    ///
    /// # Errors
    ///
    /// Returns the first error of the sequence.
    pub async fn collect_records(mut self) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        while let Some(item) = self.next().await {
            if let PageItem::Record(record) = item? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(records: usize, start: usize, total: u64) -> Value {
        let items: Vec<Value> = (start..start + records).map(|i| json!({"id": i})).collect();
        json!({"href": "h", "limit": 200, "offset": start, "total": total, "itemSummaries": items})
    }

    fn drain(cursor: &mut PageCursor, pages: &[Value]) -> Vec<PageItem> {
        let mut items = Vec::new();
        for page in pages {
            assert!(!cursor.is_done());
            items.extend(cursor.consume(page));
        }
        assert!(cursor.is_done());
        items.push(cursor.total());
        items
    }

    #[test]
    fn test_three_pages_without_limit() {
        let mut cursor = PageCursor::new(None);
        assert_eq!(cursor.page_size(), 200);
        let items = drain(
            &mut cursor,
            &[page(200, 0, 450), page(200, 200, 450), page(50, 400, 450)],
        );

        let records = items.iter().filter(|i| matches!(i, PageItem::Record(_))).count();
        assert_eq!(records, 450);
        assert!(!items.iter().any(|i| matches!(i, PageItem::Info(_))));
        assert_eq!(
            items.last(),
            Some(&PageItem::Total {
                records_yielded: 450,
                records_available: 450
            })
        );
    }

    #[test]
    fn test_offset_advances_by_actual_count() {
        let mut cursor = PageCursor::new(None);
        cursor.consume(&page(200, 0, 1000));
        assert_eq!(cursor.offset(), 200);
        assert!(!cursor.is_first_page());
        cursor.consume(&page(150, 200, 1000));
        assert_eq!(cursor.offset(), 350);
        assert!(cursor.is_done());
    }

    #[test]
    fn test_limit_below_page_size() {
        let mut cursor = PageCursor::new(Some(10));
        assert_eq!(cursor.page_size(), 10);
        let items = drain(&mut cursor, &[page(10, 0, 500)]);
        assert_eq!(items.len(), 11);
        assert_eq!(
            items.last(),
            Some(&PageItem::Total {
                records_yielded: 10,
                records_available: 500
            })
        );
    }

    #[test]
    fn test_limit_spanning_pages_shrinks_last_request() {
        let mut cursor = PageCursor::new(Some(250));
        cursor.consume(&page(200, 0, 1000));
        assert_eq!(cursor.page_size(), 50);
        cursor.consume(&page(50, 200, 1000));
        assert!(cursor.is_done());
        assert_eq!(
            cursor.total(),
            PageItem::Total {
                records_yielded: 250,
                records_available: 1000
            }
        );
    }

    #[test]
    fn test_oversized_page_stops_at_limit() {
        let mut cursor = PageCursor::new(Some(3));
        let items = cursor.consume(&page(5, 0, 5));
        assert_eq!(items.len(), 3);
        assert!(cursor.is_done());
    }

    #[test]
    fn test_info_emitted_once_before_records() {
        let first = json!({
            "total": 300, "limit": 200, "offset": 0,
            "autoCorrections": {"q": "lamp"},
            "itemSummaries": vec![json!({"id": 1}); 200]
        });
        let second = json!({
            "total": 300, "limit": 200, "offset": 200,
            "autoCorrections": {"q": "lamp"},
            "itemSummaries": vec![json!({"id": 2}); 100]
        });

        let mut cursor = PageCursor::new(None);
        let items = drain(&mut cursor, &[first, second]);
        let infos: Vec<&PageItem> = items.iter().filter(|i| matches!(i, PageItem::Info(_))).collect();
        assert_eq!(infos.len(), 1);
        assert!(matches!(items[0], PageItem::Info(_)));
        assert_eq!(items.len(), 1 + 300 + 1);
    }

    #[test]
    fn test_distinct_info_is_emitted_again() {
        let mut cursor = PageCursor::new(None);
        let a = cursor.consume(&json!({"total": 4, "refinement": 1, "items": [1, 2]}));
        let b = cursor.consume(&json!({"total": 4, "refinement": 2, "items": [3, 4]}));
        assert!(matches!(a[0], PageItem::Info(_)));
        assert!(matches!(b[0], PageItem::Info(_)));
    }

    #[test]
    fn test_record_key_skips_warnings_and_is_reused() {
        let mut cursor = PageCursor::new(None);
        let items = cursor.consume(&json!({
            "warnings": [{"errorId": 1}],
            "orders": [{"orderId": "1"}],
            "total": 2
        }));
        assert_eq!(items, vec![PageItem::Record(json!({"orderId": "1"}))]);

        let items = cursor.consume(&json!({
            "lineItems": ["not records"],
            "orders": [{"orderId": "2"}],
            "total": 2
        }));
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], PageItem::Info(info) if info.contains_key("lineItems")));
        assert!(cursor.is_done());
    }

    #[test]
    fn test_page_without_sequence_yields_info_and_total() {
        let mut cursor = PageCursor::new(None);
        let items = drain(&mut cursor, &[json!({"total": 0, "note": "empty"})]);
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], PageItem::Info(_)));
        assert_eq!(
            items[1],
            PageItem::Total {
                records_yielded: 0,
                records_available: 0
            }
        );
    }

    #[test]
    fn test_full_page_at_total_stops() {
        let mut cursor = PageCursor::new(None);
        cursor.consume(&page(200, 0, 200));
        assert!(cursor.is_done());
    }

    #[test]
    fn test_full_page_without_total_continues() {
        let mut cursor = PageCursor::new(None);
        cursor.consume(&json!({"items": vec![json!(1); 200]}));
        assert!(!cursor.is_done());
        cursor.consume(&json!({"items": []}));
        assert!(cursor.is_done());
        assert_eq!(
            cursor.total(),
            PageItem::Total {
                records_yielded: 200,
                records_available: 0
            }
        );
    }
}
