//! Pagination arithmetic shared by the listing endpoints.
//!
//! Page numbers are 1-based. The first page is always valid, even over an
//! empty table; any page past the last is out of range and surfaces as a
//! not-found response.

use serde::Serialize;
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct PageNumber(u64);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    #[must_use]
    pub const fn new(number: u64) -> Option<Self> {
        if number >= 1 { Some(Self(number)) } else { None }
    }

    #[must_use]
    pub const fn new_unchecked(number: u64) -> Self {
        match Self::new(number) {
            Some(number) => number,
            None => panic!("Page number out of range."),
        }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct PageSize(u64);

impl PageSize {
    #[must_use]
    pub const fn new(size: u64) -> Option<Self> {
        if size >= 1 { Some(Self(size)) } else { None }
    }

    #[must_use]
    pub const fn new_unchecked(size: u64) -> Self {
        match Self::new(size) {
            Some(size) => size,
            None => panic!("Page size out of range."),
        }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Error)]
#[error("Page {requested} is out of range: there are {total_pages} pages")]
pub struct PageOutOfRangeError {
    pub requested: u64,
    pub total_pages: u64,
}

/// The query window for one valid page.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct PageBounds {
    pub number: PageNumber,
    pub total_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

pub fn paginate(
    total_items: u64,
    size: PageSize,
    number: PageNumber,
) -> Result<PageBounds, PageOutOfRangeError> {
    let total_pages = total_items.div_ceil(size.get()).max(1);
    if number.get() > total_pages {
        return Err(PageOutOfRangeError {
            requested: number.get(),
            total_pages,
        });
    }

    Ok(PageBounds {
        number,
        total_pages,
        offset: (number.get() - 1) * size.get(),
        limit: size.get(),
    })
}

/// One page of items plus the navigation facts a listing view needs.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, bounds: &PageBounds) -> Self {
        let number = bounds.number.get();

        Self {
            items,
            number,
            total_pages: bounds.total_pages,
            has_previous: number > 1,
            has_next: number < bounds.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::page::{Page, PageBounds, PageNumber, PageOutOfRangeError, PageSize, paginate};

    const THREE: PageSize = PageSize::new_unchecked(3);

    #[test]
    fn first_page_is_valid_even_when_empty() {
        let bounds = paginate(0, THREE, PageNumber::FIRST).unwrap();

        assert_eq!(bounds.total_pages, 1);
        assert_eq!(bounds.offset, 0);
        assert_eq!(bounds.limit, 3);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(paginate(1, THREE, PageNumber::FIRST).unwrap().total_pages, 1);
        assert_eq!(paginate(3, THREE, PageNumber::FIRST).unwrap().total_pages, 1);
        assert_eq!(paginate(4, THREE, PageNumber::FIRST).unwrap().total_pages, 2);
        assert_eq!(paginate(9, THREE, PageNumber::FIRST).unwrap().total_pages, 3);
        assert_eq!(
            paginate(10, THREE, PageNumber::FIRST).unwrap().total_pages,
            4
        );
    }

    #[test]
    fn bounds_follow_the_page_number() {
        let second = paginate(10, THREE, PageNumber::new_unchecked(2)).unwrap();
        assert_eq!(second.offset, 3);
        assert_eq!(second.limit, 3);

        let last = paginate(10, THREE, PageNumber::new_unchecked(4)).unwrap();
        assert_eq!(last.offset, 9);
    }

    #[test]
    fn pages_past_the_end_are_out_of_range() {
        assert_eq!(
            paginate(10, THREE, PageNumber::new_unchecked(5)),
            Err(PageOutOfRangeError {
                requested: 5,
                total_pages: 4,
            })
        );
        assert_eq!(
            paginate(0, THREE, PageNumber::new_unchecked(2)),
            Err(PageOutOfRangeError {
                requested: 2,
                total_pages: 1,
            })
        );

        assert_eq!(PageNumber::new(0), None);
    }

    #[test]
    fn navigation_flags() {
        let page = |number: u64| -> Page<u64> {
            let bounds: PageBounds =
                paginate(10, THREE, PageNumber::new_unchecked(number)).unwrap();
            Page::new(Vec::new(), &bounds)
        };

        assert!(!page(1).has_previous);
        assert!(page(1).has_next);
        assert!(page(2).has_previous);
        assert!(page(2).has_next);
        assert!(page(4).has_previous);
        assert!(!page(4).has_next);
    }
}
