//! Filtered, paginated views of the user roster.
//!
//! `RosterFilter` holds the two pieces of view state (search term, page
//! offset) and derives pages from a roster slice on demand. It never owns the
//! roster: the session state does, and any change to either the roster or the
//! search term simply means deriving the page again.
//!
//! Matching is a case-insensitive substring test against name or email.
//! Changing the search term resets the offset to zero, since a stale offset
//! past the new filtered length would render an empty page. Page selection
//! clamps the requested index into range rather than wrapping.

use crate::session::UserProfile;

/// Fixed page size of the user list.
pub const PAGE_SIZE: usize = 5;

/// One derived page of the filtered roster.
#[derive(Debug, PartialEq)]
pub struct RosterPage {
    pub items: Vec<UserProfile>,
    pub page_count: usize,
    pub filtered_len: usize,
}

/// View state for the administrative user list.
#[derive(Debug, Default, Clone)]
pub struct RosterFilter {
    search: String,
    offset: usize,
}

impl RosterFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Update the search term; the offset restarts at the first page.
    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        self.offset = 0;
    }

    /// Select a 0-based page index, clamped into `[0, page_count)` for the
    /// given filtered length.
    pub fn select_page(&mut self, page: usize, filtered_len: usize) {
        if filtered_len == 0 {
            self.offset = 0;
            return;
        }
        let page_count = filtered_len.div_ceil(PAGE_SIZE);
        self.offset = page.min(page_count - 1) * PAGE_SIZE;
    }

    /// Profiles whose name or email contains the search term,
    /// case-insensitively. An empty term includes everything.
    #[must_use]
    pub fn filtered<'a>(&self, roster: &'a [UserProfile]) -> Vec<&'a UserProfile> {
        let needle = self.search.to_lowercase();
        roster
            .iter()
            .filter(|user| {
                needle.is_empty()
                    || user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Derive the visible page for the current search term and offset.
    #[must_use]
    pub fn page(&self, roster: &[UserProfile]) -> RosterPage {
        let filtered = self.filtered(roster);
        let filtered_len = filtered.len();
        let end = (self.offset + PAGE_SIZE).min(filtered_len);
        let items = if self.offset >= filtered_len {
            Vec::new()
        } else {
            filtered[self.offset..end].iter().map(|&u| u.clone()).collect()
        };

        RosterPage {
            items,
            page_count: filtered_len.div_ceil(PAGE_SIZE),
            filtered_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserRole;

    fn roster(count: usize) -> Vec<UserProfile> {
        (0..count)
            .map(|i| UserProfile {
                id: format!("u{i}"),
                name: format!("User {i}"),
                email: format!("user{i}@example.com"),
                role: UserRole::Subscriber,
                is_verified: i % 2 == 0,
            })
            .collect()
    }

    #[test]
    fn twelve_items_make_three_pages() {
        let filter = RosterFilter::new();
        let page = filter.page(&roster(12));
        assert_eq!(page.page_count, 3);
        assert_eq!(page.filtered_len, 12);
        assert_eq!(page.items.len(), PAGE_SIZE);
    }

    #[test]
    fn last_page_is_clipped_to_available_length() {
        let mut filter = RosterFilter::new();
        filter.select_page(2, 12);
        assert_eq!(filter.offset(), 10);
        let page = filter.page(&roster(12));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "u10");
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let mut filter = RosterFilter::new();
        filter.select_page(9, 12);
        assert_eq!(filter.offset(), 10);
    }

    #[test]
    fn empty_filtered_set_resets_offset() {
        let mut filter = RosterFilter::new();
        filter.select_page(3, 0);
        assert_eq!(filter.offset(), 0);
        assert_eq!(filter.page(&[]).items.len(), 0);
        assert_eq!(filter.page(&[]).page_count, 0);
    }

    #[test]
    fn filter_matches_name_or_email_case_insensitively() {
        let users = vec![
            UserProfile {
                id: "a".to_string(),
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                role: UserRole::Admin,
                is_verified: true,
            },
            UserProfile {
                id: "b".to_string(),
                name: "Grace Hopper".to_string(),
                email: "grace@navy.mil".to_string(),
                role: UserRole::Author,
                is_verified: true,
            },
        ];

        let mut filter = RosterFilter::new();
        filter.set_search("ADA");
        assert_eq!(filter.filtered(&users).len(), 1);

        filter.set_search("navy");
        let matched = filter.filtered(&users);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "b");

        filter.set_search("");
        assert_eq!(filter.filtered(&users).len(), 2);
    }

    #[test]
    fn changing_search_resets_offset() {
        let mut filter = RosterFilter::new();
        filter.select_page(2, 12);
        assert_eq!(filter.offset(), 10);
        filter.set_search("user1");
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn stale_offset_past_filtered_length_yields_empty_page() {
        let mut filter = RosterFilter::new();
        filter.select_page(2, 12);
        let page = filter.page(&roster(3));
        assert_eq!(page.items.len(), 0);
        assert_eq!(page.page_count, 1);
    }
}
