//! Ordered page storage
//!
//! Display order is insertion order. Positions are bounds-checked on every
//! call and an out-of-range position is a caller bug, so it panics.

use crate::page::TabPage;

#[derive(Debug, Default, Clone)]
pub struct PageCollection {
    pages: Vec<TabPage>,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Insert `page` at `position` in `[0, count]`
    pub fn insert(&mut self, page: TabPage, position: usize) {
        assert!(
            position <= self.pages.len(),
            "insert position {position} out of bounds for {} pages",
            self.pages.len()
        );
        assert!(
            !self.contains(&page),
            "page {} is already in the collection",
            page.id()
        );

        self.pages.insert(position, page);
    }

    pub fn remove(&mut self, position: usize) -> TabPage {
        self.check(position);
        self.pages.remove(position)
    }

    /// Move the page at `from` to `to`, keeping the relative order of the rest
    pub fn move_page(&mut self, from: usize, to: usize) {
        self.check(from);
        self.check(to);

        let page = self.pages.remove(from);
        self.pages.insert(to, page);
    }

    pub fn get(&self, position: usize) -> &TabPage {
        self.check(position);
        &self.pages[position]
    }

    pub fn position_of(&self, page: &TabPage) -> Option<usize> {
        self.pages.iter().position(|p| p == page)
    }

    pub fn contains(&self, page: &TabPage) -> bool {
        self.pages.contains(page)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabPage> {
        self.pages.iter()
    }

    pub fn to_vec(&self) -> Vec<TabPage> {
        self.pages.clone()
    }

    pub(crate) fn into_vec(self) -> Vec<TabPage> {
        self.pages
    }

    fn check(&self, position: usize) {
        assert!(
            position < self.pages.len(),
            "position {position} out of bounds for {} pages",
            self.pages.len()
        );
    }
}
