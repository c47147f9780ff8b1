//! The active-page snapshot and its single mutation path.
//!
//! The visible page is an explicit value owned by the store - not process
//! globals - copied out of the catalog on selection, so selection logic is
//! testable without a live display.

use heapless::String;

use super::page::{MenuError, MenuPage, PageCatalog, MAX_ITEMS, MAX_LABEL_LEN};

/// The currently rendered page's field values. A copy of a catalog entry,
/// never a reference into it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActivePage {
    pub number: u16,
    pub title: String<MAX_LABEL_LEN>,
    pub items: [String<MAX_LABEL_LEN>; MAX_ITEMS],
}

impl ActivePage {
    fn copy_from(&mut self, page: &MenuPage) {
        self.number = page.number;
        self.title = page.title.clone();
        self.items = page.items.clone();
    }
}

/// Holds the immutable catalog and the mutable active snapshot.
///
/// Single writer: only the main loop mutates the snapshot, and only through
/// [`MenuStore::select_page`].
#[derive(Debug)]
pub struct MenuStore {
    catalog: PageCatalog,
    active: ActivePage,
}

impl MenuStore {
    /// The active state starts as a copy of the first catalog page; callers
    /// normally follow up with [`MenuStore::select_page`] for the configured
    /// default.
    pub fn new(catalog: PageCatalog) -> Result<Self, MenuError> {
        let first = catalog.iter().next().ok_or(MenuError::EmptyCatalog)?;
        let mut active = ActivePage {
            number: 0,
            title: String::new(),
            items: Default::default(),
        };
        active.copy_from(first);
        Ok(Self { catalog, active })
    }

    /// Make `number` the active page.
    ///
    /// On a miss the snapshot is left exactly as it was: a stale but valid
    /// display beats a blank one.
    pub fn select_page(&mut self, number: u16) -> Result<(), MenuError> {
        let page = self
            .catalog
            .find(number)
            .ok_or(MenuError::PageNotFound(number))?;
        self.active.copy_from(page);
        Ok(())
    }

    /// Read-only view of the active snapshot.
    pub fn active(&self) -> &ActivePage {
        &self.active
    }

    /// Read-only view of the catalog.
    pub fn catalog(&self) -> &PageCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lights_items() -> [&'static str; MAX_ITEMS] {
        [
            "Knight R1",
            "Rainbow",
            "Dual Bnc",
            "Auto Off",
            "Knight R2",
            "Short Cir",
            "Zig Zag",
            "Auto On",
        ]
    }

    fn test_catalog() -> PageCatalog {
        let mut catalog = PageCatalog::new();
        catalog
            .push(MenuPage::new(30, "Lights", lights_items()))
            .unwrap();
        catalog
            .push(MenuPage::new(
                70,
                "Shows",
                [
                    "Rocket Man",
                    "Leia Holo",
                    "Zap",
                    "Open Zapper",
                    "Fav Things",
                    "TBD",
                    "TBD",
                    "Close Zapper",
                ],
            ))
            .unwrap();
        catalog
    }

    #[test]
    fn test_new_requires_pages() {
        assert!(matches!(
            MenuStore::new(PageCatalog::new()),
            Err(MenuError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_new_starts_on_first_page() {
        let store = MenuStore::new(test_catalog()).unwrap();
        assert_eq!(store.active().number, 30);
        assert_eq!(store.active().title.as_str(), "Lights");
    }

    #[test]
    fn test_select_copies_catalog_entry() {
        let mut store = MenuStore::new(test_catalog()).unwrap();
        store.select_page(70).unwrap();

        let active = store.active();
        let entry = store.catalog().find(70).unwrap();
        assert_eq!(active.number, entry.number);
        assert_eq!(active.title, entry.title);
        assert_eq!(active.items, entry.items);
    }

    #[test]
    fn test_select_is_a_copy_not_a_reference() {
        let mut store = MenuStore::new(test_catalog()).unwrap();
        store.select_page(30).unwrap();

        // push the snapshot around; the catalog entry must be unaffected
        let mut snapshot = store.active().clone();
        snapshot.title.clear();
        snapshot.items[0].clear();

        let entry = store.catalog().find(30).unwrap();
        assert_eq!(entry.title.as_str(), "Lights");
        assert_eq!(entry.items[0].as_str(), "Knight R1");
        assert_eq!(store.active().title.as_str(), "Lights");
    }

    #[test]
    fn test_select_unknown_leaves_state() {
        let mut store = MenuStore::new(test_catalog()).unwrap();
        store.select_page(70).unwrap();
        let before = store.active().clone();

        assert_eq!(store.select_page(42), Err(MenuError::PageNotFound(42)));
        assert_eq!(store.active(), &before);
    }

    proptest! {
        // Failure is idempotent for every unknown page number.
        #[test]
        fn select_failure_never_mutates(number in any::<u16>()) {
            let mut store = MenuStore::new(test_catalog()).unwrap();
            store.select_page(70).unwrap();
            let before = store.active().clone();

            if store.catalog().find(number).is_none() {
                prop_assert!(store.select_page(number).is_err());
                prop_assert_eq!(store.active(), &before);
            }
        }
    }
}
