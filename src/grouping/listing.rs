//! Directory tree indices for code listings.

use super::{GroupError, GroupFormatter, ItemGrouper};
use crate::{
    groups::Group,
    items::{Item, ItemType},
};
use std::sync::Arc;

pub struct ListingIndexGrouper {
    formatter: GroupFormatter,
}

impl ListingIndexGrouper {
    pub fn new(formatter: GroupFormatter) -> Self {
        Self { formatter }
    }
}

impl ItemGrouper for ListingIndexGrouper {
    fn group_items(&self, items: &[Arc<Item>]) -> Result<Vec<Group>, GroupError> {
        let listings: Vec<Arc<Item>> = items
            .iter()
            .filter(|item| item.item_type == ItemType::Listing)
            .cloned()
            .collect();

        Ok(self
            .formatter
            .directory_tree_groups(&listings, "listing_list.liquid", "Listings (/", ")")
            .into_iter()
            .map(Group::DirectoryTree)
            .collect())
    }
}
