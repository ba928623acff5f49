//! Previous/next post navigation.

use super::{GroupError, PostGrouper};
use crate::{
    groups::{Group, NavLink, NavSlot, NavigationIndex},
    items::Item,
};
use std::sync::Arc;

/// Builds the single navigation lookup over posts sorted newest first:
/// previous is the older neighbor, next the newer one.
pub struct NavigationGrouper;

impl PostGrouper for NavigationGrouper {
    fn group_posts(&self, posts: &[Arc<Item>]) -> Result<Vec<Group>, GroupError> {
        let mut index = NavigationIndex::default();
        for (i, post) in posts.iter().enumerate() {
            let prev = posts.get(i + 1).map(|p| NavLink::for_item(p));
            let next = (i > 0).then(|| NavLink::for_item(&posts[i - 1]));
            index.insert(post.source_key(), NavSlot { prev, next });
        }
        Ok(vec![Group::Navigation(index)])
    }
}
