//! Point lookup by key.

use std::borrow::Cow;

use skein_store::BlockStore;
use skein_types::Post;

use crate::error::{ListError, ListResult};
use crate::list::MerkleList;
use crate::node::{ChildLink, TreeNode};

impl<S: BlockStore> MerkleList<S> {
    /// Fetch a post whose `created_at` equals `key`.
    ///
    /// Routing follows the range summaries strictly: a key outside every
    /// child's `[min_key, max_key]` is reported as [`ListError::NotFound`]
    /// without guessing a neighbour. When several posts share the key, the
    /// first one in list order is returned, which is the earliest inserted.
    pub fn retrieve_post(&self, key: u64) -> ListResult<Post> {
        let Some(root) = &self.root else {
            return Err(ListError::NotFound { key });
        };

        let mut node = Cow::Borrowed(root);
        loop {
            let next = match node.as_ref() {
                TreeNode::Leaf { entries } => {
                    let entry = entries
                        .iter()
                        .find(|entry| entry.key == key)
                        .ok_or(ListError::NotFound { key })?;
                    return self.load_entry(entry);
                }
                TreeNode::Internal { depth, children } => {
                    let slot = route(children, key)?.ok_or(ListError::NotFound { key })?;
                    self.load_child(&children[slot], *depth)?
                }
            };
            node = Cow::Owned(next);
        }
    }
}

/// Pick the child whose range holds `key`.
///
/// Several children may claim the key only when a run of equal keys was cut
/// by a split, in which case each neighbouring pair shares `key` as its
/// boundary. The left-most of them holds the first occurrence. Any other
/// multi-match means the summaries are inconsistent.
pub(crate) fn route(children: &[ChildLink], key: u64) -> ListResult<Option<usize>> {
    let matches: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, link)| link.contains(key))
        .map(|(i, _)| i)
        .collect();

    let Some(&first) = matches.first() else {
        return Ok(None);
    };
    let straddles = matches.windows(2).all(|pair| {
        pair[1] == pair[0] + 1
            && children[pair[0]].max_key == key
            && children[pair[1]].min_key == key
    });
    if !straddles {
        return Err(ListError::AmbiguousRange {
            key,
            matches: matches.len(),
        });
    }
    Ok(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListConfig;
    use skein_store::InMemoryBlockStore;
    use skein_types::Address;

    fn link(min_key: u64, max_key: u64) -> ChildLink {
        ChildLink {
            min_key,
            max_key,
            address: Address::from_bytes(&[min_key as u8, max_key as u8]),
        }
    }

    fn filled(
        capacity: usize,
        keys: impl IntoIterator<Item = u64>,
    ) -> MerkleList<InMemoryBlockStore> {
        let mut list = MerkleList::new(
            InMemoryBlockStore::new(),
            ListConfig::with_capacity(capacity).unwrap(),
        )
        .unwrap();
        for key in keys {
            list.insert(&Post::new(key, format!("post-{key}"))).unwrap();
        }
        list
    }

    #[test]
    fn route_picks_the_containing_child() {
        let children = [link(1, 4), link(5, 9), link(10, 20)];
        assert_eq!(route(&children, 7).unwrap(), Some(1));
        assert_eq!(route(&children, 10).unwrap(), Some(2));
    }

    #[test]
    fn route_misses_gaps_and_outliers() {
        let children = [link(2, 4), link(8, 9)];
        assert_eq!(route(&children, 1).unwrap(), None);
        assert_eq!(route(&children, 6).unwrap(), None);
        assert_eq!(route(&children, 50).unwrap(), None);
    }

    #[test]
    fn route_accepts_split_duplicate_runs() {
        let children = [link(1, 5), link(5, 5), link(5, 8)];
        assert_eq!(route(&children, 5).unwrap(), Some(0));
    }

    #[test]
    fn route_rejects_overlapping_summaries() {
        let children = [link(1, 10), link(5, 20)];
        assert!(matches!(
            route(&children, 7),
            Err(ListError::AmbiguousRange { key: 7, matches: 2 })
        ));
    }

    #[test]
    fn empty_list_has_nothing() {
        let list = filled(4, []);
        assert!(matches!(list.retrieve_post(1), Err(ListError::NotFound { key: 1 })));
    }

    #[test]
    fn finds_every_inserted_key() {
        let list = filled(3, (1..=40).map(|k| k * 3));
        for key in (1..=40).map(|k| k * 3) {
            let post = list.retrieve_post(key).unwrap();
            assert_eq!(post.created_at, key);
            assert_eq!(post.data, format!("post-{key}"));
        }
    }

    #[test]
    fn missing_keys_are_not_found() {
        let list = filled(3, (1..=40).map(|k| k * 3));
        for key in [0, 1, 4, 50, 121, u64::MAX] {
            assert!(matches!(
                list.retrieve_post(key),
                Err(ListError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn duplicate_key_returns_first_in_order() {
        let mut list = filled(2, [1, 2, 3]);
        for payload in ["first", "second", "third", "fourth"] {
            list.insert(&Post::new(9, payload)).unwrap();
        }
        let post = list.retrieve_post(9).unwrap();
        assert_eq!(post.data, "first");
    }

    #[test]
    fn works_on_a_loaded_list() {
        let list = filled(4, 1..=30);
        let address = list.publish_root().unwrap();
        let loaded = MerkleList::load(list.store(), *list.config(), &address).unwrap();
        assert_eq!(loaded.retrieve_post(17).unwrap().created_at, 17);
    }
}
