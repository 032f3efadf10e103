use crate::membership::NodeAddress;
use crate::store::{Entry, Version};
use std::collections::BTreeMap;

/// Two nodes hold different values under the same version. Under a single leader this can't
/// happen, so it is never resolved by picking one.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ConflictingVersions {
    pub(crate) version: Version,
    pub(crate) nodes: (NodeAddress, NodeAddress),
}

/// Picks the newest entry among the responses. `Ok(None)` means no responding node has the key.
/// A tombstone can win; callers decide what a deleted key reads as.
pub(crate) fn newest_entry(
    responses: impl IntoIterator<Item = (NodeAddress, Option<Entry>)>,
) -> Result<Option<Entry>, ConflictingVersions> {
    let mut by_version: BTreeMap<Version, (NodeAddress, Entry)> = BTreeMap::new();

    for (node, entry) in responses {
        let entry = match entry {
            Some(entry) => entry,
            None => continue,
        };

        if let Some((seen_on, seen)) = by_version.get(&entry.version) {
            if seen.value != entry.value {
                return Err(ConflictingVersions {
                    version: entry.version,
                    nodes: (seen_on.clone(), node),
                });
            }
            continue;
        }
        by_version.insert(entry.version, (node, entry));
    }

    Ok(by_version.into_iter().next_back().map(|(_, (_, entry))| entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::Epoch;

    fn entry(epoch: u64, sequence: u64, value: Option<&str>) -> Option<Entry> {
        Some(Entry::new(
            Version::new(Epoch::new(epoch), sequence),
            value.map(str::to_string),
        ))
    }

    fn node(a: &str) -> NodeAddress {
        NodeAddress::new(a)
    }

    #[test]
    fn highest_version_wins() {
        let newest = newest_entry(vec![
            (node("a:1"), entry(1, 4, Some("old"))),
            (node("b:1"), entry(1, 9, Some("new"))),
            (node("c:1"), None),
        ]);

        assert_eq!(newest, Ok(entry(1, 9, Some("new"))));
    }

    #[test]
    fn nobody_has_it() {
        assert_eq!(newest_entry(vec![(node("a:1"), None), (node("b:1"), None)]), Ok(None));
    }

    #[test]
    fn equal_versions_with_equal_values_agree() {
        let newest = newest_entry(vec![
            (node("a:1"), entry(2, 1, Some("v"))),
            (node("b:1"), entry(2, 1, Some("v"))),
        ]);

        assert_eq!(newest, Ok(entry(2, 1, Some("v"))));
    }

    #[test]
    fn tombstone_can_be_newest() {
        let newest = newest_entry(vec![
            (node("a:1"), entry(1, 1, Some("v"))),
            (node("b:1"), entry(1, 2, None)),
        ]);

        assert_eq!(newest, Ok(entry(1, 2, None)));
    }

    #[test]
    fn equal_versions_with_different_values_is_a_violation() {
        let newest = newest_entry(vec![
            (node("a:1"), entry(1, 3, Some("x"))),
            (node("b:1"), entry(1, 3, Some("y"))),
        ]);

        assert_eq!(
            newest,
            Err(ConflictingVersions {
                version: Version::new(Epoch::new(1), 3),
                nodes: (node("a:1"), node("b:1")),
            })
        );
    }
}
