use crate::membership::{Liveness, Node, NodeAddress, Role};
use std::collections::BTreeMap;

/// PeerRegistry is the local node's view of cluster membership. The local node is always a member
/// of its own registry.
///
/// Members are keyed (and iterated) by address, so every snapshot of the same membership lists
/// nodes in the same order. At most one member is marked Leader at any time.
pub(crate) struct PeerRegistry {
    my_address: NodeAddress,
    nodes: BTreeMap<NodeAddress, Node>,
}

impl PeerRegistry {
    pub(crate) fn new(my_address: NodeAddress) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(my_address.clone(), Node::new_follower(my_address.clone()));

        PeerRegistry { my_address, nodes }
    }

    pub(crate) fn my_address(&self) -> &NodeAddress {
        &self.my_address
    }

    pub(crate) fn contains(&self, address: &NodeAddress) -> bool {
        self.nodes.contains_key(address)
    }

    /// Returns true if the address was not already a member.
    pub(crate) fn add_peer(&mut self, address: NodeAddress) -> bool {
        if self.nodes.contains_key(&address) {
            return false;
        }

        self.nodes.insert(address.clone(), Node::new_follower(address));
        true
    }

    /// Returns the removed node, if it was a member. The local node can't be removed.
    pub(crate) fn remove_peer(&mut self, address: &NodeAddress) -> Option<Node> {
        if address == &self.my_address {
            return None;
        }

        self.nodes.remove(address)
    }

    /// Point-in-time copy of all members, ordered by address.
    pub(crate) fn list_peers(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }

    pub(crate) fn current_leader(&self) -> Option<&NodeAddress> {
        self.nodes.values().find(|node| node.is_leader()).map(|node| &node.address)
    }

    /// Marks `address` as the one and only leader. Returns false (and changes nothing) if the
    /// address is not a member.
    pub(crate) fn mark_leader(&mut self, address: &NodeAddress) -> bool {
        if !self.nodes.contains_key(address) {
            return false;
        }

        for node in self.nodes.values_mut() {
            node.role = if &node.address == address {
                Role::Leader
            } else {
                Role::Follower
            };
        }
        true
    }

    /// Returns the address that was leader, if any.
    pub(crate) fn clear_leader(&mut self) -> Option<NodeAddress> {
        let mut previous = None;
        for node in self.nodes.values_mut() {
            if node.is_leader() {
                node.role = Role::Follower;
                previous = Some(node.address.clone());
            }
        }
        previous
    }

    /// Returns the peer's new liveness if it changed. Outcomes for non-members are ignored.
    pub(crate) fn record_call_outcome(
        &mut self,
        address: &NodeAddress,
        reachable: bool,
        unreachable_after_failures: u32,
    ) -> Option<Liveness> {
        self.nodes
            .get_mut(address)
            .and_then(|node| node.record_call_outcome(reachable, unreachable_after_failures))
    }

    /// Replaces the membership with `members` (plus ourself). Members we already knew keep their
    /// liveness. Leader marks are cleared; the caller re-applies the leader it learned about.
    pub(crate) fn replace_members(&mut self, members: impl IntoIterator<Item = NodeAddress>) {
        let mut old_nodes = std::mem::take(&mut self.nodes);
        for address in members.into_iter().chain(std::iter::once(self.my_address.clone())) {
            let mut node = old_nodes
                .remove(&address)
                .unwrap_or_else(|| Node::new_follower(address.clone()));
            node.role = Role::Follower;
            self.nodes.insert(address, node);
        }
    }

    pub(crate) fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            my_address: self.my_address.clone(),
            leader: self.current_leader().cloned(),
            members: self.list_peers(),
        }
    }
}

/// RegistrySnapshot is an immutable copy of the registry. Reads and writes work off a snapshot
/// taken when they start, so concurrent membership changes don't affect an in-flight tally.
#[derive(Clone, Debug)]
pub(crate) struct RegistrySnapshot {
    pub(crate) my_address: NodeAddress,
    pub(crate) leader: Option<NodeAddress>,
    pub(crate) members: Vec<Node>,
}

impl RegistrySnapshot {
    /// Number of nodes in the cluster, including ourself.
    pub(crate) fn cluster_size(&self) -> usize {
        self.members.len()
    }

    /// Every member except ourself, in registry order.
    pub(crate) fn other_members(&self) -> Vec<NodeAddress> {
        self.members
            .iter()
            .filter(|node| node.address != self.my_address)
            .map(|node| node.address.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(a: &str) -> NodeAddress {
        NodeAddress::new(a)
    }

    fn addresses(registry: &PeerRegistry) -> Vec<String> {
        registry
            .list_peers()
            .into_iter()
            .map(|node| node.address.into_inner())
            .collect()
    }

    #[test]
    fn contains_self_from_the_start() {
        let registry = PeerRegistry::new(addr("me:1"));

        assert!(registry.contains(&addr("me:1")));
        assert_eq!(registry.current_leader(), None);
        assert_eq!(registry.snapshot().cluster_size(), 1);
        assert!(registry.snapshot().other_members().is_empty());
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let mut registry = PeerRegistry::new(addr("me:1"));

        assert!(registry.add_peer(addr("b:1")));
        let once = addresses(&registry);
        assert!(!registry.add_peer(addr("b:1")));
        assert_eq!(addresses(&registry), once);

        assert!(registry.remove_peer(&addr("b:1")).is_some());
        let removed_once = addresses(&registry);
        assert!(registry.remove_peer(&addr("b:1")).is_none());
        assert_eq!(addresses(&registry), removed_once);
    }

    #[test]
    fn cannot_remove_self() {
        let mut registry = PeerRegistry::new(addr("me:1"));

        assert!(registry.remove_peer(&addr("me:1")).is_none());
        assert!(registry.contains(&addr("me:1")));
    }

    #[test]
    fn listing_order_is_stable_regardless_of_insertion_order() {
        let mut r1 = PeerRegistry::new(addr("m:1"));
        r1.add_peer(addr("z:1"));
        r1.add_peer(addr("a:1"));

        let mut r2 = PeerRegistry::new(addr("m:1"));
        r2.add_peer(addr("a:1"));
        r2.add_peer(addr("z:1"));

        assert_eq!(addresses(&r1), vec!["a:1", "m:1", "z:1"]);
        assert_eq!(addresses(&r1), addresses(&r2));
    }

    #[test]
    fn at_most_one_leader() {
        let mut registry = PeerRegistry::new(addr("me:1"));
        registry.add_peer(addr("b:1"));
        registry.add_peer(addr("c:1"));

        assert!(registry.mark_leader(&addr("b:1")));
        assert!(registry.mark_leader(&addr("c:1")));

        let leaders: Vec<_> = registry.list_peers().into_iter().filter(|n| n.is_leader()).collect();
        assert_eq!(leaders.len(), 1);
        assert_eq!(registry.current_leader(), Some(&addr("c:1")));
    }

    #[test]
    fn cannot_mark_non_member_as_leader() {
        let mut registry = PeerRegistry::new(addr("me:1"));

        assert!(!registry.mark_leader(&addr("stranger:1")));
        assert_eq!(registry.current_leader(), None);
    }

    #[test]
    fn removing_the_leader_leaves_a_vacancy() {
        let mut registry = PeerRegistry::new(addr("me:1"));
        registry.add_peer(addr("b:1"));
        registry.mark_leader(&addr("b:1"));

        let removed = registry.remove_peer(&addr("b:1")).unwrap();

        assert!(removed.is_leader());
        assert_eq!(registry.current_leader(), None);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let mut registry = PeerRegistry::new(addr("me:1"));
        registry.add_peer(addr("b:1"));
        let snapshot = registry.snapshot();

        registry.add_peer(addr("c:1"));
        registry.remove_peer(&addr("b:1"));

        assert_eq!(snapshot.other_members(), vec![addr("b:1")]);
    }

    #[test]
    fn replace_members_keeps_self_and_known_liveness() {
        let mut registry = PeerRegistry::new(addr("me:1"));
        registry.add_peer(addr("b:1"));
        registry.add_peer(addr("old:1"));
        registry.record_call_outcome(&addr("b:1"), false, 3);
        registry.mark_leader(&addr("b:1"));

        registry.replace_members(vec![addr("b:1"), addr("c:1")]);

        assert_eq!(addresses(&registry), vec!["b:1", "c:1", "me:1"]);
        assert_eq!(registry.current_leader(), None);
        let b = registry.list_peers().into_iter().find(|n| n.address == addr("b:1")).unwrap();
        assert_eq!(b.liveness, Liveness::Suspected);
    }
}
