use std::fmt;

/// NodeAddress identifies a node. It is also the address (`host:port`) peers use to reach it.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub(crate) struct NodeAddress(String);

impl NodeAddress {
    pub(crate) fn new(address: impl Into<String>) -> Self {
        NodeAddress(address.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Role {
    Leader,
    Follower,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Liveness {
    Alive,
    Suspected,
    Unreachable,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Node {
    pub(crate) address: NodeAddress,
    pub(crate) role: Role,
    pub(crate) liveness: Liveness,
    consecutive_failures: u32,
}

impl Node {
    pub(crate) fn new_follower(address: NodeAddress) -> Self {
        Node {
            address,
            role: Role::Follower,
            liveness: Liveness::Alive,
            consecutive_failures: 0,
        }
    }

    pub(crate) fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }

    /// Returns the new liveness if it changed.
    pub(crate) fn record_call_outcome(&mut self, reachable: bool, unreachable_after_failures: u32) -> Option<Liveness> {
        let previous = self.liveness;
        if reachable {
            self.consecutive_failures = 0;
            self.liveness = Liveness::Alive;
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            self.liveness = if self.consecutive_failures >= unreachable_after_failures {
                Liveness::Unreachable
            } else {
                Liveness::Suspected
            };
        }

        if previous != self.liveness {
            Some(self.liveness)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liveness_degrades_with_consecutive_failures_and_recovers_on_success() {
        let mut node = Node::new_follower(NodeAddress::new("n1:1"));

        assert_eq!(node.record_call_outcome(false, 3), Some(Liveness::Suspected));
        assert_eq!(node.record_call_outcome(false, 3), None);
        assert_eq!(node.record_call_outcome(false, 3), Some(Liveness::Unreachable));
        assert_eq!(node.record_call_outcome(false, 3), None);
        assert_eq!(node.record_call_outcome(true, 3), Some(Liveness::Alive));
        assert_eq!(node.record_call_outcome(false, 3), Some(Liveness::Suspected));
    }

    #[test]
    fn threshold_of_one_goes_straight_to_unreachable() {
        let mut node = Node::new_follower(NodeAddress::new("n1:1"));

        assert_eq!(node.record_call_outcome(false, 1), Some(Liveness::Unreachable));
    }
}
