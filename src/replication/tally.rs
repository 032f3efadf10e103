use crate::membership::NodeAddress;
use std::collections::HashSet;

/// Minimum number of nodes that form a majority of `cluster_size`.
pub(crate) fn quorum_size(cluster_size: usize) -> usize {
    cluster_size / 2 + 1
}

/// AckTally counts the nodes that answered an in-flight write or read against the number
/// required. It is owned by the one operation it belongs to.
#[derive(Debug)]
pub(crate) struct AckTally {
    required: usize,
    acknowledged: HashSet<NodeAddress>,
    outstanding: usize,
}

impl AckTally {
    /// `outstanding` is the number of nodes still expected to answer.
    pub(crate) fn new(required: usize, outstanding: usize) -> Self {
        AckTally {
            required,
            acknowledged: HashSet::new(),
            outstanding,
        }
    }

    pub(crate) fn record_ack(&mut self, node: NodeAddress) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.acknowledged.insert(node);
    }

    pub(crate) fn record_failure(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    pub(crate) fn required(&self) -> usize {
        self.required
    }

    pub(crate) fn acknowledged(&self) -> usize {
        self.acknowledged.len()
    }

    pub(crate) fn is_satisfied(&self) -> bool {
        self.acknowledged.len() >= self.required
    }

    /// True once even a full set of answers from the remaining nodes can't reach `required`.
    pub(crate) fn is_unsatisfiable(&self) -> bool {
        self.acknowledged.len() + self.outstanding < self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_sizes() {
        assert_eq!(quorum_size(1), 1);
        assert_eq!(quorum_size(2), 2);
        assert_eq!(quorum_size(3), 2);
        assert_eq!(quorum_size(4), 3);
        assert_eq!(quorum_size(5), 3);
    }

    #[test]
    fn satisfied_without_waiting_for_stragglers() {
        let mut tally = AckTally::new(2, 3);
        tally.record_ack(NodeAddress::new("a:1"));
        assert!(!tally.is_satisfied());

        tally.record_ack(NodeAddress::new("b:1"));
        assert!(tally.is_satisfied());
        assert!(!tally.is_unsatisfiable());
    }

    #[test]
    fn unsatisfiable_once_too_many_fail() {
        let mut tally = AckTally::new(3, 3);
        tally.record_ack(NodeAddress::new("a:1"));
        assert!(!tally.is_unsatisfiable());

        tally.record_failure();
        assert!(tally.is_unsatisfiable());
    }

    #[test]
    fn unsatisfiable_from_the_start_when_too_few_nodes() {
        let tally = AckTally::new(4, 2);
        assert!(tally.is_unsatisfiable());
    }

    #[test]
    fn duplicate_ack_counts_once() {
        let mut tally = AckTally::new(2, 3);
        tally.record_ack(NodeAddress::new("a:1"));
        tally.record_ack(NodeAddress::new("a:1"));

        assert_eq!(tally.acknowledged(), 1);
        assert!(!tally.is_satisfied());
    }
}
