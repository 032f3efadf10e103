use crate::membership::{Epoch, NodeAddress};

/// MembershipChange is what one node tells another so their registries converge. Receivers apply
/// it locally and never forward it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MembershipChange {
    PeerAdded(NodeAddress),
    PeerRemoved(NodeAddress),
    LeaderElected { leader: NodeAddress, epoch: Epoch },
    LeaderVacated { leader: NodeAddress, epoch: Epoch },
}

/// MembershipSync carries a full registry view to a newly added node.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MembershipSync {
    pub(crate) members: Vec<NodeAddress>,
    pub(crate) leader: Option<NodeAddress>,
    pub(crate) epoch: Epoch,
}

/// MembershipBroadcast is the set of messages a local membership or role change needs to send.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct MembershipBroadcast {
    pub(crate) notify: Vec<(NodeAddress, MembershipChange)>,
    pub(crate) sync: Option<(NodeAddress, MembershipSync)>,
}

impl MembershipBroadcast {
    pub(crate) fn none() -> Self {
        MembershipBroadcast::default()
    }

    pub(crate) fn to_all(targets: Vec<NodeAddress>, change: MembershipChange) -> Self {
        MembershipBroadcast {
            notify: targets.into_iter().map(|target| (target, change.clone())).collect(),
            sync: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.notify.is_empty() && self.sync.is_none()
    }
}
