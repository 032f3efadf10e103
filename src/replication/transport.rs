use crate::membership::{Epoch, MembershipChange, MembershipSync, NodeAddress};
use crate::store::Entry;

/// ReplicatedWrite is what the leader ships to each follower for a single key.
#[derive(Clone, Debug)]
pub(crate) struct ReplicatedWrite {
    pub(crate) leader: NodeAddress,
    pub(crate) leader_epoch: Epoch,
    pub(crate) key: String,
    pub(crate) entry: Entry,
}

/// Failure of a single call to a peer. These are only ever counted against a tally. They never
/// fail a client operation on their own.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PeerCallError {
    #[error("Peer unreachable: {0}")]
    Unreachable(String),
    #[error("Peer did not answer in time")]
    Timeout,
    #[error("Peer knows a newer leader epoch {epoch:?} (leader: {leader:?})")]
    StaleEpoch {
        leader: Option<NodeAddress>,
        epoch: Epoch,
    },
    #[error("Peer rejected the call: {0}")]
    Rejected(String),
}

impl PeerCallError {
    /// False when the peer never produced an answer. Only those calls count against its liveness.
    pub(crate) fn peer_responded(&self) -> bool {
        match self {
            PeerCallError::Unreachable(_) | PeerCallError::Timeout => false,
            PeerCallError::StaleEpoch { .. } | PeerCallError::Rejected(_) => true,
        }
    }
}

/// PeerTransport is everything a node needs to say to another node.
#[async_trait::async_trait]
pub(crate) trait PeerTransport: Send + Sync + 'static {
    async fn send_write(&self, peer: &NodeAddress, write: ReplicatedWrite) -> Result<(), PeerCallError>;

    /// Returns the peer's local entry for `key`, tombstones included.
    async fn send_read(&self, peer: &NodeAddress, key: &str) -> Result<Option<Entry>, PeerCallError>;

    async fn notify(
        &self,
        peer: &NodeAddress,
        sender: &NodeAddress,
        change: MembershipChange,
    ) -> Result<(), PeerCallError>;

    async fn sync_membership(
        &self,
        peer: &NodeAddress,
        sender: &NodeAddress,
        sync: MembershipSync,
    ) -> Result<(), PeerCallError>;
}
