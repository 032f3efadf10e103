use crate::actor::{ActorExited, AddPeerRejected, RemovePeerRejected};
use crate::api::types::KvVersion;
use crate::membership::PromotionRejected;
use crate::replication::{QuorumReadError, ReplicateWriteError};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Key must not be empty")]
    InvalidKey,

    #[error("Key not found")]
    NotFound,

    // Retry later, or relax the concern.
    #[error("Read concern not met: {received} of {required} required nodes responded")]
    ReadConcernUnsatisfiable { required: usize, received: usize },

    // Two nodes hold different values under the same version.
    #[error("Consistency violation for key '{key}' at version {version:?}")]
    ConsistencyViolation { key: String, version: KvVersion },

    #[error("Local store failure")]
    LocalIo(io::Error),

    // Node logic runs on background tasks. This error is returned if they have exited.
    #[error("Node has shut down")]
    NodeShutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Key must not be empty")]
    InvalidKey,

    // Delete a key instead of writing an empty value to it.
    #[error("Value must not be empty")]
    InvalidValue,

    #[error("I'm not leader. Leader: {leader_hint:?}")]
    NotLeader { leader_hint: Option<String> },

    // The write is NOT rolled back on nodes that already applied it.
    #[error("Write concern not met: {acknowledged} of {required} required nodes acknowledged")]
    WriteConcernUnsatisfiable { required: usize, acknowledged: usize },

    #[error("Local store already holds version {current:?}, newer than or equal to {attempted:?}")]
    LocalVersionConflict { attempted: KvVersion, current: KvVersion },

    #[error("Local store failure")]
    LocalIo(io::Error),

    #[error("Node has shut down")]
    NodeShutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum AddPeerError {
    // Only in strict mode.
    #[error("{0} is already a member")]
    AlreadyExists(String),
    #[error("Invalid peer address '{0}'")]
    InvalidAddress(String),
    #[error("Node has shut down")]
    NodeShutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum RemovePeerError {
    // Only in strict mode.
    #[error("{0} is not a member")]
    NotFound(String),
    #[error("A node can't remove itself")]
    LocalNode,
    #[error("Node has shut down")]
    NodeShutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum PromoteError {
    #[error("Node hasn't joined a cluster yet")]
    Unassigned,
    #[error("{0} is already leader")]
    OtherLeaderPresent(String),
    #[error("Node has shut down")]
    NodeShutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum DemoteError {
    #[error("Node has shut down")]
    NodeShutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Node has shut down")]
    NodeShutdown,
}

// ------- Conversions --------

impl From<QuorumReadError> for ReadError {
    fn from(internal_error: QuorumReadError) -> Self {
        match internal_error {
            QuorumReadError::NotFound => ReadError::NotFound,
            QuorumReadError::ReadConcernUnsatisfiable { required, received } => {
                ReadError::ReadConcernUnsatisfiable { required, received }
            }
            QuorumReadError::ConsistencyViolation { key, version, .. } => ReadError::ConsistencyViolation {
                key,
                version: KvVersion::from(version),
            },
            QuorumReadError::LocalIo(e) => ReadError::LocalIo(e),
            QuorumReadError::ActorExited(_) => ReadError::NodeShutdown,
        }
    }
}

impl From<ReplicateWriteError> for WriteError {
    fn from(internal_error: ReplicateWriteError) -> Self {
        match internal_error {
            ReplicateWriteError::NotLeader(not_leader) => WriteError::NotLeader {
                leader_hint: not_leader.leader_hint.map(|leader| leader.into_inner()),
            },
            ReplicateWriteError::WriteConcernUnsatisfiable { required, acknowledged } => {
                WriteError::WriteConcernUnsatisfiable { required, acknowledged }
            }
            ReplicateWriteError::LocalVersionConflict { attempted, current } => WriteError::LocalVersionConflict {
                attempted: KvVersion::from(attempted),
                current: KvVersion::from(current),
            },
            ReplicateWriteError::LocalIo(e) => WriteError::LocalIo(e),
            ReplicateWriteError::ActorExited(_) => WriteError::NodeShutdown,
        }
    }
}

impl From<AddPeerRejected> for AddPeerError {
    fn from(internal_error: AddPeerRejected) -> Self {
        match internal_error {
            AddPeerRejected::AlreadyExists(address) => AddPeerError::AlreadyExists(address.into_inner()),
        }
    }
}

impl From<RemovePeerRejected> for RemovePeerError {
    fn from(internal_error: RemovePeerRejected) -> Self {
        match internal_error {
            RemovePeerRejected::NotFound(address) => RemovePeerError::NotFound(address.into_inner()),
            RemovePeerRejected::LocalNode => RemovePeerError::LocalNode,
        }
    }
}

impl From<PromotionRejected> for PromoteError {
    fn from(internal_error: PromotionRejected) -> Self {
        match internal_error {
            PromotionRejected::Unassigned => PromoteError::Unassigned,
            PromotionRejected::OtherLeaderPresent(leader) => PromoteError::OtherLeaderPresent(leader.into_inner()),
        }
    }
}

impl From<ActorExited> for AddPeerError {
    fn from(_: ActorExited) -> Self {
        AddPeerError::NodeShutdown
    }
}

impl From<ActorExited> for RemovePeerError {
    fn from(_: ActorExited) -> Self {
        RemovePeerError::NodeShutdown
    }
}

impl From<ActorExited> for PromoteError {
    fn from(_: ActorExited) -> Self {
        PromoteError::NodeShutdown
    }
}

impl From<ActorExited> for DemoteError {
    fn from(_: ActorExited) -> Self {
        DemoteError::NodeShutdown
    }
}

impl From<ActorExited> for StatusError {
    fn from(_: ActorExited) -> Self {
        StatusError::NodeShutdown
    }
}
