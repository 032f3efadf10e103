use crate::actor::ClusterSnapshot;
use crate::membership::{Epoch, Liveness, RoleState};
use crate::replication;
use crate::store::{Entry, Version};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReadConcern {
    /// Answer from the local store only.
    Local,
    /// Newest value among a majority of nodes, this one included.
    Majority,
    /// Newest value among every registered node. Fails if any of them doesn't answer.
    All,
}

impl FromStr for ReadConcern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ReadConcern::Local),
            "majority" => Ok(ReadConcern::Majority),
            "all" => Ok(ReadConcern::All),
            other => Err(format!("Unknown read concern '{}'. Expected local, majority or all.", other)),
        }
    }
}

impl From<ReadConcern> for replication::ReadConcern {
    fn from(concern: ReadConcern) -> Self {
        match concern {
            ReadConcern::Local => replication::ReadConcern::Local,
            ReadConcern::Majority => replication::ReadConcern::Majority,
            ReadConcern::All => replication::ReadConcern::All,
        }
    }
}

/// Version assigned by the leader to a write. Later writes have greater versions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct KvVersion {
    pub epoch: u64,
    pub sequence: u64,
}

impl From<Version> for KvVersion {
    fn from(version: Version) -> Self {
        KvVersion {
            epoch: version.epoch().as_u64(),
            sequence: version.sequence(),
        }
    }
}

impl From<KvVersion> for Version {
    fn from(version: KvVersion) -> Self {
        Version::new(Epoch::new(version.epoch), version.sequence)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KvValue {
    pub value: String,
    pub version: KvVersion,
}

impl From<Entry> for KvValue {
    // Callers only convert live entries.
    fn from(entry: Entry) -> Self {
        KvValue {
            value: entry.value.unwrap_or_default(),
            version: KvVersion::from(entry.version),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NodeRole {
    Unassigned,
    Follower,
    Leader,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MemberLiveness {
    Alive,
    Suspected,
    Unreachable,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberStatus {
    pub address: String,
    pub is_leader: bool,
    pub liveness: MemberLiveness,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NodeStatus {
    pub my_address: String,
    pub role: NodeRole,
    pub epoch: u64,
    pub leader_address: Option<String>,
    /// All members including this node, ordered by address.
    pub members: Vec<MemberStatus>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MembershipChangeOutput {
    /// False if the request didn't change the registry (e.g. the peer was already there).
    pub changed: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RoleChangeOutput {
    pub epoch: u64,
    pub changed: bool,
}

// ------- Conversions --------

impl From<RoleState> for NodeRole {
    fn from(state: RoleState) -> Self {
        match state {
            RoleState::Unassigned => NodeRole::Unassigned,
            RoleState::Follower => NodeRole::Follower,
            RoleState::Leader => NodeRole::Leader,
        }
    }
}

impl From<Liveness> for MemberLiveness {
    fn from(liveness: Liveness) -> Self {
        match liveness {
            Liveness::Alive => MemberLiveness::Alive,
            Liveness::Suspected => MemberLiveness::Suspected,
            Liveness::Unreachable => MemberLiveness::Unreachable,
        }
    }
}

impl From<ClusterSnapshot> for NodeStatus {
    fn from(snapshot: ClusterSnapshot) -> Self {
        NodeStatus {
            my_address: snapshot.registry.my_address.into_inner(),
            role: NodeRole::from(snapshot.role),
            epoch: snapshot.epoch.as_u64(),
            leader_address: snapshot.registry.leader.map(|leader| leader.into_inner()),
            members: snapshot
                .registry
                .members
                .into_iter()
                .map(|node| MemberStatus {
                    is_leader: node.is_leader(),
                    liveness: MemberLiveness::from(node.liveness),
                    address: node.address.into_inner(),
                })
                .collect(),
        }
    }
}
