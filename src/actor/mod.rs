mod event_loop;
mod cluster_state;

pub(crate) use event_loop::create;
pub(crate) use event_loop::ActorClient;
pub(crate) use event_loop::ActorExited;
pub(crate) use cluster_state::AddPeerRejected;
pub(crate) use cluster_state::ClusterSnapshot;
pub(crate) use cluster_state::ClusterState;
pub(crate) use cluster_state::MembershipOutcome;
pub(crate) use cluster_state::NotLeader;
pub(crate) use cluster_state::RemovePeerRejected;
pub(crate) use cluster_state::ReplicatedWriteRejected;
pub(crate) use cluster_state::RoleChange;
pub(crate) use cluster_state::WriteTicket;
