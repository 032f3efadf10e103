mod actor;
mod api;
mod handler;
mod membership;
mod replication;
mod server;
mod store;
mod grpc {
    include!("../generated/kv.rs");
}

pub use api::try_create_kv_node;
pub use api::AddPeerError;
pub use api::ConnectError;
pub use api::DemoteError;
pub use api::KvNode;
pub use api::KvNodeConfig;
pub use api::KvNodeCreationError;
pub use api::KvOptions;
pub use api::KvRemoteClient;
pub use api::KvValue;
pub use api::KvVersion;
pub use api::MemberLiveness;
pub use api::MemberStatus;
pub use api::MembershipChangeOutput;
pub use api::NodeRole;
pub use api::NodeStatus;
pub use api::PromoteError;
pub use api::ReadConcern;
pub use api::ReadError;
pub use api::RemoteError;
pub use api::RemovePeerError;
pub use api::RoleChangeOutput;
pub use api::StatusError;
pub use api::WriteError;
pub use replication::MissedWriteSink;
pub use store::Entry;
pub use store::KeyValueStore;
pub use store::PutOutcome;
pub use store::Version;

// The crate root only declares private mods and re-exports. Every public type is exported by
// name here so the internal layout can change freely.
