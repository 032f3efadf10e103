//! This mod holds the library's client-facing API: node creation, the node handle, and a client
//! for talking to a node in another process.
mod errors;
mod node;
mod options;
mod remote_client;
mod types;
mod wiring;

pub use errors::AddPeerError;
pub use errors::DemoteError;
pub use errors::PromoteError;
pub use errors::ReadError;
pub use errors::RemovePeerError;
pub use errors::StatusError;
pub use errors::WriteError;
pub use node::KvNode;
pub use options::KvOptions;
pub use remote_client::ConnectError;
pub use remote_client::KvRemoteClient;
pub use remote_client::RemoteError;
pub use types::KvValue;
pub use types::KvVersion;
pub use types::MemberLiveness;
pub use types::MemberStatus;
pub use types::MembershipChangeOutput;
pub use types::NodeRole;
pub use types::NodeStatus;
pub use types::ReadConcern;
pub use types::RoleChangeOutput;
pub use wiring::try_create_kv_node;
pub use wiring::KvNodeConfig;
pub use wiring::KvNodeCreationError;
