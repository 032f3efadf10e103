use crate::api::{
    AddPeerError, DemoteError, KvValue, KvVersion, MembershipChangeOutput, NodeStatus, PromoteError, ReadConcern,
    ReadError, RemovePeerError, RoleChangeOutput, StatusError, WriteError,
};
use crate::handler::RequestHandler;
use crate::server::RpcServerShutdownHandle;
use std::sync::Arc;

/// KvNode is the in-process handle to a running node. The same operations are served to other
/// processes over gRPC (see `KvRemoteClient`).
///
/// Dropping the handle stops the node's gRPC server.
pub struct KvNode {
    handler: Arc<RequestHandler>,
    _server_shutdown: RpcServerShutdownHandle,
}

impl KvNode {
    pub(super) fn new(handler: Arc<RequestHandler>, server_shutdown: RpcServerShutdownHandle) -> Self {
        KvNode {
            handler,
            _server_shutdown: server_shutdown,
        }
    }

    pub fn my_address(&self) -> &str {
        self.handler.my_address().as_str()
    }

    /// Reads `key` at `concern`, or at the node's default concern if `None`.
    pub async fn read(&self, key: &str, concern: Option<ReadConcern>) -> Result<KvValue, ReadError> {
        self.handler.read(key, concern).await
    }

    /// Writes through the leader. `write_concern` is the number of follower acknowledgments to
    /// wait for, on top of the leader's own. `None` means the node's default.
    pub async fn write(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        write_concern: Option<u32>,
    ) -> Result<KvVersion, WriteError> {
        self.handler.write(key.into(), value.into(), write_concern).await
    }

    pub async fn delete(&self, key: impl Into<String>, write_concern: Option<u32>) -> Result<KvVersion, WriteError> {
        self.handler.delete(key.into(), write_concern).await
    }

    pub async fn add_peer(
        &self,
        address: impl Into<String>,
        strict: bool,
    ) -> Result<MembershipChangeOutput, AddPeerError> {
        self.handler.add_peer(address.into(), strict).await
    }

    pub async fn remove_peer(
        &self,
        address: impl Into<String>,
        strict: bool,
    ) -> Result<MembershipChangeOutput, RemovePeerError> {
        self.handler.remove_peer(address.into(), strict).await
    }

    pub async fn status(&self) -> Result<NodeStatus, StatusError> {
        self.handler.status().await
    }

    pub async fn promote(&self) -> Result<RoleChangeOutput, PromoteError> {
        self.handler.promote().await
    }

    pub async fn demote(&self) -> Result<RoleChangeOutput, DemoteError> {
        self.handler.demote().await
    }
}
