use crate::grpc::grpc_peer_client::GrpcPeerClient;
use crate::grpc::{
    proto_apply_write_error, proto_apply_write_result, proto_membership_change_req, proto_read_local_result,
    ProtoApplyWriteReq, ProtoLeaderElected, ProtoLeaderVacated, ProtoMembershipChangeReq, ProtoPeerAdded,
    ProtoPeerRemoved, ProtoReadLocalReq, ProtoSyncMembershipReq,
};
use crate::membership::{Epoch, MembershipChange, MembershipSync, NodeAddress};
use crate::replication::wire;
use crate::replication::{PeerCallError, PeerTransport, ReplicatedWrite};
use crate::store::Entry;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;
use tokio::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Response, Status};

/// GrpcPeerTransport talks to other nodes' GrpcPeer service. One channel per peer address is
/// created on first use and reused after that.
pub(crate) struct GrpcPeerTransport {
    logger: slog::Logger,
    call_timeout: Duration,
    clients: Mutex<HashMap<NodeAddress, GrpcPeerClient<Channel>>>,
}

impl GrpcPeerTransport {
    pub(crate) fn new(logger: slog::Logger, call_timeout: Duration) -> Self {
        GrpcPeerTransport {
            logger,
            call_timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    async fn client(&self, peer: &NodeAddress) -> Result<GrpcPeerClient<Channel>, PeerCallError> {
        if let Some(client) = self.clients.lock().await.get(peer) {
            return Ok(client.clone());
        }

        let endpoint = Endpoint::from_shared(format!("http://{}", peer))
            .map_err(|e| PeerCallError::Unreachable(format!("Invalid peer address: {}", e)))?;
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| PeerCallError::Unreachable(e.to_string()))?;

        let client = GrpcPeerClient::new(channel);
        self.clients.lock().await.insert(peer.clone(), client.clone());
        Ok(client)
    }

    // Bounds connecting and calling together by the per-call timeout.
    async fn call<T, F, Fut>(&self, peer: &NodeAddress, rpc: F) -> Result<T, PeerCallError>
    where
        T: std::fmt::Debug,
        F: FnOnce(GrpcPeerClient<Channel>) -> Fut,
        Fut: Future<Output = Result<Response<T>, Status>>,
    {
        let attempt = async {
            let client = self.client(peer).await?;
            rpc(client)
                .await
                .map(Response::into_inner)
                .map_err(Self::convert_status)
        };

        let result = match tokio::time::timeout(self.call_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(PeerCallError::Timeout),
        };

        match &result {
            Ok(reply) => {
                slog::debug!(self.logger, "ClientWire - {:?}", reply; "Peer" => peer.as_str());
            }
            Err(PeerCallError::Unreachable(_)) => {
                self.clients.lock().await.remove(peer);
            }
            Err(_) => {}
        }
        result
    }

    fn convert_status(status: Status) -> PeerCallError {
        match status.code() {
            Code::Unavailable => PeerCallError::Unreachable(status.message().to_string()),
            Code::DeadlineExceeded => PeerCallError::Timeout,
            _ => PeerCallError::Rejected(format!("{:?}: {}", status.code(), status.message())),
        }
    }

    fn convert_membership_change(sender: &NodeAddress, change: MembershipChange) -> ProtoMembershipChangeReq {
        let change = match change {
            MembershipChange::PeerAdded(address) => {
                proto_membership_change_req::Change::PeerAdded(ProtoPeerAdded {
                    address: address.into_inner(),
                })
            }
            MembershipChange::PeerRemoved(address) => {
                proto_membership_change_req::Change::PeerRemoved(ProtoPeerRemoved {
                    address: address.into_inner(),
                })
            }
            MembershipChange::LeaderElected { leader, epoch } => {
                proto_membership_change_req::Change::LeaderElected(ProtoLeaderElected {
                    address: leader.into_inner(),
                    epoch: epoch.as_u64(),
                })
            }
            MembershipChange::LeaderVacated { leader, epoch } => {
                proto_membership_change_req::Change::LeaderVacated(ProtoLeaderVacated {
                    address: leader.into_inner(),
                    epoch: epoch.as_u64(),
                })
            }
        };

        ProtoMembershipChangeReq {
            sender_address: sender.as_str().to_string(),
            change: Some(change),
        }
    }
}

#[async_trait::async_trait]
impl PeerTransport for GrpcPeerTransport {
    async fn send_write(&self, peer: &NodeAddress, write: ReplicatedWrite) -> Result<(), PeerCallError> {
        let request = ProtoApplyWriteReq {
            leader_address: write.leader.into_inner(),
            leader_epoch: write.leader_epoch.as_u64(),
            key: write.key,
            entry: Some(wire::entry_to_proto(write.entry)),
        };

        let reply = self
            .call(peer, |mut client| async move { client.apply_write(request).await })
            .await?;

        match reply.result {
            Some(proto_apply_write_result::Result::Ok(_)) => Ok(()),
            Some(proto_apply_write_result::Result::Err(e)) => match e.err {
                Some(proto_apply_write_error::Err::StaleEpoch(stale)) => Err(PeerCallError::StaleEpoch {
                    leader: wire::optional_address(stale.leader_address).map(NodeAddress::new),
                    epoch: Epoch::new(stale.epoch),
                }),
                Some(proto_apply_write_error::Err::NotMember(_)) => {
                    Err(PeerCallError::Rejected("We are not a member of the peer's cluster".to_string()))
                }
                Some(proto_apply_write_error::Err::Conflict(conflict)) => Err(PeerCallError::Rejected(format!(
                    "Peer holds a different value for '{}' at {:?}",
                    conflict.key,
                    conflict.version.map(wire::version_from_proto)
                ))),
                Some(proto_apply_write_error::Err::ServerFault(fault)) => Err(PeerCallError::Rejected(fault.message)),
                None => Err(PeerCallError::Rejected("Malformed reply".to_string())),
            },
            None => Err(PeerCallError::Rejected("Malformed reply".to_string())),
        }
    }

    async fn send_read(&self, peer: &NodeAddress, key: &str) -> Result<Option<Entry>, PeerCallError> {
        let request = ProtoReadLocalReq { key: key.to_string() };

        let reply = self
            .call(peer, |mut client| async move { client.read_local(request).await })
            .await?;

        match reply.result {
            Some(proto_read_local_result::Result::Ok(ok)) => ok
                .entry
                .map(wire::entry_from_proto)
                .transpose()
                .map_err(|e| PeerCallError::Rejected(e.to_string())),
            Some(proto_read_local_result::Result::Err(fault)) => Err(PeerCallError::Rejected(fault.message)),
            None => Err(PeerCallError::Rejected("Malformed reply".to_string())),
        }
    }

    async fn notify(
        &self,
        peer: &NodeAddress,
        sender: &NodeAddress,
        change: MembershipChange,
    ) -> Result<(), PeerCallError> {
        let request = Self::convert_membership_change(sender, change);

        self.call(peer, |mut client| async move { client.change_membership(request).await })
            .await
            .map(|_| ())
    }

    async fn sync_membership(
        &self,
        peer: &NodeAddress,
        sender: &NodeAddress,
        sync: MembershipSync,
    ) -> Result<(), PeerCallError> {
        let request = ProtoSyncMembershipReq {
            sender_address: sender.as_str().to_string(),
            members: sync.members.into_iter().map(NodeAddress::into_inner).collect(),
            leader_address: sync.leader.map(NodeAddress::into_inner).unwrap_or_default(),
            epoch: sync.epoch.as_u64(),
        };

        self.call(peer, |mut client| async move { client.sync_membership(request).await })
            .await
            .map(|_| ())
    }
}
