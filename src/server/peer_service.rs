use crate::actor::{ActorExited, ReplicatedWriteRejected};
use crate::grpc::grpc_peer_server::GrpcPeer;
use crate::grpc::{
    proto_apply_write_error, proto_apply_write_result, proto_membership_change_req, proto_read_local_result,
    ProtoApplyWriteError, ProtoApplyWriteReq, ProtoApplyWriteResult, ProtoApplyWriteSuccess, ProtoConsistencyViolation,
    ProtoMembershipChangeReq, ProtoNotMember, ProtoPeerAck, ProtoReadLocalReq, ProtoReadLocalResult,
    ProtoReadLocalSuccess, ProtoServerFault, ProtoStaleEpoch, ProtoSyncMembershipReq,
};
use crate::handler::RequestHandler;
use crate::membership::{Epoch, MembershipChange, MembershipSync, NodeAddress};
use crate::replication::{self, ApplyWriteError, ReplicatedWrite};
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// PeerService serves the node to node gRPC interface.
pub(crate) struct PeerService {
    logger: slog::Logger,
    handler: Arc<RequestHandler>,
}

impl PeerService {
    pub(crate) fn new(logger: slog::Logger, handler: Arc<RequestHandler>) -> Self {
        PeerService { logger, handler }
    }

    async fn handle_apply_write(&self, rpc_request: ProtoApplyWriteReq) -> Result<ProtoApplyWriteResult, Status> {
        let app_input = Self::convert_apply_write_input(rpc_request)?;
        let key = app_input.key.clone();
        let app_result = self.handler.apply_write(app_input).await;
        Ok(Self::convert_apply_write_result(key, app_result))
    }

    fn convert_apply_write_input(rpc_request: ProtoApplyWriteReq) -> Result<ReplicatedWrite, Status> {
        let leader = Self::convert_address(rpc_request.leader_address, "LeaderAddress")?;
        let proto_entry = rpc_request
            .entry
            .ok_or_else(|| Status::invalid_argument("Missing Entry"))?;
        let entry = replication::entry_from_proto(proto_entry).map_err(Status::invalid_argument)?;

        Ok(ReplicatedWrite {
            leader,
            leader_epoch: Epoch::new(rpc_request.leader_epoch),
            key: rpc_request.key,
            entry,
        })
    }

    fn convert_apply_write_result(key: String, app_result: Result<(), ApplyWriteError>) -> ProtoApplyWriteResult {
        let err = match app_result {
            Ok(()) => {
                return ProtoApplyWriteResult {
                    result: Some(proto_apply_write_result::Result::Ok(ProtoApplyWriteSuccess {
                        // Empty
                    })),
                }
            }
            Err(ApplyWriteError::Rejected(ReplicatedWriteRejected::NotMember)) => {
                proto_apply_write_error::Err::NotMember(ProtoNotMember {})
            }
            Err(ApplyWriteError::Rejected(ReplicatedWriteRejected::StaleEpoch { leader, epoch })) => {
                proto_apply_write_error::Err::StaleEpoch(ProtoStaleEpoch {
                    leader_address: leader.map(NodeAddress::into_inner).unwrap_or_default(),
                    epoch: epoch.as_u64(),
                })
            }
            Err(ApplyWriteError::Conflict(version)) => {
                proto_apply_write_error::Err::Conflict(ProtoConsistencyViolation {
                    key,
                    version: Some(replication::version_to_proto(version)),
                })
            }
            Err(ApplyWriteError::LocalIo(_)) => proto_apply_write_error::Err::ServerFault(ProtoServerFault {
                message: "Local IO failure".to_string(),
            }),
            Err(ApplyWriteError::ActorExited(_)) => proto_apply_write_error::Err::ServerFault(ProtoServerFault {
                message: "Server internal node task has exited".to_string(),
            }),
        };

        ProtoApplyWriteResult {
            result: Some(proto_apply_write_result::Result::Err(ProtoApplyWriteError {
                err: Some(err),
            })),
        }
    }

    async fn handle_read_local(&self, rpc_request: ProtoReadLocalReq) -> Result<ProtoReadLocalResult, Status> {
        let result = match self.handler.read_local(&rpc_request.key).await {
            Ok(entry) => proto_read_local_result::Result::Ok(ProtoReadLocalSuccess {
                entry: entry.map(replication::entry_to_proto),
            }),
            Err(e) => proto_read_local_result::Result::Err(ProtoServerFault {
                message: format!("Local IO failure: {}", e),
            }),
        };

        Ok(ProtoReadLocalResult { result: Some(result) })
    }

    async fn handle_change_membership(&self, rpc_request: ProtoMembershipChangeReq) -> Result<ProtoPeerAck, Status> {
        let sender = Self::convert_address(rpc_request.sender_address, "SenderAddress")?;
        let change = Self::convert_membership_change(rpc_request.change)?;

        self.handler
            .change_membership(sender, change)
            .await
            .map_err(Self::convert_actor_exited)?;
        Ok(ProtoPeerAck {})
    }

    fn convert_membership_change(
        proto_change: Option<proto_membership_change_req::Change>,
    ) -> Result<MembershipChange, Status> {
        let change = match proto_change {
            Some(proto_membership_change_req::Change::PeerAdded(added)) => {
                MembershipChange::PeerAdded(Self::convert_address(added.address, "PeerAdded")?)
            }
            Some(proto_membership_change_req::Change::PeerRemoved(removed)) => {
                MembershipChange::PeerRemoved(Self::convert_address(removed.address, "PeerRemoved")?)
            }
            Some(proto_membership_change_req::Change::LeaderElected(elected)) => MembershipChange::LeaderElected {
                leader: Self::convert_address(elected.address, "LeaderElected")?,
                epoch: Epoch::new(elected.epoch),
            },
            Some(proto_membership_change_req::Change::LeaderVacated(vacated)) => MembershipChange::LeaderVacated {
                leader: Self::convert_address(vacated.address, "LeaderVacated")?,
                epoch: Epoch::new(vacated.epoch),
            },
            None => return Err(Status::invalid_argument("Missing Change")),
        };

        Ok(change)
    }

    async fn handle_sync_membership(&self, rpc_request: ProtoSyncMembershipReq) -> Result<ProtoPeerAck, Status> {
        let sender = Self::convert_address(rpc_request.sender_address, "SenderAddress")?;
        let mut members = Vec::with_capacity(rpc_request.members.len());
        for member in rpc_request.members {
            members.push(Self::convert_address(member, "Members")?);
        }
        let sync = MembershipSync {
            members,
            leader: replication::optional_address(rpc_request.leader_address).map(NodeAddress::new),
            epoch: Epoch::new(rpc_request.epoch),
        };

        self.handler
            .sync_membership(sender, sync)
            .await
            .map_err(Self::convert_actor_exited)?;
        Ok(ProtoPeerAck {})
    }

    fn convert_address(address: String, field: &str) -> Result<NodeAddress, Status> {
        match replication::optional_address(address) {
            Some(address) => Ok(NodeAddress::new(address)),
            None => Err(Status::invalid_argument(format!("Empty {}", field))),
        }
    }

    fn convert_actor_exited(_: ActorExited) -> Status {
        Status::unavailable("Server internal node task has exited")
    }
}

#[async_trait::async_trait]
impl GrpcPeer for PeerService {
    async fn apply_write(
        &self,
        rpc_request_wrapped: Request<ProtoApplyWriteReq>,
    ) -> Result<Response<ProtoApplyWriteResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_apply_write(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn read_local(
        &self,
        rpc_request_wrapped: Request<ProtoReadLocalReq>,
    ) -> Result<Response<ProtoReadLocalResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_read_local(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn change_membership(
        &self,
        rpc_request_wrapped: Request<ProtoMembershipChangeReq>,
    ) -> Result<Response<ProtoPeerAck>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_change_membership(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn sync_membership(
        &self,
        rpc_request_wrapped: Request<ProtoSyncMembershipReq>,
    ) -> Result<Response<ProtoPeerAck>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_sync_membership(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grpc::{ProtoEntry, ProtoLeaderElected, ProtoVersion};

    #[test]
    fn apply_write_requires_entry_and_leader() {
        let request = ProtoApplyWriteReq {
            leader_address: "a:1".to_string(),
            leader_epoch: 2,
            key: "k".to_string(),
            entry: None,
        };
        assert!(PeerService::convert_apply_write_input(request).is_err());

        let request = ProtoApplyWriteReq {
            leader_address: String::new(),
            leader_epoch: 2,
            key: "k".to_string(),
            entry: Some(ProtoEntry {
                version: Some(ProtoVersion { epoch: 2, sequence: 1 }),
                tombstone: false,
                value: "v".to_string(),
            }),
        };
        assert!(PeerService::convert_apply_write_input(request).is_err());
    }

    #[test]
    fn stale_epoch_reply_names_current_leader() {
        let reply = PeerService::convert_apply_write_result("k".to_string(), Err(ApplyWriteError::Rejected(
            ReplicatedWriteRejected::StaleEpoch {
                leader: Some(NodeAddress::new("b:1")),
                epoch: Epoch::new(4),
            },
        )));

        match reply.result {
            Some(proto_apply_write_result::Result::Err(ProtoApplyWriteError {
                err: Some(proto_apply_write_error::Err::StaleEpoch(stale)),
            })) => {
                assert_eq!(stale.leader_address, "b:1");
                assert_eq!(stale.epoch, 4);
            }
            other => panic!("Unexpected reply {:?}", other),
        }
    }

    #[test]
    fn membership_change_conversion() {
        let change = PeerService::convert_membership_change(Some(
            proto_membership_change_req::Change::LeaderElected(ProtoLeaderElected {
                address: "b:1".to_string(),
                epoch: 3,
            }),
        ))
        .unwrap();

        assert_eq!(
            change,
            MembershipChange::LeaderElected {
                leader: NodeAddress::new("b:1"),
                epoch: Epoch::new(3),
            }
        );
        assert!(PeerService::convert_membership_change(None).is_err());
    }
}
