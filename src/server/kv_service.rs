use crate::api::{
    AddPeerError, DemoteError, KvValue, KvVersion, MemberLiveness, MembershipChangeOutput, NodeRole, NodeStatus,
    PromoteError, ReadConcern, ReadError, RemovePeerError, RoleChangeOutput, StatusError, WriteError,
};
use crate::grpc::grpc_kv_server::GrpcKv;
use crate::grpc::{
    proto_membership_error, proto_membership_result, proto_read_error, proto_read_result, proto_role_error,
    proto_role_result, proto_write_error, proto_write_result, ProtoAddPeerReq, ProtoAlreadyExists,
    ProtoConcernUnsatisfiable, ProtoConsistencyViolation, ProtoDeleteReq, ProtoDemoteReq, ProtoKeyNotFound,
    ProtoLiveness, ProtoLocalNode, ProtoMember, ProtoMembershipError, ProtoMembershipResult, ProtoMembershipSuccess,
    ProtoNotLeader, ProtoOtherLeader, ProtoPeerNotFound, ProtoPromoteReq, ProtoReadConcern, ProtoReadError,
    ProtoReadReq, ProtoReadResult, ProtoReadSuccess, ProtoRemovePeerReq, ProtoRole, ProtoRoleError, ProtoRoleResult,
    ProtoRoleSuccess, ProtoServerFault, ProtoStatusReply, ProtoStatusReq, ProtoUnassigned, ProtoVersion,
    ProtoWriteConcern, ProtoWriteError, ProtoWriteReq, ProtoWriteResult, ProtoWriteSuccess,
};
use crate::handler::RequestHandler;
use std::convert::TryFrom;
use std::sync::Arc;
use tonic::{Request, Response, Status};

const NODE_SHUTDOWN: &str = "Server internal node task has exited";

/// KvService serves the client facing gRPC interface.
pub(crate) struct KvService {
    logger: slog::Logger,
    handler: Arc<RequestHandler>,
}

impl KvService {
    pub(crate) fn new(logger: slog::Logger, handler: Arc<RequestHandler>) -> Self {
        KvService { logger, handler }
    }

    async fn handle_read(&self, rpc_request: ProtoReadReq) -> Result<ProtoReadResult, Status> {
        let concern = Self::convert_read_concern(rpc_request.concern)?;
        let app_result = self.handler.read(&rpc_request.key, concern).await;
        Self::convert_read_result(app_result)
    }

    fn convert_read_concern(proto_concern: i32) -> Result<Option<ReadConcern>, Status> {
        match ProtoReadConcern::from_i32(proto_concern) {
            Some(ProtoReadConcern::Unspecified) => Ok(None),
            Some(ProtoReadConcern::Local) => Ok(Some(ReadConcern::Local)),
            Some(ProtoReadConcern::Majority) => Ok(Some(ReadConcern::Majority)),
            Some(ProtoReadConcern::All) => Ok(Some(ReadConcern::All)),
            None => Err(Status::invalid_argument(format!("Unknown read concern {}", proto_concern))),
        }
    }

    fn convert_read_result(app_result: Result<KvValue, ReadError>) -> Result<ProtoReadResult, Status> {
        let err = match app_result {
            Ok(value) => {
                return Ok(ProtoReadResult {
                    result: Some(proto_read_result::Result::Ok(ProtoReadSuccess {
                        value: value.value,
                        version: Some(Self::convert_version(value.version)),
                    })),
                })
            }
            Err(e @ ReadError::InvalidKey) => return Err(Status::invalid_argument(e.to_string())),
            Err(ReadError::NotFound) => proto_read_error::Err::NotFound(ProtoKeyNotFound {}),
            Err(ReadError::ReadConcernUnsatisfiable { required, received }) => {
                proto_read_error::Err::Unsatisfiable(Self::convert_unsatisfiable(required, received))
            }
            Err(ReadError::ConsistencyViolation { key, version }) => {
                proto_read_error::Err::ConsistencyViolation(ProtoConsistencyViolation {
                    key,
                    version: Some(Self::convert_version(version)),
                })
            }
            Err(ReadError::LocalIo(_)) => proto_read_error::Err::ServerFault(ProtoServerFault {
                message: "Local IO failure".to_string(),
            }),
            Err(ReadError::NodeShutdown) => proto_read_error::Err::ServerFault(ProtoServerFault {
                message: NODE_SHUTDOWN.to_string(),
            }),
        };

        Ok(ProtoReadResult {
            result: Some(proto_read_result::Result::Err(ProtoReadError { err: Some(err) })),
        })
    }

    async fn handle_write(&self, rpc_request: ProtoWriteReq) -> Result<ProtoWriteResult, Status> {
        let write_concern = Self::convert_write_concern(rpc_request.write_concern);
        let app_result = self
            .handler
            .write(rpc_request.key, rpc_request.value, write_concern)
            .await;
        Self::convert_write_result(app_result)
    }

    async fn handle_delete(&self, rpc_request: ProtoDeleteReq) -> Result<ProtoWriteResult, Status> {
        let write_concern = Self::convert_write_concern(rpc_request.write_concern);
        let app_result = self.handler.delete(rpc_request.key, write_concern).await;
        Self::convert_write_result(app_result)
    }

    fn convert_write_concern(proto_concern: Option<ProtoWriteConcern>) -> Option<u32> {
        proto_concern.map(|concern| concern.follower_acks)
    }

    fn convert_write_result(app_result: Result<KvVersion, WriteError>) -> Result<ProtoWriteResult, Status> {
        let err = match app_result {
            Ok(version) => {
                return Ok(ProtoWriteResult {
                    result: Some(proto_write_result::Result::Ok(ProtoWriteSuccess {
                        version: Some(Self::convert_version(version)),
                    })),
                })
            }
            Err(e @ WriteError::InvalidKey) | Err(e @ WriteError::InvalidValue) => {
                return Err(Status::invalid_argument(e.to_string()))
            }
            Err(WriteError::NotLeader { leader_hint }) => proto_write_error::Err::NotLeader(ProtoNotLeader {
                leader_address: leader_hint.unwrap_or_default(),
            }),
            Err(WriteError::WriteConcernUnsatisfiable { required, acknowledged }) => {
                proto_write_error::Err::Unsatisfiable(Self::convert_unsatisfiable(required, acknowledged))
            }
            Err(WriteError::LocalVersionConflict { attempted, current }) => {
                proto_write_error::Err::ServerFault(ProtoServerFault {
                    message: format!(
                        "Local store holds version {:?}, refused {:?}",
                        current, attempted
                    ),
                })
            }
            Err(WriteError::LocalIo(_)) => proto_write_error::Err::ServerFault(ProtoServerFault {
                message: "Local IO failure".to_string(),
            }),
            Err(WriteError::NodeShutdown) => proto_write_error::Err::ServerFault(ProtoServerFault {
                message: NODE_SHUTDOWN.to_string(),
            }),
        };

        Ok(ProtoWriteResult {
            result: Some(proto_write_result::Result::Err(ProtoWriteError { err: Some(err) })),
        })
    }

    async fn handle_add_peer(&self, rpc_request: ProtoAddPeerReq) -> Result<ProtoMembershipResult, Status> {
        let app_result = self.handler.add_peer(rpc_request.address, rpc_request.strict).await;

        let err = match app_result {
            Ok(output) => return Ok(Self::convert_membership_success(output)),
            Err(AddPeerError::AlreadyExists(_)) => proto_membership_error::Err::AlreadyExists(ProtoAlreadyExists {}),
            Err(AddPeerError::InvalidAddress(address)) => {
                return Err(Status::invalid_argument(format!("Invalid peer address '{}'", address)))
            }
            Err(AddPeerError::NodeShutdown) => proto_membership_error::Err::ServerFault(ProtoServerFault {
                message: NODE_SHUTDOWN.to_string(),
            }),
        };

        Ok(Self::convert_membership_error(err))
    }

    async fn handle_remove_peer(&self, rpc_request: ProtoRemovePeerReq) -> Result<ProtoMembershipResult, Status> {
        let app_result = self.handler.remove_peer(rpc_request.address, rpc_request.strict).await;

        let err = match app_result {
            Ok(output) => return Ok(Self::convert_membership_success(output)),
            Err(RemovePeerError::NotFound(_)) => proto_membership_error::Err::NotFound(ProtoPeerNotFound {}),
            Err(RemovePeerError::LocalNode) => proto_membership_error::Err::LocalNode(ProtoLocalNode {}),
            Err(RemovePeerError::NodeShutdown) => proto_membership_error::Err::ServerFault(ProtoServerFault {
                message: NODE_SHUTDOWN.to_string(),
            }),
        };

        Ok(Self::convert_membership_error(err))
    }

    fn convert_membership_success(output: MembershipChangeOutput) -> ProtoMembershipResult {
        ProtoMembershipResult {
            result: Some(proto_membership_result::Result::Ok(ProtoMembershipSuccess {
                changed: output.changed,
            })),
        }
    }

    fn convert_membership_error(err: proto_membership_error::Err) -> ProtoMembershipResult {
        ProtoMembershipResult {
            result: Some(proto_membership_result::Result::Err(ProtoMembershipError {
                err: Some(err),
            })),
        }
    }

    async fn handle_status(&self, _rpc_request: ProtoStatusReq) -> Result<ProtoStatusReply, Status> {
        match self.handler.status().await {
            Ok(status) => Ok(Self::convert_status(status)),
            Err(StatusError::NodeShutdown) => Err(Status::unavailable(NODE_SHUTDOWN)),
        }
    }

    fn convert_status(status: NodeStatus) -> ProtoStatusReply {
        let role = match status.role {
            NodeRole::Unassigned => ProtoRole::Unassigned,
            NodeRole::Follower => ProtoRole::Follower,
            NodeRole::Leader => ProtoRole::Leader,
        };

        ProtoStatusReply {
            my_address: status.my_address,
            role: role as i32,
            epoch: status.epoch,
            leader_address: status.leader_address.unwrap_or_default(),
            members: status
                .members
                .into_iter()
                .map(|member| {
                    let liveness = match member.liveness {
                        MemberLiveness::Alive => ProtoLiveness::Alive,
                        MemberLiveness::Suspected => ProtoLiveness::Suspected,
                        MemberLiveness::Unreachable => ProtoLiveness::Unreachable,
                    };
                    ProtoMember {
                        address: member.address,
                        leader: member.is_leader,
                        liveness: liveness as i32,
                    }
                })
                .collect(),
        }
    }

    async fn handle_promote(&self, _rpc_request: ProtoPromoteReq) -> Result<ProtoRoleResult, Status> {
        let err = match self.handler.promote().await {
            Ok(output) => return Ok(Self::convert_role_success(output)),
            Err(PromoteError::Unassigned) => proto_role_error::Err::Unassigned(ProtoUnassigned {}),
            Err(PromoteError::OtherLeaderPresent(leader_address)) => {
                proto_role_error::Err::OtherLeader(ProtoOtherLeader { leader_address })
            }
            Err(PromoteError::NodeShutdown) => proto_role_error::Err::ServerFault(ProtoServerFault {
                message: NODE_SHUTDOWN.to_string(),
            }),
        };

        Ok(ProtoRoleResult {
            result: Some(proto_role_result::Result::Err(ProtoRoleError { err: Some(err) })),
        })
    }

    async fn handle_demote(&self, _rpc_request: ProtoDemoteReq) -> Result<ProtoRoleResult, Status> {
        let err = match self.handler.demote().await {
            Ok(output) => return Ok(Self::convert_role_success(output)),
            Err(DemoteError::NodeShutdown) => proto_role_error::Err::ServerFault(ProtoServerFault {
                message: NODE_SHUTDOWN.to_string(),
            }),
        };

        Ok(ProtoRoleResult {
            result: Some(proto_role_result::Result::Err(ProtoRoleError { err: Some(err) })),
        })
    }

    fn convert_role_success(output: RoleChangeOutput) -> ProtoRoleResult {
        ProtoRoleResult {
            result: Some(proto_role_result::Result::Ok(ProtoRoleSuccess {
                epoch: output.epoch,
                changed: output.changed,
            })),
        }
    }

    fn convert_version(version: KvVersion) -> ProtoVersion {
        ProtoVersion {
            epoch: version.epoch,
            sequence: version.sequence,
        }
    }

    fn convert_unsatisfiable(required: usize, received: usize) -> ProtoConcernUnsatisfiable {
        ProtoConcernUnsatisfiable {
            required: u32::try_from(required).unwrap_or(u32::MAX),
            received: u32::try_from(received).unwrap_or(u32::MAX),
        }
    }
}

#[async_trait::async_trait]
impl GrpcKv for KvService {
    async fn read(&self, rpc_request_wrapped: Request<ProtoReadReq>) -> Result<Response<ProtoReadResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_read(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn write(&self, rpc_request_wrapped: Request<ProtoWriteReq>) -> Result<Response<ProtoWriteResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_write(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn delete(
        &self,
        rpc_request_wrapped: Request<ProtoDeleteReq>,
    ) -> Result<Response<ProtoWriteResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_delete(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn add_peer(
        &self,
        rpc_request_wrapped: Request<ProtoAddPeerReq>,
    ) -> Result<Response<ProtoMembershipResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_add_peer(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn remove_peer(
        &self,
        rpc_request_wrapped: Request<ProtoRemovePeerReq>,
    ) -> Result<Response<ProtoMembershipResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_remove_peer(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn status(&self, rpc_request_wrapped: Request<ProtoStatusReq>) -> Result<Response<ProtoStatusReply>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        let rpc_result = self.handle_status(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn promote(&self, rpc_request_wrapped: Request<ProtoPromoteReq>) -> Result<Response<ProtoRoleResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        let rpc_result = self.handle_promote(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn demote(&self, rpc_request_wrapped: Request<ProtoDemoteReq>) -> Result<Response<ProtoRoleResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        let rpc_result = self.handle_demote(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_read_concern_falls_back_to_default() {
        assert_eq!(KvService::convert_read_concern(0).unwrap(), None);
        assert_eq!(
            KvService::convert_read_concern(ProtoReadConcern::All as i32).unwrap(),
            Some(ReadConcern::All)
        );
        assert!(KvService::convert_read_concern(42).is_err());
    }

    #[test]
    fn not_leader_carries_redirect_address() {
        let reply = KvService::convert_write_result(Err(WriteError::NotLeader {
            leader_hint: Some("10.0.0.1:7000".to_string()),
        }))
        .unwrap();

        match reply.result {
            Some(proto_write_result::Result::Err(ProtoWriteError {
                err: Some(proto_write_error::Err::NotLeader(not_leader)),
            })) => assert_eq!(not_leader.leader_address, "10.0.0.1:7000"),
            other => panic!("Unexpected reply {:?}", other),
        }
    }

    #[test]
    fn empty_key_or_value_is_an_invalid_argument() {
        let status = KvService::convert_read_result(Err(ReadError::InvalidKey)).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        for err in vec![WriteError::InvalidKey, WriteError::InvalidValue] {
            let status = KvService::convert_write_result(Err(err)).unwrap_err();
            assert_eq!(status.code(), tonic::Code::InvalidArgument);
        }

        assert!(KvService::convert_read_result(Err(ReadError::NotFound)).is_ok());
    }
}
