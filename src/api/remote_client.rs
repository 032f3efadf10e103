use crate::api::{
    AddPeerError, KvValue, KvVersion, MemberLiveness, MemberStatus, MembershipChangeOutput, NodeRole, NodeStatus,
    PromoteError, ReadConcern, ReadError, RemovePeerError, RoleChangeOutput, WriteError,
};
use crate::grpc::grpc_kv_client::GrpcKvClient;
use crate::grpc::{
    proto_membership_error, proto_membership_result, proto_read_error, proto_read_result, proto_role_error,
    proto_role_result, proto_write_error, proto_write_result, ProtoAddPeerReq, ProtoDeleteReq, ProtoDemoteReq,
    ProtoLiveness, ProtoMembershipResult, ProtoPromoteReq, ProtoReadConcern, ProtoReadReq, ProtoRemovePeerReq,
    ProtoRole, ProtoRoleResult, ProtoStatusReq, ProtoVersion, ProtoWriteConcern, ProtoWriteReq, ProtoWriteResult,
};
use crate::replication;
use std::convert::Infallible;
use std::error::Error;
use tonic::transport::{Channel, Endpoint};

/// Failure of a remote call. `Operation` holds the same error the node would have returned
/// in-process; everything else is about getting there and back.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError<E: Error + 'static> {
    #[error("RPC failed: {0}")]
    Transport(#[from] tonic::Status),
    #[error("Server fault: {0}")]
    ServerFault(String),
    #[error("Malformed reply: {0}")]
    MalformedReply(&'static str),
    #[error(transparent)]
    Operation(E),
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid node address '{0}'")]
    InvalidAddress(String),
    #[error("Failed to connect: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// KvRemoteClient talks to one node's client facing gRPC service.
#[derive(Clone)]
pub struct KvRemoteClient {
    client: GrpcKvClient<Channel>,
}

impl KvRemoteClient {
    /// `address` is "host:port", the same string the node was configured with.
    pub async fn connect(address: &str) -> Result<Self, ConnectError> {
        let endpoint = Endpoint::from_shared(format!("http://{}", address))
            .map_err(|_| ConnectError::InvalidAddress(address.to_string()))?;
        let channel = endpoint.connect().await?;

        Ok(KvRemoteClient {
            client: GrpcKvClient::new(channel),
        })
    }

    pub async fn read(&self, key: &str, concern: Option<ReadConcern>) -> Result<KvValue, RemoteError<ReadError>> {
        let concern = match concern {
            None => ProtoReadConcern::Unspecified,
            Some(ReadConcern::Local) => ProtoReadConcern::Local,
            Some(ReadConcern::Majority) => ProtoReadConcern::Majority,
            Some(ReadConcern::All) => ProtoReadConcern::All,
        };
        let request = ProtoReadReq {
            key: key.to_string(),
            concern: concern as i32,
        };

        let reply = self.client.clone().read(request).await?.into_inner();

        let err = match reply.result {
            Some(proto_read_result::Result::Ok(ok)) => {
                return Ok(KvValue {
                    value: ok.value,
                    version: Self::convert_version(ok.version)?,
                })
            }
            Some(proto_read_result::Result::Err(e)) => e.err,
            None => return Err(RemoteError::MalformedReply("Missing result")),
        };

        let err = match err {
            Some(proto_read_error::Err::NotFound(_)) => ReadError::NotFound,
            Some(proto_read_error::Err::Unsatisfiable(unsatisfiable)) => ReadError::ReadConcernUnsatisfiable {
                required: unsatisfiable.required as usize,
                received: unsatisfiable.received as usize,
            },
            Some(proto_read_error::Err::ConsistencyViolation(violation)) => ReadError::ConsistencyViolation {
                key: violation.key,
                version: Self::convert_version(violation.version)?,
            },
            Some(proto_read_error::Err::ServerFault(fault)) => return Err(RemoteError::ServerFault(fault.message)),
            None => return Err(RemoteError::MalformedReply("Missing error")),
        };

        Err(RemoteError::Operation(err))
    }

    pub async fn write(
        &self,
        key: &str,
        value: &str,
        write_concern: Option<u32>,
    ) -> Result<KvVersion, RemoteError<WriteError>> {
        let request = ProtoWriteReq {
            key: key.to_string(),
            value: value.to_string(),
            write_concern: write_concern.map(|follower_acks| ProtoWriteConcern { follower_acks }),
        };

        let reply = self.client.clone().write(request).await?.into_inner();
        Self::convert_write_result(reply)
    }

    pub async fn delete(&self, key: &str, write_concern: Option<u32>) -> Result<KvVersion, RemoteError<WriteError>> {
        let request = ProtoDeleteReq {
            key: key.to_string(),
            write_concern: write_concern.map(|follower_acks| ProtoWriteConcern { follower_acks }),
        };

        let reply = self.client.clone().delete(request).await?.into_inner();
        Self::convert_write_result(reply)
    }

    fn convert_write_result(reply: ProtoWriteResult) -> Result<KvVersion, RemoteError<WriteError>> {
        let err = match reply.result {
            Some(proto_write_result::Result::Ok(ok)) => return Self::convert_version(ok.version),
            Some(proto_write_result::Result::Err(e)) => e.err,
            None => return Err(RemoteError::MalformedReply("Missing result")),
        };

        let err = match err {
            Some(proto_write_error::Err::NotLeader(not_leader)) => WriteError::NotLeader {
                leader_hint: replication::optional_address(not_leader.leader_address),
            },
            Some(proto_write_error::Err::Unsatisfiable(unsatisfiable)) => WriteError::WriteConcernUnsatisfiable {
                required: unsatisfiable.required as usize,
                acknowledged: unsatisfiable.received as usize,
            },
            Some(proto_write_error::Err::ServerFault(fault)) => return Err(RemoteError::ServerFault(fault.message)),
            None => return Err(RemoteError::MalformedReply("Missing error")),
        };

        Err(RemoteError::Operation(err))
    }

    pub async fn add_peer(
        &self,
        address: &str,
        strict: bool,
    ) -> Result<MembershipChangeOutput, RemoteError<AddPeerError>> {
        let request = ProtoAddPeerReq {
            address: address.to_string(),
            strict,
        };

        let reply = self.client.clone().add_peer(request).await?.into_inner();

        match Self::convert_membership_result(reply)? {
            Ok(output) => Ok(output),
            Err(proto_membership_error::Err::AlreadyExists(_)) => {
                Err(RemoteError::Operation(AddPeerError::AlreadyExists(address.to_string())))
            }
            Err(proto_membership_error::Err::ServerFault(fault)) => Err(RemoteError::ServerFault(fault.message)),
            Err(_) => Err(RemoteError::MalformedReply("Unexpected error for AddPeer")),
        }
    }

    pub async fn remove_peer(
        &self,
        address: &str,
        strict: bool,
    ) -> Result<MembershipChangeOutput, RemoteError<RemovePeerError>> {
        let request = ProtoRemovePeerReq {
            address: address.to_string(),
            strict,
        };

        let reply = self.client.clone().remove_peer(request).await?.into_inner();

        match Self::convert_membership_result(reply)? {
            Ok(output) => Ok(output),
            Err(proto_membership_error::Err::NotFound(_)) => {
                Err(RemoteError::Operation(RemovePeerError::NotFound(address.to_string())))
            }
            Err(proto_membership_error::Err::LocalNode(_)) => Err(RemoteError::Operation(RemovePeerError::LocalNode)),
            Err(proto_membership_error::Err::ServerFault(fault)) => Err(RemoteError::ServerFault(fault.message)),
            Err(_) => Err(RemoteError::MalformedReply("Unexpected error for RemovePeer")),
        }
    }

    // Outer error is for problems that don't depend on the operation.
    fn convert_membership_result<E: Error + 'static>(
        reply: ProtoMembershipResult,
    ) -> Result<Result<MembershipChangeOutput, proto_membership_error::Err>, RemoteError<E>> {
        match reply.result {
            Some(proto_membership_result::Result::Ok(ok)) => Ok(Ok(MembershipChangeOutput { changed: ok.changed })),
            Some(proto_membership_result::Result::Err(e)) => match e.err {
                Some(err) => Ok(Err(err)),
                None => Err(RemoteError::MalformedReply("Missing error")),
            },
            None => Err(RemoteError::MalformedReply("Missing result")),
        }
    }

    pub async fn status(&self) -> Result<NodeStatus, RemoteError<Infallible>> {
        let reply = self.client.clone().status(ProtoStatusReq {}).await?.into_inner();

        let role = match ProtoRole::from_i32(reply.role) {
            Some(ProtoRole::Unassigned) => NodeRole::Unassigned,
            Some(ProtoRole::Follower) => NodeRole::Follower,
            Some(ProtoRole::Leader) => NodeRole::Leader,
            None => return Err(RemoteError::MalformedReply("Unknown role")),
        };

        let mut members = Vec::with_capacity(reply.members.len());
        for member in reply.members {
            let liveness = match ProtoLiveness::from_i32(member.liveness) {
                Some(ProtoLiveness::Alive) => MemberLiveness::Alive,
                Some(ProtoLiveness::Suspected) => MemberLiveness::Suspected,
                Some(ProtoLiveness::Unreachable) => MemberLiveness::Unreachable,
                None => return Err(RemoteError::MalformedReply("Unknown liveness")),
            };
            members.push(MemberStatus {
                address: member.address,
                is_leader: member.leader,
                liveness,
            });
        }

        Ok(NodeStatus {
            my_address: reply.my_address,
            role,
            epoch: reply.epoch,
            leader_address: replication::optional_address(reply.leader_address),
            members,
        })
    }

    pub async fn promote(&self) -> Result<RoleChangeOutput, RemoteError<PromoteError>> {
        let reply = self.client.clone().promote(ProtoPromoteReq {}).await?.into_inner();

        match Self::convert_role_result(reply)? {
            Ok(output) => Ok(output),
            Err(proto_role_error::Err::Unassigned(_)) => Err(RemoteError::Operation(PromoteError::Unassigned)),
            Err(proto_role_error::Err::OtherLeader(other)) => Err(RemoteError::Operation(
                PromoteError::OtherLeaderPresent(other.leader_address),
            )),
            Err(proto_role_error::Err::ServerFault(fault)) => Err(RemoteError::ServerFault(fault.message)),
        }
    }

    pub async fn demote(&self) -> Result<RoleChangeOutput, RemoteError<Infallible>> {
        let reply = self.client.clone().demote(ProtoDemoteReq {}).await?.into_inner();

        match Self::convert_role_result(reply)? {
            Ok(output) => Ok(output),
            Err(proto_role_error::Err::ServerFault(fault)) => Err(RemoteError::ServerFault(fault.message)),
            Err(_) => Err(RemoteError::MalformedReply("Unexpected error for Demote")),
        }
    }

    fn convert_role_result<E: Error + 'static>(
        reply: ProtoRoleResult,
    ) -> Result<Result<RoleChangeOutput, proto_role_error::Err>, RemoteError<E>> {
        match reply.result {
            Some(proto_role_result::Result::Ok(ok)) => Ok(Ok(RoleChangeOutput {
                epoch: ok.epoch,
                changed: ok.changed,
            })),
            Some(proto_role_result::Result::Err(e)) => match e.err {
                Some(err) => Ok(Err(err)),
                None => Err(RemoteError::MalformedReply("Missing error")),
            },
            None => Err(RemoteError::MalformedReply("Missing result")),
        }
    }

    fn convert_version<E: Error + 'static>(version: Option<ProtoVersion>) -> Result<KvVersion, RemoteError<E>> {
        version
            .map(|version| KvVersion {
                epoch: version.epoch,
                sequence: version.sequence,
            })
            .ok_or(RemoteError::MalformedReply("Missing version"))
    }
}
