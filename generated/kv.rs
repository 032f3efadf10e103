// ------- Shared --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoVersion {
    #[prost(uint64, tag = "1")]
    pub epoch: u64,
    #[prost(uint64, tag = "2")]
    pub sequence: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoEntry {
    #[prost(message, optional, tag = "1")]
    pub version: ::core::option::Option<ProtoVersion>,
    #[prost(bool, tag = "2")]
    pub tombstone: bool,
    #[prost(string, tag = "3")]
    pub value: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoServerFault {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoConcernUnsatisfiable {
    #[prost(uint32, tag = "1")]
    pub required: u32,
    #[prost(uint32, tag = "2")]
    pub received: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoConsistencyViolation {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub version: ::core::option::Option<ProtoVersion>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadReq {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(enumeration = "ProtoReadConcern", tag = "2")]
    pub concern: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadResult {
    #[prost(oneof = "proto_read_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_read_result::Result>,
}
/// Nested message and enum types in `ProtoReadResult`.
pub mod proto_read_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoReadSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoReadError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadSuccess {
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub version: ::core::option::Option<ProtoVersion>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadError {
    #[prost(oneof = "proto_read_error::Err", tags = "1, 2, 3, 4")]
    pub err: ::core::option::Option<proto_read_error::Err>,
}
/// Nested message and enum types in `ProtoReadError`.
pub mod proto_read_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        NotFound(super::ProtoKeyNotFound),
        #[prost(message, tag = "2")]
        Unsatisfiable(super::ProtoConcernUnsatisfiable),
        #[prost(message, tag = "3")]
        ConsistencyViolation(super::ProtoConsistencyViolation),
        #[prost(message, tag = "4")]
        ServerFault(super::ProtoServerFault),
    }
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoKeyNotFound {}
// ------- Write / Delete --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWriteConcern {
    #[prost(uint32, tag = "1")]
    pub follower_acks: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWriteReq {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
    /// Absent means the node's configured default.
    #[prost(message, optional, tag = "3")]
    pub write_concern: ::core::option::Option<ProtoWriteConcern>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDeleteReq {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub write_concern: ::core::option::Option<ProtoWriteConcern>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWriteResult {
    #[prost(oneof = "proto_write_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_write_result::Result>,
}
/// Nested message and enum types in `ProtoWriteResult`.
pub mod proto_write_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoWriteSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoWriteError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWriteSuccess {
    #[prost(message, optional, tag = "1")]
    pub version: ::core::option::Option<ProtoVersion>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoWriteError {
    #[prost(oneof = "proto_write_error::Err", tags = "1, 2, 3")]
    pub err: ::core::option::Option<proto_write_error::Err>,
}
/// Nested message and enum types in `ProtoWriteError`.
pub mod proto_write_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        NotLeader(super::ProtoNotLeader),
        #[prost(message, tag = "2")]
        Unsatisfiable(super::ProtoConcernUnsatisfiable),
        #[prost(message, tag = "3")]
        ServerFault(super::ProtoServerFault),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNotLeader {
    /// Empty if no leader is known.
    #[prost(string, tag = "1")]
    pub leader_address: ::prost::alloc::string::String,
}
// ------- Membership --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoAddPeerReq {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub strict: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRemovePeerReq {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub strict: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMembershipResult {
    #[prost(oneof = "proto_membership_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_membership_result::Result>,
}
/// Nested message and enum types in `ProtoMembershipResult`.
pub mod proto_membership_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoMembershipSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoMembershipError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMembershipSuccess {
    #[prost(bool, tag = "1")]
    pub changed: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMembershipError {
    #[prost(oneof = "proto_membership_error::Err", tags = "1, 2, 3, 4")]
    pub err: ::core::option::Option<proto_membership_error::Err>,
}
/// Nested message and enum types in `ProtoMembershipError`.
pub mod proto_membership_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        AlreadyExists(super::ProtoAlreadyExists),
        #[prost(message, tag = "2")]
        NotFound(super::ProtoPeerNotFound),
        #[prost(message, tag = "3")]
        LocalNode(super::ProtoLocalNode),
        #[prost(message, tag = "4")]
        ServerFault(super::ProtoServerFault),
    }
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoAlreadyExists {}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPeerNotFound {}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLocalNode {}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoStatusReq {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoStatusReply {
    #[prost(string, tag = "1")]
    pub my_address: ::prost::alloc::string::String,
    #[prost(enumeration = "ProtoRole", tag = "2")]
    pub role: i32,
    #[prost(uint64, tag = "3")]
    pub epoch: u64,
    /// Empty if no leader is known.
    #[prost(string, tag = "4")]
    pub leader_address: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "5")]
    pub members: ::prost::alloc::vec::Vec<ProtoMember>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMember {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub leader: bool,
    #[prost(enumeration = "ProtoLiveness", tag = "3")]
    pub liveness: i32,
}
// ------- Promote / Demote --------

/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPromoteReq {}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDemoteReq {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRoleResult {
    #[prost(oneof = "proto_role_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_role_result::Result>,
}
/// Nested message and enum types in `ProtoRoleResult`.
pub mod proto_role_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoRoleSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoRoleError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRoleSuccess {
    #[prost(uint64, tag = "1")]
    pub epoch: u64,
    #[prost(bool, tag = "2")]
    pub changed: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRoleError {
    #[prost(oneof = "proto_role_error::Err", tags = "1, 2, 3")]
    pub err: ::core::option::Option<proto_role_error::Err>,
}
/// Nested message and enum types in `ProtoRoleError`.
pub mod proto_role_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        Unassigned(super::ProtoUnassigned),
        #[prost(message, tag = "2")]
        OtherLeader(super::ProtoOtherLeader),
        #[prost(message, tag = "3")]
        ServerFault(super::ProtoServerFault),
    }
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoUnassigned {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOtherLeader {
    #[prost(string, tag = "1")]
    pub leader_address: ::prost::alloc::string::String,
}
// ------- Peer: replication --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoApplyWriteReq {
    #[prost(string, tag = "1")]
    pub leader_address: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub leader_epoch: u64,
    #[prost(string, tag = "3")]
    pub key: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub entry: ::core::option::Option<ProtoEntry>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoApplyWriteResult {
    #[prost(oneof = "proto_apply_write_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_apply_write_result::Result>,
}
/// Nested message and enum types in `ProtoApplyWriteResult`.
pub mod proto_apply_write_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoApplyWriteSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoApplyWriteError),
    }
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoApplyWriteSuccess {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoApplyWriteError {
    #[prost(oneof = "proto_apply_write_error::Err", tags = "1, 2, 3, 4")]
    pub err: ::core::option::Option<proto_apply_write_error::Err>,
}
/// Nested message and enum types in `ProtoApplyWriteError`.
pub mod proto_apply_write_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        StaleEpoch(super::ProtoStaleEpoch),
        #[prost(message, tag = "2")]
        NotMember(super::ProtoNotMember),
        #[prost(message, tag = "3")]
        Conflict(super::ProtoConsistencyViolation),
        #[prost(message, tag = "4")]
        ServerFault(super::ProtoServerFault),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoStaleEpoch {
    #[prost(string, tag = "1")]
    pub leader_address: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub epoch: u64,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNotMember {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadLocalReq {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadLocalResult {
    #[prost(oneof = "proto_read_local_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_read_local_result::Result>,
}
/// Nested message and enum types in `ProtoReadLocalResult`.
pub mod proto_read_local_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoReadLocalSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoServerFault),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReadLocalSuccess {
    /// Absent if the key was never written on this node.
    #[prost(message, optional, tag = "1")]
    pub entry: ::core::option::Option<ProtoEntry>,
}
// ------- Peer: membership propagation --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMembershipChangeReq {
    #[prost(string, tag = "1")]
    pub sender_address: ::prost::alloc::string::String,
    #[prost(oneof = "proto_membership_change_req::Change", tags = "2, 3, 4, 5")]
    pub change: ::core::option::Option<proto_membership_change_req::Change>,
}
/// Nested message and enum types in `ProtoMembershipChangeReq`.
pub mod proto_membership_change_req {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Change {
        #[prost(message, tag = "2")]
        PeerAdded(super::ProtoPeerAdded),
        #[prost(message, tag = "3")]
        PeerRemoved(super::ProtoPeerRemoved),
        #[prost(message, tag = "4")]
        LeaderElected(super::ProtoLeaderElected),
        #[prost(message, tag = "5")]
        LeaderVacated(super::ProtoLeaderVacated),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPeerAdded {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPeerRemoved {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLeaderElected {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub epoch: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLeaderVacated {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub epoch: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoSyncMembershipReq {
    #[prost(string, tag = "1")]
    pub sender_address: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub members: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// Empty if no leader is known.
    #[prost(string, tag = "3")]
    pub leader_address: ::prost::alloc::string::String,
    #[prost(uint64, tag = "4")]
    pub epoch: u64,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPeerAck {}
// ------- Read --------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProtoReadConcern {
    Unspecified = 0,
    Local = 1,
    Majority = 2,
    All = 3,
}
// ------- Status --------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProtoRole {
    Unassigned = 0,
    Follower = 1,
    Leader = 2,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProtoLiveness {
    Alive = 0,
    Suspected = 1,
    Unreachable = 2,
}
#[doc = r" Generated client implementations."]
pub mod grpc_kv_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = " Client facing API. Any node serves reads; writes are only accepted by the leader."]
    pub struct GrpcKvClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcKvClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcKvClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        pub async fn read(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoReadReq>,
        ) -> Result<tonic::Response<super::ProtoReadResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcKv/Read");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn write(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoWriteReq>,
        ) -> Result<tonic::Response<super::ProtoWriteResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcKv/Write");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn delete(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoDeleteReq>,
        ) -> Result<tonic::Response<super::ProtoWriteResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcKv/Delete");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn add_peer(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoAddPeerReq>,
        ) -> Result<tonic::Response<super::ProtoMembershipResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcKv/AddPeer");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn remove_peer(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoRemovePeerReq>,
        ) -> Result<tonic::Response<super::ProtoMembershipResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcKv/RemovePeer");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn status(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoStatusReq>,
        ) -> Result<tonic::Response<super::ProtoStatusReply>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcKv/Status");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn promote(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoPromoteReq>,
        ) -> Result<tonic::Response<super::ProtoRoleResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcKv/Promote");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn demote(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoDemoteReq>,
        ) -> Result<tonic::Response<super::ProtoRoleResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcKv/Demote");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcKvClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcKvClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcKvClient {{ ... }}")
        }
    }
}
#[doc = r" Generated client implementations."]
pub mod grpc_peer_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = " Node to node API."]
    pub struct GrpcPeerClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcPeerClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcPeerClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        pub async fn apply_write(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoApplyWriteReq>,
        ) -> Result<tonic::Response<super::ProtoApplyWriteResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcPeer/ApplyWrite");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn read_local(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoReadLocalReq>,
        ) -> Result<tonic::Response<super::ProtoReadLocalResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcPeer/ReadLocal");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn change_membership(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoMembershipChangeReq>,
        ) -> Result<tonic::Response<super::ProtoPeerAck>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcPeer/ChangeMembership");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn sync_membership(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoSyncMembershipReq>,
        ) -> Result<tonic::Response<super::ProtoPeerAck>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/kv.GrpcPeer/SyncMembership");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcPeerClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcPeerClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcPeerClient {{ ... }}")
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_kv_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcKvServer."]
    #[async_trait]
    pub trait GrpcKv: Send + Sync + 'static {
        async fn read(
            &self,
            request: tonic::Request<super::ProtoReadReq>,
        ) -> Result<tonic::Response<super::ProtoReadResult>, tonic::Status>;
        async fn write(
            &self,
            request: tonic::Request<super::ProtoWriteReq>,
        ) -> Result<tonic::Response<super::ProtoWriteResult>, tonic::Status>;
        async fn delete(
            &self,
            request: tonic::Request<super::ProtoDeleteReq>,
        ) -> Result<tonic::Response<super::ProtoWriteResult>, tonic::Status>;
        async fn add_peer(
            &self,
            request: tonic::Request<super::ProtoAddPeerReq>,
        ) -> Result<tonic::Response<super::ProtoMembershipResult>, tonic::Status>;
        async fn remove_peer(
            &self,
            request: tonic::Request<super::ProtoRemovePeerReq>,
        ) -> Result<tonic::Response<super::ProtoMembershipResult>, tonic::Status>;
        async fn status(
            &self,
            request: tonic::Request<super::ProtoStatusReq>,
        ) -> Result<tonic::Response<super::ProtoStatusReply>, tonic::Status>;
        async fn promote(
            &self,
            request: tonic::Request<super::ProtoPromoteReq>,
        ) -> Result<tonic::Response<super::ProtoRoleResult>, tonic::Status>;
        async fn demote(
            &self,
            request: tonic::Request<super::ProtoDemoteReq>,
        ) -> Result<tonic::Response<super::ProtoRoleResult>, tonic::Status>;
    }
    #[doc = " Client facing API. Any node serves reads; writes are only accepted by the leader."]
    #[derive(Debug)]
    pub struct GrpcKvServer<T: GrpcKv> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcKv> GrpcKvServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcKvServer<T>
    where
        T: GrpcKv,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/kv.GrpcKv/Read" => {
                    #[allow(non_camel_case_types)]
                    struct ReadSvc<T: GrpcKv>(pub Arc<T>);
                    impl<T: GrpcKv> tonic::server::UnaryService<super::ProtoReadReq> for ReadSvc<T> {
                        type Response = super::ProtoReadResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoReadReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).read(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ReadSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcKv/Write" => {
                    #[allow(non_camel_case_types)]
                    struct WriteSvc<T: GrpcKv>(pub Arc<T>);
                    impl<T: GrpcKv> tonic::server::UnaryService<super::ProtoWriteReq> for WriteSvc<T> {
                        type Response = super::ProtoWriteResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoWriteReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).write(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = WriteSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcKv/Delete" => {
                    #[allow(non_camel_case_types)]
                    struct DeleteSvc<T: GrpcKv>(pub Arc<T>);
                    impl<T: GrpcKv> tonic::server::UnaryService<super::ProtoDeleteReq> for DeleteSvc<T> {
                        type Response = super::ProtoWriteResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoDeleteReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).delete(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = DeleteSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcKv/AddPeer" => {
                    #[allow(non_camel_case_types)]
                    struct AddPeerSvc<T: GrpcKv>(pub Arc<T>);
                    impl<T: GrpcKv> tonic::server::UnaryService<super::ProtoAddPeerReq> for AddPeerSvc<T> {
                        type Response = super::ProtoMembershipResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoAddPeerReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).add_peer(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = AddPeerSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcKv/RemovePeer" => {
                    #[allow(non_camel_case_types)]
                    struct RemovePeerSvc<T: GrpcKv>(pub Arc<T>);
                    impl<T: GrpcKv> tonic::server::UnaryService<super::ProtoRemovePeerReq> for RemovePeerSvc<T> {
                        type Response = super::ProtoMembershipResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoRemovePeerReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).remove_peer(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = RemovePeerSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcKv/Status" => {
                    #[allow(non_camel_case_types)]
                    struct StatusSvc<T: GrpcKv>(pub Arc<T>);
                    impl<T: GrpcKv> tonic::server::UnaryService<super::ProtoStatusReq> for StatusSvc<T> {
                        type Response = super::ProtoStatusReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoStatusReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).status(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = StatusSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcKv/Promote" => {
                    #[allow(non_camel_case_types)]
                    struct PromoteSvc<T: GrpcKv>(pub Arc<T>);
                    impl<T: GrpcKv> tonic::server::UnaryService<super::ProtoPromoteReq> for PromoteSvc<T> {
                        type Response = super::ProtoRoleResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoPromoteReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).promote(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = PromoteSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcKv/Demote" => {
                    #[allow(non_camel_case_types)]
                    struct DemoteSvc<T: GrpcKv>(pub Arc<T>);
                    impl<T: GrpcKv> tonic::server::UnaryService<super::ProtoDemoteReq> for DemoteSvc<T> {
                        type Response = super::ProtoRoleResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoDemoteReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).demote(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = DemoteSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcKv> Clone for GrpcKvServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcKv> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcKv> tonic::transport::NamedService for GrpcKvServer<T> {
        const NAME: &'static str = "kv.GrpcKv";
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_peer_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcPeerServer."]
    #[async_trait]
    pub trait GrpcPeer: Send + Sync + 'static {
        async fn apply_write(
            &self,
            request: tonic::Request<super::ProtoApplyWriteReq>,
        ) -> Result<tonic::Response<super::ProtoApplyWriteResult>, tonic::Status>;
        async fn read_local(
            &self,
            request: tonic::Request<super::ProtoReadLocalReq>,
        ) -> Result<tonic::Response<super::ProtoReadLocalResult>, tonic::Status>;
        async fn change_membership(
            &self,
            request: tonic::Request<super::ProtoMembershipChangeReq>,
        ) -> Result<tonic::Response<super::ProtoPeerAck>, tonic::Status>;
        async fn sync_membership(
            &self,
            request: tonic::Request<super::ProtoSyncMembershipReq>,
        ) -> Result<tonic::Response<super::ProtoPeerAck>, tonic::Status>;
    }
    #[doc = " Node to node API."]
    #[derive(Debug)]
    pub struct GrpcPeerServer<T: GrpcPeer> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcPeer> GrpcPeerServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcPeerServer<T>
    where
        T: GrpcPeer,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/kv.GrpcPeer/ApplyWrite" => {
                    #[allow(non_camel_case_types)]
                    struct ApplyWriteSvc<T: GrpcPeer>(pub Arc<T>);
                    impl<T: GrpcPeer> tonic::server::UnaryService<super::ProtoApplyWriteReq> for ApplyWriteSvc<T> {
                        type Response = super::ProtoApplyWriteResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoApplyWriteReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).apply_write(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ApplyWriteSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcPeer/ReadLocal" => {
                    #[allow(non_camel_case_types)]
                    struct ReadLocalSvc<T: GrpcPeer>(pub Arc<T>);
                    impl<T: GrpcPeer> tonic::server::UnaryService<super::ProtoReadLocalReq> for ReadLocalSvc<T> {
                        type Response = super::ProtoReadLocalResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoReadLocalReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).read_local(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ReadLocalSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcPeer/ChangeMembership" => {
                    #[allow(non_camel_case_types)]
                    struct ChangeMembershipSvc<T: GrpcPeer>(pub Arc<T>);
                    impl<T: GrpcPeer> tonic::server::UnaryService<super::ProtoMembershipChangeReq>
                        for ChangeMembershipSvc<T>
                    {
                        type Response = super::ProtoPeerAck;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoMembershipChangeReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).change_membership(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ChangeMembershipSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/kv.GrpcPeer/SyncMembership" => {
                    #[allow(non_camel_case_types)]
                    struct SyncMembershipSvc<T: GrpcPeer>(pub Arc<T>);
                    impl<T: GrpcPeer> tonic::server::UnaryService<super::ProtoSyncMembershipReq>
                        for SyncMembershipSvc<T>
                    {
                        type Response = super::ProtoPeerAck;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoSyncMembershipReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).sync_membership(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = SyncMembershipSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcPeer> Clone for GrpcPeerServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcPeer> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcPeer> tonic::transport::NamedService for GrpcPeerServer<T> {
        const NAME: &'static str = "kv.GrpcPeer";
    }
}
