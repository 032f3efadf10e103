mod arbitration;
mod coordinator;
#[cfg(test)]
pub(crate) mod fake_transport;
mod grpc_transport;
mod missed;
mod tally;
mod transport;
mod wire;

pub(crate) use coordinator::ApplyWriteError;
pub(crate) use coordinator::QuorumReadError;
pub(crate) use coordinator::ReadConcern;
pub(crate) use coordinator::ReplicateWriteError;
pub(crate) use coordinator::ReplicationCoordinator;
pub(crate) use grpc_transport::GrpcPeerTransport;
pub(crate) use missed::LoggingMissedWriteSink;
pub use missed::MissedWriteSink;
pub(crate) use transport::PeerCallError;
pub(crate) use transport::PeerTransport;
pub(crate) use transport::ReplicatedWrite;
pub(crate) use wire::entry_from_proto;
pub(crate) use wire::entry_to_proto;
pub(crate) use wire::optional_address;
pub(crate) use wire::version_from_proto;
pub(crate) use wire::version_to_proto;
