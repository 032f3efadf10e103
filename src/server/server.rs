use crate::grpc::grpc_kv_server::GrpcKvServer;
use crate::grpc::grpc_peer_server::GrpcPeerServer;
use crate::handler::RequestHandler;
use crate::server::kv_service::KvService;
use crate::server::peer_service::PeerService;
use crate::server::RpcServerShutdownSignal;
use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;

/// RpcServer hosts both the client facing and the node to node gRPC services on one port.
pub(crate) struct RpcServer {
    logger: slog::Logger,
    handler: Arc<RequestHandler>,
}

impl RpcServer {
    pub(crate) fn new(logger: slog::Logger, handler: Arc<RequestHandler>) -> Self {
        RpcServer { logger, handler }
    }

    pub(crate) async fn run(self, socket_addr: SocketAddr, shutdown_signal: RpcServerShutdownSignal) {
        let logger = self.logger;
        slog::info!(logger, "Listening on '{:?}'", socket_addr);

        let kv_service = KvService::new(logger.new(slog::o!("Service" => "Kv")), self.handler.clone());
        let peer_service = PeerService::new(logger.new(slog::o!("Service" => "Peer")), self.handler);

        let result = Server::builder()
            .add_service(GrpcKvServer::new(kv_service))
            .add_service(GrpcPeerServer::new(peer_service))
            .serve_with_shutdown(socket_addr, shutdown_signal)
            .await;

        match result {
            Ok(()) => slog::info!(logger, "Server run() has exited"),
            Err(e) => slog::error!(logger, "Server run() has exited: {}", e),
        }
    }
}
