use crate::actor::{self, ClusterState};
use crate::api::node::KvNode;
use crate::api::options::KvOptionsValidated;
use crate::api::KvOptions;
use crate::handler::RequestHandler;
use crate::membership::{MembershipPropagator, NodeAddress};
use crate::replication::{GrpcPeerTransport, LoggingMissedWriteSink, MissedWriteSink, ReplicationCoordinator};
use crate::server::{self, RpcServer};
use crate::store::{InMemoryStore, KeyValueStore};
use std::convert::TryFrom;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct KvNodeConfig {
    /// "host:port" this node listens on. Other nodes reach it under the same string.
    pub my_address: String,
    /// Addresses of the cluster's members, optionally including `my_address`. Empty means the
    /// node starts Unassigned and waits to be added by an existing member.
    pub initial_peers: Vec<String>,
    pub info_logger: slog::Logger,
    pub options: KvOptions,
    /// Local storage engine. `None` keeps data in memory for the life of the process.
    pub store: Option<Arc<dyn KeyValueStore>>,
    /// Told about every write a follower failed to acknowledge. `None` only logs them.
    pub missed_write_sink: Option<Arc<dyn MissedWriteSink>>,
}

#[derive(Debug, thiserror::Error)]
pub enum KvNodeCreationError {
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),
    #[error("Illegal options for configuring node: {0}")]
    IllegalOptions(String),
}

pub async fn try_create_kv_node(config: KvNodeConfig) -> Result<KvNode, KvNodeCreationError> {
    let options = KvOptionsValidated::try_from(config.options)
        .map_err(|e| KvNodeCreationError::IllegalOptions(e.to_string()))?;

    let socket_addr = resolve(&config.my_address).await?;
    for peer in config.initial_peers.iter() {
        if peer.is_empty() || peer.contains(char::is_whitespace) {
            return Err(KvNodeCreationError::InvalidAddress(peer.clone()));
        }
    }

    let my_address = NodeAddress::new(config.my_address);
    let root_logger = config.info_logger.new(slog::o!("Node" => my_address.as_str().to_string()));

    let cluster_state = ClusterState::new(
        root_logger.clone(),
        my_address.clone(),
        config.initial_peers.into_iter().map(NodeAddress::new).collect(),
        options.unreachable_after_failures,
    );
    let (cluster, cluster_actor) = actor::create(10, cluster_state);
    tokio::spawn(cluster_actor.run_event_loop());

    let transport = Arc::new(GrpcPeerTransport::new(
        root_logger.new(slog::o!("Component" => "PeerTransport")),
        options.peer_call_timeout,
    ));

    let store = config.store.unwrap_or_else(|| Arc::new(InMemoryStore::new()));
    let missed_write_sink = config
        .missed_write_sink
        .unwrap_or_else(|| Arc::new(LoggingMissedWriteSink::new(root_logger.clone())));

    let coordinator = ReplicationCoordinator::new(
        root_logger.new(slog::o!("Component" => "Replication")),
        store,
        transport.clone(),
        cluster.clone(),
        missed_write_sink,
        options.write_timeout,
        options.read_timeout,
    );
    let propagator = MembershipPropagator::new(
        root_logger.new(slog::o!("Component" => "Membership")),
        transport,
        cluster.clone(),
        my_address.clone(),
        options.membership_notify_attempts,
    );

    let handler = Arc::new(RequestHandler::new(
        root_logger.clone(),
        my_address,
        coordinator,
        cluster,
        propagator,
        options.default_read_concern,
        options.default_write_concern,
    ));

    let (server_shutdown_handle, server_shutdown_signal) = server::shutdown_signal();
    let rpc_server = RpcServer::new(root_logger, handler.clone());
    tokio::spawn(rpc_server.run(socket_addr, server_shutdown_signal));

    Ok(KvNode::new(handler, server_shutdown_handle))
}

async fn resolve(address: &str) -> Result<SocketAddr, KvNodeCreationError> {
    let invalid = || KvNodeCreationError::InvalidAddress(address.to_string());

    tokio::net::lookup_host(address)
        .await
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::KvVersion;
    use std::error::Error;
    use std::sync::Mutex;
    use tokio::time::{Duration, Instant};

    #[derive(Default)]
    struct RecordingSink {
        missed: Mutex<Vec<(String, String, KvVersion)>>,
    }

    impl MissedWriteSink for RecordingSink {
        fn write_missed(&self, peer: &str, key: &str, version: KvVersion, _reason: &dyn Error) {
            self.missed
                .lock()
                .unwrap()
                .push((peer.to_string(), key.to_string(), version));
        }
    }

    fn config(my_address: &str, options: KvOptions) -> KvNodeConfig {
        KvNodeConfig {
            my_address: my_address.to_string(),
            initial_peers: vec![],
            info_logger: slog::Logger::root(slog::Discard, slog::o!()),
            options,
            store: None,
            missed_write_sink: None,
        }
    }

    #[tokio::test]
    async fn rejects_unresolvable_address() {
        let result = try_create_kv_node(config("no port here", KvOptions::default())).await;
        assert!(matches!(result, Err(KvNodeCreationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn rejects_illegal_options() {
        let options = KvOptions {
            peer_call_timeout: Some(Duration::from_secs(10)),
            ..KvOptions::default()
        };
        let result = try_create_kv_node(config("127.0.0.1:0", options)).await;
        assert!(matches!(result, Err(KvNodeCreationError::IllegalOptions(_))));
    }

    #[tokio::test]
    async fn supplied_store_and_missed_write_sink_are_used() {
        let store = Arc::new(InMemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        // Nothing listens on the follower's port.
        let mut config = config("127.0.0.1:6100", KvOptions::default());
        config.initial_peers = vec!["127.0.0.1:6100".to_string(), "127.0.0.1:47996".to_string()];
        config.store = Some(store.clone());
        config.missed_write_sink = Some(sink.clone());

        let node = try_create_kv_node(config).await.unwrap();
        node.promote().await.unwrap();
        let version = node.write("k", "v", Some(0)).await.unwrap();

        let entry = store.get("k").await.unwrap().unwrap();
        assert_eq!(entry.value.as_deref(), Some("v"));
        assert_eq!(KvVersion::from(entry.version), version);

        let deadline = Instant::now() + Duration::from_secs(5);
        while sink.missed.lock().unwrap().is_empty() {
            assert!(Instant::now() < deadline, "Missed write never reported");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(
            sink.missed.lock().unwrap().clone(),
            vec![("127.0.0.1:47996".to_string(), "k".to_string(), version)]
        );
    }
}
