use crate::actor::{ActorClient, ActorExited, NotLeader, ReplicatedWriteRejected, WriteTicket};
use crate::api::KvVersion;
use crate::membership::{Epoch, NodeAddress};
use crate::replication::arbitration::{self, ConflictingVersions};
use crate::replication::tally::{self, AckTally};
use crate::replication::{MissedWriteSink, PeerCallError, PeerTransport, ReplicatedWrite};
use crate::store::{Entry, KeyValueStore, PutOutcome, Version};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::io;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ReadConcern {
    Local,
    Majority,
    All,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ReplicateWriteError {
    #[error(transparent)]
    NotLeader(#[from] NotLeader),
    #[error("{acknowledged} of {required} required nodes acknowledged")]
    WriteConcernUnsatisfiable { required: usize, acknowledged: usize },
    #[error("Local store refused version {attempted:?}: it holds {current:?}")]
    LocalVersionConflict { attempted: Version, current: Version },
    #[error("Local store failure")]
    LocalIo(#[from] io::Error),
    #[error(transparent)]
    ActorExited(#[from] ActorExited),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum QuorumReadError {
    #[error("Key not found")]
    NotFound,
    #[error("{received} of {required} required nodes responded")]
    ReadConcernUnsatisfiable { required: usize, received: usize },
    #[error("Nodes {nodes:?} hold different values for '{key}' at version {version:?}")]
    ConsistencyViolation {
        key: String,
        version: Version,
        nodes: (NodeAddress, NodeAddress),
    },
    #[error("Local store failure")]
    LocalIo(#[from] io::Error),
    #[error(transparent)]
    ActorExited(#[from] ActorExited),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApplyWriteError {
    #[error(transparent)]
    Rejected(#[from] ReplicatedWriteRejected),
    #[error("Local store holds a different value at version {0:?}")]
    Conflict(Version),
    #[error("Local store failure")]
    LocalIo(#[from] io::Error),
    #[error(transparent)]
    ActorExited(#[from] ActorExited),
}

/// ReplicationCoordinator runs the write and read protocols. One instance serves every request on
/// a node; each call works off the cluster snapshot it takes when it starts.
pub(crate) struct ReplicationCoordinator {
    logger: slog::Logger,
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn PeerTransport>,
    cluster: ActorClient,
    missed_writes: Arc<dyn MissedWriteSink>,
    write_timeout: Duration,
    read_timeout: Duration,
}

impl ReplicationCoordinator {
    pub(crate) fn new(
        logger: slog::Logger,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn PeerTransport>,
        cluster: ActorClient,
        missed_writes: Arc<dyn MissedWriteSink>,
        write_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        ReplicationCoordinator {
            logger,
            store,
            transport,
            cluster,
            missed_writes,
            write_timeout,
            read_timeout,
        }
    }

    /// Writes `value` (or a tombstone if `None`) and waits for `follower_acks` followers on top of
    /// the leader's own apply. Followers that already applied the write keep it when this fails.
    pub(crate) async fn write(
        &self,
        key: String,
        value: Option<String>,
        follower_acks: usize,
    ) -> Result<Version, ReplicateWriteError> {
        let WriteTicket { version, registry } = self.cluster.begin_write().await??;
        let logger = self.logger.new(slog::o!("Key" => key.clone(), "Version" => format!("{:?}", version)));

        let entry = Entry::new(version, value);
        match self.store.put(key.clone(), entry.clone()).await? {
            PutOutcome::Applied => {}
            PutOutcome::Duplicate => {
                slog::warn!(logger, "Leader assigned a version it already held");
            }
            // A concurrent write to the same key got a later version and reached the store first.
            PutOutcome::Superseded { current } if current.epoch() == version.epoch() => {
                slog::debug!(logger, "Overwritten locally by {:?} before replicating", current);
            }
            PutOutcome::Superseded { current } => {
                slog::error!(logger, "Leader assigned a version older than its own store ({:?})", current);
                return Err(ReplicateWriteError::LocalVersionConflict {
                    attempted: version,
                    current,
                });
            }
            PutOutcome::Conflict { current } => {
                slog::error!(logger, "Leader assigned a version it already holds a different value for");
                return Err(ReplicateWriteError::LocalVersionConflict {
                    attempted: version,
                    current: current.version,
                });
            }
        }

        let followers = registry.other_members();
        let mut tally = AckTally::new(1 + follower_acks, 1 + followers.len());
        tally.record_ack(registry.my_address.clone());

        let write = ReplicatedWrite {
            leader: registry.my_address.clone(),
            leader_epoch: version.epoch(),
            key,
            entry,
        };

        // Every follower gets the write even when the concern is already met or can never be.
        // Spawned calls run to completion after we stop waiting on them.
        let mut acks = FuturesUnordered::new();
        for follower in followers {
            acks.push(tokio::spawn(self.replicate_to(follower, write.clone())));
        }

        let deadline = Instant::now() + self.write_timeout;
        while !tally.is_satisfied() && !tally.is_unsatisfiable() {
            match tokio::time::timeout_at(deadline, acks.next()).await {
                Ok(Some(Ok((follower, true)))) => tally.record_ack(follower),
                Ok(Some(_)) => tally.record_failure(),
                Ok(None) => break,
                Err(_) => {
                    slog::warn!(logger, "Timed out waiting for write acknowledgments");
                    break;
                }
            }
        }

        if tally.is_satisfied() {
            Ok(version)
        } else {
            slog::warn!(
                logger,
                "Write concern not met: {} of {} acknowledged",
                tally.acknowledged(),
                tally.required()
            );
            Err(ReplicateWriteError::WriteConcernUnsatisfiable {
                required: tally.required(),
                acknowledged: tally.acknowledged(),
            })
        }
    }

    // Returns whether the follower acknowledged. Health, fencing and missed-write reporting all
    // happen here so they also cover calls that finish after the client got its answer.
    fn replicate_to(
        &self,
        follower: NodeAddress,
        write: ReplicatedWrite,
    ) -> impl std::future::Future<Output = (NodeAddress, bool)> + Send + 'static {
        let transport = self.transport.clone();
        let cluster = self.cluster.clone();
        let missed_writes = self.missed_writes.clone();

        async move {
            let key = write.key.clone();
            let version = write.entry.version;
            let result = transport.send_write(&follower, write).await;
            report_outcome(&cluster, &follower, &result).await;

            match result {
                Ok(()) => (follower, true),
                Err(e) => {
                    missed_writes.write_missed(follower.as_str(), &key, KvVersion::from(version), &e);
                    (follower, false)
                }
            }
        }
    }

    pub(crate) async fn read(&self, key: &str, concern: ReadConcern) -> Result<Entry, QuorumReadError> {
        let newest = match concern {
            ReadConcern::Local => self.store.get(key).await?,
            ReadConcern::Majority | ReadConcern::All => self.read_from_nodes(key, concern).await?,
        };

        match newest {
            Some(entry) if !entry.is_tombstone() => Ok(entry),
            _ => Err(QuorumReadError::NotFound),
        }
    }

    async fn read_from_nodes(&self, key: &str, concern: ReadConcern) -> Result<Option<Entry>, QuorumReadError> {
        let registry = self.cluster.snapshot().await?.registry;
        let required = match concern {
            ReadConcern::All => registry.cluster_size(),
            _ => tally::quorum_size(registry.cluster_size()),
        };

        let peers = registry.other_members();
        let mut tally = AckTally::new(required, 1 + peers.len());
        let mut responses = Vec::with_capacity(registry.cluster_size());

        let mut replies = FuturesUnordered::new();
        for peer in peers {
            let transport = self.transport.clone();
            let cluster = self.cluster.clone();
            let key = key.to_string();
            replies.push(tokio::spawn(async move {
                let result = transport.send_read(&peer, &key).await;
                report_outcome(&cluster, &peer, &result).await;
                (peer, result)
            }));
        }

        responses.push((registry.my_address.clone(), self.store.get(key).await?));
        tally.record_ack(registry.my_address.clone());

        let deadline = Instant::now() + self.read_timeout;
        while !tally.is_satisfied() && !tally.is_unsatisfiable() {
            match tokio::time::timeout_at(deadline, replies.next()).await {
                Ok(Some(Ok((peer, Ok(entry))))) => {
                    tally.record_ack(peer.clone());
                    responses.push((peer, entry));
                }
                Ok(Some(Ok((peer, Err(e))))) => {
                    slog::debug!(self.logger, "Read of '{}' from {} failed: {}", key, peer, e);
                    tally.record_failure();
                }
                Ok(Some(Err(_))) => tally.record_failure(),
                Ok(None) | Err(_) => break,
            }
        }

        if !tally.is_satisfied() {
            return Err(QuorumReadError::ReadConcernUnsatisfiable {
                required: tally.required(),
                received: tally.acknowledged(),
            });
        }

        arbitration::newest_entry(responses).map_err(|ConflictingVersions { version, nodes }| {
            slog::error!(
                self.logger,
                "Consistency violation for key '{}': {} and {} disagree at {:?}",
                key,
                nodes.0,
                nodes.1,
                version
            );
            QuorumReadError::ConsistencyViolation {
                key: key.to_string(),
                version,
                nodes,
            }
        })
    }

    /// Follower side of the write path.
    pub(crate) async fn apply_replicated_write(&self, write: ReplicatedWrite) -> Result<(), ApplyWriteError> {
        self.cluster
            .check_replicated_write(write.leader.clone(), write.leader_epoch)
            .await??;

        let version = write.entry.version;
        match self.store.put(write.key.clone(), write.entry).await? {
            PutOutcome::Applied | PutOutcome::Duplicate => Ok(()),
            PutOutcome::Superseded { current } => {
                // Delivered out of order. The newer write already won.
                slog::debug!(
                    self.logger,
                    "Write {:?} of '{}' superseded by {:?}",
                    version,
                    write.key,
                    current
                );
                Ok(())
            }
            PutOutcome::Conflict { current } => {
                slog::error!(
                    self.logger,
                    "Consistency violation for key '{}': leader {} sent a different value at {:?}",
                    write.key,
                    write.leader,
                    current.version
                );
                Err(ApplyWriteError::Conflict(current.version))
            }
        }
    }

    /// Serves a peer's quorum read. Tombstones are returned as-is so they take part in arbitration.
    pub(crate) async fn read_local(&self, key: &str) -> Result<Option<Entry>, io::Error> {
        self.store.get(key).await
    }

    /// Highest epoch present in the local store, if any.
    pub(crate) async fn highest_stored_epoch(&self) -> Option<Epoch> {
        self.store.high_water_mark().await.map(|version| version.epoch())
    }
}

async fn report_outcome<T>(cluster: &ActorClient, peer: &NodeAddress, result: &Result<T, PeerCallError>) {
    let reachable = match result {
        Ok(_) => true,
        Err(e) => e.peer_responded(),
    };
    let _ = cluster.report_call_outcome(peer.clone(), reachable).await;

    if let Err(PeerCallError::StaleEpoch { leader, epoch }) = result {
        let _ = cluster.observe_leader(leader.clone(), *epoch).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{self, ClusterState};
    use crate::membership::{RoleState, Epoch};
    use crate::replication::fake_transport::{FakeTransport, PeerBehavior};
    use crate::store::InMemoryStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        missed: Mutex<Vec<(NodeAddress, String)>>,
    }

    impl MissedWriteSink for RecordingSink {
        fn write_missed(&self, peer: &str, key: &str, _version: KvVersion, _reason: &dyn std::error::Error) {
            self.missed.lock().unwrap().push((NodeAddress::new(peer), key.to_string()));
        }
    }

    struct Harness {
        coordinator: ReplicationCoordinator,
        cluster: ActorClient,
        store: Arc<InMemoryStore>,
        transport: Arc<FakeTransport>,
        sink: Arc<RecordingSink>,
    }

    async fn leader_of(peers: &[&str]) -> Harness {
        let harness = node_of(peers);
        harness.cluster.promote(None).await.unwrap().unwrap();
        harness
    }

    fn node_of(peers: &[&str]) -> Harness {
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let transport = FakeTransport::new();
        for peer in peers {
            transport.add_peer(peer);
        }

        let state = ClusterState::new(
            logger.clone(),
            NodeAddress::new("leader:1"),
            peers.iter().map(|p| NodeAddress::new(*p)).collect(),
            3,
        );
        let (cluster, actor) = actor::create(10, state);
        tokio::spawn(actor.run_event_loop());

        let store = Arc::new(InMemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let coordinator = ReplicationCoordinator::new(
            logger,
            store.clone(),
            transport.clone(),
            cluster.clone(),
            sink.clone(),
            Duration::from_millis(300),
            Duration::from_millis(300),
        );

        Harness {
            coordinator,
            cluster,
            store,
            transport,
            sink,
        }
    }

    #[tokio::test]
    async fn write_with_all_followers_acknowledging() {
        let h = leader_of(&["f1:1", "f2:1"]).await;

        let version = h.coordinator.write("x".into(), Some("1".into()), 2).await.unwrap();

        assert_eq!(h.store.get("x").await.unwrap().unwrap().version, version);
        let read = h.coordinator.read("x", ReadConcern::All).await.unwrap();
        assert_eq!(read.value.as_deref(), Some("1"));
        assert_eq!(read.version, version);
    }

    #[tokio::test]
    async fn follower_rejects_writes() {
        let h = node_of(&["f1:1"]);

        let err = h.coordinator.write("x".into(), Some("1".into()), 0).await.unwrap_err();

        assert!(matches!(err, ReplicateWriteError::NotLeader(_)));
        assert_eq!(h.store.get("x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_follower_makes_write_concern_unsatisfiable_without_rollback() {
        let h = leader_of(&["f1:1", "f2:1"]).await;
        h.transport.set_behavior("f2:1", PeerBehavior::Unreachable);

        let err = h.coordinator.write("x".into(), Some("1".into()), 2).await.unwrap_err();

        assert!(matches!(
            err,
            ReplicateWriteError::WriteConcernUnsatisfiable { required: 3, .. }
        ));
        assert_eq!(h.store.get("x").await.unwrap().unwrap().value.as_deref(), Some("1"));
        let f1 = h.transport.store("f1:1");
        for _ in 0..50 {
            if f1.get("x").await.unwrap().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(f1.get("x").await.unwrap().unwrap().value.as_deref(), Some("1"));
        assert_eq!(
            h.coordinator.read("x", ReadConcern::Majority).await.unwrap().value.as_deref(),
            Some("1")
        );
        assert_eq!(h.sink.missed.lock().unwrap().clone(), vec![(NodeAddress::new("f2:1"), "x".to_string())]);
    }

    #[tokio::test]
    async fn slow_follower_times_out() {
        let h = leader_of(&["f1:1"]).await;
        h.transport.set_behavior("f1:1", PeerBehavior::Slow(Duration::from_secs(5)));

        let started = Instant::now();
        let err = h.coordinator.write("x".into(), Some("1".into()), 1).await.unwrap_err();

        assert!(matches!(err, ReplicateWriteError::WriteConcernUnsatisfiable { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn concern_above_cluster_size_fails_fast() {
        let h = leader_of(&["f1:1"]).await;

        let started = Instant::now();
        let err = h.coordinator.write("x".into(), Some("1".into()), 5).await.unwrap_err();

        assert!(matches!(
            err,
            ReplicateWriteError::WriteConcernUnsatisfiable { required: 6, .. }
        ));
        assert!(started.elapsed() < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn zero_concern_succeeds_with_every_follower_down() {
        let h = leader_of(&["f1:1", "f2:1"]).await;
        h.transport.set_behavior("f1:1", PeerBehavior::Unreachable);
        h.transport.set_behavior("f2:1", PeerBehavior::Unreachable);

        h.coordinator.write("x".into(), Some("1".into()), 0).await.unwrap();

        assert_eq!(
            h.coordinator.read("x", ReadConcern::Local).await.unwrap().value.as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn concurrent_writes_get_distinct_increasing_versions() {
        let h = leader_of(&["f1:1"]).await;

        let (a, b) = tokio::join!(
            h.coordinator.write("x".into(), Some("a".into()), 0),
            h.coordinator.write("x".into(), Some("b".into()), 0),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a, b);

        let expected = if a > b { "a" } else { "b" };
        let local = h.coordinator.read("x", ReadConcern::Local).await.unwrap();
        assert_eq!(local.version, std::cmp::max(a, b));
        assert_eq!(local.value.as_deref(), Some(expected));
    }

    #[tokio::test]
    async fn local_read_ignores_peers() {
        let h = leader_of(&["f1:1"]).await;
        h.transport.set_behavior("f1:1", PeerBehavior::Unreachable);

        assert!(matches!(
            h.coordinator.read("missing", ReadConcern::Local).await,
            Err(QuorumReadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn read_all_fails_when_any_peer_is_unreachable() {
        let h = leader_of(&["f1:1", "f2:1"]).await;
        h.coordinator.write("x".into(), Some("1".into()), 2).await.unwrap();
        h.transport.set_behavior("f2:1", PeerBehavior::Unreachable);

        assert!(matches!(
            h.coordinator.read("x", ReadConcern::All).await,
            Err(QuorumReadError::ReadConcernUnsatisfiable { required: 3, .. })
        ));
        assert!(h.coordinator.read("x", ReadConcern::Majority).await.is_ok());
        assert!(h.coordinator.read("x", ReadConcern::Local).await.is_ok());
    }

    #[tokio::test]
    async fn majority_read_fails_without_quorum() {
        let h = leader_of(&["f1:1", "f2:1"]).await;
        h.transport.set_behavior("f1:1", PeerBehavior::Unreachable);
        h.transport.set_behavior("f2:1", PeerBehavior::Unreachable);

        assert!(matches!(
            h.coordinator.read("x", ReadConcern::Majority).await,
            Err(QuorumReadError::ReadConcernUnsatisfiable {
                required: 2,
                received: 1
            })
        ));
    }

    #[tokio::test]
    async fn majority_read_returns_newest_version_held_by_a_follower() {
        let h = node_of(&["f1:1", "f2:1"]);
        let f1 = h.transport.store("f1:1");
        h.transport.set_behavior("f2:1", PeerBehavior::Unreachable);
        let newer = Entry::new(Version::new(Epoch::new(3), 1), Some("new".into()));
        f1.put("x".into(), newer.clone()).await.unwrap();
        h.store
            .put("x".into(), Entry::new(Version::new(Epoch::new(2), 8), Some("old".into())))
            .await
            .unwrap();

        assert_eq!(h.coordinator.read("x", ReadConcern::Majority).await.unwrap(), newer);
    }

    #[tokio::test]
    async fn equal_versions_with_different_values_surface_as_violation() {
        let h = node_of(&["f1:1"]);
        let f1 = h.transport.store("f1:1");
        let version = Version::new(Epoch::new(1), 1);
        f1.put("x".into(), Entry::new(version, Some("a".into()))).await.unwrap();
        h.store.put("x".into(), Entry::new(version, Some("b".into()))).await.unwrap();

        assert!(matches!(
            h.coordinator.read("x", ReadConcern::All).await,
            Err(QuorumReadError::ConsistencyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn delete_reads_as_not_found_everywhere() {
        let h = leader_of(&["f1:1"]).await;
        h.coordinator.write("x".into(), Some("1".into()), 1).await.unwrap();

        h.coordinator.write("x".into(), None, 1).await.unwrap();

        assert!(matches!(
            h.coordinator.read("x", ReadConcern::All).await,
            Err(QuorumReadError::NotFound)
        ));
        assert!(matches!(
            h.coordinator.read("x", ReadConcern::Local).await,
            Err(QuorumReadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn leader_steps_down_when_follower_reports_newer_epoch() {
        let h = leader_of(&["f1:1"]).await;
        h.transport.set_behavior("f1:1", PeerBehavior::StaleEpoch(Epoch::new(9)));

        let _ = h.coordinator.write("x".into(), Some("1".into()), 1).await;

        // Fencing is applied by the spawned call. Give the actor a moment.
        for _ in 0..50 {
            if h.cluster.snapshot().await.unwrap().role == RoleState::Follower {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let snapshot = h.cluster.snapshot().await.unwrap();
        assert_eq!(snapshot.role, RoleState::Follower);
        assert_eq!(snapshot.epoch, Epoch::new(9));
    }

    #[tokio::test]
    async fn apply_replicated_write_checks_sender_and_orders_by_version() {
        let h = node_of(&["f1:1"]);
        let write = |sequence: u64, value: &str| ReplicatedWrite {
            leader: NodeAddress::new("f1:1"),
            leader_epoch: Epoch::new(1),
            key: "x".into(),
            entry: Entry::new(Version::new(Epoch::new(1), sequence), Some(value.into())),
        };

        h.coordinator.apply_replicated_write(write(2, "second")).await.unwrap();
        // Arrives late. Acknowledged, not applied.
        h.coordinator.apply_replicated_write(write(1, "first")).await.unwrap();
        assert_eq!(
            h.coordinator.read_local("x").await.unwrap().unwrap().value.as_deref(),
            Some("second")
        );

        assert!(matches!(
            h.coordinator.apply_replicated_write(write(2, "other")).await,
            Err(ApplyWriteError::Conflict(_))
        ));

        let mut stranger = write(3, "third");
        stranger.leader = NodeAddress::new("stranger:1");
        assert!(matches!(
            h.coordinator.apply_replicated_write(stranger).await,
            Err(ApplyWriteError::Rejected(ReplicatedWriteRejected::NotMember))
        ));
    }
}
