use crate::actor::ActorClient;
use crate::membership::{MembershipBroadcast, MembershipChange, MembershipSync, NodeAddress};
use crate::replication::{PeerCallError, PeerTransport};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use rand::Rng;
use std::sync::Arc;
use tokio::time::Duration;

const BACKOFF_BASE: Duration = Duration::from_millis(50);
const BACKOFF_JITTER_MILLIS: u64 = 50;

enum Outgoing {
    Change(MembershipChange),
    Sync(MembershipSync),
}

/// MembershipPropagator delivers membership messages to peers on a best-effort basis. Each message
/// is retried a bounded number of times; nobody waits for delivery.
#[derive(Clone)]
pub(crate) struct MembershipPropagator {
    logger: slog::Logger,
    transport: Arc<dyn PeerTransport>,
    cluster: ActorClient,
    my_address: NodeAddress,
    attempts: u32,
}

impl MembershipPropagator {
    pub(crate) fn new(
        logger: slog::Logger,
        transport: Arc<dyn PeerTransport>,
        cluster: ActorClient,
        my_address: NodeAddress,
        attempts: u32,
    ) -> Self {
        MembershipPropagator {
            logger,
            transport,
            cluster,
            my_address,
            attempts,
        }
    }

    pub(crate) fn propagate(&self, broadcast: MembershipBroadcast) {
        if broadcast.is_empty() {
            return;
        }

        let propagator = self.clone();
        tokio::spawn(async move {
            propagator.deliver(broadcast).await;
        });
    }

    /// Returns the peers that never received their message.
    pub(crate) async fn deliver(&self, broadcast: MembershipBroadcast) -> Vec<NodeAddress> {
        let mut outgoing: Vec<(NodeAddress, Outgoing)> = broadcast
            .notify
            .into_iter()
            .map(|(peer, change)| (peer, Outgoing::Change(change)))
            .collect();
        if let Some((peer, sync)) = broadcast.sync {
            outgoing.push((peer, Outgoing::Sync(sync)));
        }

        let mut deliveries = FuturesUnordered::new();
        for (peer, message) in outgoing {
            deliveries.push(async move {
                let result = self
                    .with_retries(&peer, || match &message {
                        Outgoing::Change(change) => self.transport.notify(&peer, &self.my_address, change.clone()),
                        Outgoing::Sync(sync) => self.transport.sync_membership(&peer, &self.my_address, sync.clone()),
                    })
                    .await;
                (peer, result)
            });
        }

        let mut undelivered = Vec::new();
        while let Some((peer, result)) = deliveries.next().await {
            if let Err(e) = result {
                slog::warn!(self.logger, "Gave up telling {} about membership: {}", peer, e);
                undelivered.push(peer);
            }
        }
        undelivered
    }

    async fn with_retries<F, Fut>(&self, peer: &NodeAddress, mut call: F) -> Result<(), PeerCallError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<(), PeerCallError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = call().await;

            let reachable = match &result {
                Ok(_) => true,
                Err(e) => e.peer_responded(),
            };
            let _ = self.cluster.report_call_outcome(peer.clone(), reachable).await;

            match result {
                Err(e) if !e.peer_responded() && attempt < self.attempts => {
                    slog::debug!(self.logger, "Membership message to {} failed ({}). Retrying.", peer, e);
                    tokio::time::sleep(Self::backoff(attempt)).await;
                }
                result => return result,
            }
        }
    }

    fn backoff(attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0..BACKOFF_JITTER_MILLIS);
        BACKOFF_BASE * 2u32.saturating_pow(attempt - 1) + Duration::from_millis(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{self, ClusterState};
    use crate::membership::{Epoch, Liveness};
    use crate::replication::fake_transport::{FakeTransport, PeerBehavior};

    fn addr(a: &str) -> NodeAddress {
        NodeAddress::new(a)
    }

    fn setup(transport: Arc<FakeTransport>, attempts: u32) -> (MembershipPropagator, ActorClient) {
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let state = ClusterState::new(logger.clone(), addr("me:1"), vec![addr("b:1"), addr("c:1")], 3);
        let (client, actor) = actor::create(10, state);
        tokio::spawn(actor.run_event_loop());

        let propagator = MembershipPropagator::new(logger, transport, client.clone(), addr("me:1"), attempts);
        (propagator, client)
    }

    #[tokio::test]
    async fn delivers_notifications_and_sync() {
        let transport = FakeTransport::new();
        transport.add_peer("b:1");
        transport.add_peer("c:1");
        let (propagator, _) = setup(transport.clone(), 3);

        let mut broadcast = MembershipBroadcast::to_all(vec![addr("b:1")], MembershipChange::PeerAdded(addr("c:1")));
        let sync = MembershipSync {
            members: vec![addr("b:1"), addr("c:1"), addr("me:1")],
            leader: None,
            epoch: Epoch::new(0),
        };
        broadcast.sync = Some((addr("c:1"), sync.clone()));

        let undelivered = propagator.deliver(broadcast).await;

        assert!(undelivered.is_empty());
        assert_eq!(
            transport.notifications(),
            vec![(addr("b:1"), MembershipChange::PeerAdded(addr("c:1")))]
        );
        assert_eq!(transport.syncs(), vec![(addr("c:1"), sync)]);
    }

    #[tokio::test]
    async fn retries_until_peer_comes_back() {
        let transport = FakeTransport::new();
        transport.add_peer("b:1");
        transport.set_behavior("b:1", PeerBehavior::FailTimes(2));
        let (propagator, _) = setup(transport.clone(), 3);

        let undelivered = propagator
            .deliver(MembershipBroadcast::to_all(
                vec![addr("b:1")],
                MembershipChange::PeerRemoved(addr("c:1")),
            ))
            .await;

        assert!(undelivered.is_empty());
        assert_eq!(transport.notifications().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts_and_marks_peer_down() {
        let transport = FakeTransport::new();
        transport.add_peer("b:1");
        transport.set_behavior("b:1", PeerBehavior::Unreachable);
        let (propagator, cluster) = setup(transport.clone(), 3);

        let undelivered = propagator
            .deliver(MembershipBroadcast::to_all(
                vec![addr("b:1")],
                MembershipChange::PeerRemoved(addr("c:1")),
            ))
            .await;

        assert_eq!(undelivered, vec![addr("b:1")]);
        assert!(transport.notifications().is_empty());

        let snapshot = cluster.snapshot().await.unwrap();
        let b = snapshot.registry.members.iter().find(|n| n.address == addr("b:1")).unwrap();
        assert_eq!(b.liveness, Liveness::Unreachable);
    }
}
