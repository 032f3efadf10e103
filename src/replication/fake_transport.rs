//! In-process transport for unit tests. Every peer is just a store; misbehaving peers are
//! configured per address.
use crate::membership::{Epoch, MembershipChange, MembershipSync, NodeAddress};
use crate::replication::{PeerCallError, PeerTransport, ReplicatedWrite};
use crate::store::{Entry, InMemoryStore, KeyValueStore, PutOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Duration;

#[derive(Clone, Debug)]
pub(crate) enum PeerBehavior {
    Healthy,
    Unreachable,
    Slow(Duration),
    StaleEpoch(Epoch),
    /// Fails this many calls as unreachable, then behaves.
    FailTimes(u32),
}

struct FakePeer {
    store: Arc<InMemoryStore>,
    behavior: PeerBehavior,
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    peers: Mutex<HashMap<NodeAddress, FakePeer>>,
    notifications: Mutex<Vec<(NodeAddress, MembershipChange)>>,
    syncs: Mutex<Vec<(NodeAddress, MembershipSync)>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(FakeTransport::default())
    }

    pub(crate) fn add_peer(&self, address: &str) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        self.peers.lock().unwrap().insert(
            NodeAddress::new(address),
            FakePeer {
                store: store.clone(),
                behavior: PeerBehavior::Healthy,
            },
        );
        store
    }

    pub(crate) fn store(&self, address: &str) -> Arc<InMemoryStore> {
        self.peers.lock().unwrap()[&NodeAddress::new(address)].store.clone()
    }

    pub(crate) fn set_behavior(&self, address: &str, behavior: PeerBehavior) {
        if let Some(peer) = self.peers.lock().unwrap().get_mut(&NodeAddress::new(address)) {
            peer.behavior = behavior;
        }
    }

    pub(crate) fn notifications(&self) -> Vec<(NodeAddress, MembershipChange)> {
        self.notifications.lock().unwrap().clone()
    }

    pub(crate) fn syncs(&self) -> Vec<(NodeAddress, MembershipSync)> {
        self.syncs.lock().unwrap().clone()
    }

    // Resolves the peer's behavior for one call. Consumes a FailTimes failure.
    async fn reach(&self, peer: &NodeAddress) -> Result<(Arc<InMemoryStore>, PeerBehavior), PeerCallError> {
        let (store, behavior) = {
            let mut peers = self.peers.lock().unwrap();
            let fake = peers
                .get_mut(peer)
                .ok_or_else(|| PeerCallError::Unreachable(format!("no such peer {}", peer)))?;
            let behavior = fake.behavior.clone();
            if let PeerBehavior::FailTimes(n) = behavior {
                fake.behavior = if n <= 1 {
                    PeerBehavior::Healthy
                } else {
                    PeerBehavior::FailTimes(n - 1)
                };
            }
            (fake.store.clone(), behavior)
        };

        match behavior {
            PeerBehavior::Unreachable | PeerBehavior::FailTimes(_) => {
                Err(PeerCallError::Unreachable(format!("{} is down", peer)))
            }
            PeerBehavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok((store, PeerBehavior::Healthy))
            }
            behavior => Ok((store, behavior)),
        }
    }
}

#[async_trait::async_trait]
impl PeerTransport for FakeTransport {
    async fn send_write(&self, peer: &NodeAddress, write: ReplicatedWrite) -> Result<(), PeerCallError> {
        let (store, behavior) = self.reach(peer).await?;
        if let PeerBehavior::StaleEpoch(epoch) = behavior {
            return Err(PeerCallError::StaleEpoch { leader: None, epoch });
        }

        match store.put(write.key, write.entry).await {
            Ok(PutOutcome::Conflict { current }) => {
                Err(PeerCallError::Rejected(format!("conflict at {:?}", current.version)))
            }
            Ok(_) => Ok(()),
            Err(e) => Err(PeerCallError::Rejected(e.to_string())),
        }
    }

    async fn send_read(&self, peer: &NodeAddress, key: &str) -> Result<Option<Entry>, PeerCallError> {
        let (store, _) = self.reach(peer).await?;
        store.get(key).await.map_err(|e| PeerCallError::Rejected(e.to_string()))
    }

    async fn notify(
        &self,
        peer: &NodeAddress,
        _sender: &NodeAddress,
        change: MembershipChange,
    ) -> Result<(), PeerCallError> {
        self.reach(peer).await?;
        self.notifications.lock().unwrap().push((peer.clone(), change));
        Ok(())
    }

    async fn sync_membership(
        &self,
        peer: &NodeAddress,
        _sender: &NodeAddress,
        sync: MembershipSync,
    ) -> Result<(), PeerCallError> {
        self.reach(peer).await?;
        self.syncs.lock().unwrap().push((peer.clone(), sync));
        Ok(())
    }
}
