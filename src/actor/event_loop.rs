use crate::actor::cluster_state::{
    AddPeerRejected, ClusterSnapshot, ClusterState, MembershipOutcome, NotLeader, RemovePeerRejected,
    ReplicatedWriteRejected, RoleChange, WriteTicket,
};
use crate::membership::{Epoch, MembershipChange, MembershipSync, NodeAddress, PromotionRejected};
use std::error::Error;
use std::fmt::Debug;
use tokio::sync::{mpsc, oneshot};

pub(crate) fn create(buffer_size: usize, cluster_state: ClusterState) -> (ActorClient, ClusterActor) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let client = ActorClient { sender: tx };
    let actor = ClusterActor {
        receiver: rx,
        cluster_state,
    };

    (client, actor)
}

// Cluster state (registry, role, version counter) is only ever touched from the actor task.
// Store I/O and peer calls happen outside of it.
#[derive(Debug)]
enum Event {
    // Leader: assign the next version and snapshot the registry.
    // Follower/Unassigned: redirect.
    BeginWrite(Callback<WriteTicket, NotLeader>),
    Snapshot(oneshot::Sender<ClusterSnapshot>),
    AddPeer {
        address: NodeAddress,
        strict: bool,
        callback: Callback<MembershipOutcome, AddPeerRejected>,
    },
    RemovePeer {
        address: NodeAddress,
        strict: bool,
        callback: Callback<MembershipOutcome, RemovePeerRejected>,
    },
    Promote {
        highest_stored_epoch: Option<Epoch>,
        callback: Callback<RoleChange, PromotionRejected>,
    },
    Demote(oneshot::Sender<RoleChange>),

    // From peers.
    CheckReplicatedWrite {
        leader: NodeAddress,
        epoch: Epoch,
        callback: Callback<(), ReplicatedWriteRejected>,
    },
    ApplyMembershipChange {
        sender: NodeAddress,
        change: MembershipChange,
    },
    SyncMembership {
        sender: NodeAddress,
        sync: MembershipSync,
    },

    // From our own outgoing peer calls.
    ObserveLeader {
        leader: Option<NodeAddress>,
        epoch: Epoch,
    },
    ReportCallOutcome {
        peer: NodeAddress,
        reachable: bool,
    },
}

#[derive(Debug)]
struct Callback<O: Debug, E: Error>(oneshot::Sender<Result<O, E>>);

impl<O: Debug, E: Error> Callback<O, E> {
    pub fn send(self, message: Result<O, E>) {
        let _ = self.0.send(message);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Cluster state actor has exited")]
pub(crate) struct ActorExited;

#[derive(Clone)]
pub(crate) struct ActorClient {
    sender: mpsc::Sender<Event>,
}

impl ActorClient {
    pub(crate) async fn begin_write(&self) -> Result<Result<WriteTicket, NotLeader>, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::BeginWrite(Callback(tx))).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub(crate) async fn snapshot(&self) -> Result<ClusterSnapshot, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::Snapshot(tx)).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub(crate) async fn add_peer(
        &self,
        address: NodeAddress,
        strict: bool,
    ) -> Result<Result<MembershipOutcome, AddPeerRejected>, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::AddPeer {
            address,
            strict,
            callback: Callback(tx),
        })
        .await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub(crate) async fn remove_peer(
        &self,
        address: NodeAddress,
        strict: bool,
    ) -> Result<Result<MembershipOutcome, RemovePeerRejected>, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::RemovePeer {
            address,
            strict,
            callback: Callback(tx),
        })
        .await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub(crate) async fn promote(
        &self,
        highest_stored_epoch: Option<Epoch>,
    ) -> Result<Result<RoleChange, PromotionRejected>, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::Promote {
            highest_stored_epoch,
            callback: Callback(tx),
        })
        .await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub(crate) async fn demote(&self) -> Result<RoleChange, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::Demote(tx)).await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub(crate) async fn check_replicated_write(
        &self,
        leader: NodeAddress,
        epoch: Epoch,
    ) -> Result<Result<(), ReplicatedWriteRejected>, ActorExited> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::CheckReplicatedWrite {
            leader,
            epoch,
            callback: Callback(tx),
        })
        .await?;
        rx.await.map_err(|_| ActorExited)
    }

    pub(crate) async fn apply_membership_change(
        &self,
        sender: NodeAddress,
        change: MembershipChange,
    ) -> Result<(), ActorExited> {
        self.send(Event::ApplyMembershipChange { sender, change }).await
    }

    pub(crate) async fn sync_membership(&self, sender: NodeAddress, sync: MembershipSync) -> Result<(), ActorExited> {
        self.send(Event::SyncMembership { sender, sync }).await
    }

    pub(crate) async fn observe_leader(&self, leader: Option<NodeAddress>, epoch: Epoch) -> Result<(), ActorExited> {
        self.send(Event::ObserveLeader { leader, epoch }).await
    }

    pub(crate) async fn report_call_outcome(&self, peer: NodeAddress, reachable: bool) -> Result<(), ActorExited> {
        self.send(Event::ReportCallOutcome { peer, reachable }).await
    }

    async fn send(&self, event: Event) -> Result<(), ActorExited> {
        self.sender.send(event).await.map_err(|_| ActorExited)
    }
}

/// ClusterActor is the cluster state in actor model.
pub(crate) struct ClusterActor {
    receiver: mpsc::Receiver<Event>,
    cluster_state: ClusterState,
}

impl ClusterActor {
    pub(crate) async fn run_event_loop(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event);
        }
    }

    // This must NOT be async.
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::BeginWrite(callback) => {
                callback.send(self.cluster_state.begin_write());
            }
            Event::Snapshot(tx) => {
                let _ = tx.send(self.cluster_state.snapshot());
            }
            Event::AddPeer {
                address,
                strict,
                callback,
            } => {
                callback.send(self.cluster_state.add_peer(address, strict));
            }
            Event::RemovePeer {
                address,
                strict,
                callback,
            } => {
                callback.send(self.cluster_state.remove_peer(address, strict));
            }
            Event::Promote {
                highest_stored_epoch,
                callback,
            } => {
                callback.send(self.cluster_state.promote(highest_stored_epoch));
            }
            Event::Demote(tx) => {
                let _ = tx.send(self.cluster_state.demote());
            }
            Event::CheckReplicatedWrite {
                leader,
                epoch,
                callback,
            } => {
                callback.send(self.cluster_state.check_replicated_write(&leader, epoch));
            }
            Event::ApplyMembershipChange { sender, change } => {
                self.cluster_state.apply_membership_change(&sender, change);
            }
            Event::SyncMembership { sender, sync } => {
                self.cluster_state.sync_membership(&sender, sync);
            }
            Event::ObserveLeader { leader, epoch } => {
                self.cluster_state.observe_leader(leader, epoch);
            }
            Event::ReportCallOutcome { peer, reachable } => {
                self.cluster_state.report_call_outcome(&peer, reachable);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::RoleState;

    fn spawn_actor(me: &str, others: &[&str]) -> ActorClient {
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let state = ClusterState::new(
            logger,
            NodeAddress::new(me),
            others.iter().map(|a| NodeAddress::new(*a)).collect(),
            3,
        );
        let (client, actor) = create(10, state);
        tokio::spawn(actor.run_event_loop());
        client
    }

    #[tokio::test]
    async fn events_are_applied_in_order() {
        let client = spawn_actor("me:1", &["b:1"]);

        client.promote(None).await.unwrap().unwrap();
        client
            .apply_membership_change(NodeAddress::new("b:1"), MembershipChange::PeerAdded(NodeAddress::new("c:1")))
            .await
            .unwrap();

        let snapshot = client.snapshot().await.unwrap();
        assert_eq!(snapshot.role, RoleState::Leader);
        assert_eq!(snapshot.registry.cluster_size(), 3);

        let ticket = client.begin_write().await.unwrap().unwrap();
        assert_eq!(ticket.registry.cluster_size(), 3);
    }

    #[tokio::test]
    async fn client_reports_exited_actor() {
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let state = ClusterState::new(logger, NodeAddress::new("me:1"), vec![], 3);
        let (client, actor) = create(10, state);
        drop(actor);

        assert!(client.snapshot().await.is_err());
        assert!(client.demote().await.is_err());
    }
}
