use crate::membership::{
    Epoch, LeaderObservation, MembershipBroadcast, MembershipChange, MembershipSync, NodeAddress, PeerRegistry,
    Promotion, PromotionRejected, RegistrySnapshot, RoleManager, RoleState,
};
use crate::store::Version;

/// ClusterState is everything a node knows about the cluster: who is in it, who leads, and the
/// leader's version counter. It is owned by the cluster actor, so none of this needs locking.
pub(crate) struct ClusterState {
    logger: slog::Logger,
    registry: PeerRegistry,
    role: RoleManager,
    last_sequence: u64,
    unreachable_after_failures: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct ClusterSnapshot {
    pub(crate) role: RoleState,
    pub(crate) epoch: Epoch,
    pub(crate) registry: RegistrySnapshot,
}

/// Permission to run one write as leader.
#[derive(Debug)]
pub(crate) struct WriteTicket {
    pub(crate) version: Version,
    pub(crate) registry: RegistrySnapshot,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Local node is not leader (leader hint: {leader_hint:?})")]
pub(crate) struct NotLeader {
    pub(crate) leader_hint: Option<NodeAddress>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct MembershipOutcome {
    pub(crate) changed: bool,
    pub(crate) broadcast: MembershipBroadcast,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum AddPeerRejected {
    #[error("{0} is already a member")]
    AlreadyExists(NodeAddress),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum RemovePeerRejected {
    #[error("{0} is not a member")]
    NotFound(NodeAddress),
    #[error("Local node can't remove itself")]
    LocalNode,
}

#[derive(Debug, PartialEq)]
pub(crate) struct RoleChange {
    pub(crate) epoch: Epoch,
    pub(crate) changed: bool,
    pub(crate) broadcast: MembershipBroadcast,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum ReplicatedWriteRejected {
    #[error("Sender is not a member")]
    NotMember,
    #[error("Sender's epoch is stale. Current epoch {epoch:?}, leader {leader:?}")]
    StaleEpoch {
        leader: Option<NodeAddress>,
        epoch: Epoch,
    },
}

impl ClusterState {
    pub(crate) fn new(
        logger: slog::Logger,
        my_address: NodeAddress,
        initial_peers: Vec<NodeAddress>,
        unreachable_after_failures: u32,
    ) -> Self {
        let mut registry = PeerRegistry::new(my_address);
        let mut role = RoleManager::new(logger.clone());

        if !initial_peers.is_empty() {
            for peer in initial_peers {
                registry.add_peer(peer);
            }
            role.registry_synced();
        }

        ClusterState {
            logger,
            registry,
            role,
            last_sequence: 0,
            unreachable_after_failures,
        }
    }

    pub(crate) fn snapshot(&self) -> ClusterSnapshot {
        ClusterSnapshot {
            role: self.role.state(),
            epoch: self.role.epoch(),
            registry: self.registry.snapshot(),
        }
    }

    pub(crate) fn begin_write(&mut self) -> Result<WriteTicket, NotLeader> {
        if !self.role.is_leader() {
            return Err(NotLeader {
                leader_hint: self.registry.current_leader().cloned(),
            });
        }

        self.last_sequence += 1;
        Ok(WriteTicket {
            version: Version::new(self.role.epoch(), self.last_sequence),
            registry: self.registry.snapshot(),
        })
    }

    pub(crate) fn add_peer(&mut self, address: NodeAddress, strict: bool) -> Result<MembershipOutcome, AddPeerRejected> {
        let me = self.registry.my_address().clone();

        if !self.registry.add_peer(address.clone()) {
            if strict {
                return Err(AddPeerRejected::AlreadyExists(address));
            }
            // Re-sync in case the first sync never arrived. Registry stays as it was.
            let broadcast = if address != me {
                MembershipBroadcast {
                    notify: Vec::new(),
                    sync: Some((address.clone(), self.membership_sync())),
                }
            } else {
                MembershipBroadcast::none()
            };
            return Ok(MembershipOutcome {
                changed: false,
                broadcast,
            });
        }

        slog::info!(self.logger, "Added peer {}", address);
        // Growing the cluster from here means we have a view worth acting on.
        self.role.registry_synced();

        let existing = self
            .registry
            .snapshot()
            .other_members()
            .into_iter()
            .filter(|member| member != &address)
            .collect();
        let mut broadcast = MembershipBroadcast::to_all(existing, MembershipChange::PeerAdded(address.clone()));
        broadcast.sync = Some((address, self.membership_sync()));

        Ok(MembershipOutcome {
            changed: true,
            broadcast,
        })
    }

    pub(crate) fn remove_peer(
        &mut self,
        address: NodeAddress,
        strict: bool,
    ) -> Result<MembershipOutcome, RemovePeerRejected> {
        if &address == self.registry.my_address() {
            return Err(RemovePeerRejected::LocalNode);
        }

        let removed = match self.registry.remove_peer(&address) {
            Some(removed) => removed,
            None if strict => return Err(RemovePeerRejected::NotFound(address)),
            None => {
                return Ok(MembershipOutcome {
                    changed: false,
                    broadcast: MembershipBroadcast::none(),
                })
            }
        };

        slog::info!(self.logger, "Removed peer {}", address);
        if removed.is_leader() {
            self.role.leader_removed(&address);
        }

        let remaining = self.registry.snapshot().other_members();
        Ok(MembershipOutcome {
            changed: true,
            broadcast: MembershipBroadcast::to_all(remaining, MembershipChange::PeerRemoved(address)),
        })
    }

    /// `highest_stored_epoch` is the epoch of the newest version in the local store. The new
    /// epoch must outrank it, or versions could go backwards.
    pub(crate) fn promote(&mut self, highest_stored_epoch: Option<Epoch>) -> Result<RoleChange, PromotionRejected> {
        if let Some(stored) = highest_stored_epoch {
            if self.role.state() != RoleState::Unassigned {
                self.role.catch_up_epoch(&mut self.registry, stored);
            }
        }

        let Promotion { epoch, changed } = self.role.promote_self(&mut self.registry)?;
        if !changed {
            return Ok(RoleChange {
                epoch,
                changed,
                broadcast: MembershipBroadcast::none(),
            });
        }

        self.last_sequence = 0;
        let me = self.registry.my_address().clone();
        let others = self.registry.snapshot().other_members();
        Ok(RoleChange {
            epoch,
            changed,
            broadcast: MembershipBroadcast::to_all(others, MembershipChange::LeaderElected { leader: me, epoch }),
        })
    }

    pub(crate) fn demote(&mut self) -> RoleChange {
        let epoch = self.role.epoch();
        if !self.role.demote_self(&mut self.registry) {
            return RoleChange {
                epoch,
                changed: false,
                broadcast: MembershipBroadcast::none(),
            };
        }

        let me = self.registry.my_address().clone();
        let others = self.registry.snapshot().other_members();
        RoleChange {
            epoch,
            changed: true,
            broadcast: MembershipBroadcast::to_all(others, MembershipChange::LeaderVacated { leader: me, epoch }),
        }
    }

    /// Decides whether a write replicated by `leader` at `epoch` may be applied locally.
    pub(crate) fn check_replicated_write(
        &mut self,
        leader: &NodeAddress,
        epoch: Epoch,
    ) -> Result<(), ReplicatedWriteRejected> {
        if !self.registry.contains(leader) || leader == self.registry.my_address() {
            return Err(ReplicatedWriteRejected::NotMember);
        }

        match self.role.observe_leader(&mut self.registry, leader, epoch) {
            LeaderObservation::AlreadyKnown | LeaderObservation::Adopted { .. } => Ok(()),
            LeaderObservation::Stale => Err(ReplicatedWriteRejected::StaleEpoch {
                leader: self.registry.current_leader().cloned(),
                epoch: self.role.epoch(),
            }),
        }
    }

    pub(crate) fn apply_membership_change(&mut self, sender: &NodeAddress, change: MembershipChange) {
        slog::debug!(self.logger, "Membership change from {}: {:?}", sender, change);

        match change {
            MembershipChange::PeerAdded(address) => {
                if self.registry.add_peer(address.clone()) {
                    slog::info!(self.logger, "Added peer {} (told by {})", address, sender);
                }
            }
            MembershipChange::PeerRemoved(address) => {
                if &address == self.registry.my_address() {
                    slog::warn!(self.logger, "{} removed us from its membership", sender);
                    return;
                }
                if let Some(removed) = self.registry.remove_peer(&address) {
                    slog::info!(self.logger, "Removed peer {} (told by {})", address, sender);
                    if removed.is_leader() {
                        self.role.leader_removed(&address);
                    }
                }
            }
            MembershipChange::LeaderElected { leader, epoch } => {
                if let LeaderObservation::Stale = self.role.observe_leader(&mut self.registry, &leader, epoch) {
                    slog::warn!(self.logger, "Ignoring stale leader announcement {} at {:?}", leader, epoch);
                }
            }
            MembershipChange::LeaderVacated { leader, epoch } => {
                self.role.observe_vacancy(&mut self.registry, &leader, epoch);
            }
        }
    }

    pub(crate) fn sync_membership(&mut self, sender: &NodeAddress, sync: MembershipSync) {
        slog::info!(self.logger, "Membership sync from {}: {:?}", sender, sync);

        self.registry.replace_members(sync.members);
        self.role.registry_synced();
        if self.role.is_leader() {
            let me = self.registry.my_address().clone();
            self.registry.mark_leader(&me);
        }

        match sync.leader {
            Some(leader) => {
                self.role.observe_leader(&mut self.registry, &leader, sync.epoch);
            }
            None => {
                self.role.catch_up_epoch(&mut self.registry, sync.epoch);
            }
        }
    }

    /// A peer told us about a leader epoch newer than ours.
    pub(crate) fn observe_leader(&mut self, leader: Option<NodeAddress>, epoch: Epoch) {
        match leader {
            Some(leader) => {
                self.role.observe_leader(&mut self.registry, &leader, epoch);
            }
            None => {
                self.role.catch_up_epoch(&mut self.registry, epoch);
            }
        }
    }

    pub(crate) fn report_call_outcome(&mut self, peer: &NodeAddress, reachable: bool) {
        if let Some(liveness) = self
            .registry
            .record_call_outcome(peer, reachable, self.unreachable_after_failures)
        {
            slog::info!(self.logger, "Peer {} is now {:?}", peer, liveness);
        }
    }

    fn membership_sync(&self) -> MembershipSync {
        let snapshot = self.registry.snapshot();
        MembershipSync {
            members: snapshot.members.into_iter().map(|node| node.address).collect(),
            leader: snapshot.leader,
            epoch: self.role.epoch(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::Liveness;

    fn logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    fn addr(a: &str) -> NodeAddress {
        NodeAddress::new(a)
    }

    fn cluster(me: &str, others: &[&str]) -> ClusterState {
        ClusterState::new(logger(), addr(me), others.iter().map(|a| addr(a)).collect(), 3)
    }

    fn leader(me: &str, others: &[&str]) -> ClusterState {
        let mut state = cluster(me, others);
        state.promote(None).unwrap();
        state
    }

    #[test]
    fn initial_peers_count_as_first_sync() {
        assert_eq!(cluster("me:1", &["b:1"]).snapshot().role, RoleState::Follower);
        assert_eq!(cluster("me:1", &[]).snapshot().role, RoleState::Unassigned);
        // Listing ourself among the initial peers doesn't duplicate us.
        assert_eq!(cluster("me:1", &["me:1", "b:1"]).snapshot().registry.cluster_size(), 2);
    }

    #[test]
    fn follower_redirects_writes_to_known_leader() {
        let mut state = cluster("me:1", &["b:1"]);
        assert_eq!(state.begin_write().unwrap_err(), NotLeader { leader_hint: None });

        state.observe_leader(Some(addr("b:1")), Epoch::new(1));
        assert_eq!(
            state.begin_write().unwrap_err(),
            NotLeader {
                leader_hint: Some(addr("b:1"))
            }
        );
    }

    #[test]
    fn leader_versions_strictly_increase() {
        let mut state = leader("me:1", &["b:1"]);

        let first = state.begin_write().unwrap().version;
        let second = state.begin_write().unwrap().version;

        assert!(second > first);
        assert_eq!(first, Version::new(Epoch::new(1), 1));
    }

    #[test]
    fn versions_after_re_promotion_outrank_earlier_ones() {
        let mut state = leader("me:1", &["b:1"]);
        let before = state.begin_write().unwrap().version;
        state.demote();
        state.promote(Some(before.epoch())).unwrap();

        assert!(state.begin_write().unwrap().version > before);
    }

    #[test]
    fn promotion_outranks_stored_epoch() {
        let mut state = cluster("me:1", &["b:1"]);

        let change = state.promote(Some(Epoch::new(7))).unwrap();

        assert_eq!(change.epoch, Epoch::new(8));
    }

    #[test]
    fn promotion_announces_to_every_other_member() {
        let mut state = cluster("me:1", &["b:1", "c:1"]);

        let change = state.promote(None).unwrap();

        assert!(change.changed);
        let targets: Vec<_> = change.broadcast.notify.iter().map(|(to, _)| to.clone()).collect();
        assert_eq!(targets, vec![addr("b:1"), addr("c:1")]);
        assert_eq!(
            change.broadcast.notify[0].1,
            MembershipChange::LeaderElected {
                leader: addr("me:1"),
                epoch: Epoch::new(1)
            }
        );

        let again = state.promote(None).unwrap();
        assert!(!again.changed);
        assert!(again.broadcast.is_empty());
    }

    #[test]
    fn unassigned_node_cannot_promote() {
        let mut state = cluster("me:1", &[]);
        assert_eq!(state.promote(None).unwrap_err(), PromotionRejected::Unassigned);
    }

    #[test]
    fn add_peer_notifies_existing_members_and_syncs_the_new_one() {
        let mut state = leader("me:1", &["b:1"]);

        let outcome = state.add_peer(addr("c:1"), false).unwrap();

        assert!(outcome.changed);
        assert_eq!(
            outcome.broadcast.notify,
            vec![(addr("b:1"), MembershipChange::PeerAdded(addr("c:1")))]
        );
        let (target, sync) = outcome.broadcast.sync.unwrap();
        assert_eq!(target, addr("c:1"));
        assert_eq!(sync.members, vec![addr("b:1"), addr("c:1"), addr("me:1")]);
        assert_eq!(sync.leader, Some(addr("me:1")));
        assert_eq!(sync.epoch, Epoch::new(1));
    }

    #[test]
    fn add_existing_peer() {
        let mut state = cluster("me:1", &["b:1"]);

        let outcome = state.add_peer(addr("b:1"), false).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.broadcast.notify.is_empty());

        assert_eq!(
            state.add_peer(addr("b:1"), true).unwrap_err(),
            AddPeerRejected::AlreadyExists(addr("b:1"))
        );
        assert_eq!(state.snapshot().registry.cluster_size(), 2);
    }

    #[test]
    fn add_peer_on_unassigned_node_joins_it() {
        let mut state = cluster("me:1", &[]);

        state.add_peer(addr("b:1"), false).unwrap();

        assert_eq!(state.snapshot().role, RoleState::Follower);
    }

    #[test]
    fn remove_peer() {
        let mut state = cluster("me:1", &["b:1", "c:1"]);

        let outcome = state.remove_peer(addr("b:1"), true).unwrap();
        assert!(outcome.changed);
        assert_eq!(
            outcome.broadcast.notify,
            vec![(addr("c:1"), MembershipChange::PeerRemoved(addr("b:1")))]
        );

        let again = state.remove_peer(addr("b:1"), false).unwrap();
        assert!(!again.changed);
        assert_eq!(
            state.remove_peer(addr("b:1"), true).unwrap_err(),
            RemovePeerRejected::NotFound(addr("b:1"))
        );
        assert_eq!(
            state.remove_peer(addr("me:1"), false).unwrap_err(),
            RemovePeerRejected::LocalNode
        );
    }

    #[test]
    fn removing_the_leader_vacates_its_epoch() {
        let mut state = cluster("me:1", &["b:1", "c:1"]);
        state.observe_leader(Some(addr("b:1")), Epoch::new(2));

        state.remove_peer(addr("b:1"), false).unwrap();
        assert_eq!(state.snapshot().registry.leader, None);

        // A late write from the removed leader is refused.
        assert_eq!(
            state.check_replicated_write(&addr("b:1"), Epoch::new(2)),
            Err(ReplicatedWriteRejected::NotMember)
        );
    }

    #[test]
    fn replicated_writes_are_fenced_by_epoch() {
        let mut state = cluster("me:1", &["b:1", "c:1"]);
        assert_eq!(state.check_replicated_write(&addr("b:1"), Epoch::new(2)), Ok(()));
        assert_eq!(state.snapshot().registry.leader, Some(addr("b:1")));

        assert_eq!(
            state.check_replicated_write(&addr("c:1"), Epoch::new(1)),
            Err(ReplicatedWriteRejected::StaleEpoch {
                leader: Some(addr("b:1")),
                epoch: Epoch::new(2)
            })
        );
        assert_eq!(
            state.check_replicated_write(&addr("stranger:1"), Epoch::new(9)),
            Err(ReplicatedWriteRejected::NotMember)
        );
    }

    #[test]
    fn leader_steps_down_on_newer_leaders_write() {
        let mut state = leader("me:1", &["b:1"]);

        assert_eq!(state.check_replicated_write(&addr("b:1"), Epoch::new(2)), Ok(()));

        assert_eq!(state.snapshot().role, RoleState::Follower);
        assert!(state.begin_write().is_err());
    }

    #[test]
    fn membership_changes_from_peers() {
        let mut state = cluster("me:1", &["b:1"]);

        state.apply_membership_change(&addr("b:1"), MembershipChange::PeerAdded(addr("c:1")));
        state.apply_membership_change(&addr("b:1"), MembershipChange::PeerAdded(addr("c:1")));
        assert_eq!(state.snapshot().registry.cluster_size(), 3);

        state.apply_membership_change(
            &addr("b:1"),
            MembershipChange::LeaderElected {
                leader: addr("b:1"),
                epoch: Epoch::new(1),
            },
        );
        assert_eq!(state.snapshot().registry.leader, Some(addr("b:1")));

        state.apply_membership_change(
            &addr("b:1"),
            MembershipChange::LeaderVacated {
                leader: addr("b:1"),
                epoch: Epoch::new(1),
            },
        );
        assert_eq!(state.snapshot().registry.leader, None);

        state.apply_membership_change(&addr("b:1"), MembershipChange::PeerRemoved(addr("me:1")));
        state.apply_membership_change(&addr("b:1"), MembershipChange::PeerRemoved(addr("c:1")));
        assert_eq!(state.snapshot().registry.other_members(), vec![addr("b:1")]);
    }

    #[test]
    fn sync_replaces_membership_and_adopts_leader() {
        let mut state = cluster("me:1", &[]);

        state.sync_membership(
            &addr("b:1"),
            MembershipSync {
                members: vec![addr("b:1"), addr("c:1"), addr("me:1")],
                leader: Some(addr("b:1")),
                epoch: Epoch::new(3),
            },
        );

        let snapshot = state.snapshot();
        assert_eq!(snapshot.role, RoleState::Follower);
        assert_eq!(snapshot.epoch, Epoch::new(3));
        assert_eq!(snapshot.registry.leader, Some(addr("b:1")));
        assert_eq!(snapshot.registry.other_members(), vec![addr("b:1"), addr("c:1")]);
    }

    #[test]
    fn liveness_follows_call_outcomes() {
        let mut state = cluster("me:1", &["b:1"]);
        let liveness = |state: &ClusterState| {
            state
                .snapshot()
                .registry
                .members
                .into_iter()
                .find(|n| n.address == addr("b:1"))
                .map(|n| n.liveness)
        };

        for _ in 0..3 {
            state.report_call_outcome(&addr("b:1"), false);
        }
        assert_eq!(liveness(&state), Some(Liveness::Unreachable));

        state.report_call_outcome(&addr("b:1"), true);
        assert_eq!(liveness(&state), Some(Liveness::Alive));
    }
}
