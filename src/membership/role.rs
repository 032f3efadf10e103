use crate::membership::{NodeAddress, PeerRegistry};
use std::fmt;

/// Epoch distinguishes successive leader promotions. Whenever two nodes disagree about who leads,
/// the higher epoch wins.
#[derive(Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Default)]
pub(crate) struct Epoch(u64);

impl Epoch {
    pub(crate) fn new(epoch: u64) -> Self {
        Epoch(epoch)
    }

    pub(crate) fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(&self) -> Epoch {
        Epoch(self.0 + 1)
    }
}

impl fmt::Debug for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum RoleState {
    /// We have not yet received any membership view.
    Unassigned,
    Follower,
    Leader,
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) struct Promotion {
    pub(crate) epoch: Epoch,
    pub(crate) changed: bool,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub(crate) enum PromotionRejected {
    #[error("Local node has not joined a cluster yet")]
    Unassigned,
    #[error("{0} is already leader")]
    OtherLeaderPresent(NodeAddress),
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum LeaderObservation {
    Adopted { stepped_down: bool },
    AlreadyKnown,
    Stale,
}

/// RoleManager tracks whether the local node leads, and the highest leader epoch it has seen.
///
/// Leadership is not elected. Promotion is an administrative action, and the only cross-node
/// protection against two leaders is the epoch tie-break applied in `observe_leader()`: the higher
/// epoch wins, and on equal epochs the greater address wins. That tie-break is deterministic but is
/// not mutual exclusion; two promotions issued concurrently on different nodes can both succeed
/// locally until their announcements (or replicated writes) meet.
pub(crate) struct RoleManager {
    logger: slog::Logger,
    state: RoleState,
    epoch: Epoch,
    // Set when the leader of `epoch` stepped down or was removed, so a late announcement for the
    // same epoch can't resurrect it.
    vacated_epoch: Option<Epoch>,
}

impl RoleManager {
    pub(crate) fn new(logger: slog::Logger) -> Self {
        RoleManager {
            logger,
            state: RoleState::Unassigned,
            epoch: Epoch::default(),
            vacated_epoch: None,
        }
    }

    pub(crate) fn state(&self) -> RoleState {
        self.state
    }

    pub(crate) fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub(crate) fn is_leader(&self) -> bool {
        self.state == RoleState::Leader
    }

    /// First registry sync moves us out of Unassigned. Later syncs don't change the role.
    pub(crate) fn registry_synced(&mut self) {
        if self.state == RoleState::Unassigned {
            self.state = RoleState::Follower;
            slog::info!(self.logger, "Joined cluster as follower.");
        }
    }

    pub(crate) fn promote_self(&mut self, registry: &mut PeerRegistry) -> Result<Promotion, PromotionRejected> {
        match self.state {
            RoleState::Unassigned => Err(PromotionRejected::Unassigned),
            RoleState::Leader => Ok(Promotion {
                epoch: self.epoch,
                changed: false,
            }),
            RoleState::Follower => {
                if let Some(leader) = registry.current_leader() {
                    if leader != registry.my_address() {
                        return Err(PromotionRejected::OtherLeaderPresent(leader.clone()));
                    }
                }

                self.epoch = self.epoch.next();
                self.state = RoleState::Leader;
                let me = registry.my_address().clone();
                registry.mark_leader(&me);
                slog::info!(self.logger, "Promoted self to leader. Epoch: {:?}", self.epoch);

                Ok(Promotion {
                    epoch: self.epoch,
                    changed: true,
                })
            }
        }
    }

    /// Returns true if we were leader.
    pub(crate) fn demote_self(&mut self, registry: &mut PeerRegistry) -> bool {
        if self.state != RoleState::Leader {
            return false;
        }

        self.state = RoleState::Follower;
        self.vacated_epoch = Some(self.epoch);
        registry.clear_leader();
        slog::info!(self.logger, "Demoted self to follower. Epoch: {:?}", self.epoch);
        true
    }

    /// Applies another node's claim to leadership at `epoch`, e.g. from a leader announcement or a
    /// replicated write.
    pub(crate) fn observe_leader(
        &mut self,
        registry: &mut PeerRegistry,
        leader: &NodeAddress,
        epoch: Epoch,
    ) -> LeaderObservation {
        if leader == registry.my_address() {
            // Echo of our own promotion. Nothing else can claim our address.
            return if self.is_leader() && epoch == self.epoch {
                LeaderObservation::AlreadyKnown
            } else {
                LeaderObservation::Stale
            };
        }

        if epoch < self.epoch {
            return LeaderObservation::Stale;
        }

        if epoch == self.epoch {
            if self.vacated_epoch == Some(epoch) {
                return LeaderObservation::Stale;
            }
            match registry.current_leader() {
                Some(current) if current == leader => return LeaderObservation::AlreadyKnown,
                Some(current) if current > leader => return LeaderObservation::Stale,
                _ => {}
            }
        }

        self.epoch = epoch;
        let stepped_down = self.is_leader();
        if stepped_down {
            self.state = RoleState::Follower;
            slog::warn!(
                self.logger,
                "Observed leader {} at epoch {:?}. Stepping down.",
                leader,
                epoch
            );
        }

        if !registry.mark_leader(leader) {
            // Someone we haven't been told about yet leads. Our previous leader is outdated either way.
            slog::warn!(self.logger, "Leader {} for epoch {:?} is not a known member.", leader, epoch);
            registry.clear_leader();
        } else {
            slog::info!(self.logger, "Following leader {} at epoch {:?}.", leader, epoch);
        }

        LeaderObservation::Adopted { stepped_down }
    }

    /// Applies another node's announcement that `leader` stepped down from `epoch`. Returns true
    /// if it changed our view.
    pub(crate) fn observe_vacancy(&mut self, registry: &mut PeerRegistry, leader: &NodeAddress, epoch: Epoch) -> bool {
        if epoch < self.epoch {
            return false;
        }

        if epoch == self.epoch && registry.current_leader() != Some(leader) {
            return false;
        }

        if epoch > self.epoch && self.is_leader() {
            // A newer leader came and went without us noticing.
            self.state = RoleState::Follower;
        }

        self.epoch = epoch;
        self.vacated_epoch = Some(epoch);
        registry.clear_leader();
        slog::info!(self.logger, "Leader {} vacated epoch {:?}.", leader, epoch);
        true
    }

    /// Adopts a higher epoch learned without a leader attached (e.g. a vacant cluster view).
    /// Returns true if we stepped down because of it.
    pub(crate) fn catch_up_epoch(&mut self, registry: &mut PeerRegistry, epoch: Epoch) -> bool {
        if epoch <= self.epoch {
            return false;
        }

        self.epoch = epoch;
        self.vacated_epoch = Some(epoch);
        // Any leader we still have marked belongs to an older epoch.
        let previous_leader = registry.clear_leader();
        if self.is_leader() {
            self.state = RoleState::Follower;
            slog::warn!(self.logger, "Observed newer epoch {:?}. Stepping down.", epoch);
            return true;
        }
        if let Some(previous_leader) = previous_leader {
            slog::info!(
                self.logger,
                "Observed newer epoch {:?}. Leader {} is no longer current.",
                epoch,
                previous_leader
            );
        }
        false
    }

    /// Called after the leader was removed from the registry.
    pub(crate) fn leader_removed(&mut self, leader: &NodeAddress) {
        self.vacated_epoch = Some(self.epoch);
        slog::info!(
            self.logger,
            "Leader {} removed from membership. Leader is vacant for epoch {:?}.",
            leader,
            self.epoch
        );
    }
}
