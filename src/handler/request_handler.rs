use crate::actor::{ActorClient, ActorExited};
use crate::api::{
    AddPeerError, DemoteError, KvValue, KvVersion, MembershipChangeOutput, NodeStatus, PromoteError, ReadConcern,
    ReadError, RemovePeerError, RoleChangeOutput, StatusError, WriteError,
};
use crate::membership::{MembershipChange, MembershipPropagator, MembershipSync, NodeAddress};
use crate::replication::{ApplyWriteError, ReplicatedWrite, ReplicationCoordinator};
use crate::store::Entry;
use std::io;

/// RequestHandler is the set of operations a node exposes, both to clients and to other nodes.
/// It validates and defaults its inputs, then hands off to the coordinator or the cluster actor.
pub(crate) struct RequestHandler {
    logger: slog::Logger,
    my_address: NodeAddress,
    coordinator: ReplicationCoordinator,
    cluster: ActorClient,
    propagator: MembershipPropagator,
    default_read_concern: ReadConcern,
    default_write_concern: u32,
}

impl RequestHandler {
    pub(crate) fn new(
        logger: slog::Logger,
        my_address: NodeAddress,
        coordinator: ReplicationCoordinator,
        cluster: ActorClient,
        propagator: MembershipPropagator,
        default_read_concern: ReadConcern,
        default_write_concern: u32,
    ) -> Self {
        RequestHandler {
            logger,
            my_address,
            coordinator,
            cluster,
            propagator,
            default_read_concern,
            default_write_concern,
        }
    }

    pub(crate) fn my_address(&self) -> &NodeAddress {
        &self.my_address
    }

    // ------- Client facing --------

    pub(crate) async fn read(&self, key: &str, concern: Option<ReadConcern>) -> Result<KvValue, ReadError> {
        if key.is_empty() {
            return Err(ReadError::InvalidKey);
        }
        let concern = concern.unwrap_or(self.default_read_concern);

        self.coordinator
            .read(key, concern.into())
            .await
            .map(KvValue::from)
            .map_err(ReadError::from)
    }

    pub(crate) async fn write(
        &self,
        key: String,
        value: String,
        write_concern: Option<u32>,
    ) -> Result<KvVersion, WriteError> {
        if value.is_empty() {
            return Err(WriteError::InvalidValue);
        }
        self.replicate(key, Some(value), write_concern).await
    }

    pub(crate) async fn delete(&self, key: String, write_concern: Option<u32>) -> Result<KvVersion, WriteError> {
        self.replicate(key, None, write_concern).await
    }

    async fn replicate(
        &self,
        key: String,
        value: Option<String>,
        write_concern: Option<u32>,
    ) -> Result<KvVersion, WriteError> {
        if key.is_empty() {
            return Err(WriteError::InvalidKey);
        }
        let follower_acks = write_concern.unwrap_or(self.default_write_concern) as usize;

        self.coordinator
            .write(key, value, follower_acks)
            .await
            .map(KvVersion::from)
            .map_err(WriteError::from)
    }

    pub(crate) async fn add_peer(&self, address: String, strict: bool) -> Result<MembershipChangeOutput, AddPeerError> {
        if address.is_empty() || address.contains(char::is_whitespace) {
            return Err(AddPeerError::InvalidAddress(address));
        }

        let outcome = self.cluster.add_peer(NodeAddress::new(address), strict).await??;
        self.propagator.propagate(outcome.broadcast);

        Ok(MembershipChangeOutput {
            changed: outcome.changed,
        })
    }

    pub(crate) async fn remove_peer(
        &self,
        address: String,
        strict: bool,
    ) -> Result<MembershipChangeOutput, RemovePeerError> {
        let outcome = self.cluster.remove_peer(NodeAddress::new(address), strict).await??;
        self.propagator.propagate(outcome.broadcast);

        Ok(MembershipChangeOutput {
            changed: outcome.changed,
        })
    }

    pub(crate) async fn status(&self) -> Result<NodeStatus, StatusError> {
        let snapshot = self.cluster.snapshot().await?;
        Ok(NodeStatus::from(snapshot))
    }

    pub(crate) async fn promote(&self) -> Result<RoleChangeOutput, PromoteError> {
        let highest_stored_epoch = self.coordinator.highest_stored_epoch().await;
        let change = self.cluster.promote(highest_stored_epoch).await??;
        self.propagator.propagate(change.broadcast);

        Ok(RoleChangeOutput {
            epoch: change.epoch.as_u64(),
            changed: change.changed,
        })
    }

    pub(crate) async fn demote(&self) -> Result<RoleChangeOutput, DemoteError> {
        let change = self.cluster.demote().await?;
        self.propagator.propagate(change.broadcast);

        Ok(RoleChangeOutput {
            epoch: change.epoch.as_u64(),
            changed: change.changed,
        })
    }

    // ------- Peer facing --------

    pub(crate) async fn apply_write(&self, write: ReplicatedWrite) -> Result<(), ApplyWriteError> {
        self.coordinator.apply_replicated_write(write).await
    }

    pub(crate) async fn read_local(&self, key: &str) -> Result<Option<Entry>, io::Error> {
        self.coordinator.read_local(key).await
    }

    pub(crate) async fn change_membership(
        &self,
        sender: NodeAddress,
        change: MembershipChange,
    ) -> Result<(), ActorExited> {
        self.cluster.apply_membership_change(sender, change).await
    }

    pub(crate) async fn sync_membership(&self, sender: NodeAddress, sync: MembershipSync) -> Result<(), ActorExited> {
        if sync.members.iter().all(|member| member != &self.my_address) {
            slog::warn!(self.logger, "Membership sync from {} doesn't list us. Applying anyway.", sender);
        }
        self.cluster.sync_membership(sender, sync).await
    }
}
