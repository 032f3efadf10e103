mod messages;
mod node;
mod propagation;
mod registry;
mod role;

pub(crate) use messages::MembershipBroadcast;
pub(crate) use messages::MembershipChange;
pub(crate) use messages::MembershipSync;
pub(crate) use node::Liveness;
pub(crate) use node::Node;
pub(crate) use node::NodeAddress;
pub(crate) use node::Role;
pub(crate) use propagation::MembershipPropagator;
pub(crate) use registry::PeerRegistry;
pub(crate) use registry::RegistrySnapshot;
pub(crate) use role::Epoch;
pub(crate) use role::LeaderObservation;
pub(crate) use role::Promotion;
pub(crate) use role::PromotionRejected;
pub(crate) use role::RoleManager;
pub(crate) use role::RoleState;
