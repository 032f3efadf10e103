use crate::membership::Epoch;
use std::fmt;

/// Version orders writes for last-writer-wins arbitration. It is assigned by the leader at write
/// time. Versions from a later leader epoch always sort after versions from an earlier one, and
/// within an epoch the leader's sequence counter is strictly increasing across all keys.
///
/// Store implementations that persist versions convert through `KvVersion`.
#[derive(Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub struct Version {
    epoch: Epoch,
    sequence: u64,
}

impl Version {
    pub(crate) fn new(epoch: Epoch, sequence: u64) -> Self {
        Version { epoch, sequence }
    }

    pub(crate) fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.epoch.as_u64(), self.sequence)
    }
}

/// Entry is what the store holds for a key. A `None` value is a tombstone left by a delete; it is
/// kept (instead of removing the key) so that it still takes part in version arbitration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub version: Version,
    pub value: Option<String>,
}

impl Entry {
    pub fn new(version: Version, value: Option<String>) -> Self {
        Entry { version, value }
    }

    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_epoch_wins_regardless_of_sequence() {
        let old_leader = Version::new(Epoch::new(1), 900);
        let new_leader = Version::new(Epoch::new(2), 1);

        assert!(new_leader > old_leader);
        assert!(Version::new(Epoch::new(2), 2) > new_leader);
    }
}
