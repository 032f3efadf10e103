use crate::grpc::{ProtoEntry, ProtoVersion};
use crate::membership::Epoch;
use crate::store::{Entry, Version};

pub(crate) fn version_to_proto(version: Version) -> ProtoVersion {
    ProtoVersion {
        epoch: version.epoch().as_u64(),
        sequence: version.sequence(),
    }
}

pub(crate) fn version_from_proto(proto: ProtoVersion) -> Version {
    Version::new(Epoch::new(proto.epoch), proto.sequence)
}

pub(crate) fn entry_to_proto(entry: Entry) -> ProtoEntry {
    let tombstone = entry.is_tombstone();
    ProtoEntry {
        version: Some(version_to_proto(entry.version)),
        tombstone,
        value: entry.value.unwrap_or_default(),
    }
}

pub(crate) fn entry_from_proto(proto: ProtoEntry) -> Result<Entry, &'static str> {
    let version = proto.version.ok_or("Entry is missing its version")?;
    let value = if proto.tombstone { None } else { Some(proto.value) };

    Ok(Entry::new(version_from_proto(version), value))
}

/// Empty strings stand for "no address" on the wire.
pub(crate) fn optional_address(address: String) -> Option<String> {
    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}
