use crate::api::KvVersion;
use std::error::Error;

/// MissedWriteSink hears about every follower that did not acknowledge a replicated write,
/// including ones that fail after the client already got its answer. Replication is not
/// transactional, so this is where background reconciliation plugs in.
///
/// Called from the replication task, so implementations should hand work off instead of blocking.
pub trait MissedWriteSink: Send + Sync + 'static {
    fn write_missed(&self, peer: &str, key: &str, version: KvVersion, reason: &dyn Error);
}

/// Default sink. Only logs.
pub(crate) struct LoggingMissedWriteSink {
    logger: slog::Logger,
}

impl LoggingMissedWriteSink {
    pub(crate) fn new(logger: slog::Logger) -> Self {
        LoggingMissedWriteSink { logger }
    }
}

impl MissedWriteSink for LoggingMissedWriteSink {
    fn write_missed(&self, peer: &str, key: &str, version: KvVersion, reason: &dyn Error) {
        slog::warn!(
            self.logger,
            "Peer missed write {:?} of key '{}': {}",
            version,
            key,
            reason;
            "Peer" => peer.to_string()
        );
    }
}
