use crate::api::types::ReadConcern;
use std::convert::TryFrom;
use tokio::time::Duration;

#[derive(Clone, Default)]
pub struct KvOptions {
    /// Bound on any single call to a peer, including connecting to it.
    pub peer_call_timeout: Option<Duration>,
    /// How long a write waits for follower acknowledgments.
    pub write_timeout: Option<Duration>,
    /// How long a Majority/All read waits for responses.
    pub read_timeout: Option<Duration>,
    /// Consecutive failed calls after which a peer is reported Unreachable.
    pub unreachable_after_failures: Option<u32>,
    /// Used when a read doesn't specify a concern.
    pub default_read_concern: Option<ReadConcern>,
    /// Used when a write or delete doesn't specify a concern.
    pub default_write_concern: Option<u32>,
    /// Delivery attempts per membership message.
    pub membership_notify_attempts: Option<u32>,
}

pub(super) struct KvOptionsValidated {
    pub peer_call_timeout: Duration,
    pub write_timeout: Duration,
    pub read_timeout: Duration,
    pub unreachable_after_failures: u32,
    pub default_read_concern: ReadConcern,
    pub default_write_concern: u32,
    pub membership_notify_attempts: u32,
}

impl KvOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.peer_call_timeout >= self.write_timeout {
            return Err("Peer call timeout must be less than the write timeout");
        }
        if self.peer_call_timeout >= self.read_timeout {
            return Err("Peer call timeout must be less than the read timeout");
        }
        if self.unreachable_after_failures == 0 {
            return Err("Unreachable-after-failures threshold must be at least 1");
        }
        if self.membership_notify_attempts == 0 {
            return Err("Membership notify attempts must be at least 1");
        }

        Ok(())
    }
}

impl TryFrom<KvOptions> for KvOptionsValidated {
    type Error = &'static str;

    fn try_from(options: KvOptions) -> Result<Self, Self::Error> {
        let values = KvOptionsValidated {
            peer_call_timeout: options.peer_call_timeout.unwrap_or(Duration::from_millis(500)),
            write_timeout: options.write_timeout.unwrap_or(Duration::from_secs(2)),
            read_timeout: options.read_timeout.unwrap_or(Duration::from_secs(2)),
            unreachable_after_failures: options.unreachable_after_failures.unwrap_or(3),
            default_read_concern: options.default_read_concern.unwrap_or(ReadConcern::Local),
            default_write_concern: options.default_write_concern.unwrap_or(0),
            membership_notify_attempts: options.membership_notify_attempts.unwrap_or(3),
        };

        values.validate()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = KvOptionsValidated::try_from(KvOptions::default()).unwrap();

        assert_eq!(options.default_read_concern, ReadConcern::Local);
        assert_eq!(options.default_write_concern, 0);
        assert!(options.peer_call_timeout < options.write_timeout);
    }

    #[test]
    fn peer_timeout_must_fit_inside_operation_timeouts() {
        let options = KvOptions {
            peer_call_timeout: Some(Duration::from_secs(3)),
            ..KvOptions::default()
        };

        assert!(KvOptionsValidated::try_from(options).is_err());

        let options = KvOptions {
            peer_call_timeout: Some(Duration::from_millis(100)),
            read_timeout: Some(Duration::from_millis(100)),
            ..KvOptions::default()
        };

        assert!(KvOptionsValidated::try_from(options).is_err());
    }

    #[test]
    fn zero_thresholds_are_rejected() {
        let options = KvOptions {
            unreachable_after_failures: Some(0),
            ..KvOptions::default()
        };
        assert!(KvOptionsValidated::try_from(options).is_err());

        let options = KvOptions {
            membership_notify_attempts: Some(0),
            ..KvOptions::default()
        };
        assert!(KvOptionsValidated::try_from(options).is_err());
    }
}
