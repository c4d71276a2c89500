//! Logical channel roles within a repeater

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseKindError;

/// Role a channel slot plays for a repeater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Receive leg (radio or trunk)
    Rx,
    /// Transmit leg, possibly the same endpoint as `Rx`
    Tx,
    /// Private local loop used for conferencing
    Private,
    /// Hardware transmit shadow
    HardwareTx,
    /// Monitor tap
    Monitor,
    /// Parrot playback
    Parrot,
    /// Telemetry / announcements
    Tele,
    /// Background telemetry
    BackgroundTele,
    /// Voice-operated switch
    Vox,
    /// Transmit private shadow
    TxPrivate,
}

/// Application tags attached to a real call leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTags {
    pub app: &'static str,
    pub data: &'static str,
}

impl ChannelKind {
    /// Every kind, in slot table order
    pub const ALL: [ChannelKind; 10] = [
        ChannelKind::Rx,
        ChannelKind::Tx,
        ChannelKind::Private,
        ChannelKind::HardwareTx,
        ChannelKind::Monitor,
        ChannelKind::Parrot,
        ChannelKind::Tele,
        ChannelKind::BackgroundTele,
        ChannelKind::Vox,
        ChannelKind::TxPrivate,
    ];

    /// Number of slots per repeater
    pub const COUNT: usize = Self::ALL.len();

    /// Short name used in logs and configuration
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rx => "rxchan",
            Self::Tx => "txchan",
            Self::Private => "pchan",
            Self::HardwareTx => "dahditxchan",
            Self::Monitor => "monchan",
            Self::Parrot => "parrotchan",
            Self::Tele => "telechan",
            Self::BackgroundTele => "btelechan",
            Self::Vox => "voxchan",
            Self::TxPrivate => "txpchan",
        }
    }

    /// Whether the kind takes an externally configured address.
    ///
    /// Everything else is an internal pseudo channel.
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Rx | Self::Tx)
    }

    /// Tags handed to call setup for real call legs
    pub fn call_tags(&self) -> Option<CallTags> {
        match self {
            Self::Rx => Some(CallTags {
                app: "(Repeater Rx)",
                data: "Rx",
            }),
            Self::Tx => Some(CallTags {
                app: "(Repeater Tx)",
                data: "Tx",
            }),
            Self::Private
            | Self::HardwareTx
            | Self::Monitor
            | Self::Parrot
            | Self::Tele
            | Self::BackgroundTele
            | Self::Vox
            | Self::TxPrivate => None,
        }
    }

    /// The other kind that may share this kind's endpoint
    pub fn alias_partner(&self) -> Option<ChannelKind> {
        match self {
            Self::Rx => Some(Self::Tx),
            Self::Tx => Some(Self::Rx),
            _ => None,
        }
    }

    /// Position in the slot table
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_index() {
        for (i, kind) in ChannelKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = ChannelKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ChannelKind::COUNT);
    }

    #[test]
    fn test_only_rx_tx_configured() {
        let configured: Vec<_> = ChannelKind::ALL
            .into_iter()
            .filter(|k| k.is_configured())
            .collect();
        assert_eq!(configured, vec![ChannelKind::Rx, ChannelKind::Tx]);

        for kind in ChannelKind::ALL {
            assert_eq!(kind.call_tags().is_some(), kind.is_configured());
        }
    }

    #[test]
    fn test_call_tags() {
        let rx = ChannelKind::Rx.call_tags().unwrap();
        assert_eq!(rx.app, "(Repeater Rx)");
        assert_eq!(rx.data, "Rx");
        let tx = ChannelKind::Tx.call_tags().unwrap();
        assert_eq!(tx.app, "(Repeater Tx)");
        assert_eq!(tx.data, "Tx");
    }

    #[test]
    fn test_alias_partner() {
        assert_eq!(ChannelKind::Rx.alias_partner(), Some(ChannelKind::Tx));
        assert_eq!(ChannelKind::Tx.alias_partner(), Some(ChannelKind::Rx));
        assert_eq!(ChannelKind::Private.alias_partner(), None);
        assert_eq!(ChannelKind::HardwareTx.alias_partner(), None);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("monchan".parse::<ChannelKind>(), Ok(ChannelKind::Monitor));
        assert_eq!("TXPCHAN".parse::<ChannelKind>(), Ok(ChannelKind::TxPrivate));
        assert!("nochan".parse::<ChannelKind>().is_err());
    }
}
