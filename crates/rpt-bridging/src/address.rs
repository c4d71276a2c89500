//! `tech/device` channel addresses

use std::fmt;

use crate::error::AddressError;

/// Technology name of the radio interface hardware
pub const HARDWARE_TECH: &str = "DAHDI";

/// Reserved device name for internal loop channels
pub const PSEUDO_DEVICE: &str = "pseudo";

/// A configured address split into technology and device
///
/// Only the first `/` separates the two; anything after it belongs to the
/// device (`IAX2/peer/1234` dials `peer/1234` on `IAX2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAddress<'a> {
    pub tech: &'a str,
    pub device: &'a str,
}

impl<'a> ChannelAddress<'a> {
    /// Address of the internal loop channel
    pub const PSEUDO: ChannelAddress<'static> = ChannelAddress {
        tech: HARDWARE_TECH,
        device: PSEUDO_DEVICE,
    };

    /// Split `tech/device`, rejecting a missing separator or empty half
    pub fn parse(s: &'a str) -> Result<Self, AddressError> {
        match s.split_once('/') {
            Some((tech, device)) if !tech.is_empty() && !device.is_empty() => {
                Ok(Self { tech, device })
            }
            _ => Err(AddressError(s.to_string())),
        }
    }

    /// Technology is the radio interface hardware
    pub fn is_hardware(&self) -> bool {
        self.tech.eq_ignore_ascii_case(HARDWARE_TECH)
    }

    /// Device is the reserved internal loop
    pub fn is_pseudo(&self) -> bool {
        self.device.eq_ignore_ascii_case(PSEUDO_DEVICE)
    }

    /// Hardware technology on a real (non-pseudo) device
    pub fn is_hardware_device(&self) -> bool {
        self.is_hardware() && !self.is_pseudo()
    }
}

impl fmt::Display for ChannelAddress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tech, self.device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let addr = ChannelAddress::parse("DAHDI/1").unwrap();
        assert_eq!(addr.tech, "DAHDI");
        assert_eq!(addr.device, "1");
        assert_eq!(addr.to_string(), "DAHDI/1");
    }

    #[test]
    fn test_device_keeps_extra_separators() {
        let addr = ChannelAddress::parse("IAX2/peer/1234").unwrap();
        assert_eq!(addr.tech, "IAX2");
        assert_eq!(addr.device, "peer/1234");
    }

    #[test]
    fn test_parse_malformed() {
        for bad in ["sip", "", "SIP/", "/1", "/"] {
            assert_eq!(
                ChannelAddress::parse(bad),
                Err(AddressError(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_hardware_detection() {
        assert!(ChannelAddress::parse("dahdi/3").unwrap().is_hardware_device());
        assert!(ChannelAddress::parse("DAHDI/pseudo").unwrap().is_hardware());
        assert!(!ChannelAddress::parse("DAHDI/Pseudo").unwrap().is_hardware_device());
        assert!(!ChannelAddress::parse("SIP/1").unwrap().is_hardware());
        assert!(ChannelAddress::PSEUDO.is_pseudo());
    }
}
