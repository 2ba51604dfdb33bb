//! Shared value types.

use std::fmt;

use crate::error::Error;

/// Symbol rate of the USB-UART link.
///
/// The CP2105 accepts arbitrary rates, but the radios this stack targets
/// only speak a closed set, so the type enumerates them rather than
/// carrying a raw `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaudRate {
    B4800,
    B9600,
    B19200,
    /// The customary rate for modern Yaesu CAT, and the default here.
    #[default]
    B38400,
}

impl BaudRate {
    /// The rate in bits per second.
    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::B4800 => 4_800,
            BaudRate::B9600 => 9_600,
            BaudRate::B19200 => 19_200,
            BaudRate::B38400 => 38_400,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = Error;

    fn try_from(rate: u32) -> Result<Self, Error> {
        match rate {
            4_800 => Ok(BaudRate::B4800),
            9_600 => Ok(BaudRate::B9600),
            19_200 => Ok(BaudRate::B19200),
            38_400 => Ok(BaudRate::B38400),
            other => Err(Error::InvalidParameter(format!(
                "unsupported baud rate: {other} (supported: 4800, 9600, 19200, 38400)"
            ))),
        }
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_rate_round_trip() {
        for rate in [
            BaudRate::B4800,
            BaudRate::B9600,
            BaudRate::B19200,
            BaudRate::B38400,
        ] {
            assert_eq!(BaudRate::try_from(rate.as_u32()).unwrap(), rate);
        }
    }

    #[test]
    fn baud_rate_rejects_unsupported() {
        let err = BaudRate::try_from(115_200).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn baud_rate_default_is_38400() {
        assert_eq!(BaudRate::default(), BaudRate::B38400);
    }

    #[test]
    fn baud_rate_display() {
        assert_eq!(BaudRate::B4800.to_string(), "4800");
        assert_eq!(BaudRate::B38400.to_string(), "38400");
    }
}
