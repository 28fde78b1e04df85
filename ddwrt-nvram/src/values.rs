//! Validated scalar types used inside NVRAM table values.
//!
//! The firmware stores everything as text; these wrappers give each field a
//! validating constructor and a canonical rendering, so an invalid value is
//! never observable. Parsing accepts exactly what the router's web UI
//! produces; rendering reproduces it.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors raised by the validating constructors in this module.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// Text is not one of the accepted spellings for an enumerated field.
    #[error("{value:?} is not a valid {field}")]
    InvalidEnumValue { field: &'static str, value: String },
    /// Numeric field outside its permitted range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: u64,
        max: u64,
    },
    /// Text does not spell a 48-bit hardware address.
    #[error("{value:?} is not a valid hardware address")]
    InvalidMacAddress { value: String },
    /// Text is neither a bare IP address nor an `address/prefix` network.
    #[error("{value:?} is not a valid address or network")]
    InvalidAddress { value: String },
}

/// A 48-bit hardware address, rendered as six uppercase colon-hex octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Wrap six raw octets.
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The six octets, most significant first.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = ValueError;

    /// Accepts `AA:BB:CC:DD:EE:FF` and the separator-free `AABBCCDDEEFF`
    /// form; anything other than twelve hex digits is rejected.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let digits: String = text.chars().filter(|c| *c != ':').collect();
        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValueError::InvalidMacAddress {
                value: text.to_string(),
            });
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            // Slice bounds are checked above; the parse cannot fail.
            *octet = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).unwrap_or(0);
        }
        Ok(Self(octets))
    }
}

impl TryFrom<u64> for MacAddress {
    type Error = ValueError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        const MAX: u64 = (1 << 48) - 1;
        if raw > MAX {
            return Err(ValueError::OutOfRange {
                field: "hardware address",
                value: raw.to_string(),
                min: 0,
                max: MAX,
            });
        }
        let bytes = raw.to_be_bytes();
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&bytes[2..]);
        Ok(Self(octets))
    }
}

impl Display for MacAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A boolean-like on/off toggle, rendered as `on` or `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    On,
    Off,
}

impl State {
    /// True for [`State::On`].
    pub fn is_on(&self) -> bool {
        matches!(self, State::On)
    }
}

impl FromStr for State {
    type Err = ValueError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.eq_ignore_ascii_case("on") {
            Ok(State::On)
        } else if text.eq_ignore_ascii_case("off") {
            Ok(State::Off)
        } else {
            Err(ValueError::InvalidEnumValue {
                field: "state",
                value: text.to_string(),
            })
        }
    }
}

impl From<bool> for State {
    fn from(on: bool) -> Self {
        if on {
            State::On
        } else {
            State::Off
        }
    }
}

impl From<State> for bool {
    fn from(state: State) -> Self {
        state.is_on()
    }
}

impl TryFrom<u8> for State {
    type Error = ValueError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(State::On),
            0 => Ok(State::Off),
            other => Err(ValueError::InvalidEnumValue {
                field: "state",
                value: other.to_string(),
            }),
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::On => "on",
            State::Off => "off",
        })
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A TCP/UDP port number, rendered as its decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Port(u16);

impl Port {
    /// Wrap a port number; any u16 is valid here, including 0.
    pub fn new(number: u16) -> Self {
        Self(number)
    }

    /// Wrap a port number, rejecting 0 for fields where "no port" makes no
    /// sense.
    pub fn nonzero(number: u16) -> Result<Self, ValueError> {
        if number == 0 {
            return Err(ValueError::OutOfRange {
                field: "port",
                value: "0".to_string(),
                min: 1,
                max: u16::MAX as u64,
            });
        }
        Ok(Self(number))
    }

    /// Parse a decimal port in `[1, 65535]`.
    pub fn parse_nonzero(text: &str) -> Result<Self, ValueError> {
        let port: Port = text.parse()?;
        if port.0 == 0 {
            return Err(ValueError::OutOfRange {
                field: "port",
                value: text.to_string(),
                min: 1,
                max: u16::MAX as u64,
            });
        }
        Ok(port)
    }

    /// The raw number.
    pub fn number(&self) -> u16 {
        self.0
    }
}

impl FromStr for Port {
    type Err = ValueError;

    /// Parse a decimal port in `[0, 65535]`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.trim()
            .parse::<u16>()
            .map(Self)
            .map_err(|_| ValueError::OutOfRange {
                field: "port",
                value: text.to_string(),
                min: 0,
                max: u16::MAX as u64,
            })
    }
}

impl Display for Port {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.0)
    }
}

/// Protocol selector for a forwarding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    /// TCP and UDP together; only some fields accept it.
    Both,
}

impl Protocol {
    /// Parse case-insensitively, rejecting `both` for fields that forward a
    /// single protocol only.
    pub fn parse_single(text: &str) -> Result<Self, ValueError> {
        match text.parse()? {
            Protocol::Both => Err(ValueError::InvalidEnumValue {
                field: "protocol",
                value: text.to_string(),
            }),
            single => Ok(single),
        }
    }
}

impl FromStr for Protocol {
    type Err = ValueError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.eq_ignore_ascii_case("tcp") {
            Ok(Protocol::Tcp)
        } else if text.eq_ignore_ascii_case("udp") {
            Ok(Protocol::Udp)
        } else if text.eq_ignore_ascii_case("both") {
            Ok(Protocol::Both)
        } else {
            Err(ValueError::InvalidEnumValue {
                field: "protocol",
                value: text.to_string(),
            })
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Both => "both",
        })
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{MacAddress, Port, Protocol, State, ValueError};

    #[test]
    fn port_bounds_are_enforced() {
        assert!(Port::nonzero(0).is_err());
        assert!("65536".parse::<Port>().is_err());
        assert!("meme".parse::<Port>().is_err());
        assert_eq!("1".parse::<Port>().unwrap().number(), 1);
        assert_eq!(Port::new(65535).to_string(), "65535");
        assert!(Port::parse_nonzero("0").is_err());
        assert_eq!(Port::parse_nonzero("443").unwrap().number(), 443);
    }

    #[test]
    fn protocol_parses_case_insensitively() {
        assert_eq!("tcP".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert_eq!("Udp".parse::<Protocol>().unwrap(), Protocol::Udp);
        assert_eq!("bOth".parse::<Protocol>().unwrap(), Protocol::Both);
        assert!("meme".parse::<Protocol>().is_err());
        assert!(Protocol::parse_single("both").is_err());
        assert_eq!(Protocol::parse_single("udp").unwrap(), Protocol::Udp);
    }

    #[test]
    fn mac_address_round_trips_and_validates() {
        let mac: MacAddress = "00:22:33:00:76:99".parse().unwrap();
        assert_eq!(mac.to_string(), "00:22:33:00:76:99");
        assert_eq!(
            "aabbccddeeff".parse::<MacAddress>().unwrap().to_string(),
            "AA:BB:CC:DD:EE:FF"
        );
        assert!("00:22:33".parse::<MacAddress>().is_err());
        assert!("gg:22:33:00:76:99".parse::<MacAddress>().is_err());
    }

    #[test]
    fn mac_address_converts_from_integers() {
        let mac = MacAddress::try_from(0x0022_3300_7699u64).unwrap();
        assert_eq!(mac.to_string(), "00:22:33:00:76:99");
        assert!(matches!(
            MacAddress::try_from(1u64 << 48),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test]
    fn state_accepts_all_documented_spellings() {
        assert!("oN".parse::<State>().unwrap().is_on());
        assert!(!"oFf".parse::<State>().unwrap().is_on());
        assert!(State::from(true).is_on());
        assert_eq!(State::try_from(1u8).unwrap(), State::On);
        assert_eq!(State::try_from(0u8).unwrap(), State::Off);
        assert!("OnGameFrame".parse::<State>().is_err());
        assert!(State::try_from(2u8).is_err());
    }
}
