use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use graphene_codec::{ByteBuffer, Decode, DecodeError, Encode, EncodeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// IPv4 address. On the wire the four octets travel in reversed order,
/// most-significant octet last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddress(pub Ipv4Addr);

impl IpAddress {
    pub const UNSPECIFIED: Self = Self(Ipv4Addr::UNSPECIFIED);
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for IpAddress {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl Encode for IpAddress {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let octets = self.0.octets();
        out.extend_from_slice(&[octets[3], octets[2], octets[1], octets[0]]);
        Ok(())
    }
}

impl Decode for IpAddress {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let raw = buf.read_array::<4>()?;
        Ok(Self(Ipv4Addr::new(raw[3], raw[2], raw[1], raw[0])))
    }
}

/// IPv4 endpoint: reversed address octets followed by a little-endian port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpEndpoint {
    pub addr: IpAddress,
    pub port: u16,
}

impl IpEndpoint {
    pub fn new(addr: IpAddress, port: u16) -> Self {
        Self { addr, port }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointParseError {
    #[error("endpoint is not in address:port form")]
    MissingPort,

    #[error("address part is not a valid IPv4 address")]
    InvalidAddress,

    #[error("port part is not a valid non-zero port")]
    InvalidPort,
}

impl fmt::Display for IpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

impl FromStr for IpEndpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, port) = s.split_once(':').ok_or(EndpointParseError::MissingPort)?;
        let addr = addr.parse().map_err(|_| EndpointParseError::InvalidAddress)?;
        let port: u16 = port.parse().map_err(|_| EndpointParseError::InvalidPort)?;
        if port == 0 {
            return Err(EndpointParseError::InvalidPort);
        }
        Ok(Self { addr, port })
    }
}

impl Encode for IpEndpoint {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.addr.encode(out)?;
        self.port.encode(out)
    }
}

impl Decode for IpEndpoint {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(Self {
            addr: IpAddress::decode(buf)?,
            port: u16::decode(buf)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_octets_are_reversed() {
        let addr: IpAddress = "192.168.1.2".parse().unwrap();
        assert_eq!(addr.to_wire().unwrap(), vec![0x02, 0x01, 0xa8, 0xc0]);
        assert_eq!(
            IpAddress::from_wire(&[0x02, 0x01, 0xa8, 0xc0]).unwrap(),
            addr
        );
    }

    #[test]
    fn endpoint_wire_form() {
        let endpoint: IpEndpoint = "87.117.52.158:11206".parse().unwrap();
        assert_eq!(
            endpoint.to_wire().unwrap(),
            vec![0x9e, 0x34, 0x75, 0x57, 0xc6, 0x2b]
        );
        assert_eq!(
            IpEndpoint::from_wire(&[0x9e, 0x34, 0x75, 0x57, 0xc6, 0x2b]).unwrap(),
            endpoint
        );
    }

    #[test]
    fn endpoint_parser_is_strict() {
        assert_eq!(
            "10.0.0.1".parse::<IpEndpoint>(),
            Err(EndpointParseError::MissingPort)
        );
        assert_eq!(
            "10.0.0.1:0".parse::<IpEndpoint>(),
            Err(EndpointParseError::InvalidPort)
        );
        assert_eq!(
            "300.0.0.1:80".parse::<IpEndpoint>(),
            Err(EndpointParseError::InvalidAddress)
        );
        // port zero is still decodable from the wire
        assert_eq!(
            IpEndpoint::from_wire(&[0, 0, 0, 0, 0, 0]).unwrap().port,
            0
        );
    }
}
