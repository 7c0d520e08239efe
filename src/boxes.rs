use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Width of the fixed `size` + `type` header. Extended 64-bit sizes are not
/// part of this profile.
pub const HEADER_SIZE: usize = 8;

pub const MDAT: FourCC = FourCC(*b"mdat");
pub const MOOF: FourCC = FourCC(*b"moof");
pub const TRAF: FourCC = FourCC(*b"traf");

/// Box types whose bodies are walked as more boxes instead of skipped.
pub const CONTAINER_TYPES: [FourCC; 2] = [MOOF, TRAF];

/// The box type whose body carries the XML document.
pub const PAYLOAD_TYPE: FourCC = MDAT;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else {
            None
        }
    }

    /// Printable ASCII as-is, anything else replaced with `.`.
    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }

    pub fn is_container(&self) -> bool {
        CONTAINER_TYPES.contains(self)
    }

    pub fn is_payload(&self) -> bool {
        *self == PAYLOAD_TYPE
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl Serialize for FourCC {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.as_str_lossy())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub size: u32,   // total size including the 8 header bytes
    pub typ: FourCC,
    pub start: usize, // buffer offset of the header
}

impl BoxHeader {
    /// Zero for a hand-built header whose size is below the header width.
    pub fn body_len(&self) -> usize {
        (self.size as usize).saturating_sub(HEADER_SIZE)
    }
}

/// One box produced by the walker.
///
/// `body` is the half-open range of the box body inside the walked buffer.
/// Only payload boxes carry their bytes; every other record is a position
/// report and the walker never looks at its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxRecord<'a> {
    pub hdr: BoxHeader,
    pub body: Range<usize>,
    pub payload: Option<&'a [u8]>,
}

impl BoxRecord<'_> {
    pub fn typ(&self) -> FourCC {
        self.hdr.typ
    }
}
