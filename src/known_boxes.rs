use crate::boxes::{FourCC, MDAT, MOOF, TRAF};

/// Typed view over the box types a fragmented SMPTE-TT stream carries.
///
/// Anything not in this list becomes `KnownBox::Unknown(fourcc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // segment level
    Ftyp,
    Styp,
    Moov,
    Sidx,
    Free,
    Skip,
    Mdat,

    // fragments
    Moof,
    Mfhd,
    Traf,
    Tfhd,
    Tfdt,
    Trun,

    Unknown(FourCC),
}

/// What the walker does with a box of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxRole {
    /// Children follow inline and are walked as siblings.
    Container,
    /// Body is handed to the payload extractor.
    Payload,
    /// Body is skipped unread.
    Opaque,
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"ftyp" => KnownBox::Ftyp,
            b"styp" => KnownBox::Styp,
            b"moov" => KnownBox::Moov,
            b"sidx" => KnownBox::Sidx,
            b"free" => KnownBox::Free,
            b"skip" => KnownBox::Skip,
            b"mdat" => KnownBox::Mdat,

            b"moof" => KnownBox::Moof,
            b"mfhd" => KnownBox::Mfhd,
            b"traf" => KnownBox::Traf,
            b"tfhd" => KnownBox::Tfhd,
            b"tfdt" => KnownBox::Tfdt,
            b"trun" => KnownBox::Trun,

            _ => KnownBox::Unknown(cc),
        }
    }
}

impl KnownBox {
    pub fn fourcc(&self) -> FourCC {
        let tag = match self {
            KnownBox::Ftyp => b"ftyp",
            KnownBox::Styp => b"styp",
            KnownBox::Moov => b"moov",
            KnownBox::Sidx => b"sidx",
            KnownBox::Free => b"free",
            KnownBox::Skip => b"skip",
            KnownBox::Mdat => return MDAT,
            KnownBox::Moof => return MOOF,
            KnownBox::Mfhd => b"mfhd",
            KnownBox::Traf => return TRAF,
            KnownBox::Tfhd => b"tfhd",
            KnownBox::Tfdt => b"tfdt",
            KnownBox::Trun => b"trun",
            KnownBox::Unknown(cc) => return *cc,
        };
        FourCC(*tag)
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            KnownBox::Ftyp => "File Type Box",
            KnownBox::Styp => "Segment Type Box",
            KnownBox::Moov => "Movie Box",
            KnownBox::Sidx => "Segment Index Box",
            KnownBox::Free => "Free Space Box",
            KnownBox::Skip => "Free Space Box",
            KnownBox::Mdat => "Media Data Box",
            KnownBox::Moof => "Movie Fragment Box",
            KnownBox::Mfhd => "Movie Fragment Header Box",
            KnownBox::Traf => "Track Fragment Box",
            KnownBox::Tfhd => "Track Fragment Header Box",
            KnownBox::Tfdt => "Track Fragment Decode Time Box",
            KnownBox::Trun => "Track Fragment Run Box",
            KnownBox::Unknown(_) => "Unknown Box",
        }
    }

    /// `moov` is a container in ISOBMFF but this profile does not descend
    /// into it; only the fragment boxes are walked through.
    pub fn role(&self) -> BoxRole {
        let cc = self.fourcc();
        if cc.is_container() {
            BoxRole::Container
        } else if cc.is_payload() {
            BoxRole::Payload
        } else {
            BoxRole::Opaque
        }
    }
}
