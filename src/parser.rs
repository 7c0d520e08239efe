use crate::boxes::{BoxHeader, BoxRecord, FourCC, HEADER_SIZE};
use crate::known_boxes::{BoxRole, KnownBox};
use crate::observer::{BoxObserver, NoopObserver};
use crate::util::latin1_to_string;
use byteorder::{BigEndian, ByteOrder};
use std::iter::FusedIterator;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("truncated buffer at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: u64,
        available: usize,
    },
    #[error("malformed box at offset {offset}: size {size} is smaller than the 8-byte header")]
    MalformedBox { offset: usize, size: u32 },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Reads and validates the box header at `offset`.
///
/// The whole box, body included, must lie inside `buf`. Sizes 0 and 1
/// (to-end-of-file and 64-bit extended) fall below the header width and
/// are rejected here.
pub fn read_box_header(buf: &[u8], offset: usize) -> Result<BoxHeader> {
    let available = buf.len().saturating_sub(offset);
    if available < HEADER_SIZE {
        return Err(ParseError::TruncatedBuffer {
            offset,
            needed: HEADER_SIZE as u64,
            available,
        });
    }

    let size = BigEndian::read_u32(&buf[offset..offset + 4]);
    let mut typ = [0u8; 4];
    typ.copy_from_slice(&buf[offset + 4..offset + HEADER_SIZE]);

    if (size as usize) < HEADER_SIZE {
        return Err(ParseError::MalformedBox { offset, size });
    }
    if size as u64 > available as u64 {
        return Err(ParseError::TruncatedBuffer {
            offset,
            needed: size as u64,
            available,
        });
    }

    Ok(BoxHeader {
        size,
        typ: FourCC(typ),
        start: offset,
    })
}

/// Walks `buf` box by box. See [`BoxWalker`].
pub fn walk(buf: &[u8]) -> BoxWalker<'_, NoopObserver> {
    BoxWalker::new(buf, NoopObserver)
}

/// Like [`walk`], reporting every header (and payload text) to `observer`.
pub fn walk_with<O: BoxObserver>(buf: &[u8], observer: O) -> BoxWalker<'_, O> {
    BoxWalker::new(buf, observer)
}

/// Collects a whole walk, stopping at the first structural error.
pub fn walk_all(buf: &[u8]) -> Result<Vec<BoxRecord<'_>>> {
    walk(buf).collect()
}

/// Flattening box iterator over a borrowed buffer.
///
/// Container boxes (`moof`, `traf`) are transparent: their header is
/// consumed and the walk carries on at the first child, so children come
/// out as siblings of whatever follows the container and no record is
/// produced for the container itself. Nesting is not tracked; a caller
/// that needs parent/child structure has to keep its own stack of
/// container end offsets.
///
/// The first error ends the iteration.
pub struct BoxWalker<'a, O = NoopObserver> {
    buf: &'a [u8],
    offset: usize,
    observer: O,
    done: bool,
}

impl<'a, O: BoxObserver> BoxWalker<'a, O> {
    pub fn new(buf: &'a [u8], observer: O) -> Self {
        Self {
            buf,
            offset: 0,
            observer,
            done: false,
        }
    }

    /// Current cursor. Equals the buffer length after a complete walk.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    fn next_record(&mut self) -> Result<Option<BoxRecord<'a>>> {
        while self.offset < self.buf.len() {
            let hdr = read_box_header(self.buf, self.offset)?;
            self.observer.on_box(&hdr);
            self.offset += HEADER_SIZE;

            let body = self.offset..self.offset + hdr.body_len();
            let payload = match KnownBox::from(hdr.typ).role() {
                BoxRole::Container => continue,
                BoxRole::Payload => {
                    let bytes = &self.buf[body.clone()];
                    if self.observer.wants_payload_text() {
                        self.observer.on_payload_text(&latin1_to_string(bytes));
                    }
                    Some(bytes)
                }
                BoxRole::Opaque => None,
            };

            self.offset = body.end;
            return Ok(Some(BoxRecord { hdr, body, payload }));
        }
        Ok(None)
    }
}

impl<'a, O: BoxObserver> Iterator for BoxWalker<'a, O> {
    type Item = Result<BoxRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<O: BoxObserver> FusedIterator for BoxWalker<'_, O> {}
