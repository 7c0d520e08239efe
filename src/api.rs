use crate::{
    boxes::{BoxRecord, FourCC},
    known_boxes::KnownBox,
    observer::{BoxObserver, TracingObserver},
    parser::{ParseError, walk_with},
    payload::{ImageDescriptor, images_or_empty},
    render::{ImageSink, render_image},
    source::{BufferSource, SourceError},
};
use serde::Serialize;

/// Failure of one analysis, tagged by the stage that failed.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
    #[error("could not acquire input: {0}")]
    Acquire(#[from] SourceError),
    #[error("invalid box structure: {0}")]
    Structure(#[from] ParseError),
    #[error("could not render image {index}: {source}")]
    Render {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// A JSON-serializable view of one walked box.
#[derive(Debug, Clone, Serialize)]
pub struct BoxSummary {
    /// Absolute byte offset of the box header
    pub offset: usize,
    /// Total size including the 8-byte header
    pub size: u32,
    pub typ: FourCC,
    /// Human-readable box type name (e.g. "Media Data Box")
    pub full_name: &'static str,
    pub body_offset: usize,
    pub body_size: usize,
    /// Images found in this box, for payload boxes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageDescriptor>>,
}

impl BoxSummary {
    fn from_record(rec: &BoxRecord<'_>) -> Self {
        BoxSummary {
            offset: rec.hdr.start,
            size: rec.hdr.size,
            typ: rec.hdr.typ,
            full_name: KnownBox::from(rec.hdr.typ).full_name(),
            body_offset: rec.body.start,
            body_size: rec.body.len(),
            images: None,
        }
    }
}

/// Result of one complete walk.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Leaf and payload boxes in file order; containers are flattened away.
    pub boxes: Vec<BoxSummary>,
    /// Bytes consumed by the walk. Equals the buffer length.
    pub consumed: usize,
    /// Number of images handed to the sink.
    pub rendered: usize,
}

impl Analysis {
    pub fn images(&self) -> impl Iterator<Item = &ImageDescriptor> {
        self.boxes.iter().filter_map(|b| b.images.as_deref()).flatten()
    }
}

/// Walks `buf`, extracts images from every payload box and hands each one
/// to `sink`.
///
/// Structural errors abort the analysis. Payloads that do not parse only
/// contribute zero images.
pub fn analyze_with<O, S>(buf: &[u8], observer: O, sink: &mut S) -> Result<Analysis, AnalyzeError>
where
    O: BoxObserver,
    S: ImageSink + ?Sized,
{
    let mut walker = walk_with(buf, observer);
    let mut boxes = Vec::new();
    let mut rendered = 0;

    for rec in walker.by_ref() {
        let rec = rec?;
        let mut summary = BoxSummary::from_record(&rec);
        if let Some(payload) = rec.payload {
            let images = images_or_empty(payload);
            for image in &images {
                render_image(sink, image).map_err(|source| AnalyzeError::Render {
                    index: rendered,
                    source,
                })?;
                rendered += 1;
            }
            summary.images = Some(images);
        }
        boxes.push(summary);
    }

    Ok(Analysis {
        boxes,
        consumed: walker.position(),
        rendered,
    })
}

/// [`analyze_with`] using the `tracing` diagnostics.
pub fn analyze<S: ImageSink + ?Sized>(buf: &[u8], sink: &mut S) -> Result<Analysis, AnalyzeError> {
    analyze_with(buf, TracingObserver, sink)
}

/// Acquires the buffer from `source`, then analyzes it.
pub fn analyze_source<S: ImageSink + ?Sized>(
    source: &dyn BufferSource,
    sink: &mut S,
) -> Result<Analysis, AnalyzeError> {
    let buf = source.get_buffer()?;
    tracing::info!(source = %source.describe(), len = buf.len(), "analyzing");
    analyze(&buf, sink)
}
