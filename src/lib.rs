pub mod api;
pub mod boxes;
pub mod known_boxes;
pub mod observer;
pub mod parser;
pub mod payload;
pub mod render;
pub mod source;
pub mod util;

pub use api::{Analysis, AnalyzeError, BoxSummary, analyze, analyze_source, analyze_with};
pub use boxes::{BoxHeader, BoxRecord, FourCC, HEADER_SIZE};
pub use parser::{BoxWalker, ParseError, read_box_header, walk, walk_all, walk_with};
pub use payload::{ImageDescriptor, PayloadError, extract_images, images_or_empty};
pub use render::{ImageSink, PNG_MIME};
pub use source::{BufferSource, FileSource, SourceError};
