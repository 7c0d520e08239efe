use crate::payload::ImageDescriptor;
use std::fs;
use std::path::PathBuf;

/// Mime type handed to the sink for every Base64 image.
pub const PNG_MIME: &str = "image/png";

/// Turns a decoded image descriptor into something displayable.
///
/// The base64 text is passed through untouched; whether it really holds a
/// PNG is the sink's business.
pub trait ImageSink {
    fn render(&mut self, mime_type: &str, base64_data: &str) -> anyhow::Result<()>;
}

impl<T: ImageSink + ?Sized> ImageSink for &mut T {
    fn render(&mut self, mime_type: &str, base64_data: &str) -> anyhow::Result<()> {
        (**self).render(mime_type, base64_data)
    }
}

pub fn render_image<S: ImageSink + ?Sized>(sink: &mut S, image: &ImageDescriptor) -> anyhow::Result<()> {
    sink.render(PNG_MIME, &image.encoded_data)
}

/// Keeps every `(mime_type, base64_data)` pair in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    pub images: Vec<(String, String)>,
}

impl ImageSink for CollectSink {
    fn render(&mut self, mime_type: &str, base64_data: &str) -> anyhow::Result<()> {
        self.images.push((mime_type.to_string(), base64_data.to_string()));
        Ok(())
    }
}

/// Discards everything. For runs that only want the box listing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ImageSink for NullSink {
    fn render(&mut self, _mime_type: &str, _base64_data: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Decodes each image and writes it to `<dir>/image-<n>.png`.
#[derive(Debug)]
pub struct PngDirSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ImageSink for PngDirSink {
    fn render(&mut self, mime_type: &str, base64_data: &str) -> anyhow::Result<()> {
        let ext = match mime_type {
            PNG_MIME => "png",
            _ => "bin",
        };
        // base64 text in SMPTE-TT is commonly wrapped across lines
        let compact: String = base64_data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = rbase64::decode(&compact)
            .map_err(|e| anyhow::anyhow!("invalid base64 image data: {e}"))?;

        let path = self.dir.join(format!("image-{}.{ext}", self.written.len()));
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), "wrote image");
        self.written.push(path);
        Ok(())
    }
}
