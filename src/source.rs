use std::fs;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[cfg(feature = "http")]
    #[error("failed to fetch {uri}: {source}")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Supplies the whole input buffer up front. The walker never sees partial
/// input.
pub trait BufferSource {
    fn get_buffer(&self) -> Result<Vec<u8>, SourceError>;

    /// Where the bytes come from, for log and error messages.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BufferSource for FileSource {
    fn get_buffer(&self) -> Result<Vec<u8>, SourceError> {
        fs::read(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Already-loaded bytes, e.g. from a host that fetched them itself.
#[derive(Debug, Clone)]
pub struct MemorySource(pub Vec<u8>);

impl BufferSource for MemorySource {
    fn get_buffer(&self) -> Result<Vec<u8>, SourceError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("<{} bytes in memory>", self.0.len())
    }
}

#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    uri: String,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

#[cfg(feature = "http")]
impl BufferSource for HttpSource {
    fn get_buffer(&self) -> Result<Vec<u8>, SourceError> {
        let transport = |source| SourceError::Transport {
            uri: self.uri.clone(),
            source,
        };
        let response = reqwest::blocking::get(&self.uri)
            .and_then(|r| r.error_for_status())
            .map_err(transport)?;
        let bytes = response.bytes().map_err(transport)?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.uri.clone()
    }
}
