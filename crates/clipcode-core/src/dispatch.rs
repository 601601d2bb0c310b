use crate::mapping::{Code, MappingIndex};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Destination of dispatched snippet text (the system clipboard in production).
pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid text")]
    Decode { path: PathBuf },
    #[error("clipboard rejected {path}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Reads indexed files and forwards their content to the sink.
/// Every delivery re-reads the file; nothing is cached.
pub struct Dispatcher {
    index: Arc<MappingIndex>,
    sink: Arc<dyn ClipboardSink>,
}

impl Dispatcher {
    pub fn new(index: Arc<MappingIndex>, sink: Arc<dyn ClipboardSink>) -> Self {
        Self { index, sink }
    }

    pub fn index(&self) -> &MappingIndex {
        &self.index
    }

    /// Delivers the file behind `code`. Failures are logged, never returned.
    pub fn dispatch(&self, code: &Code) {
        match self.index.get(code) {
            Some(path) => self.deliver(path),
            None => warn!("No file indexed for {}", code),
        }
    }

    /// Delivers an already resolved path. Failures are logged, never returned.
    pub fn deliver(&self, path: &Path) {
        match self.try_deliver(path) {
            Ok(()) => info!("Copied content from {}", file_name(path)),
            Err(e) => error!("Failed to copy {}: {}", path.display(), e),
        }
    }

    pub fn try_deliver(&self, path: &Path) -> Result<(), DispatchError> {
        let raw = std::fs::read(path).map_err(|source| DispatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = decode_text(&raw).ok_or_else(|| DispatchError::Decode {
            path: path.to_path_buf(),
        })?;
        self.sink
            .set_text(&text)
            .map_err(|e| DispatchError::Sink {
                path: path.to_path_buf(),
                source: e.into(),
            })
    }
}

fn file_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}

/// Decodes with BOM sniffing; BOM-less content must be UTF-8.
fn decode_text(raw: &[u8]) -> Option<Cow<'_, str>> {
    if let Some((enc, bom_len)) = encoding_rs::Encoding::for_bom(raw) {
        debug!("Decoding using BOM: {}", enc.name());
        return enc
            .decode_without_bom_handling_and_without_replacement(&raw[bom_len..]);
    }
    std::str::from_utf8(raw).ok().map(Cow::Borrowed)
}
