//! In-memory [`HttpSource`] that records every request, for call-count assertions.

use crate::http::{HttpSource, TransferError};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct RecordingSource {
    docs: HashMap<String, Vec<u8>>,
    /// Bodies served by `download`, one per call; the last one repeats.
    artifacts: HashMap<String, Vec<Vec<u8>>>,
    gets: Mutex<Vec<String>>,
    downloads: Mutex<Vec<String>>,
}

impl RecordingSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_doc(mut self, url: &str, body: &str) -> Self {
        self.docs.insert(url.to_string(), body.as_bytes().to_vec());
        self
    }

    pub(crate) fn with_artifact(mut self, url: &str, bodies: &[&[u8]]) -> Self {
        self.artifacts
            .insert(url.to_string(), bodies.iter().map(|b| b.to_vec()).collect());
        self
    }

    pub(crate) fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub(crate) fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

impl HttpSource for RecordingSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        self.gets.lock().unwrap().push(url.to_string());
        self.docs.get(url).cloned().ok_or(TransferError::Http(404))
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransferError> {
        let mut downloads = self.downloads.lock().unwrap();
        let nth = downloads.iter().filter(|u| u.as_str() == url).count();
        downloads.push(url.to_string());
        let bodies = self.artifacts.get(url).ok_or(TransferError::Http(404))?;
        let body = bodies
            .get(nth)
            .or_else(|| bodies.last())
            .ok_or(TransferError::Http(404))?;
        sink.write_all(body).map_err(TransferError::Sink)?;
        Ok(body.len() as u64)
    }
}
