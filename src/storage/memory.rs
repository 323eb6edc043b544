use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::{ChunkId, ChunkStore, StoreError, UploadStream};

type SharedChunks = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// Store de chunks en mémoire, partagé entre clones.
#[derive(Clone, Default)]
pub struct MemoryChunkStore {
    chunks: SharedChunks,
}

impl MemoryChunkStore {
    /// Construit un store vide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nombre de chunks stockés.
    pub fn len(&self) -> usize {
        self.chunks.lock().map(|chunks| chunks.len()).unwrap_or(0)
    }

    /// Indique si le store est vide.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indique si le chunk `id` est présent.
    pub fn contains(&self, id: &ChunkId) -> bool {
        self.chunks
            .lock()
            .map(|chunks| chunks.contains_key(id.as_str()))
            .unwrap_or(false)
    }
}

impl ChunkStore for MemoryChunkStore {
    fn open_upload_stream(&self, name: &str) -> Result<Box<dyn UploadStream>, StoreError> {
        log::debug!("[storage] in-memory upload stream opened for '{}'", name);
        Ok(Box::new(MemoryUploadStream {
            id: ChunkId::from_raw(Uuid::new_v4().simple().to_string()),
            buffer: Vec::new(),
            chunks: Arc::clone(&self.chunks),
        }))
    }

    fn open_download_stream(&self, id: &ChunkId) -> Result<Box<dyn Read + Send>, StoreError> {
        let chunks = self
            .chunks
            .lock()
            .map_err(|_| StoreError::Backend("chunk map poisoned".to_string()))?;
        match chunks.get(id.as_str()) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}

/// Flux d'upload bufferisé, inséré dans la map à la finalisation.
struct MemoryUploadStream {
    id: ChunkId,
    buffer: Vec<u8>,
    chunks: SharedChunks,
}

impl Write for MemoryUploadStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl UploadStream for MemoryUploadStream {
    fn finish(self: Box<Self>) -> Result<ChunkId, StoreError> {
        let mut chunks = self
            .chunks
            .lock()
            .map_err(|_| StoreError::Backend("chunk map poisoned".to_string()))?;
        chunks.insert(self.id.as_str().to_string(), self.buffer);
        Ok(self.id)
    }
}
