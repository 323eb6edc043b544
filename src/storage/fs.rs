use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use uuid::Uuid;

use super::{ChunkId, ChunkStore, StoreError, UploadStream};

/// Store de chunks sur système de fichiers: un fichier par identifiant.
pub struct FsChunkStore {
    root: PathBuf,
}

impl FsChunkStore {
    /// Ouvre un store enraciné dans `root`, créé si nécessaire.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Chemin du fichier final d'un chunk.
    fn chunk_path(&self, id: &ChunkId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

impl ChunkStore for FsChunkStore {
    fn open_upload_stream(&self, name: &str) -> Result<Box<dyn UploadStream>, StoreError> {
        let id = ChunkId::from_raw(Uuid::new_v4().simple().to_string());
        let final_path = self.chunk_path(&id);
        // Écriture en `.part` puis rename: un chunk visible est toujours complet.
        let part_path = final_path.with_extension("part");
        let file = File::create(&part_path)?;
        log::debug!("[storage] upload stream opened for '{}' -> {}", name, id);
        Ok(Box::new(FsUploadStream {
            id,
            part_path,
            final_path,
            writer: BufWriter::new(file),
            finished: false,
        }))
    }

    fn open_download_stream(&self, id: &ChunkId) -> Result<Box<dyn Read + Send>, StoreError> {
        match File::open(self.chunk_path(id)) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Flux d'upload vers un fichier `.part`, renommé à la finalisation.
struct FsUploadStream {
    id: ChunkId,
    part_path: PathBuf,
    final_path: PathBuf,
    writer: BufWriter<File>,
    finished: bool,
}

impl Write for FsUploadStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl UploadStream for FsUploadStream {
    fn finish(mut self: Box<Self>) -> Result<ChunkId, StoreError> {
        self.writer.flush()?;
        fs::rename(&self.part_path, &self.final_path)?;
        self.finished = true;
        Ok(self.id.clone())
    }
}

impl Drop for FsUploadStream {
    /// Un upload abandonné ne laisse pas de fichier `.part` derrière lui.
    fn drop(&mut self) {
        if !self.finished {
            let _ = fs::remove_file(&self.part_path);
        }
    }
}
