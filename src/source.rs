//! Restartable chunk sources for the streaming encoder.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::traits::{ChunkPass, ChunkSource};

/// Serves an in-memory buffer as a sequence of chunks.
#[derive(Debug, Clone)]
pub struct MemoryChunkSource {
    chunks: Vec<Vec<u8>>,
}

impl MemoryChunkSource {
    /// Splits `data` into chunks of `chunk_size` bytes (the last may be shorter).
    pub fn new(data: &[u8], chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunks: data.chunks(chunk_size).map(<[u8]>::to_vec).collect(),
        }
    }

    /// Uses the given chunk layout verbatim, including empty chunks.
    pub fn from_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self { chunks }
    }
}

impl ChunkSource for MemoryChunkSource {
    fn open_pass(&self) -> Result<ChunkPass<'_>> {
        Ok(Box::new(self.chunks.iter().cloned().map(Ok)))
    }
}

/// Reads a file in fixed-size chunks, re-opening it for every pass.
#[derive(Debug, Clone)]
pub struct FileChunkSource {
    path: PathBuf,
    chunk_size: usize,
}

impl FileChunkSource {
    pub fn new(path: impl AsRef<Path>, chunk_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chunk_size: chunk_size.max(1),
        }
    }
}

impl ChunkSource for FileChunkSource {
    fn open_pass(&self) -> Result<ChunkPass<'_>> {
        let file = File::open(&self.path)?;
        log::debug!("opened read pass over {}", self.path.display());
        Ok(Box::new(FileChunks {
            file,
            chunk_size: self.chunk_size,
            finished: false,
        }))
    }
}

struct FileChunks {
    file: File,
    chunk_size: usize,
    finished: bool,
}

impl Iterator for FileChunks {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut chunk = Vec::with_capacity(self.chunk_size);
        match (&mut self.file)
            .take(self.chunk_size as u64)
            .read_to_end(&mut chunk)
        {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => Some(Ok(chunk)),
            Err(e) => {
                self.finished = true;
                Some(Err(e.into()))
            }
        }
    }
}
