use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid hex: {source}", path.display())]
    Hex {
        path: PathBuf,
        #[source]
        source: hex::FromHexError,
    },
    #[error("chunk size must be at least 1 byte")]
    ZeroChunk,
}

/// Load one direction of a captured stream, either raw bytes or a hex dump.
pub fn load(path: &Path, hex_mode: bool) -> Result<Vec<u8>, InputError> {
    let raw = fs::read(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if !hex_mode {
        return Ok(raw);
    }
    decode_hex(&String::from_utf8_lossy(&raw)).map_err(|source| InputError::Hex {
        path: path.to_path_buf(),
        source,
    })
}

/// Hex text with whitespace anywhere and `#` comments to end of line.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits: String = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.chars().filter(|c| !c.is_whitespace()))
        .collect();
    hex::decode(digits)
}

/// Split a stream into the segments it is replayed as.
pub fn chunks(data: &[u8], size: usize) -> Result<Vec<&[u8]>, InputError> {
    if size == 0 {
        return Err(InputError::ZeroChunk);
    }
    Ok(data.chunks(size).collect())
}
