//! Byte codecs for the grid and the player.
//!
//! Both formats share a 14-byte little-endian header (magic, version, crc32,
//! payload length) followed by the payload. The grid payload is zstd
//! compressed `width, height, cells...`; the player payload is bincode.
//! These functions only convert between values and bytes; where the bytes
//! are stored is the caller's concern.

use crc32fast::Hasher;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::is_known;
use crate::grid::Grid;
use crate::inventory::Inventory;

/// "TCGD" = tilecraft grid.
const GRID_MAGIC: u32 = 0x5443_4744;
/// "TCPL" = tilecraft player.
const PLAYER_MAGIC: u32 = 0x5443_504C;
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 14;
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("data too short: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
    #[error("invalid magic: expected 0x{expected:08X}, got 0x{found:08X}")]
    BadMagic { expected: u32, found: u32 },
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    #[error("crc32 mismatch: header says 0x{expected:08X}, payload is 0x{found:08X}")]
    CrcMismatch { expected: u32, found: u32 },
    #[error("grid is {width}x{height} but payload holds {cells} cells")]
    DimensionMismatch { width: u32, height: u32, cells: usize },
    #[error("unknown block id {0}")]
    UnknownBlock(u8),
    #[error("player field `{0}` is not a finite number")]
    NonFinite(&'static str),
    #[error("compression error: {0}")]
    Compression(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug, Clone)]
struct Header {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl Header {
    fn new(magic: u32, payload: &[u8]) -> Self {
        Self {
            magic,
            version: FORMAT_VERSION,
            crc32: checksum(payload),
            payload_len: payload.len() as u32,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.crc32.to_le_bytes());
        out.extend_from_slice(&self.payload_len.to_le_bytes());
    }

    fn read(bytes: &[u8]) -> PersistResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(PersistError::Truncated {
                needed: HEADER_LEN,
                got: bytes.len(),
            });
        }
        Ok(Self {
            magic: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            crc32: u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]),
            payload_len: u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]),
        })
    }
}

fn checksum(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

fn frame(magic: u32, payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    Header::new(magic, &payload).write(&mut out);
    out.extend_from_slice(&payload);
    out
}

/// Validate the header and return the payload slice.
fn unframe(magic: u32, bytes: &[u8]) -> PersistResult<&[u8]> {
    let header = Header::read(bytes)?;
    if header.magic != magic {
        return Err(PersistError::BadMagic {
            expected: magic,
            found: header.magic,
        });
    }
    if header.version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(header.version));
    }

    let needed = HEADER_LEN + header.payload_len as usize;
    if bytes.len() < needed {
        return Err(PersistError::Truncated {
            needed,
            got: bytes.len(),
        });
    }
    let payload = &bytes[HEADER_LEN..needed];

    let found = checksum(payload);
    if found != header.crc32 {
        return Err(PersistError::CrcMismatch {
            expected: header.crc32,
            found,
        });
    }
    Ok(payload)
}

/// Serialize a grid.
pub fn encode_grid(grid: &Grid) -> PersistResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(8 + grid.cells().len());
    raw.extend_from_slice(&grid.width().to_le_bytes());
    raw.extend_from_slice(&grid.height().to_le_bytes());
    raw.extend_from_slice(grid.cells());
    let compressed = zstd::encode_all(raw.as_slice(), ZSTD_LEVEL)?;
    Ok(frame(GRID_MAGIC, compressed))
}

/// Deserialize a grid produced by [`encode_grid`].
pub fn decode_grid(bytes: &[u8]) -> PersistResult<Grid> {
    let payload = unframe(GRID_MAGIC, bytes)?;
    let raw = zstd::decode_all(payload)?;
    if raw.len() < 8 {
        return Err(PersistError::Truncated {
            needed: 8,
            got: raw.len(),
        });
    }

    let width = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    let height = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
    let cells = raw[8..].to_vec();
    if width == 0 || height == 0 || cells.len() as u64 != width as u64 * height as u64 {
        return Err(PersistError::DimensionMismatch {
            width,
            height,
            cells: cells.len(),
        });
    }
    if let Some(&bad) = cells.iter().find(|&&id| !is_known(id)) {
        return Err(PersistError::UnknownBlock(bad));
    }

    Grid::from_cells(width, height, cells).ok_or(PersistError::DimensionMismatch {
        width,
        height,
        cells: width as usize * height as usize,
    })
}

/// Persistent part of the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSave {
    pub position: [f32; 2],
    pub life: f32,
    pub max_life: f32,
    pub inventory: Inventory,
}

impl PlayerSave {
    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    fn validate(&self) -> PersistResult<()> {
        let fields = [
            ("position.x", self.position[0]),
            ("position.y", self.position[1]),
            ("life", self.life),
            ("max_life", self.max_life),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, _)) => Err(PersistError::NonFinite(*name)),
            None => Ok(()),
        }
    }
}

/// Serialize player state.
pub fn encode_player(player: &PlayerSave) -> PersistResult<Vec<u8>> {
    let payload = bincode::serialize(player)?;
    Ok(frame(PLAYER_MAGIC, payload))
}

/// Deserialize player state produced by [`encode_player`].
pub fn decode_player(bytes: &[u8]) -> PersistResult<PlayerSave> {
    let payload = unframe(PLAYER_MAGIC, bytes)?;
    let player: PlayerSave = bincode::deserialize(payload)?;
    player.validate()?;
    Ok(player)
}
