//! Binary heightmap snapshots
//!
//! Layout: a fixed [`SnapshotHeader`], then `resolution²` native-endian `f32`
//! heights, then `resolution²` material bytes. Derived state (mipmap,
//! inverse scales, minimum height) is rebuilt on load.

use bytemuck::{Pod, Zeroable};

use super::{HeightMap, HeightMapError, MAX_RESOLUTION};

const MAGIC: [u8; 4] = *b"HMAP";
const VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct SnapshotHeader {
    magic: [u8; 4],
    version: u32,
    resolution: u32,
    horizontal_scale: f32,
    vertical_scale: f32,
    max_dh1: f32,
    max_dh11: f32,
}

impl HeightMap {
    /// Serialize samples, materials and settings
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = SnapshotHeader {
            magic: MAGIC,
            version: VERSION,
            // Bounded by MAX_RESOLUTION.
            resolution: self.resolution as u32,
            horizontal_scale: self.horizontal_scale,
            vertical_scale: self.vertical_scale,
            max_dh1: self.max_dh1,
            max_dh11: self.max_dh11,
        };
        let heights: &[u8] = bytemuck::cast_slice(&self.heights);
        let mut bytes =
            Vec::with_capacity(std::mem::size_of::<SnapshotHeader>() + heights.len() + self.material.len());
        bytes.extend_from_slice(bytemuck::bytes_of(&header));
        bytes.extend_from_slice(heights);
        bytes.extend_from_slice(&self.material);
        bytes
    }

    /// Rebuild a map from [`HeightMap::to_bytes`] output
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeightMapError> {
        let header_len = std::mem::size_of::<SnapshotHeader>();
        let header: SnapshotHeader = bytes
            .get(..header_len)
            .map(bytemuck::pod_read_unaligned)
            .ok_or_else(|| HeightMapError::Snapshot(format!("{} bytes is shorter than the header", bytes.len())))?;
        if header.magic != MAGIC {
            return Err(HeightMapError::Snapshot("bad magic".to_string()));
        }
        if header.version != VERSION {
            return Err(HeightMapError::Snapshot(format!("unsupported version {}", header.version)));
        }

        let resolution = header.resolution as usize;
        if resolution > MAX_RESOLUTION {
            return Err(HeightMapError::InvalidResolution(resolution));
        }
        let (heights_len, expected) = resolution
            .checked_mul(resolution)
            .and_then(|samples| {
                let heights_len = samples.checked_mul(std::mem::size_of::<f32>())?;
                let expected = header_len.checked_add(heights_len)?.checked_add(samples)?;
                Some((heights_len, expected))
            })
            .ok_or_else(|| HeightMapError::Snapshot(format!("resolution {resolution} overflows the snapshot size")))?;
        if bytes.len() != expected {
            return Err(HeightMapError::Snapshot(format!(
                "expected {expected} bytes for resolution {resolution}, got {}",
                bytes.len()
            )));
        }

        let mut map = Self::new(resolution, header.horizontal_scale, header.vertical_scale)?;
        map.max_dh1 = header.max_dh1;
        map.max_dh11 = header.max_dh11;
        let heights: Vec<f32> = bytes[header_len..header_len + heights_len]
            .chunks_exact(std::mem::size_of::<f32>())
            .map(bytemuck::pod_read_unaligned)
            .collect();
        map.init_set(&heights, &bytes[header_len + heights_len..])?;
        log::debug!("Loaded {resolution}x{resolution} heightmap snapshot");
        Ok(map)
    }
}
