//! The framebuffer: a channel-packed float image plus a minimal binary
//! file format (`FBUF`) for round-tripping it. The wire format is fixed
//! little-endian regardless of host byte order, so fields are packed and
//! unpacked byte-by-byte rather than cast through the host's native
//! representation.

use std::io::{Read, Write};

use crate::error::RenderError;

const MAGIC: [u8; 4] = *b"FBUF";
const FORMAT_VERSION: i32 = 1;
const HEADER_LEN: usize = 52;

/// Fixed-layout file header: magic, version, dimensions, and the view/data
/// boxes. This crate's `FrameBuffer` always renders its full extent, so
/// both boxes cover the whole image; they exist in the header for readers
/// that expect a cropped-save data window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Header {
    version: i32,
    width: u32,
    height: u32,
    channels: u32,
    view_box: [i32; 4],
    data_box: [i32; 4],
}

impl Header {
    fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.width.to_le_bytes());
        buf[12..16].copy_from_slice(&self.height.to_le_bytes());
        buf[16..20].copy_from_slice(&self.channels.to_le_bytes());
        for (i, v) in self.view_box.iter().enumerate() {
            buf[20 + i * 4..24 + i * 4].copy_from_slice(&v.to_le_bytes());
        }
        for (i, v) in self.data_box.iter().enumerate() {
            buf[36 + i * 4..40 + i * 4].copy_from_slice(&v.to_le_bytes());
        }
        buf
    }

    fn decode(buf: &[u8; HEADER_LEN]) -> Result<Self, RenderError> {
        if buf[0..4] != MAGIC {
            return Err(RenderError::MalformedFile {
                path: "<framebuffer>".into(),
                reason: "bad magic".into(),
            });
        }
        let read_i32 = |off: usize| i32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
        let read_u32 = |off: usize| u32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
        let view_box = [read_i32(20), read_i32(24), read_i32(28), read_i32(32)];
        let data_box = [read_i32(36), read_i32(40), read_i32(44), read_i32(48)];
        Ok(Self {
            version: read_i32(4),
            width: read_u32(8),
            height: read_u32(12),
            channels: read_u32(16),
            view_box,
            data_box,
        })
    }
}

/// A rendered image: `width * height * channels` interleaved `f32`
/// samples, row-major, origin at the top-left.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, channels: u32) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0.0; width as usize * height as usize * channels as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn channels(&self) -> u32 {
        self.channels
    }

    #[inline]
    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    /// Returns the channel samples for pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[f32] {
        let off = self.pixel_offset(x, y);
        &self.data[off..off + self.channels as usize]
    }

    /// Overwrites the channel samples for pixel `(x, y)`. `samples.len()`
    /// must equal `channels()`.
    pub fn set_pixel(&mut self, x: u32, y: u32, samples: &[f32]) {
        debug_assert_eq!(samples.len(), self.channels as usize);
        let off = self.pixel_offset(x, y);
        self.data[off..off + self.channels as usize].copy_from_slice(samples);
    }

    /// Writes this framebuffer to `writer` in the `FBUF` format: a fixed
    /// 52-byte header followed by the raw sample data, both little-endian.
    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), RenderError> {
        let full_box = [0, 0, self.width as i32, self.height as i32];
        let header = Header {
            version: FORMAT_VERSION,
            width: self.width,
            height: self.height,
            channels: self.channels,
            view_box: full_box,
            data_box: full_box,
        };
        writer
            .write_all(&header.encode())
            .map_err(|source| RenderError::Io {
                path: "<framebuffer>".into(),
                source,
            })?;

        let mut payload = Vec::with_capacity(self.data.len() * 4);
        for sample in &self.data {
            payload.extend_from_slice(&sample.to_le_bytes());
        }
        writer.write_all(&payload).map_err(|source| RenderError::Io {
            path: "<framebuffer>".into(),
            source,
        })
    }

    /// Reads a framebuffer previously written by [`Self::write_to`].
    pub fn read_from(reader: &mut impl Read) -> Result<Self, RenderError> {
        let mut header_bytes = [0u8; HEADER_LEN];
        reader
            .read_exact(&mut header_bytes)
            .map_err(|source| RenderError::Io {
                path: "<framebuffer>".into(),
                source,
            })?;
        let header = Header::decode(&header_bytes)?;
        if header.version != FORMAT_VERSION {
            return Err(RenderError::MalformedFile {
                path: "<framebuffer>".into(),
                reason: format!("unsupported version {}", header.version),
            });
        }

        let sample_count = header.width as usize * header.height as usize * header.channels as usize;
        let mut raw = vec![0u8; sample_count * 4];
        reader.read_exact(&mut raw).map_err(|source| RenderError::Io {
            path: "<framebuffer>".into(),
            source,
        })?;
        let data = raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect();

        Ok(Self {
            width: header.width,
            height: header.height,
            channels: header.channels,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_binary_format() {
        let mut fb = FrameBuffer::new(2, 2, 4);
        fb.set_pixel(0, 0, &[1.0, 0.0, 0.0, 1.0]);
        fb.set_pixel(1, 1, &[0.0, 1.0, 0.0, 0.5]);

        let mut bytes = Vec::new();
        fb.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 2 * 2 * 4 * 4);
        let read_back = FrameBuffer::read_from(&mut &bytes[..]).unwrap();

        assert_eq!(read_back.width(), 2);
        assert_eq!(read_back.height(), 2);
        assert_eq!(read_back.pixel(0, 0), &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(read_back.pixel(1, 1), &[0.0, 1.0, 0.0, 0.5]);
    }

    #[test]
    fn header_fields_land_at_their_documented_offsets() {
        let fb = FrameBuffer::new(3, 5, 4);
        let mut bytes = Vec::new();
        fb.write_to(&mut bytes).unwrap();

        assert_eq!(&bytes[0..4], b"FBUF");
        assert_eq!(i32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 5);
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 4);
        let view_box_xmax = i32::from_le_bytes(bytes[28..32].try_into().unwrap());
        assert_eq!(view_box_xmax, 3);
        let data_box_ymax = i32::from_le_bytes(bytes[48..52].try_into().unwrap());
        assert_eq!(data_box_ymax, 5);
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = vec![0u8; HEADER_LEN];
        let err = FrameBuffer::read_from(&mut &bytes[..]).unwrap_err();
        assert!(matches!(err, RenderError::MalformedFile { .. }));
    }
}
