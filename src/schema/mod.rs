//! The vertex attribute block schema: channel and stream descriptors plus the
//! per-stream byte layout math shared by every conversion stage.

pub mod channels;
pub mod legacy;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TranscodeError};
use crate::types::{ElementFormat, SchemaEra, SemanticAttribute};

/// Highest stream index any supported serializer emits.
pub const MAX_STREAMS: usize = 8;

/// A descriptor binding one semantic attribute slot to a stream, byte offset,
/// element format and component count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Stream this channel's data lives in.
    pub stream_index: u8,
    /// Byte offset within the stream's per-vertex block.
    pub byte_offset: u8,
    pub format: ElementFormat,
    /// Component count, 1-4.
    pub dimension: u8,
    /// Whether the slot carries data at all.
    pub is_set: bool,
}

impl ChannelDescriptor {
    /// An absent channel slot.
    pub const fn unset() -> Self {
        Self {
            stream_index: 0,
            byte_offset: 0,
            format: ElementFormat::Float32,
            dimension: 0,
            is_set: false,
        }
    }

    pub const fn new(
        stream_index: u8,
        byte_offset: u8,
        format: ElementFormat,
        dimension: u8,
    ) -> Self {
        Self {
            stream_index,
            byte_offset,
            format,
            dimension,
            is_set: true,
        }
    }

    /// Bytes one vertex's worth of this channel occupies.
    pub fn stride(&self) -> usize {
        self.dimension as usize * self.format.element_width()
    }
}

impl Default for ChannelDescriptor {
    fn default() -> Self {
        Self::unset()
    }
}

/// Legacy-era stream descriptor: which attributes the stream packs and its
/// declared per-vertex stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Bitmask over the fixed legacy attribute order.
    pub channel_mask: u32,
    pub stride: u8,
}

impl StreamDescriptor {
    pub const fn new(channel_mask: u32, stride: u8) -> Self {
        Self {
            channel_mask,
            stride,
        }
    }

    pub fn has_attribute(&self, attribute: SemanticAttribute) -> bool {
        legacy::legacy_bit(attribute).is_some_and(|bit| self.channel_mask & (1 << bit) != 0)
    }
}

/// Per-stream byte layout of a payload buffer.
///
/// Streams are laid out contiguously in index order; a stream's region is
/// `stride * vertex_count` bytes with no padding between regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLayout {
    strides: Vec<usize>,
    vertex_count: usize,
}

impl StreamLayout {
    /// Layout of a channel-era block: a stream's stride is the sum of the
    /// strides of the set channels assigned to it.
    pub fn from_channels(channels: &[ChannelDescriptor], vertex_count: u32) -> Self {
        let stream_count = channels
            .iter()
            .filter(|c| c.is_set)
            .map(|c| c.stream_index as usize + 1)
            .max()
            .unwrap_or(0);
        let mut strides = vec![0usize; stream_count];
        for channel in channels.iter().filter(|c| c.is_set) {
            strides[channel.stream_index as usize] += channel.stride();
        }
        Self {
            strides,
            vertex_count: vertex_count as usize,
        }
    }

    /// Layout of a legacy block: declared strides are authoritative.
    pub fn from_streams(streams: &[StreamDescriptor], vertex_count: u32) -> Self {
        Self {
            strides: streams.iter().map(|s| s.stride as usize).collect(),
            vertex_count: vertex_count as usize,
        }
    }

    pub fn stream_count(&self) -> usize {
        self.strides.len()
    }

    /// Per-vertex stride of one stream.
    pub fn stride(&self, stream: usize) -> usize {
        self.strides.get(stream).copied().unwrap_or(0)
    }

    /// Byte size of one stream's region.
    pub fn size(&self, stream: usize) -> usize {
        self.stride(stream) * self.vertex_count
    }

    /// Byte offset of a stream's region within the payload.
    pub fn offset(&self, stream: usize) -> usize {
        self.strides[..stream.min(self.strides.len())]
            .iter()
            .map(|stride| stride * self.vertex_count)
            .sum()
    }

    /// Total payload size the layout requires.
    pub fn total_size(&self) -> usize {
        self.offset(self.strides.len())
    }
}

/// The vertex-data record of a mesh in one concrete schema era.
///
/// Built once by a conversion and handed to the caller for serialization;
/// never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeBlock {
    /// Bitmask of active attributes in this block's era bit positions.
    pub current_mask: u32,
    pub vertex_count: u32,
    /// Channel array, 6/8/14 entries; empty for legacy blocks.
    pub channels: Vec<ChannelDescriptor>,
    /// Stream descriptors; non-empty only for legacy blocks.
    pub streams: Vec<StreamDescriptor>,
    /// Raw per-vertex attribute data, tightly packed per stream.
    pub payload: Vec<u8>,
}

impl AttributeBlock {
    /// Whether this block uses the legacy per-stream schema.
    pub fn is_legacy(&self) -> bool {
        self.channels.is_empty()
    }

    /// The stream layout this block's descriptors imply.
    pub fn layout(&self) -> StreamLayout {
        if self.is_legacy() {
            StreamLayout::from_streams(&self.streams, self.vertex_count)
        } else {
            StreamLayout::from_channels(&self.channels, self.vertex_count)
        }
    }

    /// Validate the structural invariants of a block serialized by `era`.
    ///
    /// The payload is passed separately because sources may keep it outside
    /// the block; pass the block's own payload otherwise. Every violation is
    /// fatal: offsets computed from a malformed block would be meaningless.
    pub fn validate(&self, era: SchemaEra, payload: &[u8]) -> Result<()> {
        match era {
            SchemaEra::Legacy => {
                if !self.channels.is_empty() {
                    return Err(TranscodeError::MalformedSource(
                        "legacy block carries a channel array".to_string(),
                    ));
                }
                if self.streams.len() > MAX_STREAMS {
                    return Err(TranscodeError::MalformedSource(format!(
                        "{} streams exceeds the schema cap of {}",
                        self.streams.len(),
                        MAX_STREAMS
                    )));
                }
                for (index, stream) in self.streams.iter().enumerate() {
                    let packed = legacy::packed_width(stream.channel_mask);
                    if packed > stream.stride as usize {
                        return Err(TranscodeError::MalformedSource(format!(
                            "stream {index} packs {packed} bytes into a declared stride of {}",
                            stream.stride
                        )));
                    }
                }
                if self.current_mask != legacy::combined_mask(&self.streams) {
                    return Err(TranscodeError::MalformedSource(
                        "attribute mask disagrees with stream masks".to_string(),
                    ));
                }
            }
            _ => {
                let expected = channels::channel_count(era);
                if self.channels.len() != expected {
                    return Err(TranscodeError::MalformedSource(format!(
                        "expected {expected} channel entries for {era:?}, found {}",
                        self.channels.len()
                    )));
                }
                if !self.streams.is_empty() {
                    return Err(TranscodeError::MalformedSource(
                        "channel-era block carries stream descriptors".to_string(),
                    ));
                }
                let layout = self.layout();
                for (index, channel) in self.channels.iter().enumerate() {
                    if !channel.is_set {
                        continue;
                    }
                    if channel.stream_index as usize >= MAX_STREAMS {
                        return Err(TranscodeError::MalformedSource(format!(
                            "channel {index} references stream {} beyond the schema cap of {}",
                            channel.stream_index, MAX_STREAMS
                        )));
                    }
                    let stream_stride = layout.stride(channel.stream_index as usize);
                    if channel.byte_offset as usize + channel.stride() > stream_stride {
                        return Err(TranscodeError::MalformedSource(format!(
                            "channel {index} extends past the {stream_stride}-byte stride of stream {}",
                            channel.stream_index
                        )));
                    }
                }
                if self.current_mask != channels::mask_for_channels(&self.channels) {
                    return Err(TranscodeError::MalformedSource(
                        "attribute mask disagrees with the channel array".to_string(),
                    ));
                }
            }
        }

        let required = self.layout().total_size();
        if payload.len() != required {
            return Err(TranscodeError::MalformedSource(format!(
                "payload is {} bytes, stream layout requires {required}",
                payload.len()
            )));
        }
        Ok(())
    }
}
