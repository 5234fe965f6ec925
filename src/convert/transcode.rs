//! The byte-copy engine: streams per-vertex elements between two layouts.

use crate::cursor::{EndianReader, EndianWriter};
use crate::error::Result;
use crate::schema::{channels, ChannelDescriptor, StreamLayout};
use crate::types::{ByteOrder, ElementFormat, SchemaEra, SemanticAttribute};

/// One side of a payload copy: a finished channel array with its stream
/// layout.
pub(crate) struct ChannelView<'a> {
    pub era: SchemaEra,
    pub channels: &'a [ChannelDescriptor],
    pub layout: &'a StreamLayout,
}

impl ChannelView<'_> {
    fn descriptor(&self, attribute: SemanticAttribute) -> Option<&ChannelDescriptor> {
        let index = channels::index_of(self.era, attribute)?;
        self.channels.get(index).filter(|c| c.is_set)
    }
}

/// Copy every attribute present on both sides from `payload` into `out`.
///
/// Attributes are visited in the fixed semantic order; for each one the
/// per-vertex elements are read in the source byte order and rewritten in the
/// target byte order, with both cursors skipping their respective extra
/// stride between vertices. Elements are copied bit-identically; values are
/// never interpreted.
pub(crate) fn copy_channels_data(
    source: &ChannelView<'_>,
    target: &ChannelView<'_>,
    vertex_count: u32,
    payload: &[u8],
    source_order: ByteOrder,
    target_order: ByteOrder,
    out: &mut [u8],
) -> Result<()> {
    let mut reader = EndianReader::new(payload, source_order);
    let mut writer = EndianWriter::new(out, target_order);

    for attribute in SemanticAttribute::ALL {
        let Some(src) = source.descriptor(attribute) else {
            continue;
        };
        let Some(dst) = target.descriptor(attribute) else {
            continue;
        };

        let src_extra = source.layout.stride(src.stream_index as usize) - src.stride();
        let dst_extra = target.layout.stride(dst.stream_index as usize) - dst.stride();
        reader.set_position(
            source.layout.offset(src.stream_index as usize) + src.byte_offset as usize,
        );
        writer.set_position(
            target.layout.offset(dst.stream_index as usize) + dst.byte_offset as usize,
        );

        for _ in 0..vertex_count {
            for _ in 0..src.dimension {
                match src.format {
                    ElementFormat::Float32 | ElementFormat::Int32 | ElementFormat::PackedColor32 => {
                        let element = reader.read_u32()?;
                        writer.write_u32(element)?;
                    }
                    ElementFormat::Float16 => {
                        let element = reader.read_u16()?;
                        writer.write_u16(element)?;
                    }
                    ElementFormat::UNorm8 => {
                        let element = reader.read_u8()?;
                        writer.write_u8(element)?;
                    }
                }
            }
            reader.skip(src_extra);
            writer.skip(dst_extra);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn view_era(
        era: SchemaEra,
        entries: &[(usize, ChannelDescriptor)],
    ) -> Vec<ChannelDescriptor> {
        let mut array = vec![ChannelDescriptor::unset(); channels::channel_count(era)];
        for (index, descriptor) in entries {
            array[*index] = *descriptor;
        }
        array
    }

    #[test]
    fn test_copies_exactly_attribute_bytes() {
        // Two vertices, one stream packing position and uv0; drop uv0 on the
        // way out and the positions must be extracted from the wider stride.
        let src_channels = view_era(
            SchemaEra::EightChannel,
            &[
                (0, ChannelDescriptor::new(0, 0, ElementFormat::Float32, 3)),
                (3, ChannelDescriptor::new(0, 12, ElementFormat::Float32, 2)),
            ],
        );
        let dst_channels = view_era(
            SchemaEra::EightChannel,
            &[(0, ChannelDescriptor::new(0, 0, ElementFormat::Float32, 3))],
        );
        let src_layout = StreamLayout::from_channels(&src_channels, 2);
        let dst_layout = StreamLayout::from_channels(&dst_channels, 2);

        let mut payload = Vec::new();
        for vertex in 0..2u32 {
            for component in 0..3u32 {
                payload.extend_from_slice(&((vertex * 10 + component) as f32).to_le_bytes());
            }
            payload.extend_from_slice(&0xAAAAAAAAu32.to_le_bytes());
            payload.extend_from_slice(&0xBBBBBBBBu32.to_le_bytes());
        }

        let mut out = vec![0u8; dst_layout.total_size()];
        copy_channels_data(
            &ChannelView {
                era: SchemaEra::EightChannel,
                channels: &src_channels,
                layout: &src_layout,
            },
            &ChannelView {
                era: SchemaEra::EightChannel,
                channels: &dst_channels,
                layout: &dst_layout,
            },
            2,
            &payload,
            ByteOrder::Little,
            ByteOrder::Little,
            &mut out,
        )
        .unwrap();

        assert_eq!(out.len(), 24);
        for vertex in 0..2u32 {
            for component in 0..3u32 {
                let at = (vertex * 3 + component) as usize * 4;
                let value = f32::from_le_bytes(out[at..at + 4].try_into().unwrap());
                assert_eq!(value, (vertex * 10 + component) as f32);
            }
        }
    }

    #[test]
    fn test_endian_swap_reverses_element_bytes() {
        let src_channels = view_era(
            SchemaEra::EightChannel,
            &[(0, ChannelDescriptor::new(0, 0, ElementFormat::Float32, 3))],
        );
        let layout = StreamLayout::from_channels(&src_channels, 2);

        let payload: Vec<u8> = (0u8..24).collect();
        let mut out = vec![0u8; 24];
        copy_channels_data(
            &ChannelView {
                era: SchemaEra::EightChannel,
                channels: &src_channels,
                layout: &layout,
            },
            &ChannelView {
                era: SchemaEra::EightChannel,
                channels: &src_channels,
                layout: &layout,
            },
            2,
            &payload,
            ByteOrder::Big,
            ByteOrder::Little,
            &mut out,
        )
        .unwrap();

        // Every four-byte element reversed, element order preserved.
        for element in 0..6 {
            let at = element * 4;
            let mut expected = payload[at..at + 4].to_vec();
            expected.reverse();
            assert_eq!(&out[at..at + 4], expected.as_slice());
        }
    }

    #[test]
    fn test_float16_elements_swap_in_pairs() {
        let src_channels = view_era(
            SchemaEra::EightChannel,
            &[(1, ChannelDescriptor::new(0, 0, ElementFormat::Float16, 4))],
        );
        let layout = StreamLayout::from_channels(&src_channels, 1);

        let mut payload = Vec::new();
        for value in [1.0f32, -0.5, 0.25, 2.0] {
            payload.extend_from_slice(&f16::from_f32(value).to_bits().to_be_bytes());
        }

        let mut out = vec![0u8; 8];
        copy_channels_data(
            &ChannelView {
                era: SchemaEra::EightChannel,
                channels: &src_channels,
                layout: &layout,
            },
            &ChannelView {
                era: SchemaEra::EightChannel,
                channels: &src_channels,
                layout: &layout,
            },
            1,
            &payload,
            ByteOrder::Big,
            ByteOrder::Little,
            &mut out,
        )
        .unwrap();

        for (index, value) in [1.0f32, -0.5, 0.25, 2.0].into_iter().enumerate() {
            let at = index * 2;
            let bits = u16::from_le_bytes(out[at..at + 2].try_into().unwrap());
            assert_eq!(f16::from_bits(bits).to_f32(), value);
        }
    }

    #[test]
    fn test_truncated_payload_fails() {
        let src_channels = view_era(
            SchemaEra::EightChannel,
            &[(0, ChannelDescriptor::new(0, 0, ElementFormat::Float32, 3))],
        );
        let layout = StreamLayout::from_channels(&src_channels, 2);
        let payload = vec![0u8; 20]; // needs 24
        let mut out = vec![0u8; 24];
        let result = copy_channels_data(
            &ChannelView {
                era: SchemaEra::EightChannel,
                channels: &src_channels,
                layout: &layout,
            },
            &ChannelView {
                era: SchemaEra::EightChannel,
                channels: &src_channels,
                layout: &layout,
            },
            2,
            &payload,
            ByteOrder::Little,
            ByteOrder::Little,
            &mut out,
        );
        assert!(result.is_err());
    }
}
