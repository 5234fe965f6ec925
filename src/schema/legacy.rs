//! Channel derivation for legacy per-stream blocks.
//!
//! Pre-4.0 serializers describe vertex data as streams carrying an attribute
//! mask; each attribute has a fixed implicit format and the attributes of a
//! stream are packed in one fixed order. This module is the only place channel
//! semantics are derived from streams rather than read from an explicit array.

use crate::schema::{ChannelDescriptor, StreamDescriptor};
use crate::types::{ElementFormat, SemanticAttribute};

/// The legacy attributes in their fixed in-stream order, with the implicit
/// format and dimension each one is serialized in.
const LEGACY_ATTRIBUTES: [(SemanticAttribute, ElementFormat, u8); 6] = [
    (SemanticAttribute::Position, ElementFormat::Float32, 3),
    (SemanticAttribute::Normal, ElementFormat::Float32, 3),
    (SemanticAttribute::Color, ElementFormat::PackedColor32, 1),
    (SemanticAttribute::Uv0, ElementFormat::Float32, 2),
    (SemanticAttribute::Uv1, ElementFormat::Float32, 2),
    (SemanticAttribute::Tangent, ElementFormat::Float32, 4),
];

/// Bit position of an attribute in a legacy stream's channel mask.
pub fn legacy_bit(attribute: SemanticAttribute) -> Option<u8> {
    LEGACY_ATTRIBUTES
        .iter()
        .position(|(slot, ..)| *slot == attribute)
        .map(|index| index as u8)
}

/// Packed width in bytes of every attribute a legacy mask selects.
pub fn packed_width(channel_mask: u32) -> usize {
    LEGACY_ATTRIBUTES
        .iter()
        .enumerate()
        .filter(|(bit, _)| channel_mask & (1 << bit) != 0)
        .map(|(_, (_, format, dimension))| *dimension as usize * format.element_width())
        .sum()
}

/// Union of all stream masks: the presence mask of a legacy block.
pub fn combined_mask(streams: &[StreamDescriptor]) -> u32 {
    streams.iter().fold(0, |mask, s| mask | s.channel_mask)
}

/// Synthesize the channel descriptor for one attribute from legacy streams.
///
/// Scans the streams in order for the first whose mask includes the attribute
/// and accumulates the widths of the attributes packed before it in that
/// stream. Returns an unset descriptor when no stream carries the attribute
/// or the attribute has no legacy representation at all.
pub fn derive_channel(
    streams: &[StreamDescriptor],
    attribute: SemanticAttribute,
) -> ChannelDescriptor {
    let Some(slot) = LEGACY_ATTRIBUTES
        .iter()
        .position(|(a, ..)| *a == attribute)
    else {
        return ChannelDescriptor::unset();
    };

    for (stream_index, stream) in streams.iter().enumerate() {
        if stream.channel_mask & (1 << slot) == 0 {
            continue;
        }
        let mut offset = 0usize;
        for (bit, (_, format, dimension)) in LEGACY_ATTRIBUTES.iter().enumerate().take(slot) {
            if stream.channel_mask & (1 << bit) != 0 {
                offset += *dimension as usize * format.element_width();
            }
        }
        let (_, format, dimension) = LEGACY_ATTRIBUTES[slot];
        return ChannelDescriptor {
            stream_index: stream_index as u8,
            byte_offset: offset as u8,
            format,
            dimension,
            is_set: true,
        };
    }
    ChannelDescriptor::unset()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit(attribute: SemanticAttribute) -> u32 {
        1 << legacy_bit(attribute).unwrap()
    }

    #[test]
    fn test_legacy_bits_follow_fixed_order() {
        assert_eq!(legacy_bit(SemanticAttribute::Position), Some(0));
        assert_eq!(legacy_bit(SemanticAttribute::Normal), Some(1));
        assert_eq!(legacy_bit(SemanticAttribute::Color), Some(2));
        assert_eq!(legacy_bit(SemanticAttribute::Uv0), Some(3));
        assert_eq!(legacy_bit(SemanticAttribute::Uv1), Some(4));
        assert_eq!(legacy_bit(SemanticAttribute::Tangent), Some(5));
        assert_eq!(legacy_bit(SemanticAttribute::SkinWeight), None);
    }

    #[test]
    fn test_packed_width() {
        let mask = bit(SemanticAttribute::Position)
            | bit(SemanticAttribute::Normal)
            | bit(SemanticAttribute::Color);
        assert_eq!(packed_width(mask), 12 + 12 + 4);
        assert_eq!(packed_width(0), 0);
    }

    #[test]
    fn test_derive_channel_offsets() {
        let streams = [StreamDescriptor::new(
            bit(SemanticAttribute::Position)
                | bit(SemanticAttribute::Color)
                | bit(SemanticAttribute::Uv0),
            24,
        )];

        let position = derive_channel(&streams, SemanticAttribute::Position);
        assert!(position.is_set);
        assert_eq!(position.stream_index, 0);
        assert_eq!(position.byte_offset, 0);
        assert_eq!(position.format, ElementFormat::Float32);
        assert_eq!(position.dimension, 3);

        // Color sits right after the position, the absent normal adds nothing.
        let color = derive_channel(&streams, SemanticAttribute::Color);
        assert_eq!(color.byte_offset, 12);
        assert_eq!(color.format, ElementFormat::PackedColor32);

        let uv0 = derive_channel(&streams, SemanticAttribute::Uv0);
        assert_eq!(uv0.byte_offset, 16);
        assert_eq!(uv0.dimension, 2);
    }

    #[test]
    fn test_derive_channel_picks_matching_stream() {
        let streams = [
            StreamDescriptor::new(bit(SemanticAttribute::Position), 12),
            StreamDescriptor::new(
                bit(SemanticAttribute::Uv0) | bit(SemanticAttribute::Uv1),
                16,
            ),
        ];
        let uv1 = derive_channel(&streams, SemanticAttribute::Uv1);
        assert!(uv1.is_set);
        assert_eq!(uv1.stream_index, 1);
        assert_eq!(uv1.byte_offset, 8);
    }

    #[test]
    fn test_derive_channel_absent_attribute() {
        let streams = [StreamDescriptor::new(bit(SemanticAttribute::Position), 12)];
        assert!(!derive_channel(&streams, SemanticAttribute::Tangent).is_set);
        assert!(!derive_channel(&streams, SemanticAttribute::SkinWeight).is_set);
    }

    #[test]
    fn test_combined_mask() {
        let streams = [
            StreamDescriptor::new(bit(SemanticAttribute::Position), 12),
            StreamDescriptor::new(bit(SemanticAttribute::Uv0), 8),
        ];
        assert_eq!(
            combined_mask(&streams),
            bit(SemanticAttribute::Position) | bit(SemanticAttribute::Uv0)
        );
    }
}
