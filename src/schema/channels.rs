//! Per-era channel identity tables and attribute mask relocation.
//!
//! Each channel era indexes semantic attributes differently; notably the
//! tangent slot moved twice across the engine's history. Every lookup here is
//! keyed by [`SemanticAttribute`] so no raw index ever crosses an era
//! boundary unchecked.

use crate::schema::ChannelDescriptor;
use crate::types::SemanticAttribute::{
    self, Color, Normal, Position, SkinBoneIndex, SkinWeight, Tangent, Uv0, Uv1, Uv2, Uv3,
};
use crate::types::SchemaEra;

const SIX_CHANNEL_TABLE: [Option<SemanticAttribute>; 6] = [
    Some(Position),
    Some(Normal),
    Some(Color),
    Some(Uv0),
    Some(Uv1),
    Some(Tangent),
];

const EIGHT_CHANNEL_TABLE: [Option<SemanticAttribute>; 8] = [
    Some(Position),
    Some(Normal),
    Some(Color),
    Some(Uv0),
    Some(Uv1),
    Some(Uv2),
    Some(Uv3),
    Some(Tangent),
];

// Slots 8-11 hold the additional UV sets this library does not model.
const FOURTEEN_CHANNEL_TABLE: [Option<SemanticAttribute>; 14] = [
    Some(Position),
    Some(Normal),
    Some(Tangent),
    Some(Color),
    Some(Uv0),
    Some(Uv1),
    Some(Uv2),
    Some(Uv3),
    None,
    None,
    None,
    None,
    Some(SkinWeight),
    Some(SkinBoneIndex),
];

fn table(era: SchemaEra) -> &'static [Option<SemanticAttribute>] {
    match era {
        SchemaEra::Legacy => &[],
        SchemaEra::SixChannel => &SIX_CHANNEL_TABLE,
        SchemaEra::EightChannel => &EIGHT_CHANNEL_TABLE,
        SchemaEra::FourteenChannel => &FOURTEEN_CHANNEL_TABLE,
    }
}

/// Number of channel-array entries an era serializes.
pub fn channel_count(era: SchemaEra) -> usize {
    table(era).len()
}

/// The semantic attribute stored at a channel index in the given era.
pub fn attribute_at(era: SchemaEra, index: usize) -> Option<SemanticAttribute> {
    table(era).get(index).copied().flatten()
}

/// The channel index a semantic attribute occupies in the given era.
pub fn index_of(era: SchemaEra, attribute: SemanticAttribute) -> Option<usize> {
    table(era).iter().position(|&slot| slot == Some(attribute))
}

/// Relocate an attribute presence mask from one era's bit positions to
/// another's.
///
/// Bits whose attribute has no slot in the target era are dropped; no other
/// bits are ever set.
pub fn convert_mask(mask: u32, from: SchemaEra, to: SchemaEra) -> u32 {
    let mut converted = 0u32;
    for attribute in SemanticAttribute::ALL {
        let Some(source_bit) = index_of(from, attribute) else {
            continue;
        };
        if mask & (1 << source_bit) == 0 {
            continue;
        }
        if let Some(target_bit) = index_of(to, attribute) {
            converted |= 1 << target_bit;
        }
    }
    converted
}

/// Presence mask of a channel array: one bit per set descriptor, in the
/// array's own bit positions.
pub fn mask_for_channels(channels: &[ChannelDescriptor]) -> u32 {
    channels
        .iter()
        .enumerate()
        .filter(|(_, channel)| channel.is_set)
        .fold(0, |mask, (index, _)| mask | 1 << index)
}
