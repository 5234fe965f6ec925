//! Channel descriptor conversion across eras and offset recalculation.

use crate::schema::{channels, ChannelDescriptor};
use crate::types::SchemaEra;

/// Build a target-era channel array from a source-era one.
///
/// Each target slot is filled from the source slot of the same semantic
/// attribute; format, dimension and presence are attribute choices
/// independent of era and transfer unchanged, as do stream index and byte
/// offset. Attributes the target era cannot index are left out, attributes
/// the source era never had come out unset.
pub fn convert_channels(
    source_era: SchemaEra,
    source: &[ChannelDescriptor],
    target_era: SchemaEra,
) -> Vec<ChannelDescriptor> {
    let mut converted = vec![ChannelDescriptor::unset(); channels::channel_count(target_era)];
    for (index, slot) in converted.iter_mut().enumerate() {
        let Some(attribute) = channels::attribute_at(target_era, index) else {
            continue;
        };
        let Some(source_index) = channels::index_of(source_era, attribute) else {
            continue;
        };
        if let Some(descriptor) = source.get(source_index) {
            if descriptor.is_set {
                *slot = *descriptor;
            }
        }
    }
    converted
}

/// Repack every stream tightly in channel-array order.
///
/// Loaders of the offset-ignoring eras expect the attributes of a stream
/// packed contiguously in array order starting at offset zero; after a
/// downgrade the explicit offsets must be rewritten to match. Consumes and
/// returns the array.
pub fn recalculate_offsets(mut channels: Vec<ChannelDescriptor>) -> Vec<ChannelDescriptor> {
    let Some(max_stream) = channels
        .iter()
        .filter(|c| c.is_set)
        .map(|c| c.stream_index)
        .max()
    else {
        return channels;
    };
    for stream in 0..=max_stream {
        let mut offset = 0usize;
        for channel in channels
            .iter_mut()
            .filter(|c| c.is_set && c.stream_index == stream)
        {
            channel.byte_offset = offset as u8;
            offset += channel.stride();
        }
    }
    channels
}
