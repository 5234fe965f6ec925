//! Skin channel synthesis and skin block serialization.
//!
//! Only the fourteen-channel schema can address bone influences through
//! descriptors. Upgrades synthesize the two skin channels on a fresh stream;
//! downgrades serialize the records as a trailing block the repackaging
//! pipeline keeps out-of-band.

use crate::cursor::EndianWriter;
use crate::error::Result;
use crate::schema::{channels, ChannelDescriptor};
use crate::types::{ElementFormat, SchemaEra, SemanticAttribute, SkinWeights4};

/// Element format fourteen-channel serializers use for skin weights.
const WEIGHT_FORMAT: ElementFormat = ElementFormat::Float32;
/// Element format fourteen-channel serializers use for bone indices.
const BONE_INDEX_FORMAT: ElementFormat = ElementFormat::Int32;
/// Bone influences per vertex.
const SKIN_DIMENSION: u8 = 4;

/// Add native skin channels to a fourteen-channel array.
///
/// The channels land on a fresh stream one past the highest stream in use;
/// the weights sit at offset zero with the bone indices packed immediately
/// after them. Consumes and returns the array.
pub fn synthesize_skin_channels(mut array: Vec<ChannelDescriptor>) -> Vec<ChannelDescriptor> {
    let skin_stream = array
        .iter()
        .filter(|c| c.is_set)
        .map(|c| c.stream_index)
        .max()
        .map_or(0, |max| max + 1);

    let weights = ChannelDescriptor::new(skin_stream, 0, WEIGHT_FORMAT, SKIN_DIMENSION);
    let index_offset = SKIN_DIMENSION as usize * WEIGHT_FORMAT.element_width();
    let indices = ChannelDescriptor::new(
        skin_stream,
        index_offset as u8,
        BONE_INDEX_FORMAT,
        SKIN_DIMENSION,
    );

    if let Some(slot) = channels::index_of(SchemaEra::FourteenChannel, SemanticAttribute::SkinWeight)
    {
        array[slot] = weights;
    }
    if let Some(slot) =
        channels::index_of(SchemaEra::FourteenChannel, SemanticAttribute::SkinBoneIndex)
    {
        array[slot] = indices;
    }
    array
}

/// Serialized length of a skin block for `count` vertices.
pub fn skin_block_len(count: usize) -> usize {
    count * SkinWeights4::RECORD_SIZE
}

/// Serialize skin records at the writer's current position: four weights then
/// four bone indices per vertex, in the writer's byte order.
pub fn write_skin_block(writer: &mut EndianWriter<'_>, skin: &[SkinWeights4]) -> Result<()> {
    for record in skin {
        for weight in record.weights.to_array() {
            writer.write_f32(weight)?;
        }
        for index in record.bone_indices.to_array() {
            writer.write_i32(index)?;
        }
    }
    Ok(())
}
