//! End-to-end vertex data conversion across schema eras.
//!
//! [`VertexDataConverter`] composes the identity tables, legacy stream
//! derivation, descriptor conversion, skin synthesis and the binary
//! transcoder into the full source-era to target-era transform. The source is
//! never mutated; every call builds one fresh block.

pub mod descriptor;
pub mod skin;
mod transcode;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cursor::EndianWriter;
use crate::error::{Result, TranscodeError};
use crate::schema::{channels, legacy, AttributeBlock, ChannelDescriptor, StreamLayout};
use crate::types::{EngineVersion, Platform, SchemaEra, SemanticAttribute, SkinWeights4};
use transcode::ChannelView;

/// Versions and platforms a conversion translates between.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExportContext {
    pub source_version: EngineVersion,
    pub target_version: EngineVersion,
    pub source_platform: Platform,
    pub target_platform: Platform,
}

impl ExportContext {
    /// Era the source version serializes vertex data in.
    pub fn source_era(&self) -> SchemaEra {
        self.source_version.era()
    }

    /// Era the target version expects vertex data in.
    pub fn target_era(&self) -> SchemaEra {
        self.target_version.era()
    }
}

/// Contract a source mesh fulfils towards the converter.
pub trait VertexSource {
    /// The vertex attribute block as serialized by the source version.
    fn attribute_block(&self) -> &AttributeBlock;

    /// Per-vertex bone influences; empty for unskinned meshes.
    fn skin_weights(&self) -> &[SkinWeights4];

    /// The raw channel payload, normalized to one contiguous buffer.
    fn channel_payload(&self) -> &[u8];
}

/// How the payload bytes travel from source to instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadStrategy {
    /// Source buffer reused unchanged.
    PassThrough,
    /// Source buffer reused with the synthesized skin stream appended.
    AppendSkin,
    /// Full per-attribute copy into a freshly laid out buffer.
    Transcode,
}

/// What a conversion did besides producing the new block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub strategy: PayloadStrategy,
    /// Attributes set in the source that have no slot in the target schema.
    pub dropped: Vec<SemanticAttribute>,
    /// Whether a trailing skin block was written after the channel streams.
    pub skin_appended: bool,
}

/// A converted block plus the report of what happened to it.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub block: AttributeBlock,
    pub report: ConversionReport,
}

/// Converts vertex attribute blocks between schema eras.
pub struct VertexDataConverter<'a> {
    ctx: &'a ExportContext,
}

impl<'a> VertexDataConverter<'a> {
    pub fn new(ctx: &'a ExportContext) -> Self {
        Self { ctx }
    }

    /// Convert a source mesh's vertex block for the context's target version
    /// and platform.
    pub fn convert(&self, source: &dyn VertexSource) -> Result<Conversion> {
        let source_era = self.ctx.source_era();
        let target_era = self.ctx.target_era();
        let origin = source.attribute_block();
        let payload = source.channel_payload();
        let skin = source.skin_weights();
        let vertex_count = origin.vertex_count;

        if target_era == SchemaEra::Legacy && source_era != SchemaEra::Legacy {
            return Err(TranscodeError::UnsupportedDowngrade(format!(
                "{} serializes per-stream vertex data; channel-era data cannot be restated as streams",
                self.ctx.target_version
            )));
        }

        origin.validate(source_era, payload)?;

        // Legacy blocks have no channel array; derive one in SixChannel
        // positions so every later stage sees a uniform view.
        let (view_era, source_channels): (SchemaEra, Vec<ChannelDescriptor>) =
            if source_era == SchemaEra::Legacy {
                let derived = (0..channels::channel_count(SchemaEra::SixChannel))
                    .map(|index| {
                        match channels::attribute_at(SchemaEra::SixChannel, index) {
                            Some(attribute) => legacy::derive_channel(&origin.streams, attribute),
                            None => ChannelDescriptor::unset(),
                        }
                    })
                    .collect();
                (SchemaEra::SixChannel, derived)
            } else {
                (source_era, origin.channels.clone())
            };
        let source_layout = if source_era == SchemaEra::Legacy {
            StreamLayout::from_streams(&origin.streams, vertex_count)
        } else {
            StreamLayout::from_channels(&source_channels, vertex_count)
        };

        let legacy_target = target_era == SchemaEra::Legacy;
        let mut instance_channels = if legacy_target {
            Vec::new()
        } else {
            descriptor::convert_channels(view_era, &source_channels, target_era)
        };

        // Loaders of the two middle eras ignore explicit offsets; coming down
        // from a newer schema the offsets must be rewritten for tight packing.
        if !legacy_target && target_era.loader_ignores_offsets() && view_era > target_era {
            instance_channels = descriptor::recalculate_offsets(instance_channels);
        }

        let synthesize_skin = target_era == SchemaEra::FourteenChannel
            && view_era < SchemaEra::FourteenChannel
            && !skin.is_empty();
        let source_has_skin_channels = channels::index_of(view_era, SemanticAttribute::SkinWeight)
            .and_then(|index| source_channels.get(index))
            .is_some_and(|c| c.is_set);
        if (synthesize_skin || source_has_skin_channels)
            && !skin.is_empty()
            && skin.len() != vertex_count as usize
        {
            return Err(TranscodeError::MalformedSource(format!(
                "{} skin records for {} vertices",
                skin.len(),
                vertex_count
            )));
        }
        if synthesize_skin {
            instance_channels = skin::synthesize_skin_channels(instance_channels);
        }

        // Attributes set in the source with no set slot in the instance.
        let mut dropped = Vec::new();
        if !legacy_target {
            for attribute in SemanticAttribute::ALL {
                let in_source = channels::index_of(view_era, attribute)
                    .and_then(|index| source_channels.get(index))
                    .is_some_and(|c| c.is_set);
                if !in_source {
                    continue;
                }
                let in_instance = channels::index_of(target_era, attribute)
                    .and_then(|index| instance_channels.get(index))
                    .is_some_and(|c| c.is_set);
                if !in_instance {
                    dropped.push(attribute);
                }
            }
        }

        let source_schema = source_era.serialized_version();
        let target_schema = target_era.serialized_version();
        // Native skin channels dropped on a downgrade are retained as a
        // trailing block when the mesh supplies the records.
        let append_skin_downgrade = source_schema >= 2
            && target_schema < 2
            && source_has_skin_channels
            && !skin.is_empty();

        let byte_swap = self.ctx.source_platform.byte_order() != self.ctx.target_platform.byte_order();
        let schema_downgrade = source_schema >= 2 && target_schema < 2;
        // Dropped attributes leave bytes behind that pass-through would keep
        // interleaved in the payload; they have to be squeezed out.
        let squeeze_out = !dropped.is_empty();
        let need_copy = byte_swap || schema_downgrade || squeeze_out;

        let instance_streams = if legacy_target {
            origin.streams.clone()
        } else {
            Vec::new()
        };
        let instance_layout = if legacy_target {
            StreamLayout::from_streams(&instance_streams, vertex_count)
        } else {
            StreamLayout::from_channels(&instance_channels, vertex_count)
        };

        let source_mask = if source_era == SchemaEra::Legacy {
            legacy::combined_mask(&origin.streams)
        } else {
            channels::mask_for_channels(&source_channels)
        };
        let mut current_mask = if legacy_target {
            source_mask
        } else {
            channels::convert_mask(source_mask, view_era, target_era)
        };
        if synthesize_skin {
            for attribute in [SemanticAttribute::SkinWeight, SemanticAttribute::SkinBoneIndex] {
                if let Some(bit) = channels::index_of(target_era, attribute) {
                    current_mask |= 1 << bit;
                }
            }
        }

        // Offset of the synthesized skin stream within the new buffer.
        let skin_stream_offset = if synthesize_skin {
            channels::index_of(SchemaEra::FourteenChannel, SemanticAttribute::SkinWeight)
                .and_then(|index| instance_channels.get(index))
                .filter(|c| c.is_set)
                .map(|c| instance_layout.offset(c.stream_index as usize))
        } else {
            None
        };

        let base_len = instance_layout.total_size();
        let trailer_len = if append_skin_downgrade {
            skin::skin_block_len(skin.len())
        } else {
            0
        };
        let target_order = self.ctx.target_platform.byte_order();

        let (data, strategy, skin_appended) = if need_copy {
            let mut buffer = vec![0u8; base_len + trailer_len];
            let source_view = ChannelView {
                era: view_era,
                channels: &source_channels,
                layout: &source_layout,
            };
            let target_view = if legacy_target {
                ChannelView {
                    era: view_era,
                    channels: &source_channels,
                    layout: &instance_layout,
                }
            } else {
                ChannelView {
                    era: target_era,
                    channels: &instance_channels,
                    layout: &instance_layout,
                }
            };
            transcode::copy_channels_data(
                &source_view,
                &target_view,
                vertex_count,
                payload,
                self.ctx.source_platform.byte_order(),
                target_order,
                &mut buffer,
            )?;

            let mut appended = false;
            if let Some(offset) = skin_stream_offset {
                let mut writer = EndianWriter::new(&mut buffer, target_order);
                writer.set_position(offset);
                skin::write_skin_block(&mut writer, skin)?;
                appended = true;
            }
            if append_skin_downgrade {
                let mut writer = EndianWriter::new(&mut buffer, target_order);
                writer.set_position(base_len);
                skin::write_skin_block(&mut writer, skin)?;
                appended = true;
            }
            (buffer, PayloadStrategy::Transcode, appended)
        } else if let Some(offset) = skin_stream_offset {
            // Channel streams reused verbatim, only the skin stream is new.
            let mut buffer = vec![0u8; base_len];
            buffer[..payload.len()].copy_from_slice(payload);
            let mut writer = EndianWriter::new(&mut buffer, target_order);
            writer.set_position(offset);
            skin::write_skin_block(&mut writer, skin)?;
            (buffer, PayloadStrategy::AppendSkin, true)
        } else {
            (payload.to_vec(), PayloadStrategy::PassThrough, false)
        };
        debug_assert_eq!(data.len(), base_len + trailer_len);

        debug!(
            "vertex data {} -> {}: {:?}, {} vertices, {} bytes",
            self.ctx.source_version,
            self.ctx.target_version,
            strategy,
            vertex_count,
            data.len()
        );
        if !dropped.is_empty() {
            warn!(
                "attributes without a {:?} slot dropped from the descriptor set: {:?}",
                target_era, dropped
            );
        }

        Ok(Conversion {
            block: AttributeBlock {
                current_mask,
                vertex_count,
                channels: instance_channels,
                streams: instance_streams,
                payload: data,
            },
            report: ConversionReport {
                strategy,
                dropped,
                skin_appended,
            },
        })
    }
}
