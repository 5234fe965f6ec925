//! # Vertex Transcoder
//!
//! A Rust library for converting mesh vertex-attribute data between the
//! on-disk schemas of a game engine's version history.
//!
//! ## Overview
//!
//! Across the engine's lifetime the vertex attribute schema changed three
//! times: a legacy per-stream layout, a six-entry channel array, an
//! eight-entry channel array with two extra UV sets, and a fourteen-entry
//! array with native skin channels. This library rebuilds a mesh's attribute
//! block (bitmask, channel array, stream descriptors and the raw payload
//! bytes) so that data serialized by one version loads unmodified under
//! another, on either byte order.
//!
//! The conversion is a pure in-memory transform: no I/O, no shared state, one
//! freshly allocated block per call. Container parsing and serialization stay
//! with the caller.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vertex_transcoder::{convert_vertex_data, ExportContext, Platform, VertexSource};
//!
//! let ctx = ExportContext {
//!     source_version: "2019.4.0.0".parse()?,
//!     target_version: "2017.4.0.0".parse()?,
//!     source_platform: Platform::Standalone,
//!     target_platform: Platform::Standalone,
//! };
//!
//! // `mesh` is anything implementing VertexSource.
//! let conversion = convert_vertex_data(&ctx, &mesh)?;
//! writer.write_vertex_data(&conversion.block)?;
//!
//! // The report says what happened along the way.
//! if !conversion.report.dropped.is_empty() {
//!     eprintln!("lost attributes: {:?}", conversion.report.dropped);
//! }
//! ```

pub mod error;
pub mod types;
pub mod schema;
pub mod cursor;
pub mod convert;

// Re-export main types for convenience
pub use convert::{
    Conversion, ConversionReport, ExportContext, PayloadStrategy, VertexDataConverter,
    VertexSource,
};
pub use error::{Result, TranscodeError};
pub use schema::{AttributeBlock, ChannelDescriptor, StreamDescriptor, StreamLayout};
pub use types::{
    ByteOrder, ElementFormat, EngineVersion, Platform, SchemaEra, SemanticAttribute, SkinWeights4,
};

/// Convert a source mesh's vertex block for a target version and platform.
pub fn convert_vertex_data(ctx: &ExportContext, source: &dyn VertexSource) -> Result<Conversion> {
    VertexDataConverter::new(ctx).convert(source)
}
