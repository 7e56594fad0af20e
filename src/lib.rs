pub mod bits;
pub mod config;
pub mod frame;
pub mod permute;
pub mod pipeline;
pub mod qim;
pub mod raster;
pub mod transform;

pub use config::{SubBand, WatermarkOptions};
pub use pipeline::batch::embed_files;
pub use pipeline::embed::{add_watermark, embed_file, Watermarked};
pub use pipeline::extract::{extract_file, extract_watermark};
pub use pipeline::hook::{NoopHook, PipelineHook};
pub use pipeline::{capacity, roundtrip, Capacity, RoundtripResult, WatermarkError};
