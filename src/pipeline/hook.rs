use anyhow::Result;

/// A hook invoked between embedding and extraction in a [`roundtrip`](super::roundtrip).
///
/// Implement this trait to push the watermarked image through whatever sits
/// between the two ends, for example an upload and download, and hand the
/// bytes that came back to the extractor.
///
/// # Example
///
/// ```rust
/// use anyhow::Result;
/// use dwtmark::PipelineHook;
///
/// struct Uploader;
///
/// impl PipelineHook for Uploader {
///     fn after_embed(&self, image: Vec<u8>) -> Result<Vec<u8>> {
///         // upload the PNG, download it again ...
///         Ok(image) // placeholder
///     }
/// }
/// ```
pub trait PipelineHook {
    /// Called with the watermarked PNG. Return the bytes the extractor should read.
    fn after_embed(&self, image: Vec<u8>) -> Result<Vec<u8>>;
}

/// A no-op hook that passes the image through unchanged.
pub struct NoopHook;

impl PipelineHook for NoopHook {
    fn after_embed(&self, image: Vec<u8>) -> Result<Vec<u8>> {
        Ok(image)
    }
}
