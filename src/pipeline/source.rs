//! Trait for frame-producing collaborators.

use image::RgbImage;

/// A producer of video frames for the analysis pipeline.
///
/// Frames must arrive pre-normalized to the resolution the pipeline was
/// calibrated for (360×640 by default), as 3-channel color buffers.
/// End of stream is signaled by returning `Ok(None)`; a background-thread
/// reader with a bounded buffer satisfies this trait just as well as a
/// synchronous decoder.
///
/// # Example
///
/// ```ignore
/// use bouncetrack_rs::FrameSource;
/// use image::RgbImage;
///
/// struct MyReader { /* decoder handle */ }
///
/// impl FrameSource for MyReader {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<RgbImage>, Self::Error> {
///         // Decode and return the next frame, or Ok(None) at the end.
///         Ok(None)
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for acquisition failures.
    type Error;

    /// Produce the next frame, or `Ok(None)` once the stream ends.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, Self::Error>;
}
