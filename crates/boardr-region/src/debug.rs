use image::DynamicImage;

/// Receiver for intermediate images produced while `debug` is enabled.
///
/// Sinks must not block and must not fail the pipeline: an image that cannot
/// be stored is logged and dropped.
pub trait DebugSink {
    /// Store one named diagnostic image (`name` carries no extension).
    fn emit(&self, name: &str, image: &DynamicImage);
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDebugSink;

impl DebugSink for NullDebugSink {
    fn emit(&self, _name: &str, _image: &DynamicImage) {}
}

impl<S: DebugSink + ?Sized> DebugSink for &S {
    fn emit(&self, name: &str, image: &DynamicImage) {
        (**self).emit(name, image)
    }
}
