/// An error type for the gstreamer module.
#[derive(thiserror::Error, Debug)]
pub enum StreamCaptureError {
    /// An error occurred during GStreamer initialization or pipeline parsing.
    #[error(transparent)]
    GStreamerError(#[from] gst::glib::Error),

    /// An error occurred during GStreamer downcast of pipeline element.
    #[error("Failed to downcast pipeline")]
    DowncastPipelineError(gst::Element),

    /// The named appsink or appsrc is missing from the pipeline.
    #[error("Failed to get an element by name")]
    GetElementByNameError,

    /// An error occurred during GStreamer to get the bus.
    #[error("Failed to get the bus")]
    BusError,

    /// An error occurred during GStreamer to set the pipeline state.
    #[error(transparent)]
    SetPipelineStateError(#[from] gst::StateChangeError),

    /// An error occurred during GStreamer to pull sample from appsink or map a buffer.
    #[error(transparent)]
    PullSampleError(#[from] gst::glib::BoolError),

    /// The sample carries no caps.
    #[error("Failed to get the caps from the sample")]
    GetCapsError,

    /// The caps carry no structure.
    #[error("Failed to get the structure from the caps")]
    GetStructureError,

    /// The caps carry no width.
    #[error("Failed to get the frame width")]
    GetWidthError,

    /// The caps carry no height.
    #[error("Failed to get the frame height")]
    GetHeightError,

    /// An error occurred during GStreamer to get the buffer from the sample.
    #[error("Failed to get the buffer from the sample")]
    GetBufferError,

    /// The buffer cannot hold a frame of the announced size.
    #[error("Failed to create an image frame")]
    CreateImageFrameError,

    /// An error for an invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A buffer could not be pushed downstream.
    #[error(transparent)]
    GstreamerFlowError(#[from] gst::FlowError),

    /// The frame does not match the format the writer expects.
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    /// An error occurred when the pipeline is not running.
    #[error("Pipeline is not running")]
    PipelineNotRunning,

    /// No frame arrived in time.
    #[error("No frame received within {0:?}")]
    Timeout(std::time::Duration),

    /// The pipeline posted an error on its bus.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// A lock shared with the streaming thread was poisoned.
    #[error("Could not lock the mutex")]
    MutexPoisonError,
}
