use ash::vk;

// Everything that can go wrong while recording
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // The command buffer is not in a state that allows this operation
    #[error("invalid command buffer state: {0}")]
    InvalidState(&'static str),

    // A required argument was missing or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    // Only graphics and compute bind points are tracked
    #[error("unsupported pipeline bind point {0:?}")]
    UnsupportedBindPoint(vk::PipelineBindPoint),

    // A flush or push constant update ran without a bound pipeline layout
    #[error("no pipeline layout is bound")]
    MissingPipelineLayout,

    // A raw Vulkan call returned an error code
    #[error("{context}: {result}")]
    Vulkan {
        context: &'static str,
        #[source]
        result: vk::Result,
    },
}

impl Error {
    pub(crate) fn vulkan(context: &'static str) -> impl FnOnce(vk::Result) -> Error {
        move |result| Error::Vulkan { context, result }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// Misuse of the recording API. Debug builds abort on the spot, release builds
// log the violation and bail out of the current operation with the error
macro_rules! contract_violation {
    ($err:expr, $($arg:tt)+) => {{
        if cfg!(debug_assertions) {
            panic!($($arg)+);
        }

        log::error!($($arg)+);
        return Err($err);
    }};
}

pub(crate) use contract_violation;
