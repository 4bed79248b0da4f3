use crate::option::OptionId;

/// Boxed error returned by user hooks (match hooks, group actions, execute hooks).
pub type Fault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Configuration-time failures.
///
/// Anything that goes wrong while walking argv is routed through the
/// notification handlers instead and never shows up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("long switch must be at least 2 characters (got {0:?})")]
    LongSwitchTooShort(String),

    #[error("an option needs a long name or a short name")]
    Unnamed,

    #[error("option handle {0:?} is not registered with this parser")]
    UnknownOption(OptionId),

    #[error("option {option} failed to execute: {source}")]
    Execute {
        option: String,
        #[source]
        source: Fault,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
