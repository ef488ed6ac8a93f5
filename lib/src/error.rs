//! Custom Error and Result types for this library

use thiserror::Error;

use crate::options::StoreOptionsBuilderError;

/// Custom Error type for this library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SideFxError {
    /// The reduction argument handed to the enhancer is not invocable
    #[error("provided root reducer is not a function")]
    NotAReducer,

    /// A reduction step finished without producing a terminal state
    #[error("reduction step did not return new state")]
    MissingState,

    /// A value yielded before the terminal state is not a side effect
    #[error(
        "yielded side effects must always be created through the descriptor \
         constructor (found {found} at position {position})"
    )]
    InvalidEffectDescriptor {
        /// Index of the offending value within the reduction output
        position: usize,
        /// Kind of value found in place of a side effect
        found: &'static str,
    },

    /// A side effect descriptor was constructed without a callable
    #[error("first side effect argument is always a function")]
    InvalidEffect,

    /// A deferred task was armed while another one was still pending
    #[error("cannot set a new task while another is currently set")]
    AlreadyArmed,

    /// A reducer attempted to dispatch while the store was reducing
    #[error("reducers may not dispatch actions")]
    DispatchInReducer,

    /// A dispatch capability outlived the store it was created for
    #[error("store has been dropped, dispatch is no longer possible")]
    StoreDropped,

    /// Error resulting from failure to build store options
    #[error("failed to build store options: {_0}")]
    Options(String),
}

impl From<StoreOptionsBuilderError> for SideFxError {
    fn from(value: StoreOptionsBuilderError) -> Self {
        Self::Options(value.to_string())
    }
}

/// Custom Result type for this library. All Errors exposed by this library
/// will be returned as [`SideFxError`]
pub type Result<T> = std::result::Result<T, SideFxError>;
