//! Error types shared by the list and the command runner.

/// Errors reported by [`TypedList`](crate::linked_list::typed::TypedList)
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// The list could not be constructed with the requested parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Storage for a new node could not be allocated.
    ///
    /// The list is left exactly as it was before the failed call.
    #[error("failed to allocate storage for a list node")]
    ResourceExhausted,

    /// The list's lock could not be acquired.
    ///
    /// Treat the list as unusable once this is returned; the only safe
    /// recovery is to drop it and build a new one.
    #[error("list lock failure: {0}")]
    Lock(#[from] LockError),

    /// `head`/`tail` was called on a list with no elements.
    #[error("the list is empty")]
    EmptyCollection,
}

/// Failures of the list's error-checking lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    /// The calling thread already holds the lock, for instance because a
    /// [`for_each`](crate::linked_list::typed::TypedList::for_each) visitor
    /// called back into the same list.
    #[error("the lock is already held by the current thread")]
    Reentrant,
}

#[cfg(feature = "std")]
pub use self::runner::RunnerError;

#[cfg(feature = "std")]
mod runner {
    use std::io;
    use std::string::String;

    use super::ListError;

    /// Errors reported by [`Runner::run`](crate::runner::Runner::run).
    #[derive(Debug, thiserror::Error)]
    pub enum RunnerError {
        /// The shell process could not be started.
        #[error("failed to spawn `{command}`")]
        Spawn {
            command: String,
            #[source]
            source: io::Error,
        },

        /// Reading the command's standard output failed.
        #[error("failed to read command output")]
        Read(#[source] io::Error),

        /// Waiting for the command to exit failed.
        #[error("failed to wait for command to exit")]
        Wait(#[source] io::Error),

        /// A line could not be appended to the sink list. The run is aborted.
        #[error("failed to append command output to the list")]
        Append(#[from] ListError),
    }
}
