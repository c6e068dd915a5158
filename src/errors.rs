/*!

Error types for the secret client.

Every remote-call failure is caught at the operation boundary and
converted into one of these variants; callers never see a raw transport
fault escape unwrapped, and the client never prints or retries.

*/

use std::time::Duration;

use thiserror::Error;

/// The typed outcome of a failed client operation.
///
/// The distinctions the protocol cares about are preserved: a service
/// rejection (`Refused`) is not a user dismissal (`Dismissed`), a
/// precondition violation (`Locked`) never issued an RPC, and a missing
/// item (`NoEntry`) is not a transport fault.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The service declined to unlock the collection and offered no prompt.
    #[error("the service refused to unlock the collection")]
    Refused,

    /// The user dismissed a confirmation prompt.
    #[error("the user dismissed the confirmation prompt")]
    Dismissed,

    /// A data operation was attempted before a successful unlock.
    /// No RPC is issued in this case.
    #[error("operation requires an unlocked collection")]
    Locked,

    /// No item is stored under the requested label for this application.
    #[error("no secret stored under this label")]
    NoEntry,

    /// No prompt completion arrived within the configured wait.
    #[error("no prompt completion within {0:?}")]
    PromptTimeout(Duration),

    /// A client-side argument could not be encoded for the wire.
    #[error("invalid {0}: {1}")]
    Invalid(&'static str, String),

    /// The underlying bus call failed: service down, malformed reply,
    /// or a method error raised by the service.
    #[error("transport failure: {0}")]
    Transport(#[from] zbus::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
