use shared::protocol::OutdatedReason;
use shared::{ClientId, DecodeError};
use thiserror::Error;

/// Everything that can stop the client. All variants except [`ClientError::Config`]
/// mean the connection cannot continue.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("protocol desync: {0}")]
    Protocol(#[from] DecodeError),

    #[error("failed to encode request: {0}")]
    Encode(#[from] bincode::Error),

    #[error("no player {0} in the local roster")]
    RosterInconsistency(ClientId),

    #[error("sync references unknown ball {0}")]
    UnknownBall(u8),

    #[error("{}", outdated_message(.0))]
    Outdated(OutdatedReason),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn outdated_message(reason: &OutdatedReason) -> &'static str {
    match reason {
        OutdatedReason::Client => "client is outdated, update to the latest version",
        OutdatedReason::Server => "server is outdated, try again later",
    }
}
