pub mod freshdesk;
pub mod query;
pub mod todoist;

use crate::errors::SyncError;

/// Maps a reqwest failure to a `SyncError::NetworkError` when it never
/// reached the server, otherwise keeps the original error under `what`.
pub(crate) fn transport_error(err: reqwest::Error, what: &'static str) -> anyhow::Error {
    match SyncError::from_transport(&err) {
        Some(network) => network.into(),
        None => anyhow::Error::new(err).context(what),
    }
}
