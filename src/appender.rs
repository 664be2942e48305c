use crate::error::LoggerError;
use crate::store::ContentStore;
use crate::types::{LogEntry, RemoteFileState};
use log::info;

/// Read-modify-write of one remote log file.
///
/// Nothing is cached between calls: every update reads the file fresh and
/// writes back with the token from that read. Two appenders racing on the
/// same file may have one write rejected by the store; no retry is made.
pub struct LogAppender<S> {
    store: S,
    path: String,
}

impl<S: ContentStore> LogAppender<S> {
    pub fn new(store: S, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn fetch_current(&self) -> Result<RemoteFileState, LoggerError> {
        self.store.fetch(&self.path).await
    }

    /// Appends `entry` to `state` and stores the result, returning the new content.
    pub async fn append_and_store(
        &self,
        state: RemoteFileState,
        entry: &LogEntry,
    ) -> Result<String, LoggerError> {
        let RemoteFileState {
            content_token,
            decoded_text,
        } = state;

        let mut updated = decoded_text;
        updated.push_str(&entry.render());

        self.store
            .write(&self.path, &updated, content_token.as_deref())
            .await?;

        Ok(updated)
    }

    /// Full update for one visitor: fetch, append a freshly stamped line, store.
    pub async fn record(&self, text: &str) -> Result<LogEntry, LoggerError> {
        let state = self.fetch_current().await?;
        let entry = LogEntry::now(text.to_string());

        info!(
            "Appending entry to {} ({})",
            self.path(),
            if state.exists() { "existing file" } else { "new file" }
        );
        self.append_and_store(state, &entry).await?;

        Ok(entry)
    }
}
