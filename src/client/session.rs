use super::{ApiClient, ClientError};
use crate::export::{self, ExportFile, ExportFormat, ResultFormat};
use crate::lyrics::LyricsPayload;
use crate::transform::TransformKind;
use std::time::Duration;
use tokio::sync::mpsc;

const NO_LYRICS: &str = "No lyrics found. Try another song or artist.";

/// Progress notices for whoever renders the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Loading,
    /// Soft timeout passed; the request is still running.
    StillProcessing(&'static str),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub kind: TransformKind,
    pub target: String,
    pub text: String,
}

/// State of one lyrics view. Discarded with the session.
///
/// In-flight requests are reported through `SessionEvent::Loading` rather than
/// a flag here, since the view cannot be read while a request holds the session.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub artist: String,
    pub song: String,
    pub payload: Option<LyricsPayload>,
    pub show_synced: bool,
    pub error: Option<String>,
    pub transformed: Option<TransformResult>,
}

pub struct Session {
    api: ApiClient,
    soft_timeout: Duration,
    hard_timeout: Duration,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    state: ViewState,
}

impl Session {
    pub fn new(api: ApiClient, soft_timeout: Duration, hard_timeout: Duration) -> Self {
        Self {
            api,
            soft_timeout,
            hard_timeout,
            events: None,
            state: ViewState::default(),
        }
    }

    pub fn with_events(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    fn emit(&self, ev: SessionEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(ev);
        }
    }

    /// Search → fetch. Replaces whatever the view showed before.
    pub async fn search(
        &mut self,
        artist: &str,
        song: &str,
    ) -> Result<&LyricsPayload, ClientError> {
        self.state.error = None;
        self.state.payload = None;
        self.state.transformed = None;
        self.emit(SessionEvent::Loading);

        let result = match self.api.lyrics(artist, song).await {
            Ok(resp) => {
                let reported = resp.error_message();
                match resp.into_payload() {
                    Some(payload) => Ok(payload),
                    None => Err(ClientError::NoData(
                        reported.unwrap_or_else(|| NO_LYRICS.to_string()),
                    )),
                }
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(payload) => {
                tracing::debug!(artist, song, synced = payload.has_timestamps(), "lyrics loaded");
                self.state.artist = artist.to_string();
                self.state.song = song.to_string();
                self.state.show_synced = matches!(payload, LyricsPayload::Timed(_));
                let payload: &LyricsPayload = self.state.payload.insert(payload);
                Ok(payload)
            }
            Err(e) => {
                self.state.error = Some(e.to_string());
                self.emit(SessionEvent::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Switch between the synced and unsynced view of timed lyrics.
    pub fn set_synced(&mut self, synced: bool) {
        self.state.show_synced = synced;
    }

    /// The payload as currently displayed.
    pub fn display_payload(&self) -> Option<LyricsPayload> {
        let payload = self.state.payload.as_ref()?;
        match payload {
            LyricsPayload::Timed(_) if !self.state.show_synced => Some(payload.unsynced()),
            _ => Some(payload.clone()),
        }
    }

    /// Formats the download menu would offer for the current view.
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        self.display_payload()
            .map(|p| ExportFormat::available_for(&p))
            .unwrap_or_default()
    }

    pub fn export(&self, format: ExportFormat) -> anyhow::Result<ExportFile> {
        let Some(payload) = self.display_payload() else {
            anyhow::bail!("Search for a song first.");
        };
        if !ExportFormat::available_for(&payload).contains(&format) {
            anyhow::bail!("Synchronized lyrics are not available for this song.");
        }
        Ok(ExportFile::new(
            format,
            &payload,
            &self.state.artist,
            &self.state.song,
        ))
    }

    /// Translate or transliterate the current song.
    ///
    /// Emits `StillProcessing` once the soft timeout passes and gives up with
    /// `ClientError::Timeout` at the hard timeout.
    pub async fn transform(
        &mut self,
        kind: TransformKind,
        target: &str,
    ) -> Result<&str, ClientError> {
        self.state.transformed = None;
        self.emit(SessionEvent::Loading);

        let result = {
            let request = self
                .api
                .transform(kind, &self.state.artist, &self.state.song, target);
            tokio::pin!(request);
            let soft = tokio::time::sleep(self.soft_timeout);
            tokio::pin!(soft);
            let hard = tokio::time::sleep(self.hard_timeout);
            tokio::pin!(hard);

            let mut advised = false;
            loop {
                tokio::select! {
                    res = &mut request => break res,
                    _ = &mut soft, if !advised => {
                        advised = true;
                        tracing::debug!("{} still running after soft timeout", kind.noun());
                        self.emit(SessionEvent::StillProcessing(kind.still_processing_message()));
                    }
                    _ = &mut hard => break Err(ClientError::Timeout { message: kind.timeout_message() }),
                }
            }
        };

        match result {
            Ok(text) => {
                let done = self.state.transformed.insert(TransformResult {
                    kind,
                    target: target.to_string(),
                    text,
                });
                Ok(done.text.as_str())
            }
            Err(e) => {
                self.emit(SessionEvent::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Download of the last translation/transliteration.
    pub fn export_transformed(&self, format: ResultFormat) -> anyhow::Result<ExportFile> {
        let Some(result) = &self.state.transformed else {
            anyhow::bail!("Nothing to save yet.");
        };
        let (artist, song) = (&self.state.artist, &self.state.song);
        Ok(ExportFile {
            filename: export::transformed_filename(result.kind, artist, song, format),
            mime: match format {
                ResultFormat::Txt => "text/plain",
                ResultFormat::Json => "application/json",
            },
            content: export::render_transformed(
                result.kind,
                format,
                &result.text,
                artist,
                song,
                &result.target,
            ),
        })
    }
}
