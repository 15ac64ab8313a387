//! Keyword-triggered activation from continuous speech recognition.
//!
//! A [`SpeechRecognizer`] yields a stream of transcripts. [`VoiceTrigger`]
//! watches that stream and fires its callback once for every utterance that
//! contains one of [`KEYWORDS`]. Everything else is ignored.

use std::future::Future;

use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;

/// Words that raise an alert when heard anywhere in an utterance.
pub const KEYWORDS: [&str; 3] = ["help", "emergency", "police"];

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech recognition is not supported on this device")]
    Unavailable,
}

/// Case-insensitive substring match against [`KEYWORDS`].
#[must_use]
pub fn matches_keyword(utterance: &str) -> bool {
    let normalised = utterance.trim().to_lowercase();
    KEYWORDS.iter().any(|keyword| normalised.contains(keyword))
}

/// A continuous speech-to-text capability.
pub trait SpeechRecognizer: Send + Sync {
    /// Begin listening. The stream ends only if the capability goes away.
    ///
    /// # Errors
    ///
    /// Returns [`SpeechError::Unavailable`] if there is nothing to listen with.
    fn listen(&self, language: &str) -> Result<BoxStream<'static, String>, SpeechError>;
}

/// Treats each line read from an async reader as one recognized utterance.
///
/// The CLI feeds it stdin, so any external speech engine that prints its
/// transcripts line by line can drive the trigger.
pub struct LineRecognizer<R> {
    reader: std::sync::Mutex<Option<R>>,
}

impl<R> LineRecognizer<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: std::sync::Mutex::new(Some(reader)),
        }
    }
}

impl<R> SpeechRecognizer for LineRecognizer<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn listen(&self, language: &str) -> Result<BoxStream<'static, String>, SpeechError> {
        // The reader can only be consumed once.
        let reader = self
            .reader
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or(SpeechError::Unavailable)?;
        tracing::debug!(language, "listening for transcripts");
        let lines = reader.lines();
        let transcripts = stream::unfold(lines, |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((line, lines)),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "transcript source failed");
                    None
                }
            }
        });
        Ok(transcripts.boxed())
    }
}

/// Handle to a running trigger. Dropping it stops listening.
pub struct VoiceSubscription {
    task: Option<JoinHandle<()>>,
}

impl VoiceSubscription {
    /// Stop listening now.
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Wait until the transcript stream ends on its own.
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "voice trigger task failed");
                }
            }
        }
    }
}

impl Drop for VoiceSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct VoiceTrigger;

impl VoiceTrigger {
    /// Start listening and call `on_match` once per qualifying utterance.
    ///
    /// Each callback is awaited before the next utterance is examined, so two
    /// matches never run concurrently from the same trigger.
    ///
    /// # Errors
    ///
    /// Returns [`SpeechError::Unavailable`] if the recognizer cannot start.
    /// The trigger stays inactive in that case; there is no retry.
    pub fn spawn<R, F, Fut>(
        recognizer: &R,
        language: &str,
        on_match: F,
    ) -> Result<VoiceSubscription, SpeechError>
    where
        R: SpeechRecognizer + ?Sized,
        F: Fn(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut transcripts = recognizer.listen(language).inspect_err(|e| {
            tracing::warn!(error = %e, "voice trigger inactive");
        })?;
        let task = tokio::spawn(async move {
            while let Some(utterance) = transcripts.next().await {
                if matches_keyword(&utterance) {
                    tracing::info!("keyword heard, activating");
                    on_match(utterance).await;
                } else {
                    tracing::trace!("utterance ignored");
                }
            }
            tracing::debug!("transcript stream ended");
        });
        Ok(VoiceSubscription { task: Some(task) })
    }
}
