//! Line-oriented console collaborators for running the loop without audio.
//!
//! Each input line stands for one listen attempt: during passive listening a
//! line mentioning the persona counts as the wake phrase, and during active
//! listening the next line is the utterance. Spoken output is written as
//! `[hark] ...` lines.

use crate::collaborators::{Brain, ListenResult, Messenger, Microphone};
use crate::error::{HarkError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

/// Threshold reported for a typed wake phrase.
const CONSOLE_WAKE_THRESHOLD: f32 = 1.0;

/// Microphone backed by a line reader and a writer.
pub struct ConsoleMicrophone<R, W> {
    lines: tokio::sync::Mutex<Lines<R>>,
    out: Mutex<W>,
    last_utterance: Mutex<Option<String>>,
}

impl<R, W> ConsoleMicrophone<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Read listen attempts from `input`, write speech to `out`.
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: tokio::sync::Mutex::new(input.lines()),
            out: Mutex::new(out),
            last_utterance: Mutex::new(None),
        }
    }

    async fn next_line(&self) -> Result<String> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await? {
            Some(line) => Ok(line.trim().to_owned()),
            None => Err(HarkError::Audio("console input closed".into())),
        }
    }
}

#[async_trait]
impl<R, W> Microphone for ConsoleMicrophone<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn passive_listen(&self, persona: &str) -> Result<ListenResult> {
        let line = self.next_line().await?;
        if line.to_lowercase().contains(&persona.to_lowercase()) {
            Ok(ListenResult::detected(CONSOLE_WAKE_THRESHOLD, line))
        } else {
            debug!(line, "no wake phrase in console line");
            Ok(ListenResult::nothing())
        }
    }

    async fn active_listen(&self) -> Result<()> {
        let line = self.next_line().await?;
        *self
            .last_utterance
            .lock()
            .map_err(|_| HarkError::Audio("utterance buffer poisoned".into()))? = Some(line);
        Ok(())
    }

    async fn text_from_listen(&self) -> Result<Option<String>> {
        let mut last = self
            .last_utterance
            .lock()
            .map_err(|_| HarkError::Audio("utterance buffer poisoned".into()))?;
        Ok(last.take())
    }

    async fn say(&self, text: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| HarkError::Speech("console output poisoned".into()))?;
        writeln!(out, "[hark] {text}").map_err(|e| HarkError::Speech(e.to_string()))?;
        out.flush().map_err(|e| HarkError::Speech(e.to_string()))?;
        Ok(())
    }
}

/// Brain that repeats the query back through the microphone.
pub struct EchoBrain {
    mic: Arc<dyn Microphone>,
}

impl EchoBrain {
    /// Echo through `mic`.
    pub fn new(mic: Arc<dyn Microphone>) -> Self {
        Self { mic }
    }
}

#[async_trait]
impl Brain for EchoBrain {
    async fn query(&self, text: &str, messenger: Option<&dyn Messenger>) -> Result<()> {
        let reply = format!("You said: {text}");
        if let Some(messenger) = messenger {
            messenger.send_text(&reply).await?;
        }
        self.mic.say(&reply).await
    }
}
