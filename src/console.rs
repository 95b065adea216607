//! Terminal glue: prints messages to stdout and routes stdin lines as replies.

use crate::channel::{DeliveryError, Messenger, ReplyRouter, Reporter};
use crate::participant::ParticipantId;
use std::io::BufRead;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// Writes every message to stdout, tagged with its recipient.
#[derive(Debug, Clone, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    async fn write(&self, text: String) -> Result<(), DeliveryError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(text.as_bytes())
            .await
            .map_err(|e| DeliveryError::new(format!("stdout: {e}")))?;
        stdout
            .flush()
            .await
            .map_err(|e| DeliveryError::new(format!("stdout: {e}")))
    }
}

#[async_trait::async_trait]
impl Messenger for ConsoleChannel {
    async fn send_prompt(&self, to: &ParticipantId, text: &str) -> Result<(), DeliveryError> {
        self.write(format!("[to {to}] {text}\n")).await
    }

    async fn send_acknowledgement(
        &self,
        to: &ParticipantId,
        text: &str,
    ) -> Result<(), DeliveryError> {
        self.write(format!("[to {to}] {text}\n")).await
    }
}

#[async_trait::async_trait]
impl Reporter for ConsoleChannel {
    async fn notice(&self, text: &str) -> Result<(), DeliveryError> {
        self.write(format!("{text}\n")).await
    }

    async fn round_summary(&self, lines: &[String]) -> Result<(), DeliveryError> {
        self.write(format!("{}\n", lines.join("\n"))).await
    }

    async fn series_outcome(
        &self,
        winner_label: &str,
        record_lines: &[String],
    ) -> Result<(), DeliveryError> {
        let mut text = format!("The winner of the best of 3 is: {winner_label}!!!\n");
        for line in record_lines {
            text.push_str(line);
            text.push('\n');
        }
        self.write(text).await
    }
}

/// Works out who a console line is addressed to.
///
/// `name: text` addresses `name`; bare text goes to the only human, if
/// there is exactly one.
pub fn address_line<'a>(
    line: &'a str,
    humans: &'a [ParticipantId],
) -> Option<(&'a ParticipantId, &'a str)> {
    if let Some((name, text)) = line.split_once(':') {
        let name = name.trim();
        if let Some(id) = humans.iter().find(|id| id.as_str() == name) {
            return Some((id, text));
        }
    }
    match humans {
        [only] => Some((only, line)),
        _ => None,
    }
}

/// Reads stdin until EOF, delivering each line to the router.
///
/// Blocks the calling thread; run it on a dedicated thread so an
/// unfinished read does not hold up runtime shutdown.
#[instrument(skip(router))]
pub fn pump_stdin(router: ReplyRouter, humans: Vec<ParticipantId>) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                break;
            }
        };
        match address_line(&line, &humans) {
            Some((to, text)) => {
                let delivered = router.deliver(to, text);
                debug!(%to, delivered, "Console reply");
            }
            None => warn!("Prefix replies with a participant name, e.g. `alice: r`"),
        }
    }
}
