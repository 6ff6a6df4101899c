//! Console host: runs the conversation loop over stdin/stdout.
//!
//! Type a line containing the persona to wake the loop, then the utterance
//! on the next line. Tracing output goes to stderr so stdout only carries
//! what the assistant says. Closing stdin ends the session.

use hark::console::{ConsoleMicrophone, EchoBrain};
use hark::{ConversationLoop, HarkConfig, Microphone, Session};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(HarkConfig::default_config_path);
    let config = HarkConfig::load_or_default(&config_path)?;
    tracing::info!(path = %config_path.display(), persona = %config.conversation.persona, "hark-console starting");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mic: Arc<dyn Microphone> = Arc::new(ConsoleMicrophone::new(stdin, std::io::stdout()));
    let brain = Arc::new(EchoBrain::new(mic.clone()));
    let session = Session::new(config, mic, brain);

    let mut conversation = ConversationLoop::new(session);
    let Err(e) = conversation.handle_forever().await;
    tracing::error!(error = %e, "conversation loop ended");
    Err(anyhow::anyhow!("hark-console stopped: {e}"))
}
