use super::types::DrainOutcome;
use super::ShutterlinkOrchestrator;
use crate::error::{Result, ShutterlinkError};
use crate::session::{CommandSender, SessionCommand, ShutdownReason};
use tracing::{error, info, warn};

impl ShutterlinkOrchestrator {
    /// Run until the session ends, drain outstanding work, then stop.
    ///
    /// Returns the process exit code.
    pub async fn run(&mut self) -> Result<i32> {
        let mut receiver = self
            .receiver
            .take()
            .ok_or_else(|| ShutterlinkError::system("Command receiver already taken"))?;

        self.start().await?;
        Self::setup_signal_handlers(self.commands.clone());

        info!("Shutterlink is running");

        while !self.controller.is_ended() {
            match receiver.recv().await {
                Some(command) => self.handle_command(command).await,
                None => {
                    warn!("Command queue closed, ending session");
                    self.controller.end_process();
                }
            }
        }

        let outcome = self.drain(&mut receiver).await;
        let exit_code = self.shutdown().await?;

        info!("Shutterlink stopped");
        Ok(match outcome {
            DrainOutcome::Settled => exit_code,
            DrainOutcome::TimedOut { .. } | DrainOutcome::QueueClosed => 1,
        })
    }

    /// SIGINT and SIGTERM end the session through the queue like any other input
    fn setup_signal_handlers(commands: CommandSender) {
        #[cfg(unix)]
        {
            let commands = commands.clone();
            tokio::spawn(async move {
                use tokio::signal::unix::{signal, SignalKind};

                let mut terminate = match signal(SignalKind::terminate()) {
                    Ok(terminate) => terminate,
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };
                if terminate.recv().await.is_some() {
                    info!("Received SIGTERM signal");
                    let _ = commands.send(SessionCommand::End(ShutdownReason::Signal(
                        "SIGTERM".to_string(),
                    )));
                }
            });
        }

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received SIGINT signal (Ctrl+C)");
                let _ = commands.send(SessionCommand::End(ShutdownReason::Signal(
                    "SIGINT".to_string(),
                )));
            }
        });
    }
}
