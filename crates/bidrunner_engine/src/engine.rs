use std::sync::{mpsc, Arc};
use std::thread;

use bidrunner_core::JobParameters;
use tokio::sync::Mutex;

use crate::{AwsCredentials, EngineEvent, JobRunner, RunnerConfig};

enum EngineCommand {
    Launch { parameters: JobParameters },
    CheckStatus { job_name: String },
}

/// Drives the runner on a dedicated thread's tokio runtime so the queue's
/// long-poll receive never blocks the caller. Commands go in over a channel;
/// results come back as [`EngineEvent`]s the caller drains with `try_recv`.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Connect to the real services and start the worker.
    pub fn new(config: RunnerConfig, credentials: AwsCredentials) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let runner = runtime.block_on(JobRunner::connect(config, credentials));
            serve(runtime, runner, cmd_rx, event_tx);
        });

        Self { cmd_tx, event_rx }
    }

    /// Start the worker around an already-built runner (used by tests with
    /// fake service clients).
    pub fn with_runner(runner: JobRunner) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            serve(runtime, runner, cmd_rx, event_tx);
        });

        Self { cmd_tx, event_rx }
    }

    pub fn launch(&self, parameters: JobParameters) {
        let _ = self.cmd_tx.send(EngineCommand::Launch { parameters });
    }

    pub fn check_status(&self, job_name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::CheckStatus {
            job_name: job_name.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

fn serve(
    runtime: tokio::runtime::Runtime,
    runner: JobRunner,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runner = Arc::new(Mutex::new(runner));
    while let Ok(command) = cmd_rx.recv() {
        let runner = runner.clone();
        let event_tx = event_tx.clone();
        runtime.spawn(async move {
            handle_command(runner, command, event_tx).await;
        });
    }
}

async fn handle_command(
    runner: Arc<Mutex<JobRunner>>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Launch { parameters } => {
            // The lock is the single-flight guard around handle mutation:
            // a launch never races an in-flight status check.
            let result = runner.lock().await.launch(&parameters).await;
            let _ = event_tx.send(EngineEvent::Launched { result });
        }
        EngineCommand::CheckStatus { job_name } => {
            let report = runner.lock().await.status(&job_name).await;
            let _ = event_tx.send(EngineEvent::Status { report });
        }
    }
}
