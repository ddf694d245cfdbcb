use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::command::{AppCommand, CommandOutcome};
use super::stats::{AppSnapshot, StatusBoard};
use super::switcher::AreaSwitcher;
use crate::error::ControlError;

struct Request {
    command: AppCommand,
    reply: oneshot::Sender<Result<CommandOutcome, ControlError>>,
}

/// Cloneable handle for sending commands to the dispatcher task
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<Request>,
    board: StatusBoard,
}

impl CommandSender {
    /// Send a command and wait until it has been applied
    pub async fn send(&self, command: AppCommand) -> Result<CommandOutcome, ControlError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request { command, reply })
            .await
            .map_err(|_| anyhow!("Dispatcher is not running"))?;

        rx.await
            .map_err(|_| anyhow!("Dispatcher dropped command {:?}", command))?
    }

    /// Latest snapshot; does not wait for a running command
    pub async fn status(&self) -> AppSnapshot {
        self.board.current().await
    }
}

/// Run `switcher` on its own task, applying commands one at a time
///
/// The task ends, tearing the mounted area down, once every `CommandSender`
/// has been dropped.
pub fn spawn_dispatcher(switcher: AreaSwitcher) -> (CommandSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Request>(32);
    let board = switcher.status_board();

    let handle = tokio::spawn(async move {
        let mut switcher = switcher;
        info!("Dispatcher started ({} area mounted)", switcher.area());

        while let Some(Request { command, reply }) = rx.recv().await {
            debug!("Dispatching {:?}", command);
            let result = switcher.dispatch(command).await;
            if let Err(e) = &result {
                if e.is_rejection() {
                    info!("{:?} rejected: {}", command, e);
                } else {
                    warn!("{:?} failed: {:#}", command, e);
                }
            }
            let _ = reply.send(result);
        }

        switcher.shutdown().await;
        info!("Dispatcher stopped");
    });

    (CommandSender { tx, board }, handle)
}
