//! Reminder session event loop.
//!
//! A [`Session`] owns the state machine and drives it from a single task:
//! user commands arrive on a channel, ticks come from the clock observation
//! of the active subscription. After every step the observation is
//! reconciled with the machine, so leaving a state drops its countdown on
//! the same loop turn.

use anyhow::{anyhow, Context, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::clock::{Clock, Observation};
use super::machine::{ReminderMachine, SubscriptionId};
use crate::notification::NotificationSink;
use crate::types::{History, HistoryEntry, Permission, StatusReport};

// ============================================================================
// SessionCommand
// ============================================================================

/// Commands accepted by a running session.
#[derive(Debug)]
pub enum SessionCommand {
    Start,
    Drink,
    Stop,
    /// Ask the sink for notification permission
    RequestPermission,
    /// Answer to an earlier permission request
    PermissionResolved(Permission),
    /// Query the current status
    Status(oneshot::Sender<StatusReport>),
    /// Query the history log
    History(oneshot::Sender<Vec<HistoryEntry>>),
    /// End the session
    Quit,
}

// ============================================================================
// SessionHandle
// ============================================================================

/// Sends commands to a running [`Session`].
///
/// The session ends once every handle has been dropped or [`quit`](Self::quit)
/// is called.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Sends a raw command.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has ended.
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| anyhow!("セッションは終了しています"))
    }

    pub fn start(&self) -> Result<()> {
        self.send(SessionCommand::Start)
    }

    pub fn drink(&self) -> Result<()> {
        self.send(SessionCommand::Drink)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop)
    }

    pub fn request_permission(&self) -> Result<()> {
        self.send(SessionCommand::RequestPermission)
    }

    pub fn quit(&self) -> Result<()> {
        self.send(SessionCommand::Quit)
    }

    /// Queries the current status.
    pub async fn status(&self) -> Result<StatusReport> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Status(reply))?;
        rx.await.context("ステータスの取得に失敗しました")
    }

    /// Queries the history log.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::History(reply))?;
        rx.await.context("履歴の取得に失敗しました")
    }
}

// ============================================================================
// Session
// ============================================================================

/// Single-task driver for a [`ReminderMachine`].
pub struct Session<S> {
    machine: ReminderMachine<S>,
    clock: Clock,
    observation: Option<(SubscriptionId, Observation)>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    /// Used by permission tasks to report back without keeping the session alive
    loopback: mpsc::WeakUnboundedSender<SessionCommand>,
}

impl<S: NotificationSink> Session<S> {
    /// Creates a session and the handle used to control it.
    pub fn new(machine: ReminderMachine<S>, clock: Clock) -> (Self, SessionHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let session = Self {
            machine,
            clock,
            observation: None,
            commands,
            loopback: tx.downgrade(),
        };
        (session, SessionHandle { tx })
    }

    /// Runs until [`SessionCommand::Quit`] or until every handle is dropped.
    ///
    /// Returns the history of the session.
    pub async fn run(mut self) -> History {
        info!(
            frequency_minutes = self.machine.config().frequency_minutes,
            "セッションを開始しました"
        );
        self.sync_observation();

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    match command {
                        Some(SessionCommand::Quit) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                (id, elapsed) = next_tick(&mut self.observation) => {
                    self.machine.on_tick(id, elapsed);
                }
            }

            self.sync_observation();
        }

        info!(
            history_len = self.machine.history().len(),
            "セッションを終了しました"
        );
        self.machine.into_history()
    }

    fn handle_command(&mut self, command: SessionCommand) {
        debug!(?command, "コマンドを受信しました");

        match command {
            SessionCommand::Start => self.machine.start(),
            SessionCommand::Drink => self.machine.drink(),
            SessionCommand::Stop => self.machine.stop(),
            SessionCommand::RequestPermission => self.spawn_permission_request(),
            SessionCommand::PermissionResolved(permission) => {
                self.machine.permission_resolved(permission)
            }
            SessionCommand::Status(reply) => {
                let _ = reply.send(self.machine.status());
            }
            SessionCommand::History(reply) => {
                let _ = reply.send(self.machine.history().entries().to_vec());
            }
            SessionCommand::Quit => {}
        }
    }

    /// Runs the permission prompt in its own task so ticks keep flowing.
    fn spawn_permission_request(&self) {
        let Some(loopback) = self.loopback.upgrade() else {
            debug!("セッション終了中のため通知許可リクエストを破棄しました");
            return;
        };

        let request = self.machine.request_permission();
        tokio::spawn(async move {
            let permission = request.await;
            let _ = loopback.send(SessionCommand::PermissionResolved(permission));
        });
    }

    /// Replaces the clock observation when the active subscription changed.
    fn sync_observation(&mut self) {
        let active = self.machine.subscription().map(|s| s.id());
        let current = self.observation.as_ref().map(|(id, _)| *id);
        if active == current {
            return;
        }

        if let Some(id) = current {
            debug!(%id, "カウントダウンをキャンセルしました");
        }
        self.observation = active.map(|id| (id, self.clock.observe()));
    }
}

/// Waits for the next tick of the observation, or forever if there is none.
async fn next_tick(
    observation: &mut Option<(SubscriptionId, Observation)>,
) -> (SubscriptionId, u64) {
    match observation {
        Some((id, observation)) => {
            let id = *id;
            (id, observation.next_elapsed().await)
        }
        None => std::future::pending().await,
    }
}

// ============================================================================
// Tests
// ============================================================================
