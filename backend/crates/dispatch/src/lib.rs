//! Async Dispatch
//!
//! Fire-and-forget task queue for long-latency sends. Request handlers
//! submit a [`Task`] and return immediately; the worker loop owns the
//! outbound SMS and mail clients and processes tasks one at a time.
//!
//! Delivery semantics: submission never blocks, a full queue drops the
//! task, worker failures are logged and never retried.

use platform::mailer::Mailer;
use platform::sms::SmsSender;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// A unit of deferred work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Send an sms verification code
    SendSmsCode {
        mobile: String,
        code: String,
        expires_minutes: u64,
    },
    /// Send an email-verification link
    SendVerifyEmail { to: String, verify_url: String },
}

impl Task {
    /// Stable task name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Task::SendSmsCode { .. } => "send_sms_code",
            Task::SendVerifyEmail { .. } => "send_verify_email",
        }
    }
}

/// Receiving end of the task queue, consumed by the worker
pub type TaskReceiver = mpsc::Receiver<Task>;

/// Cloneable fire-and-forget submission handle
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<Task>,
}

impl Dispatcher {
    /// Submit a task without waiting for completion
    ///
    /// The caller receives no success/failure signal.
    pub fn submit(&self, task: Task) {
        let name = task.name();
        if let Err(err) = self.tx.try_send(task) {
            // Fire and forget: a full or closed queue drops the task.
            warn!(task = name, error = %err, "Dropped dispatch task");
        }
    }
}

/// Create the task queue with the given capacity
pub fn task_queue(capacity: usize) -> (Dispatcher, TaskReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (Dispatcher { tx }, rx)
}

/// Spawn the worker loop that drains the queue
///
/// Runs until every [`Dispatcher`] clone is dropped and the queue is
/// empty. Failures are logged per task; processing continues.
pub fn spawn_worker(
    mut receiver: TaskReceiver,
    sms: SmsSender,
    mailer: Mailer,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!("Dispatch worker started");

        while let Some(task) = receiver.recv().await {
            let name = task.name();
            let result = match task {
                Task::SendSmsCode {
                    mobile,
                    code,
                    expires_minutes,
                } => sms
                    .send_code(&mobile, &code, expires_minutes)
                    .await
                    .map_err(|e| e.to_string()),
                Task::SendVerifyEmail { to, verify_url } => mailer
                    .send_verify_email(&to, &verify_url)
                    .await
                    .map_err(|e| e.to_string()),
            };

            if let Err(error) = result {
                // No retries: the failure is recorded and the task is gone.
                error!(task = name, error, "Dispatch task failed");
            }
        }

        info!("Dispatch worker stopped (queue closed)");
    })
}
