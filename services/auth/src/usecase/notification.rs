use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::repository::NotificationGateway;
use crate::domain::types::OutgoingEmail;

/// Fire-and-forget handle onto the bounded notification queue.
///
/// [`Notifier::send`] never waits: when the queue is full or the worker is
/// gone the email is dropped with a warning.
#[derive(Clone)]
pub struct Notifier {
    tx: Sender<OutgoingEmail>,
}

impl Notifier {
    /// `capacity` must be non-zero.
    pub fn channel(capacity: usize) -> (Self, Receiver<OutgoingEmail>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// False once the worker has exited; every later email would be dropped.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    pub fn send(&self, email: OutgoingEmail) {
        match self.tx.try_send(email) {
            Ok(()) => {}
            Err(TrySendError::Full(email)) => {
                warn!(email_id = %email.id, template = email.template.key(), "notification queue full, email dropped");
            }
            Err(TrySendError::Closed(email)) => {
                warn!(email_id = %email.id, template = email.template.key(), "notification worker gone, email dropped");
            }
        }
    }
}

/// Drain the queue into `gateway` until every [`Notifier`] is dropped.
pub fn spawn_notification_worker<G>(gateway: G, mut rx: Receiver<OutgoingEmail>) -> JoinHandle<()>
where
    G: NotificationGateway,
{
    tokio::spawn(async move {
        while let Some(email) = rx.recv().await {
            match gateway.send_email(&email).await {
                Ok(()) => debug!(email_id = %email.id, template = email.template.key(), "email handed off"),
                Err(e) => {
                    warn!(email_id = %email.id, template = email.template.key(), error = ?e, "email hand-off failed");
                }
            }
        }
    })
}
