use tokio::sync::watch;

use crate::{auth::IdentityResolver, models::Session};

/// IdentitySource
///
/// The single writer of the process-wide session. Every publish replaces the session
/// wholesale; subscribers get read-only `IdentityHandle`s and can only react.
///
/// Dropping the source tears the session down: mounted views observe the closed channel
/// and unmount.
#[derive(Debug)]
pub struct IdentitySource {
    tx: watch::Sender<Session>,
}

impl IdentitySource {
    /// Starts out pending; nothing has been resolved yet.
    pub fn new() -> Self {
        Self::with_session(Session::pending())
    }

    pub fn with_session(session: Session) -> Self {
        let (tx, _rx) = watch::channel(session);
        Self { tx }
    }

    pub fn subscribe(&self) -> IdentityHandle {
        IdentityHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Replace the session. Subscribers are notified even when the value is unchanged.
    pub fn publish(&self, session: Session) {
        tracing::debug!(
            readiness = ?session.readiness,
            signed_in = session.user().is_some(),
            is_admin = session.is_admin,
            "identity published"
        );
        self.tx.send_replace(session);
    }

    pub fn sign_out(&self) {
        self.publish(Session::anonymous());
    }

    /// Resolve the viewer from a bearer token. Publishes `pending` first, then the settled
    /// result. This is the only place the identity pipeline suspends.
    pub async fn resolve_with(&self, resolver: &dyn IdentityResolver, token: Option<&str>) {
        self.publish(Session::pending());
        let session = resolver.resolve(token).await;
        self.publish(session);
    }
}

impl Default for IdentitySource {
    fn default() -> Self {
        Self::new()
    }
}

/// IdentityHandle
///
/// Read-only subscription to the session. Cloning yields an independent cursor.
#[derive(Debug, Clone)]
pub struct IdentityHandle {
    rx: watch::Receiver<Session>,
}

impl IdentityHandle {
    /// The latest session, without marking it seen.
    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    /// The latest session, marking it seen.
    pub fn observe(&mut self) -> Session {
        self.rx.borrow_and_update().clone()
    }

    /// Whether a session newer than the last observed one is queued. Still answers after
    /// the source is gone, for the final value it published.
    pub fn has_changed(&self) -> bool {
        self.rx.borrow().has_changed()
    }

    /// Wait for the next session. Returns `false` once the source is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
