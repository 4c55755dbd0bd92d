use tokio::{sync::mpsc, task::JoinHandle};

use crate::{guard::Rendered, identity::IdentityHandle, layout::LayoutStack};

/// MountedView
///
/// A layout stack attached to the live identity source. Dropping it unmounts the view:
/// the driver task is aborted and any redirect it had not committed yet never fires.
#[derive(Debug)]
pub struct MountedView {
    task: Option<JoinHandle<()>>,
}

impl MountedView {
    /// Wait until the view unmounts on its own, i.e. the identity source was torn down or
    /// the frame receiver was dropped.
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                tracing::warn!(%error, "mounted view driver stopped abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for MountedView {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// mount
///
/// Spawn the driver that re-renders `stack` on every session change and streams the frames.
///
/// Each iteration renders the latest session, then yields once so the identity source can
/// finish a burst of transitions. Redirects are committed only when no newer session is
/// queued, so a `pending -> absent -> present` burst ends in `present` without navigating.
pub fn mount<T, F>(
    stack: LayoutStack,
    identity: IdentityHandle,
    content: F,
) -> (MountedView, mpsc::UnboundedReceiver<Rendered<T>>)
where
    T: Send + 'static,
    F: Fn() -> T + Send + 'static,
{
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(drive(stack, identity, content, frames_tx));
    (MountedView { task: Some(task) }, frames_rx)
}

async fn drive<T, F>(
    mut stack: LayoutStack,
    mut identity: IdentityHandle,
    content: F,
    frames: mpsc::UnboundedSender<Rendered<T>>,
) where
    F: Fn() -> T,
{
    loop {
        let session = identity.observe();
        let frame = stack.render(&session, &content);
        if frames.send(frame).is_err() {
            break;
        }

        tokio::task::yield_now().await;
        if !identity.has_changed() {
            stack.commit();
        }

        if !identity.changed().await {
            break;
        }
    }

    stack.unmount();
    tracing::debug!(depth = stack.depth(), "view unmounted");
}
