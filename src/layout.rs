use serde::Deserialize;
use std::fmt;

use crate::{
    guard::{AuthGuard, DenialReason, GuardDecision, Rendered},
    models::{Location, Policy, Session},
    navigator::NavigatorState,
};

/// Layout
///
/// A page- or section-level boundary carrying exactly one policy.
///
/// Page authors declare it as `{ "requireAdmin": bool }`; omitting the flag gives the
/// "any signed-in user" layout. `Layout::public()` has no requirement at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    policy: Policy,
}

impl Layout {
    pub const fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub const fn public() -> Self {
        Self::new(Policy::public())
    }

    pub const fn authenticated() -> Self {
        Self::new(Policy::authenticated())
    }

    pub const fn admin() -> Self {
        Self::new(Policy::admin())
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Instantiate this boundary's guard.
    pub fn guard(&self, navigator: NavigatorState, fallback: Location) -> AuthGuard {
        AuthGuard::new(self.policy, navigator, fallback)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::authenticated()
    }
}

/// LayoutStack
///
/// Physically nested layouts, outermost first, each with its own guard.
///
/// Evaluation walks inward. Every boundary that is reached does its own full evaluation,
/// even when the boundaries outside it already allowed. The first boundary that does not
/// allow decides the frame, and every boundary inside it is treated as unmounted. The
/// content is only built when all boundaries allow.
pub struct LayoutStack {
    navigator: NavigatorState,
    fallback: Location,
    guards: Vec<AuthGuard>,
}

impl LayoutStack {
    pub fn new(navigator: NavigatorState, fallback: Location) -> Self {
        Self {
            navigator,
            fallback,
            guards: Vec::new(),
        }
    }

    /// Nest `layout` inside every layout added so far.
    pub fn nest(mut self, layout: Layout) -> Self {
        let guard = layout.guard(self.navigator.clone(), self.fallback.clone());
        self.guards.push(guard);
        self
    }

    pub fn depth(&self) -> usize {
        self.guards.len()
    }

    /// Last decision per boundary, outermost first. `None` marks a boundary that was not
    /// mounted during the last render pass.
    pub fn decisions(&self) -> Vec<Option<GuardDecision>> {
        self.guards.iter().map(AuthGuard::last_decision).collect()
    }

    pub fn render<T>(&mut self, session: &Session, content: impl FnOnce() -> T) -> Rendered<T> {
        let mut frame = None;

        for guard in &mut self.guards {
            if frame.is_some() {
                guard.unmount();
                continue;
            }
            match guard.evaluate(session) {
                GuardDecision::Allowed => {}
                GuardDecision::Pending => frame = Some(Rendered::Placeholder),
                GuardDecision::Denied(_) => frame = Some(Rendered::Nothing),
            }
        }

        frame.unwrap_or_else(|| Rendered::Children(content()))
    }

    /// Run the effect phase of every boundary. Only the innermost mounted boundary can hold
    /// a scheduled redirect, so at most one navigation happens per call.
    pub fn commit(&mut self) -> Option<DenialReason> {
        self.guards
            .iter_mut()
            .fold(None, |issued, guard| guard.commit().or(issued))
    }

    pub fn unmount(&mut self) {
        for guard in &mut self.guards {
            guard.unmount();
        }
    }
}

impl fmt::Debug for LayoutStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStack")
            .field("fallback", &self.fallback)
            .field("guards", &self.guards)
            .finish()
    }
}
