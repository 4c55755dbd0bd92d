use std::fmt;

use crate::{
    models::{Location, Policy, Presence, Session},
    navigator::NavigatorState,
};

/// DenialReason
///
/// The only two ways a guard can refuse a viewer. Why authentication failed
/// (expired token, never signed in, ...) belongs to the identity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    NotAuthenticated,
    NotAdmin,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::NotAuthenticated => f.write_str("not_authenticated"),
            DenialReason::NotAdmin => f.write_str("not_admin"),
        }
    }
}

/// GuardDecision
///
/// Outcome of evaluating a session against a policy. Derived on every render, never stored
/// as the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pending,
    Denied(DenialReason),
    Allowed,
}

impl GuardDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, GuardDecision::Denied(_))
    }
}

/// decide
///
/// The pure decision function. Same (session, policy) in, same decision out.
///
/// Readiness is checked first for every policy, including the public one. Once settled, a
/// public policy allows anyone; otherwise presence is checked, then the admin flag.
/// Presence is authoritative: an `is_admin` flag observed without a signed-in user still
/// yields `NotAuthenticated`.
pub fn decide(session: &Session, policy: &Policy) -> GuardDecision {
    if session.is_pending() {
        return GuardDecision::Pending;
    }
    if !policy.require_authentication() {
        return GuardDecision::Allowed;
    }
    if session.presence == Presence::Absent {
        return GuardDecision::Denied(DenialReason::NotAuthenticated);
    }
    if policy.require_admin() && !session.is_admin {
        return GuardDecision::Denied(DenialReason::NotAdmin);
    }
    GuardDecision::Allowed
}

/// Rendered
///
/// What a guarded boundary puts on screen for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<T> {
    /// Loading placeholder while the identity source is still resolving.
    Placeholder,
    /// Denied: nothing at all. The navigator owns the visible transition.
    Nothing,
    /// Allowed: the wrapped subtree, untouched.
    Children(T),
}

impl<T> Rendered<T> {
    pub fn children(self) -> Option<T> {
        match self {
            Rendered::Children(children) => Some(children),
            _ => None,
        }
    }
}

/// Redirect effect bookkeeping. `Scheduled` is entered on the transition into a denial and
/// only turns into a navigation on `commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirectEffect {
    /// Not denied, or the denial was left; the next denial schedules a fresh redirect.
    Idle,
    /// Denied in the render phase, waiting for `commit`.
    Scheduled(DenialReason),
    /// Navigation done; stays here while the guard keeps denying, so no second redirect.
    Issued(DenialReason),
}

/// AuthGuard
///
/// One authorization boundary: a policy, the navigator to send denied viewers through,
/// and the fallback location they are sent to.
///
/// Rendering and redirecting are split into two phases. `evaluate`/`render` are the
/// render phase: they compute the decision and schedule a redirect on the transition
/// into a denial. `commit` is the effect phase: it performs the scheduled navigation,
/// at most once per denial. Leaving the denial (allowed or pending again) or unmounting
/// before `commit` drops the scheduled redirect.
pub struct AuthGuard {
    policy: Policy,
    navigator: NavigatorState,
    fallback: Location,
    last: Option<GuardDecision>,
    redirect: RedirectEffect,
}

impl AuthGuard {
    pub fn new(policy: Policy, navigator: NavigatorState, fallback: Location) -> Self {
        Self {
            policy,
            navigator,
            fallback,
            last: None,
            redirect: RedirectEffect::Idle,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// The decision from the most recent evaluation; `None` while unmounted.
    pub fn last_decision(&self) -> Option<GuardDecision> {
        self.last
    }

    /// Whether a redirect is waiting for `commit`.
    pub fn has_scheduled_redirect(&self) -> bool {
        matches!(self.redirect, RedirectEffect::Scheduled(_))
    }

    /// Render phase: decide and update the redirect effect.
    pub fn evaluate(&mut self, session: &Session) -> GuardDecision {
        let decision = decide(session, &self.policy);
        let was_denied = self.last.is_some_and(|last| last.is_denied());

        match decision {
            GuardDecision::Denied(reason) => {
                if !was_denied {
                    tracing::debug!(%reason, "guard denied, redirect scheduled");
                    self.redirect = RedirectEffect::Scheduled(reason);
                } else if let RedirectEffect::Scheduled(_) = self.redirect {
                    // Still inside the same denial; keep the latest reason for the log line.
                    self.redirect = RedirectEffect::Scheduled(reason);
                }
            }
            GuardDecision::Pending | GuardDecision::Allowed => {
                if let RedirectEffect::Scheduled(reason) = self.redirect {
                    tracing::debug!(%reason, ?decision, "scheduled redirect cancelled");
                }
                self.redirect = RedirectEffect::Idle;
            }
        }

        self.last = Some(decision);
        decision
    }

    /// Render phase with output. `children` is only invoked when the decision is `Allowed`,
    /// so a denied subtree is never even built.
    pub fn render<T>(&mut self, session: &Session, children: impl FnOnce() -> T) -> Rendered<T> {
        match self.evaluate(session) {
            GuardDecision::Pending => Rendered::Placeholder,
            GuardDecision::Denied(_) => Rendered::Nothing,
            GuardDecision::Allowed => Rendered::Children(children()),
        }
    }

    /// Effect phase: perform the scheduled redirect, if any. Returns the reason of the
    /// redirect that was issued by this call.
    pub fn commit(&mut self) -> Option<DenialReason> {
        let RedirectEffect::Scheduled(reason) = self.redirect else {
            return None;
        };
        tracing::info!(
            %reason,
            policy = ?self.policy,
            fallback = %self.fallback,
            "redirecting denied viewer"
        );
        self.navigator.navigate_to(&self.fallback);
        self.redirect = RedirectEffect::Issued(reason);
        Some(reason)
    }

    /// Detach the guard from the view. Any redirect not yet committed is suppressed and the
    /// next evaluation starts from scratch.
    pub fn unmount(&mut self) {
        if let RedirectEffect::Scheduled(reason) = self.redirect {
            tracing::debug!(%reason, "guard unmounted, redirect suppressed");
        }
        self.redirect = RedirectEffect::Idle;
        self.last = None;
    }
}

impl fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGuard")
            .field("policy", &self.policy)
            .field("fallback", &self.fallback)
            .field("last", &self.last)
            .field("redirect", &self.redirect)
            .finish()
    }
}
