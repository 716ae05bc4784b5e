use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use stellar_protocol::{ClassName, DomCommand, NodeId};
use thiserror::Error;
use tracing::{info, warn};

use crate::clock::WallClock;
use crate::runtime::{Context, Task};
use crate::storage::{self, KeyValueStore};

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

const SUBMITTING_LABEL: &str = "Subscribing...";
const FAILURE_MESSAGE: &str = "Subscription failed. Please try again.";

/// One accepted newsletter sign-up. Appended to storage, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub name: String,
    pub email: String,
    #[serde(rename = "date")]
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("a submission is already in flight")]
    InFlight,
}

#[derive(Debug, Error)]
#[error("subscribe backend: {0}")]
pub struct BackendError(pub String);

/// The remote end of a sign-up.
pub trait SubscribeBackend {
    fn subscribe(&mut self, name: &str, email: &str) -> Result<(), BackendError>;
}

/// Stand-in for a newsletter service; every sign-up succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedBackend;

impl SubscribeBackend for SimulatedBackend {
    fn subscribe(&mut self, _name: &str, _email: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Field checks in the order the user sees them.
pub fn validate(name: &str, email: &str) -> Result<(), ValidationError> {
    if name.is_empty() || email.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !EMAIL.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Elements of the newsletter form as found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterForm {
    pub form: NodeId,
    pub submit: Option<NodeId>,
    /// Text of the submit button before any submission.
    pub submit_label: String,
    pub success: Option<NodeId>,
    pub error: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageRegion {
    Success,
    Error,
}

impl MessageRegion {
    fn slot(self) -> usize {
        match self {
            MessageRegion::Success => 0,
            MessageRegion::Error => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSubmission {
    name: String,
    email: String,
}

/// Validates and "submits" the newsletter form.
///
/// Only one submission is in flight at a time. Message regions auto-hide,
/// but a hide timer only applies to the message it was scheduled for.
#[derive(Debug)]
pub struct FormSubmitter {
    elements: NewsletterForm,
    latency: Duration,
    dwell: Duration,
    in_flight: Option<PendingSubmission>,
    generations: [u64; 2],
    visible: Option<(MessageRegion, String)>,
}

impl FormSubmitter {
    pub fn new(
        elements: NewsletterForm,
        latency: Duration,
        dwell: Duration,
    ) -> Self {
        Self {
            elements,
            latency,
            dwell,
            in_flight: None,
            generations: [0; 2],
            visible: None,
        }
    }

    pub fn form(&self) -> NodeId {
        self.elements.form
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The message region currently shown, with its text.
    pub fn visible_message(&self) -> Option<(MessageRegion, &str)> {
        self.visible.as_ref().map(|(r, t)| (*r, t.as_str()))
    }

    /// Validate and start a submission. Rejections are shown in the error
    /// region and returned.
    pub fn submit(&mut self, name: &str, email: &str, ctx: &mut Context<'_>) -> Result<(), SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::InFlight);
        }
        if let Err(err) = validate(name, email) {
            self.show_message(MessageRegion::Error, &err.to_string(), ctx);
            return Err(err.into());
        }

        if let Some(button) = self.elements.submit {
            ctx.emit(DomCommand::text(button, SUBMITTING_LABEL));
            ctx.emit(DomCommand::SetDisabled {
                node: button,
                disabled: true,
            });
        }
        self.in_flight = Some(PendingSubmission {
            name: name.to_string(),
            email: email.to_string(),
        });
        ctx.scheduler.set_timeout(self.latency, Task::SubmitComplete);
        Ok(())
    }

    /// Finish the in-flight submission once the simulated latency elapsed.
    /// Returns the record that was accepted, if any.
    pub fn complete(
        &mut self,
        backend: &mut dyn SubscribeBackend,
        store: &mut dyn KeyValueStore,
        clock: &dyn WallClock,
        ctx: &mut Context<'_>,
    ) -> Option<SubscriptionRecord> {
        let pending = self.in_flight.take()?;
        self.restore_button(ctx);

        if let Err(err) = backend.subscribe(&pending.name, &pending.email) {
            warn!(error = %err, "Newsletter subscription failed");
            self.show_message(MessageRegion::Error, FAILURE_MESSAGE, ctx);
            return None;
        }

        let message = format!("Thank you, {}! You've been subscribed.", pending.name);
        self.show_message(MessageRegion::Success, &message, ctx);
        ctx.emit(DomCommand::ResetForm {
            node: self.elements.form,
        });

        let record = SubscriptionRecord {
            name: pending.name,
            email: pending.email,
            submitted_at: clock.now(),
        };
        match storage::append_subscriber(store, record.clone()) {
            Ok(count) => info!(count, "Newsletter subscription stored"),
            Err(err) => warn!(error = %err, "Could not persist subscription"),
        }
        Some(record)
    }

    fn restore_button(&self, ctx: &mut Context<'_>) {
        if let Some(button) = self.elements.submit {
            ctx.emit(DomCommand::text(button, self.elements.submit_label.as_str()));
            ctx.emit(DomCommand::SetDisabled {
                node: button,
                disabled: false,
            });
        }
    }

    fn region_node(&self, region: MessageRegion) -> Option<NodeId> {
        match region {
            MessageRegion::Success => self.elements.success,
            MessageRegion::Error => self.elements.error,
        }
    }

    /// Hide every message region, then show `text` in `region`.
    pub fn show_message(&mut self, region: MessageRegion, text: &str, ctx: &mut Context<'_>) {
        let Some(node) = self.region_node(region) else {
            return;
        };
        for other in [self.elements.success, self.elements.error].into_iter().flatten() {
            ctx.emit(DomCommand::RemoveClass {
                node: other,
                class: ClassName::Visible,
            });
        }
        ctx.emit(DomCommand::text(node, text));
        ctx.emit(DomCommand::AddClass {
            node,
            class: ClassName::Visible,
        });

        let slot = region.slot();
        self.generations[slot] += 1;
        self.visible = Some((region, text.to_string()));
        ctx.scheduler.set_timeout(
            self.dwell,
            Task::HideMessage {
                region,
                generation: self.generations[slot],
            },
        );
    }

    /// Auto-hide timer. Ignored if the region showed a newer message since.
    pub fn hide_message(&mut self, region: MessageRegion, generation: u64, ctx: &mut Context<'_>) {
        if self.generations[region.slot()] != generation {
            return;
        }
        let Some(node) = self.region_node(region) else {
            return;
        };
        ctx.emit(DomCommand::RemoveClass {
            node,
            class: ClassName::Visible,
        });
        if self.visible.as_ref().is_some_and(|(r, _)| *r == region) {
            self.visible = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::clock::FixedClock;
    use crate::runtime::Runtime;
    use crate::storage::{MemoryStore, load_subscribers};

    struct FailingBackend;

    impl SubscribeBackend for FailingBackend {
        fn subscribe(&mut self, _name: &str, _email: &str) -> Result<(), BackendError> {
            Err(BackendError("503".to_string()))
        }
    }

    fn setup(h: &mut Runtime) -> FormSubmitter {
        let elements = NewsletterForm {
            form: h.nodes.alloc(),
            submit: Some(h.nodes.alloc()),
            submit_label: "Subscribe".to_string(),
            success: Some(h.nodes.alloc()),
            error: Some(h.nodes.alloc()),
        };
        FormSubmitter::new(elements, Duration::from_millis(1500), Duration::from_millis(5000))
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).single().unwrap_or_default())
    }

    #[test]
    fn validation_order() {
        assert_eq!(validate("", "a@b.com"), Err(ValidationError::MissingFields));
        assert_eq!(validate("Ada", ""), Err(ValidationError::MissingFields));
        assert_eq!(validate("Ada", "not-an-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate("Ada", "ada@example"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate("Ada", "a da@example.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate("Ada", "ada@example.com"), Ok(()));
        assert_eq!(validate("Ada", "a.b@mail.example.co.uk"), Ok(()));
    }

    #[test]
    fn rejected_submission_shows_error_and_stores_nothing() {
        let mut h = Runtime::default();
        let mut form = setup(&mut h);
        let result = form.submit("", "a@b.com", &mut h.ctx());

        assert_eq!(result, Err(SubmitError::Invalid(ValidationError::MissingFields)));
        assert_eq!(
            form.visible_message(),
            Some((MessageRegion::Error, "Please fill in all fields"))
        );
        assert!(!form.is_submitting());
        assert_eq!(h.scheduler.pending_timers(), 1); // only the hide timer
    }

    #[test]
    fn accepted_submission_completes_after_latency() {
        let mut h = Runtime::default();
        let mut form = setup(&mut h);
        let mut store = MemoryStore::new();

        assert_eq!(form.submit("Ada", "ada@example.com", &mut h.ctx()), Ok(()));
        assert!(form.is_submitting());
        assert_eq!(
            form.submit("Ada", "ada@example.com", &mut h.ctx()),
            Err(SubmitError::InFlight)
        );

        assert!(h.scheduler.advance(Duration::from_millis(1499)).is_empty());
        let due = h.scheduler.advance(Duration::from_millis(1500));
        assert_eq!(due, vec![Task::SubmitComplete]);

        let record = form.complete(&mut SimulatedBackend, &mut store, &clock(), &mut h.ctx());
        assert_eq!(record.as_ref().map(|r| r.name.as_str()), Some("Ada"));
        assert!(!form.is_submitting());

        let (region, text) = form.visible_message().unwrap_or((MessageRegion::Error, ""));
        assert_eq!(region, MessageRegion::Success);
        assert!(text.contains("Ada"));

        let stored = load_subscribers(&store).unwrap_or_default();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].email, "ada@example.com");

        let out = h.drain();
        assert!(out.contains(&DomCommand::ResetForm { node: form.form() }));
        assert!(out.iter().any(|c| matches!(c, DomCommand::SetDisabled { disabled: false, .. })));
    }

    #[test]
    fn backend_failure_keeps_log_untouched() {
        let mut h = Runtime::default();
        let mut form = setup(&mut h);
        let mut store = MemoryStore::new();

        let _ = form.submit("Ada", "ada@example.com", &mut h.ctx());
        h.scheduler.advance(Duration::from_millis(1500));
        let record = form.complete(&mut FailingBackend, &mut store, &clock(), &mut h.ctx());

        assert!(record.is_none());
        assert!(load_subscribers(&store).unwrap_or_default().is_empty());
        assert_eq!(
            form.visible_message().map(|(r, _)| r),
            Some(MessageRegion::Error)
        );
        assert!(!h.drain().iter().any(|c| matches!(c, DomCommand::ResetForm { .. })));
    }

    #[test]
    fn stale_hide_timer_spares_newer_message() {
        let mut h = Runtime::default();
        let mut form = setup(&mut h);

        let _ = form.submit("", "", &mut h.ctx());
        h.scheduler.advance(Duration::from_millis(3000));
        let _ = form.submit("Ada", "nope", &mut h.ctx());

        // First hide timer is due at 5000ms, second at 8000ms.
        for task in h.scheduler.advance(Duration::from_millis(5000)) {
            if let Task::HideMessage { region, generation } = task {
                form.hide_message(region, generation, &mut h.ctx());
            }
        }
        assert_eq!(
            form.visible_message(),
            Some((MessageRegion::Error, "Please enter a valid email address"))
        );

        for task in h.scheduler.advance(Duration::from_millis(8000)) {
            if let Task::HideMessage { region, generation } = task {
                form.hide_message(region, generation, &mut h.ctx());
            }
        }
        assert!(form.visible_message().is_none());
    }
}
