use std::time::Duration;

use stellar_protocol::{ClassName, DomCommand, InsertPosition, NodeId, Tag};
use tracing::debug;

use crate::runtime::{Context, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub id: ToastId,
    pub text: String,
    /// Scheduler time at which the toast was shown.
    pub created_at: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    /// Inserted, waiting for the next frame to add `show`.
    Entering,
    Shown,
    /// `show` removed, element still attached for the exit transition.
    Leaving,
}

#[derive(Debug)]
struct ActiveToast {
    message: ToastMessage,
    node: NodeId,
    phase: ToastPhase,
}

/// Short-lived notifications, at most one on screen.
///
/// A new toast removes the current one synchronously. The old toast's timers
/// still fire later; they find a different (or no) current toast and do
/// nothing.
#[derive(Debug)]
pub struct ToastNotifier {
    body: NodeId,
    dwell: Duration,
    exit: Duration,
    next_id: u64,
    current: Option<ActiveToast>,
}

impl ToastNotifier {
    pub fn new(body: NodeId, dwell: Duration, exit: Duration) -> Self {
        Self {
            body,
            dwell,
            exit,
            next_id: 0,
            current: None,
        }
    }

    pub fn show(&mut self, text: impl Into<String>, ctx: &mut Context<'_>) -> ToastId {
        if let Some(previous) = self.current.take() {
            ctx.emit(DomCommand::Remove {
                node: previous.node,
            });
        }

        let id = ToastId(self.next_id);
        self.next_id += 1;
        let text = text.into();
        let node = ctx.nodes.alloc();

        ctx.emit(DomCommand::CreateElement {
            node,
            parent: self.body,
            position: InsertPosition::Append,
            tag: Tag::Div,
            class: Some(ClassName::NotificationToast),
            text: Some(text.as_str().into()),
            styles: Vec::new(),
            attributes: vec![("role".into(), "status".into())],
        });
        ctx.scheduler.request_frame(Task::ToastEnter(id));
        ctx.scheduler.set_timeout(self.dwell, Task::ToastExit(id));

        debug!(?id, text = %text, "Toast shown");
        self.current = Some(ActiveToast {
            message: ToastMessage {
                id,
                text,
                created_at: ctx.scheduler.now(),
            },
            node,
            phase: ToastPhase::Entering,
        });
        id
    }

    fn active_mut(&mut self, id: ToastId) -> Option<&mut ActiveToast> {
        self.current.as_mut().filter(|t| t.message.id == id)
    }

    pub fn on_enter(&mut self, id: ToastId, ctx: &mut Context<'_>) {
        if let Some(toast) = self.active_mut(id)
            && toast.phase == ToastPhase::Entering
        {
            toast.phase = ToastPhase::Shown;
            let node = toast.node;
            ctx.emit(DomCommand::AddClass {
                node,
                class: ClassName::Show,
            });
        }
    }

    pub fn on_exit(&mut self, id: ToastId, ctx: &mut Context<'_>) {
        let exit = self.exit;
        let Some(toast) = self.active_mut(id) else {
            debug!(?id, "Stale toast exit ignored");
            return;
        };
        toast.phase = ToastPhase::Leaving;
        let node = toast.node;
        ctx.emit(DomCommand::RemoveClass {
            node,
            class: ClassName::Show,
        });
        ctx.scheduler.set_timeout(exit, Task::ToastRemove(id));
    }

    pub fn on_remove(&mut self, id: ToastId, ctx: &mut Context<'_>) {
        if self.active_mut(id).is_none() {
            return;
        }
        if let Some(toast) = self.current.take() {
            ctx.emit(DomCommand::Remove { node: toast.node });
        }
    }

    /// The toast currently on screen.
    pub fn visible(&self) -> Option<&ToastMessage> {
        self.current.as_ref().map(|t| &t.message)
    }

    pub fn phase(&self) -> Option<ToastPhase> {
        self.current.as_ref().map(|t| t.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    fn notifier(h: &mut Runtime) -> ToastNotifier {
        let body = h.nodes.alloc();
        ToastNotifier::new(body, Duration::from_millis(3000), Duration::from_millis(300))
    }

    fn run_due(toasts: &mut ToastNotifier, h: &mut Runtime, now_ms: u64) {
        for task in h.scheduler.advance(Duration::from_millis(now_ms)) {
            let mut ctx = h.ctx();
            match task {
                Task::ToastExit(id) => toasts.on_exit(id, &mut ctx),
                Task::ToastRemove(id) => toasts.on_remove(id, &mut ctx),
                _ => {}
            }
        }
    }

    #[test]
    fn toast_lifecycle() {
        let mut h = Runtime::default();
        let mut toasts = notifier(&mut h);
        toasts.show("Real planet sizes enabled", &mut h.ctx());
        assert_eq!(toasts.phase(), Some(ToastPhase::Entering));

        for task in h.scheduler.take_frame() {
            if let Task::ToastEnter(id) = task {
                toasts.on_enter(id, &mut h.ctx());
            }
        }
        assert_eq!(toasts.phase(), Some(ToastPhase::Shown));

        run_due(&mut toasts, &mut h, 3000);
        assert_eq!(toasts.phase(), Some(ToastPhase::Leaving));
        run_due(&mut toasts, &mut h, 3300);
        assert!(toasts.visible().is_none());
        assert!(h.drain().iter().any(|c| matches!(c, DomCommand::Remove { .. })));
    }

    #[test]
    fn second_toast_supersedes_first() {
        let mut h = Runtime::default();
        let mut toasts = notifier(&mut h);
        toasts.show("A", &mut h.ctx());
        h.scheduler.advance(Duration::from_millis(1000));
        toasts.show("B", &mut h.ctx());

        let removed = h
            .drain()
            .iter()
            .filter(|c| matches!(c, DomCommand::Remove { .. }))
            .count();
        assert_eq!(removed, 1);
        assert_eq!(toasts.visible().map(|t| t.text.as_str()), Some("B"));

        // A's exit fires at 3000ms and must leave B alone.
        run_due(&mut toasts, &mut h, 3000);
        assert_eq!(toasts.visible().map(|t| t.text.as_str()), Some("B"));
        assert!(h.drain().is_empty());

        run_due(&mut toasts, &mut h, 4000);
        run_due(&mut toasts, &mut h, 4300);
        assert!(toasts.visible().is_none());
    }
}
