//! Small per-page helpers: scroll-to-top, print, copy-link and the
//! character counter.

use stellar_protocol::{ClassName, DomCommand, InsertPosition, NodeId, StyleProperty, Tag};
use tracing::error;

use crate::event::EventKind;
use crate::runtime::{Context, Handler, Task};

const COPY_LABEL: &str = "🔗 Copy Link";
const COPIED_LABEL: &str = "✓ Link Copied!";

/// Floating button that appears once the page is scrolled down.
#[derive(Debug)]
pub struct ScrollToTop {
    button: NodeId,
    threshold: f64,
    visible: bool,
}

impl ScrollToTop {
    pub fn install(body: NodeId, threshold: f64, ctx: &mut Context<'_>) -> Self {
        let button = ctx.nodes.alloc();
        ctx.emit(DomCommand::CreateElement {
            node: button,
            parent: body,
            position: InsertPosition::Append,
            tag: Tag::Button,
            class: Some(ClassName::ScrollToTop),
            text: Some("↑".into()),
            styles: vec![
                (StyleProperty::Opacity, "0".into()),
                (StyleProperty::Visibility, "hidden".into()),
            ],
            attributes: vec![("aria-label".into(), "Scroll to top".into())],
        });
        ctx.subscriptions.subscribe(EventKind::Scroll, Handler::ScrollToTop);
        ctx.subscriptions
            .subscribe(EventKind::Click(button), Handler::ScrollToTopClick);
        Self {
            button,
            threshold,
            visible: false,
        }
    }

    pub fn on_scroll(&mut self, scroll_y: f64, out: &mut Vec<DomCommand>) {
        let visible = scroll_y > self.threshold;
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        let (opacity, visibility) = if visible { ("1", "visible") } else { ("0", "hidden") };
        out.push(DomCommand::style(self.button, StyleProperty::Opacity, opacity));
        out.push(DomCommand::style(self.button, StyleProperty::Visibility, visibility));
    }

    pub fn on_click(&self, out: &mut Vec<DomCommand>) {
        out.push(DomCommand::ScrollTo { top: 0.0 });
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn button(&self) -> NodeId {
        self.button
    }
}

/// Insert a centered print button at the top of the footer.
pub fn install_print_button(footer: NodeId, ctx: &mut Context<'_>) -> NodeId {
    let wrapper = ctx.nodes.alloc();
    let button = ctx.nodes.alloc();
    ctx.emit(DomCommand::CreateElement {
        node: wrapper,
        parent: footer,
        position: InsertPosition::Prepend,
        tag: Tag::Div,
        class: None,
        text: None,
        styles: vec![(StyleProperty::Custom("text-align".into()), "center".into())],
        attributes: Vec::new(),
    });
    ctx.emit(DomCommand::CreateElement {
        node: button,
        parent: wrapper,
        position: InsertPosition::Append,
        tag: Tag::Button,
        class: Some(ClassName::PrintButton),
        text: Some("🖨️ Print This Page".into()),
        styles: Vec::new(),
        attributes: Vec::new(),
    });
    ctx.subscriptions.subscribe(EventKind::Click(button), Handler::Print);
    button
}

/// Header button copying the page URL, with transient feedback.
#[derive(Debug)]
pub struct CopyLink {
    button: NodeId,
    url: String,
    copied: bool,
}

impl CopyLink {
    pub fn install(header: NodeId, url: String, ctx: &mut Context<'_>) -> Self {
        let button = ctx.nodes.alloc();
        ctx.emit(DomCommand::CreateElement {
            node: button,
            parent: header,
            position: InsertPosition::Append,
            tag: Tag::Button,
            class: Some(ClassName::CopyLinkButton),
            text: Some(COPY_LABEL.into()),
            styles: Vec::new(),
            attributes: Vec::new(),
        });
        ctx.subscriptions.subscribe(EventKind::Click(button), Handler::CopyLink);
        Self {
            button,
            url,
            copied: false,
        }
    }

    pub fn on_click(&self, out: &mut Vec<DomCommand>) {
        out.push(DomCommand::CopyToClipboard {
            text: self.url.as_str().into(),
        });
    }

    pub fn on_written(&mut self, ok: bool, feedback: std::time::Duration, ctx: &mut Context<'_>) {
        if !ok {
            error!(url = %self.url, "Failed to copy link");
            return;
        }
        self.copied = true;
        ctx.emit(DomCommand::text(self.button, COPIED_LABEL));
        ctx.scheduler.set_timeout(feedback, Task::RestoreCopyLabel);
    }

    pub fn restore(&mut self, out: &mut Vec<DomCommand>) {
        if !self.copied {
            return;
        }
        self.copied = false;
        out.push(DomCommand::text(self.button, COPY_LABEL));
    }

    pub fn is_showing_feedback(&self) -> bool {
        self.copied
    }
}

/// The textarea a character counter is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterTarget {
    pub textarea: NodeId,
    pub parent: NodeId,
    pub initial_value: String,
}

/// Live "N characters" line under a textarea.
#[derive(Debug)]
pub struct CharCounter {
    counter: NodeId,
    count: usize,
}

impl CharCounter {
    pub fn install(target: &CounterTarget, ctx: &mut Context<'_>) -> Self {
        let counter = ctx.nodes.alloc();
        ctx.emit(DomCommand::CreateElement {
            node: counter,
            parent: target.parent,
            position: InsertPosition::Append,
            tag: Tag::Div,
            class: Some(ClassName::CharCounter),
            text: None,
            styles: Vec::new(),
            attributes: Vec::new(),
        });
        ctx.subscriptions
            .subscribe(EventKind::Input(target.textarea), Handler::CharCounter);
        let mut this = Self { counter, count: 0 };
        this.update(&target.initial_value, ctx.out);
        this
    }

    pub fn update(&mut self, value: &str, out: &mut Vec<DomCommand>) {
        self.count = value.chars().count();
        out.push(DomCommand::text(self.counter, format!("{} characters", self.count)));
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn scroll_to_top_toggles_at_threshold() {
        let mut h = Runtime::default();
        let body = h.nodes.alloc();
        let mut button = ScrollToTop::install(body, 300.0, &mut h.ctx());
        h.drain();

        let mut out = Vec::new();
        button.on_scroll(300.0, &mut out);
        assert!(out.is_empty());
        button.on_scroll(301.0, &mut out);
        button.on_scroll(900.0, &mut out);
        assert!(button.is_visible());
        assert_eq!(out.len(), 2);
        button.on_scroll(0.0, &mut out);
        assert!(!button.is_visible());

        out.clear();
        button.on_click(&mut out);
        assert_eq!(out, vec![DomCommand::ScrollTo { top: 0.0 }]);
    }

    #[test]
    fn copy_link_feedback_restores() {
        let mut h = Runtime::default();
        let header = h.nodes.alloc();
        let mut copy = CopyLink::install(header, "https://example.org/memories".to_string(), &mut h.ctx());
        h.drain();

        let mut out = Vec::new();
        copy.on_click(&mut out);
        assert_eq!(
            out,
            vec![DomCommand::CopyToClipboard {
                text: "https://example.org/memories".into()
            }]
        );

        copy.on_written(true, Duration::from_millis(2000), &mut h.ctx());
        assert!(copy.is_showing_feedback());
        assert_eq!(
            h.scheduler.advance(Duration::from_millis(2000)),
            vec![Task::RestoreCopyLabel]
        );
        out.clear();
        copy.restore(&mut out);
        assert!(!copy.is_showing_feedback());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn failed_copy_keeps_label() {
        let mut h = Runtime::default();
        let header = h.nodes.alloc();
        let mut copy = CopyLink::install(header, "u".to_string(), &mut h.ctx());
        h.drain();
        copy.on_written(false, Duration::from_millis(2000), &mut h.ctx());
        assert!(h.drain().is_empty());
        assert_eq!(h.scheduler.pending_timers(), 0);
    }

    #[test]
    fn counter_counts_characters() {
        let mut h = Runtime::default();
        let target = CounterTarget {
            textarea: h.nodes.alloc(),
            parent: h.nodes.alloc(),
            initial_value: "héllo".to_string(),
        };
        let mut counter = CharCounter::install(&target, &mut h.ctx());
        assert_eq!(counter.count(), 5);
        let out = h.drain();
        assert!(matches!(out.last(), Some(DomCommand::SetText { text, .. }) if *text == "5 characters".into()));

        let mut out = Vec::new();
        counter.update("", &mut out);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn print_button_goes_first_in_footer() {
        let mut h = Runtime::default();
        let footer = h.nodes.alloc();
        let button = install_print_button(footer, &mut h.ctx());
        let out = h.drain();
        assert!(matches!(
            out.first(),
            Some(DomCommand::CreateElement { parent, position: InsertPosition::Prepend, .. }) if *parent == footer
        ));
        assert_eq!(
            h.subscriptions.dispatch(EventKind::Click(button)),
            vec![Handler::Print]
        );
    }
}
