//! Composition root: one [`Site`] per page.
//!
//! The host scans the document into a [`PageManifest`], constructs a `Site`
//! and calls [`Site::start`]. From then on it forwards [`HostEvent`]s,
//! advances time, runs display frames and applies whatever
//! [`DomCommand`]s the site emits.

use std::time::Duration;

use stellar_protocol::{DomCommand, HostEvent, NodeId};
use tracing::{debug, info, warn};

use crate::clock::{SystemClock, WallClock};
use crate::config::SiteConfig;
use crate::dom::NodeAllocator;
use crate::event::EventKind;
use crate::form::{FormSubmitter, NewsletterForm, SimulatedBackend, SubscribeBackend, SubmitError};
use crate::lazy::{LazyImage, LazyImages};
use crate::lightbox::{Lightbox, Photo};
use crate::nav::{self, NavHighlighter, NavLink, Section};
use crate::page::{self, CharCounter, CopyLink, CounterTarget, ScrollToTop};
use crate::reveal::RevealController;
use crate::runtime::{Context, Handler, Runtime, Task};
use crate::shortcuts::{self, Shortcut};
use crate::sound;
use crate::starfield;
use crate::storage::{self, KeyValueStore, MemoryStore};
use crate::toast::ToastNotifier;
use crate::toggle::{Control, TogglePanel, Transition};

/// Browser capabilities, probed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    pub intersection_observer: bool,
    /// `(pointer: coarse)` matched.
    pub coarse_pointer: bool,
    /// `(prefers-reduced-motion: reduce)` matched.
    pub prefers_reduced_motion: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            coarse_pointer: false,
            prefers_reduced_motion: false,
        }
    }
}

/// Everything the host found on the page. Missing elements simply disable
/// the feature that needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageManifest {
    pub body: NodeId,
    pub starfield: Option<NodeId>,
    pub controls: Vec<(Control, NodeId)>,
    pub newsletter: Option<NewsletterForm>,
    pub parallax: Option<NodeId>,
    pub reveal_targets: Vec<NodeId>,
    pub sections: Vec<Section>,
    pub nav_links: Vec<NavLink>,
    pub lazy_images: Vec<LazyImage>,
    pub photos: Vec<Photo>,
    pub page_header: Option<NodeId>,
    pub page_footer: Option<NodeId>,
    pub char_counter: Option<CounterTarget>,
    pub page_url: String,
}

impl PageManifest {
    /// A page with nothing but a body.
    pub fn new(body: NodeId) -> Self {
        Self {
            body,
            starfield: None,
            controls: Vec::new(),
            newsletter: None,
            parallax: None,
            reveal_targets: Vec::new(),
            sections: Vec::new(),
            nav_links: Vec::new(),
            lazy_images: Vec::new(),
            photos: Vec::new(),
            page_header: None,
            page_footer: None,
            char_counter: None,
            page_url: String::new(),
        }
    }
}

/// Collaborators the site talks to outside the DOM.
pub struct HostServices {
    pub store: Box<dyn KeyValueStore>,
    pub backend: Box<dyn SubscribeBackend>,
    pub clock: Box<dyn WallClock>,
    /// Seed for the starfield layout.
    pub seed: u64,
}

impl HostServices {
    /// In-memory store, simulated backend and the system clock.
    pub fn in_memory(store: MemoryStore, seed: u64) -> Self {
        Self {
            store: Box::new(store),
            backend: Box::new(SimulatedBackend),
            clock: Box::new(SystemClock),
            seed,
        }
    }
}

/// What the host should do with the browser event it forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

pub struct Site {
    config: SiteConfig,
    caps: HostCapabilities,
    manifest: PageManifest,
    services: HostServices,
    rt: Runtime,
    started: bool,
    scroll_y: f64,
    visits: Option<u64>,

    reveal: RevealController,
    toast: ToastNotifier,
    panel: TogglePanel,
    form: Option<FormSubmitter>,
    nav: Option<NavHighlighter>,
    lazy: Option<LazyImages>,
    lightbox: Option<Lightbox>,
    scroll_top: Option<ScrollToTop>,
    copy_link: Option<CopyLink>,
    counter: Option<CharCounter>,
}

impl Site {
    /// `nodes` must be the allocator the manifest's ids came from.
    pub fn new(
        config: SiteConfig,
        caps: HostCapabilities,
        manifest: PageManifest,
        nodes: NodeAllocator,
        services: HostServices,
    ) -> Self {
        let rt = Runtime {
            nodes,
            ..Runtime::default()
        };
        let toast = ToastNotifier::new(manifest.body, config.toast_dwell(), config.toast_exit());
        let panel = TogglePanel::new(manifest.body, manifest.controls.clone(), config.escape_scope);
        let form = manifest
            .newsletter
            .clone()
            .map(|elements| FormSubmitter::new(elements, config.submit_latency(), config.message_dwell()));
        Self {
            reveal: RevealController::new(&config),
            toast,
            panel,
            form,
            nav: None,
            lazy: None,
            lightbox: None,
            scroll_top: None,
            copy_link: None,
            counter: None,
            config,
            caps,
            manifest,
            services,
            rt,
            started: false,
            scroll_y: 0.0,
            visits: None,
        }
    }

    /// Run every page initializer. Calling it twice does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!("Initializing page scripts");

        match storage::record_visit(self.services.store.as_mut()) {
            Ok(visits) => self.visits = Some(visits),
            Err(err) => warn!(error = %err, "Visit counter unavailable"),
        }

        let observer = self.caps.intersection_observer;
        let mut ctx = self.rt.ctx();

        if let Some(container) = self.manifest.starfield {
            starfield::populate(container, &self.config, self.services.seed, &mut ctx);
        }

        for (control, node) in self.panel.controls() {
            ctx.subscriptions
                .subscribe(EventKind::Click(*node), Handler::Control(*control));
        }
        ctx.subscriptions.subscribe(EventKind::KeyDown, Handler::Shortcuts);

        if let Some(form) = &self.form {
            ctx.subscriptions
                .subscribe(EventKind::Submit(form.form()), Handler::Newsletter);
        }

        self.nav = NavHighlighter::install(
            std::mem::take(&mut self.manifest.sections),
            std::mem::take(&mut self.manifest.nav_links),
            &self.config.nav_root_margin,
            &mut ctx,
        );

        if let Some(node) = self.manifest.parallax {
            self.reveal.track_parallax(
                node,
                self.config.parallax_rate,
                self.caps.coarse_pointer,
                &mut ctx,
            );
        }

        if !self.manifest.lazy_images.is_empty() {
            self.lazy = Some(LazyImages::install(
                std::mem::take(&mut self.manifest.lazy_images),
                observer,
                &self.config.lazy_root_margin,
                &mut ctx,
            ));
        }

        self.reveal
            .register_reveal_targets(&self.manifest.reveal_targets, observer, &mut ctx);

        if self.config.scroll_to_top {
            self.scroll_top = Some(ScrollToTop::install(
                self.manifest.body,
                self.config.scroll_top_threshold_px,
                &mut ctx,
            ));
        }
        if let Some(footer) = self.manifest.page_footer {
            page::install_print_button(footer, &mut ctx);
        }
        if let Some(header) = self.manifest.page_header {
            self.copy_link = Some(CopyLink::install(
                header,
                self.manifest.page_url.clone(),
                &mut ctx,
            ));
        }
        if let Some(target) = &self.manifest.char_counter {
            self.counter = Some(CharCounter::install(target, &mut ctx));
        }
        self.lightbox = Lightbox::install(
            self.manifest.body,
            std::mem::take(&mut self.manifest.photos),
            &mut ctx,
        );

        info!(
            subscriptions = self.rt.subscriptions.len(),
            "Page scripts loaded"
        );
        info!("{}", shortcuts::HELP);
    }

    /// Forward one browser event.
    pub fn handle(&mut self, event: HostEvent) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        let kind = match &event {
            HostEvent::Click { node } => EventKind::Click(*node),
            HostEvent::Submit { form, .. } => EventKind::Submit(*form),
            HostEvent::Input { node, .. } => EventKind::Input(*node),
            HostEvent::KeyDown(_) => EventKind::KeyDown,
            HostEvent::Scroll { y } => {
                self.scroll_y = *y;
                EventKind::Scroll
            }
            HostEvent::Intersection {
                observer,
                node,
                intersecting,
            } => {
                if !intersecting {
                    return outcome;
                }
                EventKind::Intersect(*observer, *node)
            }
            HostEvent::AnchorClick { href, target } => {
                if let Some(command) = nav::smooth_scroll(href, *target) {
                    self.rt.out.push(command);
                    outcome.prevent_default = true;
                }
                return outcome;
            }
            HostEvent::ClipboardWritten { ok } => {
                let feedback = self.config.copy_feedback();
                if let Some(copy) = &mut self.copy_link {
                    copy.on_written(*ok, feedback, &mut self.rt.ctx());
                }
                return outcome;
            }
            HostEvent::Loaded { load_time_ms } => {
                if let Some(ms) = load_time_ms {
                    info!(load_time_ms = *ms, "Page loaded");
                }
                return outcome;
            }
        };

        for handler in self.rt.subscriptions.dispatch(kind) {
            self.route(handler, &event, &mut outcome);
        }
        outcome
    }

    fn route(&mut self, handler: Handler, event: &HostEvent, outcome: &mut EventOutcome) {
        let mut ctx = self.rt.ctx();
        match handler {
            Handler::Reveal(index) => {
                self.reveal.on_intersect(index, &mut ctx);
            }
            Handler::LazyImage(index) => {
                if let Some(lazy) = &mut self.lazy {
                    lazy.on_visible(index, ctx.out);
                }
            }
            Handler::NavSection(index) => {
                if let Some(nav) = &mut self.nav {
                    nav.on_section_visible(index, ctx.out);
                }
            }
            Handler::Parallax => self.reveal.on_scroll(&mut ctx),
            Handler::Control(control) => {
                outcome.prevent_default = true;
                if let Some(transition) = self.panel.press(control, ctx.out) {
                    announce(
                        transition,
                        &mut self.toast,
                        self.caps.prefers_reduced_motion,
                        &mut ctx,
                    );
                }
            }
            Handler::Shortcuts => {
                let HostEvent::KeyDown(key) = event else {
                    return;
                };
                if key.key == "Escape"
                    && let Some(lightbox) = &mut self.lightbox
                {
                    lightbox.close(ctx.out);
                }
                match shortcuts::resolve(key) {
                    Some(Shortcut::Press(control)) => {
                        if let Some(transition) = self.panel.press(control, ctx.out) {
                            announce(
                                transition,
                                &mut self.toast,
                                self.caps.prefers_reduced_motion,
                                &mut ctx,
                            );
                        }
                    }
                    Some(Shortcut::Escape) => {
                        if let Some(message) = self.panel.escape(ctx.out) {
                            self.toast.show(message, &mut ctx);
                        }
                    }
                    None => {}
                }
            }
            Handler::Newsletter => {
                let HostEvent::Submit { name, email, .. } = event else {
                    return;
                };
                outcome.prevent_default = true;
                if let Some(form) = &mut self.form {
                    match form.submit(name, email, &mut ctx) {
                        Ok(()) => debug!("Newsletter submission started"),
                        Err(SubmitError::InFlight) => debug!("Submission already in flight"),
                        Err(err) => debug!(error = %err, "Newsletter submission rejected"),
                    }
                }
            }
            Handler::ScrollToTop => {
                if let (Some(button), HostEvent::Scroll { y }) = (&mut self.scroll_top, event) {
                    button.on_scroll(*y, ctx.out);
                }
            }
            Handler::ScrollToTopClick => {
                if let Some(button) = &self.scroll_top {
                    button.on_click(ctx.out);
                }
            }
            Handler::LightboxOpen(index) => {
                outcome.prevent_default = true;
                if let Some(lightbox) = &mut self.lightbox {
                    lightbox.open(index, ctx.out);
                }
            }
            Handler::LightboxDismiss => {
                outcome.stop_propagation = true;
                if let Some(lightbox) = &mut self.lightbox {
                    lightbox.close(ctx.out);
                }
            }
            Handler::LightboxImage => outcome.stop_propagation = true,
            Handler::Print => ctx.emit(DomCommand::Print),
            Handler::CopyLink => {
                if let Some(copy) = &self.copy_link {
                    copy.on_click(ctx.out);
                }
            }
            Handler::CharCounter => {
                if let (Some(counter), HostEvent::Input { value, .. }) = (&mut self.counter, event) {
                    counter.update(value, ctx.out);
                }
            }
        }
    }

    /// Move host time to `now` and run the timers that came due.
    pub fn advance(&mut self, now: Duration) {
        for task in self.rt.scheduler.advance(now) {
            self.run_task(task);
        }
    }

    /// Run one display frame.
    pub fn frame(&mut self) {
        for task in self.rt.scheduler.take_frame() {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: Task) {
        let mut ctx = self.rt.ctx();
        match task {
            Task::ToastEnter(id) => self.toast.on_enter(id, &mut ctx),
            Task::ToastExit(id) => self.toast.on_exit(id, &mut ctx),
            Task::ToastRemove(id) => self.toast.on_remove(id, &mut ctx),
            Task::SubmitComplete => {
                if let Some(form) = &mut self.form {
                    form.complete(
                        self.services.backend.as_mut(),
                        self.services.store.as_mut(),
                        self.services.clock.as_ref(),
                        &mut ctx,
                    );
                }
            }
            Task::HideMessage { region, generation } => {
                if let Some(form) = &mut self.form {
                    form.hide_message(region, generation, &mut ctx);
                }
            }
            Task::ParallaxFrame => self.reveal.on_frame(self.scroll_y, &mut ctx),
            Task::RestoreCopyLabel => {
                if let Some(copy) = &mut self.copy_link {
                    copy.restore(ctx.out);
                }
            }
        }
    }

    /// Commands emitted since the last drain, in order.
    pub fn drain_commands(&mut self) -> Vec<DomCommand> {
        self.rt.drain()
    }

    pub fn wants_frame(&self) -> bool {
        self.rt.scheduler.has_frame_pending()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.rt.scheduler.next_deadline()
    }

    pub fn now(&self) -> Duration {
        self.rt.scheduler.now()
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Visit count recorded by [`start`](Self::start).
    pub fn visits(&self) -> Option<u64> {
        self.visits
    }

    pub fn reveal(&self) -> &RevealController {
        &self.reveal
    }

    pub fn toast(&self) -> &ToastNotifier {
        &self.toast
    }

    pub fn panel(&self) -> &TogglePanel {
        &self.panel
    }

    pub fn form(&self) -> Option<&FormSubmitter> {
        self.form.as_ref()
    }

    pub fn nav(&self) -> Option<&NavHighlighter> {
        self.nav.as_ref()
    }

    pub fn lazy_images(&self) -> Option<&LazyImages> {
        self.lazy.as_ref()
    }

    pub fn lightbox(&self) -> Option<&Lightbox> {
        self.lightbox.as_ref()
    }

    pub fn scroll_top(&self) -> Option<&ScrollToTop> {
        self.scroll_top.as_ref()
    }

    pub fn copy_link(&self) -> Option<&CopyLink> {
        self.copy_link.as_ref()
    }

    pub fn char_counter(&self) -> Option<&CharCounter> {
        self.counter.as_ref()
    }

    /// Read access to persisted state.
    pub fn store(&self) -> &dyn KeyValueStore {
        self.services.store.as_ref()
    }
}

fn announce(
    transition: Transition,
    toast: &mut ToastNotifier,
    prefers_reduced_motion: bool,
    ctx: &mut Context<'_>,
) {
    toast.show(transition.message, ctx);
    if transition.is_red_giant_onset()
        && let Some(tone) = sound::red_giant(prefers_reduced_motion)
    {
        ctx.emit(tone);
    }
}
