//! Deterministic core of the stellar page scripts.
//!
//! Everything here is host-agnostic: the browser bridge feeds in
//! [`HostEvent`](stellar_protocol::HostEvent)s and monotonic time, and applies
//! the [`DomCommand`](stellar_protocol::DomCommand)s that come back out.

pub mod clock;
pub mod config;
pub mod dom;
pub mod event;
pub mod form;
pub mod lazy;
pub mod lightbox;
pub mod nav;
pub mod page;
pub mod reveal;
pub mod runtime;
pub mod schedule;
pub mod shortcuts;
pub mod site;
pub mod sound;
pub mod starfield;
pub mod storage;
pub mod toast;
pub mod toggle;

pub use config::{ConfigError, EscapeScope, SiteConfig};
pub use dom::NodeAllocator;
pub use site::{EventOutcome, HostCapabilities, HostServices, PageManifest, Site};
