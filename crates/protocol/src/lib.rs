pub mod class;
pub mod commands;
pub mod events;
pub mod shared_str;
pub mod types;

pub use class::ClassName;
pub use commands::DomCommand;
pub use events::{HostEvent, KeyInput};
pub use shared_str::SharedStr;
pub use types::{InsertPosition, NodeId, ObserveOptions, ObserverId, StyleProperty, Tag, ToneSpec};
