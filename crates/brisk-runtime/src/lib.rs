//! brisk Runtime
//!
//! Declarative behavior binding for a rendered document tree. The runtime
//! scans for marker attributes such as `br-view` or `br-ajax`, runs each
//! marker's handler once per element, keeps an index of named elements,
//! and re-scans after the tree changes.
//!
//! # Example
//! ```rust,ignore
//! use brisk_runtime::Runtime;
//!
//! let document = brisk_html::parse(r#"<body><div br-view="{url:'/clock'}"></div></body>"#);
//! let mut rt = Runtime::new(document)?;
//! rt.start();
//! smol::block_on(rt.settle());
//! ```

mod bind;
mod config;
mod error;
mod events;
mod index;
mod registry;
mod runtime;
mod scope;
mod state;
pub mod cogs;
pub mod markers;
pub mod mask;
pub mod scheduler;
pub mod watch;

pub use config::{MarkerNames, RuntimeConfig};
pub use error::BindError;
pub use events::{Listener, ListenerMap};
pub use index::IdentifierIndex;
pub use mask::{Edit, Mask, Outcome};
pub use registry::{Handler, MarkerRegistry};
pub use runtime::{Delegate, Notice, Runtime, RuntimeBuilder};
pub use state::{ElementState, StateTable, ViewState};

// Re-export sub-crates for hosts
pub use brisk_config as config_lang;
pub use brisk_dom as dom;
pub use brisk_html as html;
pub use brisk_net as net;
pub use brisk_net::{PartTag, ProgressTracker};

/// Runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
