//! Skein Prelude: everything needed to build a vault and query it.
//!
//! ```rust
//! use skein::prelude::*;
//! ```

pub use skein_core::prelude::*;
pub use skein_graph::prelude::*;
pub use skein_rag::prelude::*;

pub use crate::config::EngineConfig;
pub use crate::engine::Skein;
pub use crate::telemetry::init_tracing;
