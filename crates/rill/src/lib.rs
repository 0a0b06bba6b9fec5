//! Rill engine: orchestrates the full evaluation pipeline.
//!
//! ```text
//! Source → Lexer → Parser → Interpreter → Value
//! ```
//!
//! [`Engine`] owns one interpreter, so globals declared by one [`Engine::eval`]
//! call are visible to the next.

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::{eval, Engine, EngineError};

pub use rill_eval::{EvalError, Interpreter, StackFrame, Thrown, Value};
pub use rill_types::{ErrorCode, ParseError, SourceFile};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for engine diagnostics.
///
/// Only takes effect when `RUST_LOG` is set. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// The engine version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
