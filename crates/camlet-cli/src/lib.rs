#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod builtins;
pub mod closure;
pub mod contract;
pub mod env;
pub mod error;
pub mod eval;
pub mod interp;
pub mod monitor;
pub mod scope;
mod stack;
pub mod value;

pub use error::{Error, RuntimeError};
pub use interp::{Interpreter, Options, Outcome, StatementResult};
pub use value::Value;

static TRACING_INIT: std::sync::Once = std::sync::Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}
