//! Integration tests for `dmdcolor-rs`
//!
//! Bundles are authored in memory with the writers, parsed back and driven through the
//! public engine API.

mod codec;
mod coloring;
mod crom;
mod playback;

/// Initializes logging with default level set to info if `RUST_LOG` is not set
pub(crate) fn init_logger() {
	let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
		.is_test(true)
		.try_init();
}
