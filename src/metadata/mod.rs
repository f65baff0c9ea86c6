//! Frame-header metadata extraction.
//!
//! The scanner needs two descriptive fields per sequence — timecode and
//! color space — read from the first frame's header. Backends live behind
//! the [`HeaderProvider`] trait; [`create_provider`] picks one at startup.

pub mod provider;
pub mod providers;
mod timecode;

pub use provider::{
    descriptive_fields, HeaderFields, HeaderProvider, COLORSPACE_KEY, TIMECODE_KEY,
};
pub use timecode::decode_timecode;

use std::time::Duration;

use plateflow_av::EnvLauncher;

use crate::config::Config;

/// Select a header provider for this host.
///
/// With the `exr-native` feature the in-process reader is preferred;
/// otherwise headers go through the environment launcher. Availability is
/// probed once here — per-frame failures later degrade to empty metadata
/// instead of switching backends mid-scan.
pub fn create_provider(config: &Config) -> Box<dyn HeaderProvider> {
    #[cfg(feature = "exr-native")]
    {
        let native = providers::NativeHeaderProvider::new();
        if native.is_available() {
            tracing::info!("header provider: in-process EXR reader");
            return Box::new(native);
        }
    }

    let launcher = EnvLauncher::new(
        config.tools.env_launcher.clone(),
        config.tools.header_package.clone(),
    )
    .with_timeout(Duration::from_secs(config.tools.tool_timeout_secs));

    let provider = providers::LauncherHeaderProvider::new(launcher);
    if provider.is_available() {
        tracing::info!(
            "header provider: {} environment launcher",
            config.tools.header_package
        );
    } else {
        tracing::warn!(
            "environment launcher {} not found; header extraction will yield empty metadata",
            config.tools.env_launcher.display()
        );
    }
    Box::new(provider)
}
