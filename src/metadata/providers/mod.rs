//! Header provider implementations.

pub mod launcher;

#[cfg(feature = "exr-native")]
pub mod native;

pub use launcher::LauncherHeaderProvider;

#[cfg(feature = "exr-native")]
pub use native::NativeHeaderProvider;
