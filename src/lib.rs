//! cbmdi -- console driver installer for the OpenCBM family of USB devices
//! (xu1541, xum1541/ZoomFloppy, and their firmware-upgrade bootloaders).
//!
//! The library half holds the installation pipeline; the platform-specific
//! installation primitives live behind [backend::Backend], with the real
//! implementation only existing on Windows.

pub use config::{InstallConfig, DEFAULT_EXTRACT_DIR, DEFAULT_INF_NAME};
pub use device::{DeviceInfo, KnownDevice, TargetDevice, KNOWN_DEVICES};
pub use error::{status_code, status_text, Error, InstallResult};
pub use installer::Installer;

pub mod backend;
pub mod config;
pub mod device;
pub mod error;
pub mod installer;
