//! Trait and factory for the driver-installation backend.
//! Backends can (and will) contain unsafe code, but they expose a safe
//! interface here.

use std::rc::Rc;
use std::time::Duration;

use crate::device::{DeviceInfo, TargetDevice};
use crate::error::InstallResult;

#[cfg(target_os = "windows")]
mod windows;

/// Opaque handle to a window the installer may attach its progress bar to.
pub type WindowHandle = isize;

/// The driver personality to generate and install for a device.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DriverType {
    /// The generic WinUSB driver; what we install for every target device.
    #[default]
    WinUsb,
    LibusbK,
    Libusb0,
    UserDriver,
}

/// Options for [Backend::list_devices].
#[derive(Debug, Copy, Clone, Default)]
pub struct ListOptions {
    /// Include devices that already have a driver bound to them.
    pub list_all: bool,

    /// Include hubs and composite-device parents.
    pub list_hubs: bool,

    /// Trim leading/trailing whitespace from reported string fields.
    pub trim_whitespaces: bool,
}

/// Options for [Backend::prepare_driver].
#[derive(Debug, Copy, Clone, Default)]
pub struct PrepareOptions {
    /// Which driver personality to materialize.
    pub driver_type: DriverType,
}

/// Options for [Backend::install_certificate].
#[derive(Debug, Copy, Clone, Default)]
pub struct CertOptions {
    /// Add the certificate without showing the usual security warning.
    pub disable_warning: bool,

    /// Window to attach any prompt or progress UI to.
    pub progress_window: Option<WindowHandle>,
}

/// Options for [Backend::install_driver].
#[derive(Debug, Copy, Clone, Default)]
pub struct InstallOptions {
    /// How long to wait for a concurrent installation already in progress.
    pub pending_install_timeout: Option<Duration>,

    /// Window to attach the progress bar to.
    pub progress_window: Option<WindowHandle>,
}

/// Trait that unifies the installation primitives the orchestrator drives.
///
/// Each method is a thin, blocking wrapper over one OS-level operation; the
/// sequencing and failure policy all live in [crate::Installer].
pub trait Backend: std::fmt::Debug {
    /// Materializes the installable driver files for `device` on disk.
    /// Safe to re-run; the extraction directory is reused.
    fn prepare_driver(
        &self,
        device: &TargetDevice,
        extract_dir: &str,
        inf_name: &str,
        options: &PrepareOptions,
    ) -> InstallResult<()>;

    /// Adds the named certificate from the embedded user files to the
    /// trusted-publisher store.
    fn install_certificate(&self, name: &str, options: &CertOptions) -> InstallResult<()>;

    /// Returns a snapshot of the devices currently attached to the system.
    ///
    /// The backend owns whatever the OS allocated for the listing and must
    /// release it before returning, so the caller only ever sees an owned
    /// collection.
    fn list_devices(&self, options: &ListOptions) -> InstallResult<Vec<DeviceInfo>>;

    /// Performs the OS-level driver binding for one device identity.
    fn install_driver(
        &self,
        device: &TargetDevice,
        extract_dir: &str,
        inf_name: &str,
        options: &InstallOptions,
    ) -> InstallResult<()>;
}

/// Creates the default backend implementation for Windows machines.
#[cfg(target_os = "windows")]
pub fn create_default_backend() -> InstallResult<Rc<dyn Backend>> {
    Ok(Rc::new(windows::WdiBackend::new()?))
}

/// Driver installation only exists on Windows; everywhere else the factory
/// reports the platform as unsupported so the binary still builds and says
/// something sensible.
#[cfg(not(target_os = "windows"))]
pub fn create_default_backend() -> InstallResult<Rc<dyn Backend>> {
    Err(crate::error::Error::NotSupported)
}

/// Finds the window handle of the console this process is attached to, for
/// the progress-bar option's no-argument form. Returns None when there is no
/// console or no way to look one up.
#[cfg(target_os = "windows")]
pub fn console_window() -> Option<WindowHandle> {
    windows::console_window()
}

#[cfg(not(target_os = "windows"))]
pub fn console_window() -> Option<WindowHandle> {
    None
}
