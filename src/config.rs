//! Resolved installer configuration.

use std::time::Duration;

use log::LevelFilter;

use crate::backend::WindowHandle;

/// Name of the inf file to extract and install, unless overridden.
pub const DEFAULT_INF_NAME: &str = "usb_device.inf";

/// Directory the driver files are extracted into, unless overridden.
pub const DEFAULT_EXTRACT_DIR: &str = "usb_driver";

/// Everything the orchestrator needs to know about one run, resolved from
/// the command line (or built by hand in tests).
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Name of the inf file describing the driver.
    pub inf_name: String,

    /// Directory to extract the driver files into.
    pub extract_dir: String,

    /// Extract the driver files, then stop without installing anything.
    pub extract_only: bool,

    /// Suppress all progress output.
    pub silent: bool,

    /// Certificate from the embedded user files to install as a trusted
    /// publisher before the driver install, if any.
    pub certificate: Option<String>,

    /// Install the certificate without prompting the user.
    pub stealth_cert: bool,

    /// How long the install primitive may wait on a pending installation.
    pub pending_install_timeout: Option<Duration>,

    /// Verbosity of the library's own logging.
    pub log_level: LevelFilter,

    /// Window to attach the installer's progress bar to, if one was
    /// requested.
    pub progress_window: Option<WindowHandle>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig {
            inf_name: DEFAULT_INF_NAME.to_string(),
            extract_dir: DEFAULT_EXTRACT_DIR.to_string(),
            extract_only: false,
            silent: false,
            certificate: None,
            stealth_cert: false,
            pending_install_timeout: None,
            log_level: LevelFilter::Warn,
            progress_window: None,
        }
    }
}
