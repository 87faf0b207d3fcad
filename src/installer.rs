//! The installation pipeline: prepare the driver package, optionally trust
//! a certificate, then install the driver for every matching attached
//! device -- or once unconditionally when nothing matched.

use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, warn};

use crate::backend::{
    create_default_backend, Backend, CertOptions, InstallOptions, ListOptions, PrepareOptions,
};
use crate::config::InstallConfig;
use crate::device::{TargetDevice, KNOWN_DEVICES};
use crate::error::{status_text, InstallResult};

/// Progress text for the operator; not logging, and silenced wholesale by
/// the silent flag.
macro_rules! progress {
    ($installer:expr, $($arg:tt)*) => {
        if !$installer.config.silent {
            println!($($arg)*);
        }
    };
}

/// Drives one installation run against a [Backend].
pub struct Installer {
    /// The backend providing the actual installation primitives.
    backend: Rc<dyn Backend>,

    /// The resolved configuration for this run.
    config: InstallConfig,
}

impl Installer {
    /// Creates an installer using the backend appropriate for the current
    /// platform.
    pub fn new(config: InstallConfig) -> InstallResult<Self> {
        let backend = create_default_backend()?;
        Ok(Self::with_backend(config, backend))
    }

    /// Creates an installer from a custom backend; this is also how the
    /// tests substitute a scripted backend for the real one.
    pub fn with_backend(config: InstallConfig, backend: Rc<dyn Backend>) -> Self {
        Installer { backend, config }
    }

    /// Runs the whole pipeline and returns its final status.
    ///
    /// Driver-package extraction is a hard prerequisite: if it fails, no
    /// later stage runs and its status is the run's result. The certificate
    /// stage is best-effort; its failure is reported but never propagates.
    /// The result of the last driver-install attempt (matched or fallback)
    /// is the run's result otherwise.
    pub fn run(&self) -> InstallResult<()> {
        let target = TargetDevice::default();

        progress!(self, "Extracting driver files...");
        let prepared = self.backend.prepare_driver(
            &target,
            &self.config.extract_dir,
            &self.config.inf_name,
            &PrepareOptions::default(),
        );
        progress!(self, "  {}", status_text(&prepared));
        prepared?;

        if self.config.extract_only {
            return Ok(());
        }

        if let Some(name) = &self.config.certificate {
            progress!(
                self,
                "Installing certificate '{}' as a Trusted Publisher...",
                name
            );
            let cert_options = CertOptions {
                disable_warning: self.config.stealth_cert,
                progress_window: self.config.progress_window,
            };
            let installed = self.backend.install_certificate(name, &cert_options);
            progress!(self, "  {}", status_text(&installed));

            // Best-effort: a missing trust entry means prompts during the
            // install, not a failed install.
            if let Err(e) = installed {
                warn!("certificate install failed: {e}");
            }
        }

        progress!(self, "Installing driver(s)...");
        self.install_for_matches(target)
    }

    /// Matches attached devices against the known-device table and installs
    /// the driver for each match, stopping at the first failed install.
    /// Falls back to a single unconditional install for the default identity
    /// when no device matched at all.
    fn install_for_matches(&self, mut target: TargetDevice) -> InstallResult<()> {
        let install_options = InstallOptions {
            pending_install_timeout: self.config.pending_install_timeout,
            progress_window: self.config.progress_window,
        };

        // The fallback install must see the descriptor exactly as
        // configured, untouched by the match loop.
        let fallback = target.clone();

        let mut matched = false;
        let mut result = Ok(());

        // Match against plugged devices first, to avoid device-manager
        // prompts for identities that are actually present.
        let list_options = ListOptions {
            list_all: true,
            list_hubs: true,
            trim_whitespaces: true,
        };
        match self.backend.list_devices(&list_options) {
            Ok(devices) => {
                'enumeration: for candidate in &devices {
                    for entry in &KNOWN_DEVICES {
                        if !target.matches(entry, candidate) {
                            continue;
                        }
                        target.adopt(entry, candidate);
                        matched = true;

                        debug!(
                            "matched {:04x}:{:04x}, hardware id {:?}",
                            target.vendor_id, target.product_id, target.hardware_id
                        );
                        if !self.config.silent {
                            print!(
                                "  {}: ",
                                target.hardware_id.as_deref().unwrap_or("(unknown)")
                            );
                            let _ = io::stdout().flush();
                        }
                        result = self.backend.install_driver(
                            &target,
                            &self.config.extract_dir,
                            &self.config.inf_name,
                            &install_options,
                        );
                        progress!(self, "{}", status_text(&result));

                        // One failed install ends the whole match pass; the
                        // failure is the run's result.
                        if result.is_err() {
                            break 'enumeration;
                        }
                    }
                }
            }
            Err(e) => {
                // A failed enumeration just means nothing can match.
                debug!("device enumeration failed: {e}");
            }
        }

        // No plugged device matched; install for the default identity so an
        // operator can still set up the driver with nothing attached. A
        // match pass that got as far as an install attempt never falls
        // through to here, even if that attempt failed.
        if !matched {
            result = self.backend.install_driver(
                &fallback,
                &self.config.extract_dir,
                &self.config.inf_name,
                &install_options,
            );
            progress!(self, "  {}", status_text(&result));
        }

        result
    }
}
