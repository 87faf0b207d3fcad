//! Command-line front end for the installer.

use std::process;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use cbmdi::backend::{self, WindowHandle};
use cbmdi::{status_code, InstallConfig, Installer, DEFAULT_EXTRACT_DIR, DEFAULT_INF_NAME};

#[derive(Debug, Parser)]
#[command(name = "cbmdi", version, about = "Driver installer for OpenCBM USB devices")]
struct Args {
    /// Set the inf name.
    #[arg(short = 'f', long = "inf", value_name = "NAME", default_value = DEFAULT_INF_NAME)]
    inf: String,

    /// Set the extraction directory.
    #[arg(short = 'd', long = "dest", value_name = "DIR", default_value = DEFAULT_EXTRACT_DIR)]
    dest: String,

    /// Extract files only (don't install).
    #[arg(short = 'x', long = "extract")]
    extract: bool,

    /// Install the named certificate from the embedded user files as a
    /// trusted publisher.
    #[arg(short = 'c', long = "cert", value_name = "CERTNAME")]
    cert: Option<String>,

    /// Install the certificate above without prompting.
    #[arg(long = "stealth-cert", requires = "cert")]
    stealth_cert: bool,

    /// Silent mode.
    #[arg(short = 's', long = "silent")]
    silent: bool,

    /// Display a progress bar during install; an optional HWND can be given.
    #[arg(
        short = 'b',
        long = "progressbar",
        value_name = "HWND",
        num_args = 0..=1,
        value_parser = parse_handle
    )]
    progressbar: Option<Option<WindowHandle>>,

    /// Timeout (in ms) to wait for any pending installations.
    #[arg(short = 'o', long = "timeout", value_name = "MS")]
    timeout: Option<u64>,

    /// Log level (0=debug, 4=none).
    #[arg(short = 'l', long = "log", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=4))]
    log: Option<u8>,
}

/// Window handles may arrive in decimal or with a 0x prefix.
fn parse_handle(s: &str) -> Result<WindowHandle, String> {
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };
    WindowHandle::from_str_radix(digits, radix).map_err(|e| e.to_string())
}

impl Args {
    fn into_config(self) -> InstallConfig {
        let log_level = if self.silent {
            LevelFilter::Off
        } else {
            match self.log {
                Some(0) => LevelFilter::Debug,
                Some(1) => LevelFilter::Info,
                Some(3) => LevelFilter::Error,
                Some(4) => LevelFilter::Off,
                // Default verbosity is warnings.
                Some(_) | None => LevelFilter::Warn,
            }
        };

        // -b without a value means "find our own console window".
        let progress_window = match self.progressbar {
            None => None,
            Some(Some(handle)) => Some(handle),
            Some(None) => backend::console_window(),
        };

        InstallConfig {
            inf_name: self.inf,
            extract_dir: self.dest,
            extract_only: self.extract,
            silent: self.silent,
            certificate: self.cert,
            stealth_cert: self.stealth_cert,
            pending_install_timeout: self.timeout.map(Duration::from_millis),
            log_level,
            progress_window,
        }
    }
}

fn main() {
    let config = Args::parse().into_config();

    env_logger::Builder::from_default_env()
        .filter_level(config.log_level)
        .init();

    let result = match Installer::new(config) {
        Ok(installer) => installer.run(),
        Err(e) => {
            eprintln!("{e}");
            Err(e)
        }
    };

    // The exit code is the final status code; 0 means success.
    process::exit(status_code(&result));
}
