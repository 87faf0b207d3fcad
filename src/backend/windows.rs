//! libwdi-backed installation primitives for Windows.

use std::ffi::{CStr, CString};
use std::ptr;

use libc::{c_char, c_int};
use log::LevelFilter;

use super::{
    Backend, CertOptions, DriverType, InstallOptions, ListOptions, PrepareOptions, WindowHandle,
};
use crate::device::{DeviceInfo, TargetDevice};
use crate::error::{Error, InstallResult};

mod wdi_c;

/// Backend that drives libwdi directly.
#[derive(Debug)]
pub(crate) struct WdiBackend {}

impl WdiBackend {
    pub fn new() -> InstallResult<WdiBackend> {
        // Mirror our own log verbosity into libwdi's logger.
        unsafe {
            wdi_c::wdi_set_log_level(wdi_log_level(log::max_level()));
        }
        Ok(WdiBackend {})
    }
}

/// Converts a Rust string into C storage; embedded NULs are a caller error.
fn cstring(s: &str) -> InstallResult<CString> {
    CString::new(s).map_err(|_| Error::InvalidParam)
}

/// Copies a libwdi-owned C string out into an owned String.
unsafe fn owned_string(s: *const c_char) -> Option<String> {
    if s.is_null() {
        None
    } else {
        Some(CStr::from_ptr(s).to_string_lossy().into_owned())
    }
}

fn wdi_log_level(level: LevelFilter) -> c_int {
    match level {
        LevelFilter::Off => wdi_c::WDI_LOG_LEVEL_NONE,
        LevelFilter::Error => wdi_c::WDI_LOG_LEVEL_ERROR,
        LevelFilter::Warn => wdi_c::WDI_LOG_LEVEL_WARNING,
        LevelFilter::Info => wdi_c::WDI_LOG_LEVEL_INFO,
        LevelFilter::Debug | LevelFilter::Trace => wdi_c::WDI_LOG_LEVEL_DEBUG,
    }
}

fn wdi_driver_type(driver_type: DriverType) -> c_int {
    match driver_type {
        DriverType::WinUsb => wdi_c::WDI_WINUSB,
        DriverType::Libusb0 => wdi_c::WDI_LIBUSB0,
        DriverType::LibusbK => wdi_c::WDI_LIBUSBK,
        DriverType::UserDriver => wdi_c::WDI_USER,
    }
}

fn hwnd(handle: Option<WindowHandle>) -> wdi_c::HWND {
    handle.map_or(ptr::null_mut(), |h| h as wdi_c::HWND)
}

/// Owns the C-side storage for a wdi_device_info for the duration of a call.
struct RawDevice {
    vid: u16,
    pid: u16,
    is_composite: bool,
    mi: u8,
    desc: CString,
    hardware_id: Option<CString>,
    device_id: Option<CString>,
}

impl RawDevice {
    fn new(device: &TargetDevice) -> InstallResult<RawDevice> {
        Ok(RawDevice {
            vid: device.vendor_id,
            pid: device.product_id,
            is_composite: device.is_composite,
            mi: device.interface,
            desc: cstring(&device.description)?,
            hardware_id: device.hardware_id.as_deref().map(cstring).transpose()?,
            device_id: device.device_id.as_deref().map(cstring).transpose()?,
        })
    }

    /// The wdi_device_info view of this device. Only valid while `self`
    /// lives, since the string fields point into our CString storage.
    fn info(&self) -> wdi_c::wdi_device_info {
        fn field(s: &Option<CString>) -> *mut c_char {
            s.as_ref().map_or(ptr::null_mut(), |s| s.as_ptr() as *mut c_char)
        }

        wdi_c::wdi_device_info {
            next: ptr::null_mut(),
            vid: self.vid,
            pid: self.pid,
            is_composite: self.is_composite as wdi_c::BOOL,
            mi: self.mi,
            desc: self.desc.as_ptr() as *mut c_char,
            driver: ptr::null_mut(),
            device_id: field(&self.device_id),
            hardware_id: field(&self.hardware_id),
            compatible_id: ptr::null_mut(),
            upper_filter: ptr::null_mut(),
            driver_version: 0,
        }
    }
}

impl Backend for WdiBackend {
    fn prepare_driver(
        &self,
        device: &TargetDevice,
        extract_dir: &str,
        inf_name: &str,
        options: &PrepareOptions,
    ) -> InstallResult<()> {
        let raw = RawDevice::new(device)?;
        let mut info = raw.info();
        let path = cstring(extract_dir)?;
        let inf = cstring(inf_name)?;
        let mut opts = wdi_c::wdi_options_prepare_driver {
            driver_type: wdi_driver_type(options.driver_type),
            vendor_name: ptr::null_mut(),
            device_guid: ptr::null_mut(),
            disable_cat: 0,
            disable_signing: 0,
            cert_subject: ptr::null_mut(),
            use_wcid_driver: 0,
            external_inf: 0,
        };

        unsafe {
            Error::check(wdi_c::wdi_prepare_driver(
                &mut info,
                path.as_ptr(),
                inf.as_ptr(),
                &mut opts,
            ))
        }
    }

    fn install_certificate(&self, name: &str, options: &CertOptions) -> InstallResult<()> {
        let name = cstring(name)?;
        let mut opts = wdi_c::wdi_options_install_cert {
            hWnd: hwnd(options.progress_window),
            disable_warning: options.disable_warning as wdi_c::BOOL,
        };

        unsafe {
            Error::check(wdi_c::wdi_install_trusted_certificate(
                name.as_ptr(),
                &mut opts,
            ))
        }
    }

    fn list_devices(&self, options: &ListOptions) -> InstallResult<Vec<DeviceInfo>> {
        let mut opts = wdi_c::wdi_options_create_list {
            list_all: options.list_all as wdi_c::BOOL,
            list_hubs: options.list_hubs as wdi_c::BOOL,
            trim_whitespaces: options.trim_whitespaces as wdi_c::BOOL,
        };

        unsafe {
            let mut raw_list: *mut wdi_c::wdi_device_info = ptr::null_mut();
            Error::check(wdi_c::wdi_create_list(&mut raw_list, &mut opts))?;

            // Copy the externally owned list into owned records, then hand
            // it straight back; nothing past this function may see it.
            let mut devices = vec![];
            let mut node = raw_list;
            while !node.is_null() {
                let entry = &*node;
                devices.push(DeviceInfo {
                    vendor_id: entry.vid,
                    product_id: entry.pid,
                    interface: entry.mi,
                    is_composite: entry.is_composite != 0,
                    hardware_id: owned_string(entry.hardware_id),
                    device_id: owned_string(entry.device_id),
                    description: owned_string(entry.desc),
                });
                node = entry.next;
            }
            wdi_c::wdi_destroy_list(raw_list);

            Ok(devices)
        }
    }

    fn install_driver(
        &self,
        device: &TargetDevice,
        extract_dir: &str,
        inf_name: &str,
        options: &InstallOptions,
    ) -> InstallResult<()> {
        let raw = RawDevice::new(device)?;
        let mut info = raw.info();
        let path = cstring(extract_dir)?;
        let inf = cstring(inf_name)?;
        let mut opts = wdi_c::wdi_options_install_driver {
            hWnd: hwnd(options.progress_window),
            install_filter_driver: 0,
            pending_install_timeout: options
                .pending_install_timeout
                .map_or(0, |t| t.as_millis() as u32),
        };

        unsafe {
            Error::check(wdi_c::wdi_install_driver(
                &mut info,
                path.as_ptr(),
                inf.as_ptr(),
                &mut opts,
            ))
        }
    }
}

/// Finds the window handle of our own console, by giving the console a
/// unique temporary title and looking up the window that carries it.
pub(crate) fn console_window() -> Option<WindowHandle> {
    use windows_sys::Win32::System::Console::{GetConsoleTitleA, SetConsoleTitleA};
    use windows_sys::Win32::System::SystemInformation::GetTickCount;
    use windows_sys::Win32::System::Threading::{GetCurrentProcessId, Sleep};
    use windows_sys::Win32::UI::WindowsAndMessaging::FindWindowA;

    unsafe {
        let mut old_title = [0u8; 128];
        GetConsoleTitleA(old_title.as_mut_ptr(), old_title.len() as u32);

        let probe = format!("{}/{}\0", GetTickCount(), GetCurrentProcessId());
        SetConsoleTitleA(probe.as_ptr());

        // Give the window manager a moment to pick the new title up.
        Sleep(40);
        let found = FindWindowA(ptr::null(), probe.as_ptr());
        SetConsoleTitleA(old_title.as_ptr());

        if found == 0 {
            None
        } else {
            Some(found as WindowHandle)
        }
    }
}
