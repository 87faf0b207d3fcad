//! Raw declarations for the libwdi C API.
//!
//! Layouts and names mirror libwdi.h exactly; everything here is consumed
//! by the safe wrapper one level up.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use libc::{c_char, c_int, c_uchar, c_ushort, c_void};

/// Win32 BOOL: a four-byte int, nonzero for true.
pub type BOOL = c_int;

/// Win32 HWND, carried opaquely.
pub type HWND = *mut c_void;

// enum wdi_driver_type
pub const WDI_WINUSB: c_int = 0;
pub const WDI_LIBUSB0: c_int = 1;
pub const WDI_LIBUSBK: c_int = 2;
pub const WDI_USER: c_int = 4;

// enum wdi_log_level
pub const WDI_LOG_LEVEL_DEBUG: c_int = 0;
pub const WDI_LOG_LEVEL_INFO: c_int = 1;
pub const WDI_LOG_LEVEL_WARNING: c_int = 2;
pub const WDI_LOG_LEVEL_ERROR: c_int = 3;
pub const WDI_LOG_LEVEL_NONE: c_int = 4;

/// One node of the singly linked device list wdi_create_list allocates.
/// The list is owned by libwdi and must be handed back to wdi_destroy_list.
#[repr(C)]
pub struct wdi_device_info {
    pub next: *mut wdi_device_info,
    pub vid: c_ushort,
    pub pid: c_ushort,
    pub is_composite: BOOL,
    pub mi: c_uchar,
    pub desc: *mut c_char,
    pub driver: *mut c_char,
    pub device_id: *mut c_char,
    pub hardware_id: *mut c_char,
    pub compatible_id: *mut c_char,
    pub upper_filter: *mut c_char,
    pub driver_version: u64,
}

#[repr(C)]
pub struct wdi_options_create_list {
    pub list_all: BOOL,
    pub list_hubs: BOOL,
    pub trim_whitespaces: BOOL,
}

#[repr(C)]
pub struct wdi_options_prepare_driver {
    pub driver_type: c_int,
    pub vendor_name: *mut c_char,
    pub device_guid: *mut c_char,
    pub disable_cat: BOOL,
    pub disable_signing: BOOL,
    pub cert_subject: *mut c_char,
    pub use_wcid_driver: BOOL,
    pub external_inf: BOOL,
}

#[repr(C)]
pub struct wdi_options_install_driver {
    pub hWnd: HWND,
    pub install_filter_driver: BOOL,
    pub pending_install_timeout: u32,
}

#[repr(C)]
pub struct wdi_options_install_cert {
    pub hWnd: HWND,
    pub disable_warning: BOOL,
}

#[link(name = "wdi")]
extern "C" {
    pub fn wdi_create_list(
        list: *mut *mut wdi_device_info,
        options: *mut wdi_options_create_list,
    ) -> c_int;

    pub fn wdi_destroy_list(list: *mut wdi_device_info) -> c_int;

    pub fn wdi_prepare_driver(
        device: *mut wdi_device_info,
        path: *const c_char,
        inf_name: *const c_char,
        options: *mut wdi_options_prepare_driver,
    ) -> c_int;

    pub fn wdi_install_driver(
        device: *mut wdi_device_info,
        path: *const c_char,
        inf_name: *const c_char,
        options: *mut wdi_options_install_driver,
    ) -> c_int;

    pub fn wdi_install_trusted_certificate(
        cert_name: *const c_char,
        options: *mut wdi_options_install_cert,
    ) -> c_int;

    pub fn wdi_set_log_level(level: c_int) -> c_int;
}
