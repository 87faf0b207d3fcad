//! Pipeline tests, driven through a scripted backend.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cbmdi::backend::{Backend, CertOptions, InstallOptions, ListOptions, PrepareOptions};
use cbmdi::{
    DeviceInfo, Error, InstallConfig, InstallResult, Installer, TargetDevice, KNOWN_DEVICES,
};

/// One primitive invocation, with the descriptor captured as it looked at
/// call time (the orchestrator mutates it between calls).
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Prepare(TargetDevice),
    Certificate(String),
    List,
    Install(TargetDevice),
}

/// Backend that records every call and replays scripted results.
#[derive(Debug, Default)]
struct ScriptedBackend {
    prepare_result: Option<Error>,
    cert_result: Option<Error>,
    list_result: Option<Error>,
    devices: Vec<DeviceInfo>,

    /// Results for successive install calls; exhausted entries succeed.
    install_results: RefCell<VecDeque<Error>>,

    calls: RefCell<Vec<Call>>,
}

impl ScriptedBackend {
    fn failing_installs(mut self, failures: &[Error]) -> Self {
        self.install_results = RefCell::new(failures.iter().copied().collect());
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn installs(&self) -> Vec<TargetDevice> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Install(device) => Some(device),
                _ => None,
            })
            .collect()
    }

    fn result(error: Option<Error>) -> InstallResult<()> {
        match error {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

impl Backend for ScriptedBackend {
    fn prepare_driver(
        &self,
        device: &TargetDevice,
        _extract_dir: &str,
        _inf_name: &str,
        _options: &PrepareOptions,
    ) -> InstallResult<()> {
        self.calls.borrow_mut().push(Call::Prepare(device.clone()));
        Self::result(self.prepare_result)
    }

    fn install_certificate(&self, name: &str, _options: &CertOptions) -> InstallResult<()> {
        self.calls
            .borrow_mut()
            .push(Call::Certificate(name.to_string()));
        Self::result(self.cert_result)
    }

    fn list_devices(&self, options: &ListOptions) -> InstallResult<Vec<DeviceInfo>> {
        self.calls.borrow_mut().push(Call::List);
        assert!(options.list_all && options.list_hubs && options.trim_whitespaces);
        match self.list_result {
            Some(e) => Err(e),
            None => Ok(self.devices.clone()),
        }
    }

    fn install_driver(
        &self,
        device: &TargetDevice,
        _extract_dir: &str,
        _inf_name: &str,
        _options: &InstallOptions,
    ) -> InstallResult<()> {
        self.calls.borrow_mut().push(Call::Install(device.clone()));
        Self::result(self.install_results.borrow_mut().pop_front())
    }
}

fn config() -> InstallConfig {
    InstallConfig {
        silent: true,
        ..Default::default()
    }
}

fn run(backend: ScriptedBackend, config: InstallConfig) -> (Rc<ScriptedBackend>, InstallResult<()>) {
    let backend = Rc::new(backend);
    let result = Installer::with_backend(config, backend.clone()).run();
    (backend, result)
}

fn attached(vendor_id: u16, product_id: u16) -> DeviceInfo {
    DeviceInfo {
        vendor_id,
        product_id,
        interface: 0,
        is_composite: false,
        hardware_id: Some(format!("USB\\VID_{vendor_id:04X}&PID_{product_id:04X}")),
        device_id: Some(format!("USB\\VID_{vendor_id:04X}&PID_{product_id:04X}\\6&ABCD")),
        description: Some("test device".to_string()),
    }
}

#[test]
fn matched_device_gets_exactly_one_install() {
    let plugged = attached(0x0403, 0xc632);
    let backend = ScriptedBackend {
        devices: vec![plugged.clone()],
        ..Default::default()
    };

    let (backend, result) = run(backend, config());
    assert_eq!(result, Ok(()));

    let installs = backend.installs();
    assert_eq!(installs.len(), 1);
    assert_eq!(installs[0].vendor_id, 0x0403);
    assert_eq!(installs[0].product_id, 0xc632);
    assert_eq!(installs[0].hardware_id, plugged.hardware_id);
    assert_eq!(installs[0].device_id, plugged.device_id);
}

#[test]
fn every_known_identity_matches() {
    let backend = ScriptedBackend {
        devices: KNOWN_DEVICES
            .iter()
            .map(|entry| attached(entry.vendor_id, entry.product_id))
            .collect(),
        ..Default::default()
    };

    let (backend, result) = run(backend, config());
    assert_eq!(result, Ok(()));

    let identities: Vec<(u16, u16)> = backend
        .installs()
        .iter()
        .map(|d| (d.vendor_id, d.product_id))
        .collect();
    let expected: Vec<(u16, u16)> = KNOWN_DEVICES
        .iter()
        .map(|e| (e.vendor_id, e.product_id))
        .collect();
    assert_eq!(identities, expected);
}

#[test]
fn failed_preparation_stops_everything() {
    let backend = ScriptedBackend {
        prepare_result: Some(Error::Io),
        devices: vec![attached(0x0403, 0xc632)],
        ..Default::default()
    };
    let config = InstallConfig {
        certificate: Some("opencbm.cer".to_string()),
        ..config()
    };

    let (backend, result) = run(backend, config);
    assert_eq!(result, Err(Error::Io));

    // Nothing but the preparation attempt may have happened.
    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::Prepare(_)));
}

#[test]
fn extract_only_stops_after_preparation() {
    let backend = ScriptedBackend {
        devices: vec![attached(0x0403, 0xc632)],
        ..Default::default()
    };
    let config = InstallConfig {
        extract_only: true,
        certificate: Some("opencbm.cer".to_string()),
        ..config()
    };

    let (backend, result) = run(backend, config);
    assert_eq!(result, Ok(()));

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::Prepare(_)));
}

#[test]
fn failed_certificate_install_is_not_fatal() {
    let backend = ScriptedBackend {
        cert_result: Some(Error::Access),
        devices: vec![attached(0x16d0, 0x0504)],
        ..Default::default()
    };
    let config = InstallConfig {
        certificate: Some("opencbm.cer".to_string()),
        ..config()
    };

    let (backend, result) = run(backend, config);
    assert_eq!(result, Ok(()));

    // The pipeline went all the way through to the driver install.
    let calls = backend.calls();
    assert!(calls.contains(&Call::Certificate("opencbm.cer".to_string())));
    assert!(calls.contains(&Call::List));
    assert_eq!(backend.installs().len(), 1);
}

#[test]
fn no_certificate_configured_means_no_certificate_call() {
    let backend = ScriptedBackend {
        devices: vec![attached(0x16d0, 0x0504)],
        ..Default::default()
    };

    let (backend, result) = run(backend, config());
    assert_eq!(result, Ok(()));
    assert!(!backend
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Certificate(_))));
}

#[test]
fn enumeration_failure_falls_back_to_default_install() {
    let backend = ScriptedBackend {
        list_result: Some(Error::NoDevice),
        ..Default::default()
    };

    let (backend, result) = run(backend, config());
    assert_eq!(result, Ok(()));

    // Exactly one install, for the untouched default identity.
    let installs = backend.installs();
    assert_eq!(installs.len(), 1);
    assert_eq!(installs[0], TargetDevice::default());
}

#[test]
fn empty_enumeration_falls_back_to_default_install() {
    let backend = ScriptedBackend::default();

    let (backend, result) = run(backend, config());
    assert_eq!(result, Ok(()));

    let installs = backend.installs();
    assert_eq!(installs.len(), 1);
    assert_eq!(installs[0], TargetDevice::default());
}

#[test]
fn unmatched_devices_fall_back_with_pristine_descriptor() {
    // Attached devices, none of them ours: the table was walked, but the
    // fallback still has to see the originally configured identity.
    let backend = ScriptedBackend {
        devices: vec![attached(0x1234, 0x5678), attached(0x0403, 0x6001)],
        ..Default::default()
    };

    let (backend, result) = run(backend, config());
    assert_eq!(result, Ok(()));

    let installs = backend.installs();
    assert_eq!(installs.len(), 1);
    assert_eq!(installs[0].vendor_id, 0x16d0);
    assert_eq!(installs[0].product_id, 0x0504);
    assert_eq!(installs[0].hardware_id, None);
}

#[test]
fn composite_mismatch_is_not_a_match() {
    let mut composite = attached(0x0403, 0xc632);
    composite.is_composite = true;
    composite.interface = 1;
    let backend = ScriptedBackend {
        devices: vec![composite],
        ..Default::default()
    };

    let (backend, _) = run(backend, config());

    // Right VID/PID, wrong mi/composite state: fallback path.
    let installs = backend.installs();
    assert_eq!(installs.len(), 1);
    assert_eq!(installs[0], TargetDevice::default());
}

#[test]
fn first_install_failure_stops_the_match_pass() {
    let backend = ScriptedBackend {
        devices: vec![attached(0x0403, 0xc632), attached(0x16d0, 0x0504)],
        ..Default::default()
    }
    .failing_installs(&[Error::NotFound]);

    let (backend, result) = run(backend, config());
    assert_eq!(result, Err(Error::NotFound));

    // The second matching device is never processed, and a failed match
    // pass must not fall through to the unconditional install.
    let installs = backend.installs();
    assert_eq!(installs.len(), 1);
    assert_eq!(installs[0].vendor_id, 0x0403);
    assert_eq!(installs[0].product_id, 0xc632);
}

#[test]
fn failed_fallback_install_is_the_final_status() {
    let backend = ScriptedBackend {
        list_result: Some(Error::NoDevice),
        ..Default::default()
    }
    .failing_installs(&[Error::NeedsAdmin]);

    let (_, result) = run(backend, config());
    assert_eq!(result, Err(Error::NeedsAdmin));
}
