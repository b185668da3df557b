//! End-to-end configuration-state scenarios against in-memory collaborators.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use nodecfg_control::{
    ConfigState, ConfigStateRequest, ConfigStateService, ControlConfig, ControlError, DeviceId,
    FaultKind, NodeControl, PatternId, StoreProvisioner,
};
use nodecfg_registry::{
    Pattern, ServiceDefinition, Sharable, StaticRegistry, UserInput, WorkloadChoice,
    WorkloadDefinition, WorkloadDependency, WorkloadReference,
};
use nodecfg_store::{Device, MemoryStore, ServiceRecord, Store, StoreError};

const ARCH: &str = "amd64";
const ORG: &str = "e2edev";
const WORKLOAD: &str = "https://bluehorizon.network/workloads/location";
const GPS: &str = "https://bluehorizon.network/microservices/gps";
const NET: &str = "https://bluehorizon.network/microservices/network";

// =============================================================================
// Collaborators
// =============================================================================

/// A store that counts configuration-state writes and can be told to fail
/// them.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    state_writes: AtomicUsize,
    fail_state_writes: AtomicBool,
}

impl CountingStore {
    fn state_writes(&self) -> usize {
        self.state_writes.load(Ordering::SeqCst)
    }

    fn fail_state_writes(&self) {
        self.fail_state_writes.store(true, Ordering::SeqCst);
    }
}

impl Store for CountingStore {
    fn get_device(&self) -> nodecfg_store::Result<Option<Device>> {
        self.inner.get_device()
    }

    fn put_device(&self, device: &Device) -> nodecfg_store::Result<()> {
        self.inner.put_device(device)
    }

    fn set_config_state(
        &self,
        device_id: &DeviceId,
        state: ConfigState,
    ) -> nodecfg_store::Result<Device> {
        self.state_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_state_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("device table unavailable".to_string()));
        }
        self.inner.set_config_state(device_id, state)
    }

    fn put_service(&self, service: &ServiceRecord) -> nodecfg_store::Result<()> {
        self.inner.put_service(service)
    }

    fn find_services(
        &self,
        spec_ref: &str,
        org: &str,
    ) -> nodecfg_store::Result<Vec<ServiceRecord>> {
        self.inner.find_services(spec_ref, org)
    }

    fn list_services(&self) -> nodecfg_store::Result<Vec<ServiceRecord>> {
        self.inner.list_services()
    }
}

type Service =
    ConfigStateService<CountingStore, StaticRegistry, StoreProvisioner<CountingStore, StaticRegistry>>;

struct Node {
    service: Service,
    store: Arc<CountingStore>,
    registry: Arc<StaticRegistry>,
}

fn node() -> Node {
    let store = Arc::new(CountingStore::default());
    let registry = Arc::new(StaticRegistry::new());
    let provisioner = Arc::new(StoreProvisioner::new(
        Arc::clone(&store),
        Arc::clone(&registry),
    ));
    let service = ConfigStateService::new(
        Arc::clone(&store),
        Arc::clone(&registry),
        provisioner,
        ControlConfig::with_arch(ARCH),
    );
    Node {
        service,
        store,
        registry,
    }
}

fn register(node: &Node, pattern: Option<&str>) {
    let mut device = Device::new(DeviceId::new("an12345").unwrap(), ORG, "abcdefg");
    if let Some(name) = pattern {
        device = device.with_pattern(PatternId::new(ORG, name).unwrap());
    }
    node.store.put_device(&device).unwrap();
}

fn service_def(spec_ref: &str, version: &str, inputs: Vec<UserInput>) -> ServiceDefinition {
    ServiceDefinition {
        spec_ref: spec_ref.to_string(),
        org: ORG.to_string(),
        version: version.to_string(),
        arch: ARCH.to_string(),
        sharable: Sharable::Exclusive,
        user_inputs: inputs,
    }
}

/// Publish pattern `location` with one workload needing `deps`.
fn publish_location(registry: &StaticRegistry, deps: &[&str]) {
    registry.insert_pattern(
        format!("{ORG}/location"),
        Pattern {
            label: "location".to_string(),
            workloads: vec![
                WorkloadReference {
                    workload_url: WORKLOAD.to_string(),
                    workload_org: ORG.to_string(),
                    workload_arch: ARCH.to_string(),
                    workload_versions: vec![WorkloadChoice::new("2.0.6")],
                },
                WorkloadReference {
                    workload_url: "https://bluehorizon.network/workloads/cpu".to_string(),
                    workload_org: ORG.to_string(),
                    workload_arch: "arm".to_string(),
                    workload_versions: vec![WorkloadChoice::new("1.0.0")],
                },
            ],
            ..Pattern::default()
        },
    );
    registry.insert_workload(WorkloadDefinition {
        workload_url: WORKLOAD.to_string(),
        org: ORG.to_string(),
        version: "2.0.6".to_string(),
        arch: ARCH.to_string(),
        dependencies: deps
            .iter()
            .map(|spec_ref| WorkloadDependency {
                spec_ref: (*spec_ref).to_string(),
                org: ORG.to_string(),
                version: "1.0.0".to_string(),
            })
            .collect(),
    });
}

fn existing_service(spec_ref: &str) -> ServiceRecord {
    ServiceRecord {
        name: format!("{spec_ref}-preconfigured"),
        spec_ref: spec_ref.to_string(),
        org: ORG.to_string(),
        version: "1.0.0".to_string(),
        arch: ARCH.to_string(),
        variables: BTreeMap::new(),
        created_at: Utc::now(),
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn no_device_is_not_found() {
    let node = node();

    for state in ["configuring", "configured", "bogus"] {
        let err = node
            .service
            .update_config_state(ConfigStateRequest::new(state))
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::DeviceNotRegistered));
        assert_eq!(err.kind(), FaultKind::NotFound);
    }
    assert_eq!(node.store.state_writes(), 0);
}

#[tokio::test]
async fn configure_without_pattern_persists_once() {
    let node = node();
    register(&node, None);

    let update = node
        .service
        .update_config_state(ConfigStateRequest::new("configured"))
        .await
        .unwrap();

    assert_eq!(update.configstate.state, ConfigState::Configured);
    assert!(update.policies_created.is_empty());
    assert_eq!(node.store.state_writes(), 1);
}

#[tokio::test]
async fn already_present_dependency_is_skipped() {
    let node = node();
    register(&node, Some("location"));
    publish_location(&node.registry, &[GPS, NET]);
    node.registry.insert_service(service_def(GPS, "1.0.0", Vec::new()));
    node.registry.insert_service(service_def(NET, "1.0.0", Vec::new()));
    node.store.put_service(&existing_service(GPS)).unwrap();

    let update = node
        .service
        .update_config_state(ConfigStateRequest::new("configured"))
        .await
        .unwrap();

    assert_eq!(update.configstate.state, ConfigState::Configured);
    assert_eq!(update.policies_created.len(), 1);
    assert_eq!(update.policies_created[0].spec_ref, NET);
    assert_eq!(
        update.policies_created[0].service_name,
        "bluehorizon.network-microservices-network_e2edev_1.0.0"
    );
    assert_eq!(node.store.state_writes(), 1);
}

#[tokio::test]
async fn manual_config_dependency_blocks_configuration() {
    let node = node();
    register(&node, Some("location"));
    publish_location(&node.registry, &[GPS]);
    node.registry.insert_service(service_def(
        GPS,
        "1.0.0",
        vec![UserInput {
            name: "HZN_LAT".to_string(),
            kind: "float".to_string(),
            default_value: None,
        }],
    ));

    let err = node
        .service
        .update_config_state(ConfigStateRequest::new("configured"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FaultKind::InvalidInput);
    match &err {
        ControlError::ManualConfigRequired { spec_ref, reason, .. } => {
            assert_eq!(spec_ref, GPS);
            assert!(reason.contains("HZN_LAT"));
        }
        other => panic!("expected ManualConfigRequired, got {other:?}"),
    }
    assert!(err.to_string().contains(GPS));

    assert_eq!(node.store.state_writes(), 0);
    assert_eq!(
        node.service.config_state().await.unwrap().state,
        ConfigState::Configuring
    );
}

#[tokio::test]
async fn reverse_transition_is_rejected() {
    let node = node();
    register(&node, None);
    node.service
        .update_config_state(ConfigStateRequest::new("configured"))
        .await
        .unwrap();

    let err = node
        .service
        .update_config_state(ConfigStateRequest::new("configuring"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FaultKind::InvalidInput);
    assert!(matches!(
        err,
        ControlError::UnsupportedTransition {
            from: ConfigState::Configured,
            to: ConfigState::Configuring,
        }
    ));
    assert_eq!(
        err.to_string(),
        "transition from 'configured' to 'configuring' is not supported"
    );
    assert_eq!(node.store.state_writes(), 1);
}

#[tokio::test]
async fn noop_has_no_side_effects() {
    let node = node();
    register(&node, Some("location"));

    let update = node
        .service
        .update_config_state(ConfigStateRequest::new("configuring"))
        .await
        .unwrap();

    assert_eq!(update.configstate.state, ConfigState::Configuring);
    assert!(update.policies_created.is_empty());
    assert_eq!(node.store.state_writes(), 0);
}

#[tokio::test]
async fn retry_after_manual_config_completes() {
    let node = node();
    register(&node, Some("location"));
    publish_location(&node.registry, &[NET, GPS]);
    node.registry.insert_service(service_def(NET, "1.0.0", Vec::new()));
    node.registry.insert_service(service_def(
        GPS,
        "1.0.0",
        vec![UserInput {
            name: "HZN_LAT".to_string(),
            kind: "float".to_string(),
            default_value: None,
        }],
    ));

    let first = node
        .service
        .update_config_state(ConfigStateRequest::new("configured"))
        .await;
    assert!(matches!(first, Err(ControlError::ManualConfigRequired { .. })));
    // NET was created before the pass stopped and is not rolled back
    assert_eq!(node.store.find_services(NET, ORG).unwrap().len(), 1);

    // The node owner configures GPS by hand, then retries.
    node.store.put_service(&existing_service(GPS)).unwrap();

    let update = node
        .service
        .update_config_state(ConfigStateRequest::new("configured"))
        .await
        .unwrap();

    assert_eq!(update.configstate.state, ConfigState::Configured);
    assert!(update.policies_created.is_empty());
    assert_eq!(node.store.list_services().unwrap().len(), 2);
}

#[tokio::test]
async fn unresolvable_workload_is_systemic() {
    let node = node();
    register(&node, Some("location"));
    publish_location(&node.registry, &[GPS]);
    // no GPS definition published

    let err = node
        .service
        .update_config_state(ConfigStateRequest::new("configured"))
        .await
        .unwrap_err();

    assert!(matches!(err, ControlError::WorkloadResolution { .. }));
    assert_eq!(err.kind(), FaultKind::Systemic);
    assert_eq!(node.store.state_writes(), 0);
}

#[tokio::test]
async fn failed_state_write_is_systemic_and_keeps_services() {
    let node = node();
    register(&node, Some("location"));
    publish_location(&node.registry, &[NET]);
    node.registry.insert_service(service_def(NET, "1.0.0", Vec::new()));
    node.store.fail_state_writes();

    let err = node
        .service
        .update_config_state(ConfigStateRequest::new("configured"))
        .await
        .unwrap_err();

    assert!(matches!(err, ControlError::Store(StoreError::Database(_))));
    assert_eq!(err.kind(), FaultKind::Systemic);
    assert_eq!(node.store.state_writes(), 1);

    // the service created before the write is not rolled back
    assert_eq!(node.store.find_services(NET, ORG).unwrap().len(), 1);
    assert_eq!(
        node.service.config_state().await.unwrap().state,
        ConfigState::Configuring
    );
}
