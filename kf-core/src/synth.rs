use tracing::*;

use crate::errors::*;
use crate::ids::SeedIds;
use crate::lifecycle::{
    self,
    Observation,
    RuntimeIds,
    Timeline,
};
use crate::macros::klabel;
use crate::prelude::*;

const TEMPLATE_HASH_LEN: usize = 10;
const NAME_SUFFIX_LEN: usize = 5;
const VOLUME_SUFFIX_LEN: usize = 5;
const UI_COLOR: &str = "#34577c";

// Build a complete pod fixture from a scenario descriptor.  The pod is modelled on a podinfo
// Deployment replica: metadata, containers, volumes, and tolerations look the way the API server
// and kubelet would have left them, and the status is derived from the requested phase.  Every
// identifier comes from the seed, so the same descriptor always yields the same fixture.
pub fn synthesize(descriptor: &ScenarioDescriptor) -> ValidationResult<PodFixture> {
    let scenario = descriptor.resolve()?;
    let ids = SeedIds::new(&scenario.seed);
    debug!("synthesizing pod fixture from {scenario:?}");

    let metadata = build_metadata(&scenario, &ids)?;
    let spec = build_spec(&scenario, &ids)?;
    let status = observe(scenario.phase, &metadata, &spec, None, scenario.restart_count);

    let fixture = PodFixture::new(metadata, spec, status)?;
    info!(
        "synthesized {} pod {} with {} container(s)",
        fixture.phase(),
        fixture.namespaced_name(),
        fixture.spec.containers.len()
    );
    Ok(fixture)
}

// Advance a fixture to a later phase of its lifecycle.  The spec and identity of the pod are
// untouched; the status is re-derived for the new phase on the same timeline, conditions whose
// value didn't change keep their original transition times, and the resourceVersion moves
// forward like it would on a real update.
pub fn transition(fixture: &PodFixture, next: PodPhase) -> ValidationResult<PodFixture> {
    let current = fixture.phase();
    check!(
        current.can_transition_to(next),
        "status.phase",
        "cannot transition from phase={current} to phase={next}"
    );
    if matches!(next, PodPhase::Succeeded | PodPhase::Failed) {
        check!(
            fixture.spec.restart_policy != RestartPolicy::Always,
            "spec.restartPolicy",
            "restartPolicy=Always incompatible with phase={next}"
        );
    }

    let mut metadata = fixture.metadata.clone();
    let out_of_range = || {
        ValidationError::new("metadata.resourceVersion", format!("{:?} is out of range", metadata.resource_version))
    };
    let version: u64 = metadata.resource_version.parse().map_err(|_| out_of_range())?;
    let next_version = version.checked_add(1).ok_or_else(out_of_range)?;
    metadata.resource_version = next_version.to_string();

    let restart_count = fixture.status.max_restart_count();
    let mut status = observe(next, &metadata, &fixture.spec, Some(&fixture.status), restart_count);
    for cond in status.conditions.iter_mut() {
        if let Some(prev) = fixture.status.conditions.iter().find(|c| c.type_ == cond.type_)
            && prev.status == cond.status
        {
            cond.last_transition_time = prev.last_transition_time.clone();
        }
    }

    let next_fixture = PodFixture::new(metadata, fixture.spec.clone(), status)?;
    info!("transitioned pod {} from {current} to {next}", next_fixture.namespaced_name());
    Ok(next_fixture)
}

fn build_metadata(scenario: &ResolvedScenario, ids: &SeedIds) -> ValidationResult<ObjectMeta> {
    let app = &scenario.app_name;
    let suffix = ids.safe_string("name-suffix", NAME_SUFFIX_LEN);

    let (generate_name, labels, owner_references) = if scenario.with_owner_reference {
        let hash = ids.safe_string("pod-template-hash", TEMPLATE_HASH_LEN);
        let rs_name = format!("{app}-{hash}");
        let owner = OwnerReference::controller(&GVK::replica_set(), &rs_name, &ids.uid("replicaset"))
            .within("metadata.ownerReferences[0]")?;
        (
            format!("{rs_name}-"),
            klabel!(APP_KUBERNETES_IO_NAME_KEY => app, POD_TEMPLATE_HASH_LABEL_KEY => hash),
            vec![owner],
        )
    } else {
        (format!("{app}-"), klabel!(APP_KUBERNETES_IO_NAME_KEY => app), vec![])
    };

    Ok(ObjectMeta {
        name: format!("{generate_name}{suffix}"),
        generate_name: Some(generate_name),
        namespace: scenario.namespace.clone(),
        labels,
        annotations: klabel!(
            PROMETHEUS_PORT_ANNOTATION_KEY => HTTP_PORT,
            PROMETHEUS_SCRAPE_ANNOTATION_KEY => true,
        ),
        owner_references,
        // etcd revisions on a live cluster are five-ish digits
        resource_version: (10_000 + ids.number("resource-version") % 90_000).to_string(),
        uid: ids.uid("pod"),
        creation_timestamp: lifecycle::timestamp(REFERENCE_TS),
    })
}

fn build_container(scenario: &ResolvedScenario, index: usize, api_volume: &str) -> ValidationResult<Container> {
    let app = &scenario.app_name;
    let name = if index == 0 { app.clone() } else { format!("{app}-{index}") };
    let offset = PORT_STRIDE * index as i32;
    let (http, metrics, grpc) = (HTTP_PORT + offset, METRICS_PORT + offset, GRPC_PORT + offset);

    let probe = |endpoint: &str| {
        let target = format!("localhost:{http}/{endpoint}");
        Probe {
            initial_delay_seconds: 1,
            timeout_seconds: 5,
            ..Probe::exec(&["podcli", "check", "http", &target])
        }
    };

    Container {
        command: vec![
            "./podinfo".into(),
            format!("--port={http}"),
            format!("--cert-path={DATA_MOUNT_PATH}/cert"),
            format!("--port-metrics={metrics}"),
            format!("--grpc-port={grpc}"),
            format!("--grpc-service-name={app}"),
            "--level=info".into(),
            "--random-delay=false".into(),
            "--random-error=false".into(),
        ],
        env: vec![EnvVar::new("PODINFO_UI_COLOR", UI_COLOR)],
        image_pull_policy: Some(ImagePullPolicy::IfNotPresent),
        ports: vec![
            ContainerPort::new("http", http as i64, Protocol::Tcp)?,
            ContainerPort::new("http-metrics", metrics as i64, Protocol::Tcp)?,
            ContainerPort::new("grpc", grpc as i64, Protocol::Tcp)?,
        ],
        resources: ResourceRequirements {
            requests: [(RESOURCE_CPU, "1m"), (RESOURCE_MEMORY, "16Mi")]
                .into_iter()
                .map(|(res, q)| (res.to_string(), Quantity(q.into())))
                .collect(),
            ..Default::default()
        },
        liveness_probe: Some(probe("healthz")),
        readiness_probe: Some(probe("readyz")),
        termination_message_path: Some(DEFAULT_TERMINATION_MESSAGE_PATH.into()),
        termination_message_policy: Some(TerminationMessagePolicy::File),
        volume_mounts: vec![
            VolumeMount::new(DATA_VOLUME_NAME, DATA_MOUNT_PATH, false)?,
            VolumeMount::new(api_volume, KUBE_SVC_ACCOUNT_MOUNT_PATH, true)?,
        ],
        ..Container::new(&name, &scenario.image.to_string())?
    }
    .validated()
}

// The projected volume the ServiceAccount admission controller injects: a bound token, the
// cluster CA bundle, and the pod's namespace
fn service_account_volume(name: &str) -> ValidationResult<Volume> {
    let sources = vec![
        VolumeProjection::ServiceAccountToken(ServiceAccountTokenProjection {
            expiration_seconds: Some(SVC_ACCOUNT_TOKEN_EXPIRATION_SECONDS),
            path: "token".into(),
        }),
        VolumeProjection::ConfigMap(ConfigMapProjection {
            name: KUBE_ROOT_CA_CONFIGMAP.into(),
            items: vec![KeyToPath { key: "ca.crt".into(), path: "ca.crt".into() }],
        }),
        VolumeProjection::DownwardApi(DownwardApiProjection {
            items: vec![DownwardApiVolumeFile {
                field_ref: ObjectFieldSelector {
                    api_version: Some(POD_API_VERSION.into()),
                    field_path: "metadata.namespace".into(),
                },
                path: "namespace".into(),
            }],
        }),
    ];
    Volume::new(
        name,
        VolumeSource::Projected(ProjectedVolumeSource {
            default_mode: Some(PROJECTED_VOLUME_DEFAULT_MODE),
            sources,
        }),
    )
}

fn build_spec(scenario: &ResolvedScenario, ids: &SeedIds) -> ValidationResult<PodSpec> {
    let api_volume = format!(
        "{KUBE_SVC_ACCOUNT_VOLUME_NAME_PREFIX}-{}",
        ids.safe_string("service-account-volume", VOLUME_SUFFIX_LEN)
    );

    let containers = (0..scenario.container_count)
        .map(|i| build_container(scenario, i, &api_volume).within(&format!("spec.containers[{i}]")))
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(PodSpec {
        containers,
        volumes: vec![Volume::empty_dir(DATA_VOLUME_NAME)?, service_account_volume(&api_volume)?],
        tolerations: vec![
            Toleration::evict_after(NOT_READY_TAINT_KEY, DEFAULT_TOLERATION_SECONDS)?,
            Toleration::evict_after(UNREACHABLE_TAINT_KEY, DEFAULT_TOLERATION_SECONDS)?,
        ],
        scheduler_name: DEFAULT_SCHEDULER_NAME.into(),
        restart_policy: scenario.restart_policy,
        service_account_name: DEFAULT_SERVICE_ACCOUNT.into(),
        service_account: Some(DEFAULT_SERVICE_ACCOUNT.into()),
        dns_policy: DnsPolicy::ClusterFirst,
        image_pull_secrets: vec![LocalObjectReference { name: DEFAULT_IMAGE_PULL_SECRET.into() }],
        termination_grace_period_seconds: DEFAULT_TERMINATION_GRACE_PERIOD_SECONDS,
        node_name: Some(DEFAULT_NODE_NAME.into()),
        enable_service_links: Some(true),
        preemption_policy: Some(PreemptionPolicy::PreemptLowerPriority),
        priority: Some(0),
    })
}

fn strip_runtime_scheme(id: &str) -> String {
    id.strip_prefix(CONTAINER_RUNTIME_SCHEME).unwrap_or(id).into()
}

// Work out what the kubelet would report for this pod in the given phase.  Runtime identifiers and
// addresses come from the pod's uid, so that a fixture and its transitions agree on them; when
// transitioning, anything the previous status already reported is carried over unchanged.
fn observe(
    phase: PodPhase,
    metadata: &ObjectMeta,
    spec: &PodSpec,
    previous: Option<&PodStatus>,
    restart_count: i32,
) -> PodStatus {
    let ids = SeedIds::new(&metadata.uid);

    let runtime_ids: Vec<_> = spec
        .containers
        .iter()
        .map(|c| {
            let prev = previous.and_then(|st| st.container_status(&c.name));
            let current_id = prev
                .filter(|cs| !matches!(cs.state, ContainerState::Waiting(_)))
                .and_then(|cs| cs.container_id.as_deref())
                .map(strip_runtime_scheme);
            let image_id = prev.map(|cs| cs.image_id.clone()).filter(|id| !id.is_empty());

            RuntimeIds {
                container_id: current_id.unwrap_or_else(|| ids.hex(&format!("container/{}", c.name))),
                previous_container_id: ids.hex(&format!("container/{}/previous", c.name)),
                image_id: image_id.unwrap_or_else(|| match c.image_ref() {
                    Ok(image) => image.with_digest(&ids.hex(&format!("image/{}", c.image))),
                    Err(_) => c.image.clone(),
                }),
            }
        })
        .collect();

    let host_ip = previous
        .and_then(|st| st.host_ip.clone())
        .unwrap_or_else(|| format!("172.19.0.{}", 2 + ids.number("host-ip") % 253));
    let pod_ip = previous.and_then(|st| st.pod_ip.clone()).unwrap_or_else(|| {
        let n = ids.number("pod-ip");
        format!("10.42.{}.{}", n % 256, 2 + (n >> 8) % 252)
    });

    let timeline = Timeline::new(metadata.creation_timestamp.0.timestamp(), restart_count);
    lifecycle::derive_status(
        phase,
        &Observation {
            containers: &spec.containers,
            runtime_ids: &runtime_ids,
            restart_count,
            host_ip: &host_ip,
            pod_ip: &pod_ip,
            timeline,
        },
    )
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
mod tests;
