// Object identity
pub const POD_API_VERSION: &str = "v1";
pub const POD_KIND: &str = "Pod";
pub const REPLICASET_KIND: &str = "ReplicaSet";
pub const APPS_GROUP: &str = "apps";
pub const APPS_VERSION: &str = "v1";

// Well-known labels, annotations, and taints
pub const APP_KUBERNETES_IO_NAME_KEY: &str = "app.kubernetes.io/name";
pub const POD_TEMPLATE_HASH_LABEL_KEY: &str = "pod-template-hash";
pub const PROMETHEUS_PORT_ANNOTATION_KEY: &str = "prometheus.io/port";
pub const PROMETHEUS_SCRAPE_ANNOTATION_KEY: &str = "prometheus.io/scrape";
pub const NOT_READY_TAINT_KEY: &str = "node.kubernetes.io/not-ready";
pub const UNREACHABLE_TAINT_KEY: &str = "node.kubernetes.io/unreachable";

// Service account plumbing that the API server injects into every pod
pub const KUBE_SVC_ACCOUNT_VOLUME_NAME_PREFIX: &str = "kube-api-access";
pub const KUBE_SVC_ACCOUNT_MOUNT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
pub const KUBE_ROOT_CA_CONFIGMAP: &str = "kube-root-ca.crt";
pub const SVC_ACCOUNT_TOKEN_EXPIRATION_SECONDS: i64 = 3607;
pub const MIN_SVC_ACCOUNT_TOKEN_EXPIRATION_SECONDS: i64 = 600;
pub const PROJECTED_VOLUME_DEFAULT_MODE: i32 = 0o644;

// Scenario defaults
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_SEED: &str = "kubefix";
pub const DEFAULT_APP_NAME: &str = "podinfo";
pub const DEFAULT_IMAGE: &str = "ghcr.io/stefanprodan/podinfo:6.1.6";
pub const DEFAULT_CONTAINER_COUNT: usize = 1;
pub const MAX_CONTAINER_COUNT: usize = 64;
pub const MAX_APP_NAME_LEN: usize = 40;
pub const DEFAULT_SCHEDULER_NAME: &str = "default-scheduler";
pub const DEFAULT_SERVICE_ACCOUNT: &str = "default";
pub const DEFAULT_NODE_NAME: &str = "k3d-k3s-default-server-0";
pub const DEFAULT_IMAGE_PULL_SECRET: &str = "private-registry";
pub const DEFAULT_TERMINATION_GRACE_PERIOD_SECONDS: i64 = 30;
pub const DEFAULT_TOLERATION_SECONDS: i64 = 300;
pub const DEFAULT_TERMINATION_MESSAGE_PATH: &str = "/dev/termination-log";
pub const DATA_VOLUME_NAME: &str = "data";
pub const DATA_MOUNT_PATH: &str = "/data";

// podinfo's listeners; additional containers shift these by PORT_STRIDE so that no two containers
// in the pod ever share a port
pub const HTTP_PORT: i32 = 9898;
pub const METRICS_PORT: i32 = 9797;
pub const GRPC_PORT: i32 = 9999;
pub const PORT_STRIDE: i32 = 100;

// Timing; all fixture timestamps are offsets (in seconds) from a fixed reference instant,
// 2023-03-07T07:48:13Z
pub const REFERENCE_TS: i64 = 1_678_175_293;
pub const CONTAINER_START_DELAY_SECONDS: i64 = 1;
pub const READINESS_DELAY_SECONDS: i64 = 2;
pub const RESTART_BACKOFF_SECONDS: i64 = 10;
pub const CRASH_AFTER_SECONDS: i64 = 5;
pub const RUN_DURATION_SECONDS: i64 = 60;
pub const OBSERVABILITY_LOST_AFTER_SECONDS: i64 = 240;

// Container runtime
pub const CONTAINER_RUNTIME_SCHEME: &str = "containerd://";
pub const FAILED_EXIT_CODE: i32 = 1;
