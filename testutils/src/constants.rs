pub const TEST_NAMESPACE: &str = "test-ns";
pub const TEST_SEED: &str = "test-seed";
pub const TEST_APP_NAME: &str = "cool-name-podinfo";
pub const TEST_RESTART_COUNT: i64 = 3;

// A Pod as returned by the API server for a podinfo replica in a k3d cluster
pub const PODINFO_JSON: &str = include_str!("../data/podinfo.json");
pub const PODINFO_NAMESPACE: &str = "helm-releasename";
pub const PODINFO_NAME: &str = "cool-name-podinfo-66bbff7cf4-fwhl2";
pub const PODINFO_OWNER_UID: &str = "41d30484-6ccd-462b-b96a-e166095e3681";
pub const PODINFO_CONTAINER_ID: &str =
    "containerd://81b20dafbf2498a52c8ab46fa1e95ce25c06271684e590a377ee4ac9fd2a85ee";
