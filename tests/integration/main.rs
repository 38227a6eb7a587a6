//! Integration tests for infocache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const TOPOLOGY: &str = r#"
[[interface]]
name = "mlx5_0"
net_interfaces = ["ib0"]
class = "infiniband"
providers = ["ofi+verbs", "ofi+tcp"]

[[interface]]
name = "eth_dev"
net_interfaces = ["eth0", "eth1"]
class = "ether"
providers = ["ofi+tcp"]

[numa]
ib0 = 1
eth0 = 0
eth1 = 1
"#;

    const ATTACH_INFO: &str = r#"{
  "system": "daos_server",
  "service_ranks": [{"rank": 0, "uri": "ofi+tcp://10.0.0.1:31416"}],
  "ms_ranks": [0],
  "client_net_hint": {"provider": "ofi+tcp", "interface": "eth0", "domain": "eth0", "net_dev_class": 1}
}"#;

    /// Isolated environment: a config path that does not exist plus source files
    struct Env {
        dir: TempDir,
    }

    impl Env {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("topology.toml"), TOPOLOGY).unwrap();
            std::fs::write(dir.path().join("attach_info.json"), ATTACH_INFO).unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("infocache");
            cmd.env_remove("INFOCACHE_TOPOLOGY")
                .env_remove("INFOCACHE_ATTACH_INFO")
                .env("INFOCACHE_CONFIG", self.path("agent.toml"));
            cmd
        }

        fn with_sources(&self) -> Command {
            let mut cmd = self.cmd();
            cmd.arg("--topology")
                .arg(self.path("topology.toml"))
                .arg("--attach-info")
                .arg(self.path("attach_info.json"));
            cmd
        }
    }

    fn write_config(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("infocache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("attach info and fabric cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("infocache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("infocache"));
    }

    #[test]
    fn config_path_follows_override() {
        let env = Env::new();
        env.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("agent.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let env = Env::new();
        env.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[agent]"))
            .stdout(predicate::str::contains("system_name = \"daos_server\""));
    }

    #[test]
    fn config_init_writes_file() {
        let env = Env::new();
        env.cmd().args(["config", "init"]).assert().success();
        assert!(env.path("agent.toml").exists());

        env.cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let env = Env::new();
        write_config(&env.path("agent.toml"), "[agent]\ndisable_caching = \"maybe\"\n");

        env.cmd()
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn net_scan_groups_by_numa() {
        let env = Env::new();
        env.with_sources()
            .arg("net-scan")
            .assert()
            .success()
            .stdout(predicate::str::contains("NUMA node 0"))
            .stdout(predicate::str::contains("NUMA node 1"))
            .stdout(predicate::str::contains("ib0"));
    }

    #[test]
    fn net_scan_honors_excluded_interfaces() {
        let env = Env::new();
        write_config(
            &env.path("agent.toml"),
            "[agent]\nexclude_fabric_ifaces = [\"ib0\"]\n",
        );

        env.with_sources()
            .args(["net-scan", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("eth1"))
            .stdout(predicate::str::contains("ib0").not());
    }

    #[test]
    fn select_prefers_requested_numa_node() {
        let env = Env::new();
        env.with_sources()
            .args(["select", "--numa", "1", "--class", "ether", "--provider", "ofi+tcp"])
            .assert()
            .success()
            .stdout(predicate::str::contains("eth1"));
    }

    #[test]
    fn select_falls_back_to_other_node() {
        let env = Env::new();
        env.with_sources()
            .args(["select", "--numa", "0", "--class", "infiniband", "-p", "ofi+verbs", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"ib0\""))
            .stdout(predicate::str::contains("\"domain\": \"mlx5_0\""));
    }

    #[test]
    fn select_unknown_provider_fails() {
        let env = Env::new();
        env.with_sources()
            .args(["select", "--provider", "bad"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no suitable fabric interface"));
    }

    #[test]
    fn select_without_topology_fails() {
        let env = Env::new();
        env.cmd()
            .arg("--attach-info")
            .arg(env.path("attach_info.json"))
            .args(["select", "--provider", "ofi+tcp"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("fabric scanner is not initialized"))
            .stderr(predicate::str::contains("--topology"));
    }

    #[test]
    fn no_sources_fails() {
        let env = Env::new();
        env.cmd()
            .arg("net-scan")
            .assert()
            .failure()
            .stderr(predicate::str::contains("not initialized"));
    }

    #[test]
    fn attach_info_dumps_json() {
        let env = Env::new();
        env.with_sources()
            .arg("attach-info")
            .assert()
            .success()
            .stdout(predicate::str::contains("ofi+tcp://10.0.0.1:31416"))
            .stdout(predicate::str::contains("\"ms_ranks\""));
    }

    #[test]
    fn attach_info_wrong_system_fails() {
        let env = Env::new();
        env.with_sources()
            .args(["attach-info", "--system", "other"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("system name mismatch"));
    }

    #[test]
    fn topology_from_config_file() {
        let env = Env::new();
        write_config(
            &env.path("agent.toml"),
            &format!(
                "[sources]\ntopology_file = {:?}\n",
                env.path("topology.toml").display().to_string()
            ),
        );

        env.cmd()
            .args(["select", "--class", "infiniband", "-p", "ofi+verbs"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ib0"));
    }

    #[test]
    fn unknown_class_rejected() {
        let env = Env::new();
        env.with_sources()
            .args(["select", "--class", "token-ring", "-p", "ofi+tcp"])
            .assert()
            .failure();
    }
}
