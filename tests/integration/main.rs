//! Integration tests for shellcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A throwaway config with state and storage inside a temp dir
    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path().display().to_string().replace('\\', "/");
            let config = format!(
                r#"[general]
state_dir = "{root}/state"

[cache]
storage_dir = "{root}/caches"

[network]
origin = "http://127.0.0.1:9"
timeout_secs = 2
"#
            );
            std::fs::write(dir.path().join("config.toml"), config).unwrap();
            Self { dir }
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("shellcache");
            cmd.arg("--config")
                .arg(self.config_path())
                .env("SHELLCACHE_PLAIN", "1")
                .env_remove("RUST_LOG");
            cmd
        }

        /// Pretend an earlier `install` activated version `v1`
        fn with_active_v1(self) -> Self {
            let state = self.dir.path().join("state");
            std::fs::create_dir_all(&state).unwrap();
            std::fs::write(
                state.join("registration.json"),
                r#"{
  "active": {
    "version": "hmp-v1",
    "cache_version": "v1",
    "state": "activated",
    "since": "2026-01-01T00:00:00Z"
  },
  "waiting": null,
  "updated_at": null
}"#,
            )
            .unwrap();
            self
        }
    }

    fn shellcache() -> Command {
        cargo_bin_cmd!("shellcache")
    }

    #[test]
    fn help_displays() {
        shellcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache manager"));
    }

    #[test]
    fn version_displays() {
        shellcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("shellcache"));
    }

    #[test]
    fn config_path_honors_flag() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("namespace = \"hmp\""));
    }

    #[test]
    fn config_set_then_show() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "set", "cache.version", "v2"])
            .assert()
            .success();
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("version = \"v2\""));
    }

    #[test]
    fn config_init_force_repairs_broken_file() {
        let sandbox = Sandbox::new();
        std::fs::write(sandbox.config_path(), "this is [not toml").unwrap();

        sandbox
            .cmd()
            .args(["status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));

        sandbox
            .cmd()
            .args(["config", "init", "--force"])
            .assert()
            .success();
        sandbox.cmd().args(["config", "show"]).assert().success();
    }

    #[test]
    fn cache_list_empty() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No caches found"));
    }

    #[test]
    fn cache_show_missing() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["cache", "show", "hmp-static-v1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache not found"));
    }

    #[test]
    fn status_runs() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Registration"))
            .stdout(predicate::str::contains("hmp-static-v1"));
    }

    #[test]
    fn get_version_without_worker_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["message", "get-version"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No active worker"));
    }

    #[test]
    fn get_version_reports_active_version() {
        let sandbox = Sandbox::new().with_active_v1();
        for _ in 0..2 {
            sandbox
                .cmd()
                .args(["message", "get-version"])
                .assert()
                .success()
                .stdout(predicate::str::diff("{\"version\":\"hmp-v1\"}\n"));
        }
    }

    #[test]
    fn clear_cache_runs_without_prompt_when_non_interactive() {
        let sandbox = Sandbox::new().with_active_v1();
        std::fs::create_dir_all(sandbox.dir.path().join("caches/hmp-static-v1")).unwrap();

        sandbox
            .cmd()
            .args(["message", "clear-cache"])
            .assert()
            .success()
            .stdout(predicate::str::diff("{\"success\":true}\n"));
        assert!(!sandbox.dir.path().join("caches/hmp-static-v1").exists());
    }

    #[test]
    fn clear_cache_with_yes_flag() {
        let sandbox = Sandbox::new().with_active_v1();
        std::fs::create_dir_all(sandbox.dir.path().join("caches/hmp-dynamic-v1")).unwrap();

        sandbox
            .cmd()
            .args(["message", "clear-cache", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("{\"success\":true}"));
        assert!(!sandbox.dir.path().join("caches/hmp-dynamic-v1").exists());
    }

    #[test]
    fn activate_without_waiting_worker() {
        let sandbox = Sandbox::new().with_active_v1();
        sandbox
            .cmd()
            .arg("activate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No worker is waiting"));
    }

    #[test]
    fn push_shows_notification() {
        let sandbox = Sandbox::new().with_active_v1();
        sandbox
            .cmd()
            .args(["push", r#"{"title":"Call sheet","url":"/schedule"}"#, "--click"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Call sheet"))
            .stdout(predicate::str::contains("http://127.0.0.1:9/schedule"))
            .stdout(predicate::str::contains("Opened window"));
    }

    #[test]
    fn push_without_payload_shows_nothing() {
        let sandbox = Sandbox::new().with_active_v1();
        sandbox
            .cmd()
            .arg("push")
            .assert()
            .success()
            .stdout(predicate::str::contains("no notification"));
    }

    #[test]
    fn install_fails_when_origin_unreachable() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Install failed"));
    }
}

mod offline_scenarios {
    use async_trait::async_trait;
    use shellcache::cache::{CacheKey, CacheStorage, DiskStorage};
    use shellcache::config::Config;
    use shellcache::http::{Fetcher, Request, Response};
    use shellcache::worker::{
        CacheWorker, ControlMessage, ControlReply, HeadlessClients, Registration, WorkerSettings,
    };
    use shellcache::{ShellCacheError, ShellCacheResult};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    const ORIGIN: &str = "https://hmp.example";

    /// Serves `origin:<url>` for every URL while online
    #[derive(Default)]
    struct Network {
        offline: AtomicBool,
        hang: AtomicBool,
    }

    #[async_trait]
    impl Fetcher for Network {
        async fn fetch(&self, request: &Request) -> ShellCacheResult<Response> {
            if self.hang.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.offline.load(Ordering::SeqCst) {
                return Err(ShellCacheError::network(&request.url, "offline"));
            }
            Ok(Response::new(200, format!("origin:{}", request.url))
                .with_header("Content-Type", "text/plain"))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    struct World {
        _temp: TempDir,
        storage: Arc<DiskStorage>,
        network: Arc<Network>,
    }

    impl World {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            Self {
                storage: Arc::new(DiskStorage::new(temp.path().join("caches"))),
                network: Arc::new(Network::default()),
                _temp: temp,
            }
        }

        fn config(&self, namespace: &str, version: &str) -> Config {
            let mut config = Config::default();
            config.network.origin = ORIGIN.to_string();
            config.cache.namespace = namespace.to_string();
            config.cache.version = version.to_string();
            config
        }

        fn worker(&self, config: &Config) -> CacheWorker {
            CacheWorker::new(
                WorkerSettings::from_config(config).unwrap(),
                self.storage.clone(),
                self.network.clone(),
                Arc::new(HeadlessClients::new()),
            )
        }

        async fn installed(&self, config: &Config) -> Registration {
            let mut registration = Registration::new(self.network.clone());
            registration.install(self.worker(config)).await.unwrap();
            registration
        }

        fn go_offline(&self) {
            self.network.offline.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn install_stores_every_manifest_entry() {
        let world = World::new();
        let config = world.config("hmp", "v1");
        world.installed(&config).await;

        let keys = world.storage.keys("hmp-static-v1").await.unwrap();
        let expected = config.manifest.local.len() + config.manifest.external.len();
        assert_eq!(keys.len(), expected);
        let shell = CacheKey::from_url(&format!("{ORIGIN}/index.html")).unwrap();
        assert!(keys.contains(&shell));
    }

    #[tokio::test]
    async fn activation_keeps_only_current_pair() {
        let world = World::new();
        for name in ["old-static-v0", "old-dynamic-v0", "static-v1", "dynamic-v1"] {
            world.storage.open(name).await.unwrap();
        }

        world.installed(&world.config("", "v1")).await;

        assert_eq!(
            world.storage.names().await.unwrap(),
            vec!["dynamic-v1", "static-v1"]
        );
    }

    #[tokio::test]
    async fn offline_navigation_is_served_the_shell() {
        let world = World::new();
        let registration = world.installed(&world.config("hmp", "v1")).await;
        world.go_offline();

        let response = registration
            .handle_fetch(&Request::navigate(format!("{ORIGIN}/characters/7/looks")))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.text(), format!("origin:{ORIGIN}/index.html"));
    }

    #[tokio::test]
    async fn offline_without_shell_gets_503_json() {
        let world = World::new();
        let registration = world.installed(&world.config("hmp", "v1")).await;
        world.storage.delete("hmp-static-v1").await.unwrap();
        world.go_offline();

        let response = registration
            .handle_fetch(&Request::navigate(format!("{ORIGIN}/characters")))
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.status_text, "Service Unavailable");
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(
            response.text(),
            r#"{"error":"offline","message":"You are currently offline. Please check your connection."}"#
        );
    }

    #[tokio::test]
    async fn network_first_data_survives_going_offline() {
        let world = World::new();
        let registration = world.installed(&world.config("hmp", "v1")).await;
        let url = format!("{ORIGIN}/api/continuity?scene=12");

        let live = registration.handle_fetch(&Request::get(&url)).await.unwrap();
        world.go_offline();
        let cached = registration.handle_fetch(&Request::get(&url)).await.unwrap();

        assert_eq!(live, cached);
        let key = CacheKey::from_url(&url).unwrap();
        assert!(world.storage.get("hmp-dynamic-v1", &key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cached_static_asset_never_waits_on_network() {
        let world = World::new();
        let registration = world.installed(&world.config("hmp", "v1")).await;
        world.network.hang.store(true, Ordering::SeqCst);

        let response = tokio::time::timeout(
            Duration::from_millis(500),
            registration.handle_fetch(&Request::get(format!("{ORIGIN}/js/app.js"))),
        )
        .await
        .expect("cache-first must answer from cache")
        .unwrap();

        assert_eq!(response.text(), format!("origin:{ORIGIN}/js/app.js"));
    }

    #[tokio::test]
    async fn version_is_stable_and_follows_upgrades() {
        let world = World::new();
        let mut registration = world.installed(&world.config("hmp", "v1")).await;

        for _ in 0..3 {
            assert_eq!(
                registration.post_message(ControlMessage::GetVersion).await.unwrap(),
                ControlReply::Version {
                    version: "hmp-v1".to_string()
                }
            );
        }

        registration
            .install(world.worker(&world.config("hmp", "v2")))
            .await
            .unwrap();
        assert_eq!(
            registration.post_message(ControlMessage::GetVersion).await.unwrap(),
            ControlReply::Version {
                version: "hmp-v2".to_string()
            }
        );
        assert_eq!(world.storage.names().await.unwrap(), vec!["hmp-static-v2"]);
    }
}
