use innkeeper::config::ConfigLoader;
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const KEYS: &[&str] = &[
    "INNKEEPER_PROFILE",
    "INNKEEPER_API_BIND_ADDR",
    "INNKEEPER_LOG_LEVEL",
    "INNKEEPER_JWT_SECRET",
    "INNKEEPER_SCHEDULER_TICK_INTERVAL_SECONDS",
    "INNKEEPER_SCHEDULER_WARNING_LEAD_MINUTES",
    "INNKEEPER_SCHEDULER_CHECKOUT_GRACE_SECONDS",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

fn loader_for(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_base_dir(PathBuf::from(dir.path()))
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    let cfg = loader_for(&temp_dir)
        .load()
        .expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:5000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.jwt_expiry_seconds, 3600);
    assert!(cfg.scheduler.enabled);
    assert_eq!(cfg.scheduler.tick_interval_seconds, 60);
    assert_eq!(cfg.scheduler.warning_lead_minutes, 10);
    assert_eq!(cfg.scheduler.checkout_grace_seconds, 0);
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "INNKEEPER_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "INNKEEPER_API_BIND_ADDR=192.168.0.10:5000\nINNKEEPER_SCHEDULER_WARNING_LEAD_MINUTES=15\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "INNKEEPER_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "INNKEEPER_PROFILE=test\nINNKEEPER_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let cfg = loader_for(&temp_dir)
        .load()
        .expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.scheduler.warning_lead_minutes, 15);
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "INNKEEPER_API_BIND_ADDR=127.0.0.1:3000\n");

    unsafe {
        env::set_var("INNKEEPER_API_BIND_ADDR", "0.0.0.0:9090");
    }

    let cfg = loader_for(&temp_dir)
        .load()
        .expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("INNKEEPER_API_BIND_ADDR", "not-an-addr");
    }
    let err = loader_for(&temp_dir)
        .load()
        .expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn production_profile_requires_a_strong_jwt_secret() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("INNKEEPER_PROFILE", "prod");
    }
    let err = loader_for(&temp_dir)
        .load()
        .expect_err("missing secret should fail");
    assert!(format!("{}", err).contains("JWT secret is missing"));

    unsafe {
        env::set_var("INNKEEPER_JWT_SECRET", "short");
    }
    let err = loader_for(&temp_dir)
        .load()
        .expect_err("weak secret should fail");
    assert!(format!("{}", err).contains("at least 32 bytes"));

    unsafe {
        env::set_var(
            "INNKEEPER_JWT_SECRET",
            "0123456789abcdef0123456789abcdef",
        );
    }
    let cfg = loader_for(&temp_dir)
        .load()
        .expect("strong secret is accepted");
    assert_eq!(cfg.profile, "prod");
    assert!(
        !cfg.redacted_json()
            .unwrap()
            .contains("0123456789abcdef0123456789abcdef")
    );

    clear_env();
}

#[test]
fn scheduler_bounds_are_enforced() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    unsafe {
        env::set_var("INNKEEPER_SCHEDULER_TICK_INTERVAL_SECONDS", "5");
    }
    let err = loader_for(&temp_dir)
        .load()
        .expect_err("tick interval below 10s should fail");
    assert!(format!("{}", err).contains("tick interval"));
    clear_env();

    unsafe {
        env::set_var("INNKEEPER_SCHEDULER_CHECKOUT_GRACE_SECONDS", "-1");
    }
    let err = loader_for(&temp_dir)
        .load()
        .expect_err("negative grace should fail");
    assert!(format!("{}", err).contains("checkout grace"));
    clear_env();

    unsafe {
        env::set_var("INNKEEPER_SCHEDULER_WARNING_LEAD_MINUTES", "soon");
    }
    let err = loader_for(&temp_dir)
        .load()
        .expect_err("non-numeric lead should fail");
    assert!(format!("{}", err).contains("SCHEDULER_WARNING_LEAD_MINUTES"));

    clear_env();
}
