// tests/config_load.rs
use catalog_announcer::config::{AnnouncerConfig, ENV_CONFIG_PATH, ENV_DATA_DIR, ENV_WEBHOOK_URL};
use std::{env, fs, path::PathBuf};

#[test]
fn json_and_toml_files_load() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("announcer.toml");
    fs::write(
        &p_toml,
        r#"
webhook_url = "https://discord.test/api/webhooks/1/a"
message_delay_secs = 5
ledger_cap = 40
"#,
    )
    .unwrap();
    let t = AnnouncerConfig::load_from(&p_toml).unwrap();
    assert_eq!(t.message_delay_secs, 5);
    assert_eq!(t.ledger_cap, 40);
    assert_eq!(t.cooldown_secs, 600);

    let p_json = dir.path().join("announcer.json");
    fs::write(&p_json, r#"{"webhook_url":"https://discord.test/b","search":{"limit":60}}"#).unwrap();
    let j = AnnouncerConfig::load_from(&p_json).unwrap();
    assert_eq!(j.search.limit, 60);
    assert_eq!(j.search.sort_type, 3);

    let p_bad = dir.path().join("broken.toml");
    fs::write(&p_bad, "ledger_cap = \"lots\"").unwrap();
    assert!(AnnouncerConfig::load_from(&p_bad).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks_then_overrides() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_WEBHOOK_URL);
    env::remove_var(ENV_DATA_DIR);

    // 1) Nothing anywhere -> defaults
    let d = AnnouncerConfig::load_default().unwrap();
    assert!(d.webhook_url.is_empty());
    assert_eq!(d.ledger_cap, 150);

    // 2) Fallback TOML in ./config/
    fs::create_dir_all("config").unwrap();
    fs::write("config/announcer.toml", "cooldown_secs = 120\n").unwrap();
    assert_eq!(AnnouncerConfig::load_default().unwrap().cooldown_secs, 120);

    // 3) Env path wins
    let p_env = tmp.path().join("custom.json");
    fs::write(&p_env, r#"{"cooldown_secs": 30}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(AnnouncerConfig::load_default().unwrap().cooldown_secs, 30);

    // 4) Env overrides on top of the file
    env::set_var(ENV_WEBHOOK_URL, "https://discord.test/env");
    env::set_var(ENV_DATA_DIR, "/var/lib/announcer");
    let o = AnnouncerConfig::load_default().unwrap();
    assert_eq!(o.webhook_url, "https://discord.test/env");
    assert_eq!(o.data_dir, PathBuf::from("/var/lib/announcer"));
    assert!(o.validate().is_ok());

    // 5) Env path to nothing is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(AnnouncerConfig::load_default().is_err());

    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_WEBHOOK_URL);
    env::remove_var(ENV_DATA_DIR);
    env::set_current_dir(&old).unwrap();
}
