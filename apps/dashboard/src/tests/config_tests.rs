use super::{apply_env, apply_file, load_settings, prepare_base_url, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_point_at_local_services() {
    let settings = Settings::default();
    assert_eq!(settings.api_url, "http://localhost:5000");
    assert_eq!(settings.site_url, "http://localhost:3000");
    assert_eq!(settings.api_token, None);
}

#[test]
fn file_values_replace_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
api_url = "https://api.example.com"
api_token = "from-file"
"#,
    )
    .expect("valid toml");

    assert_eq!(settings.api_url, "https://api.example.com");
    assert_eq!(settings.site_url, "http://localhost:3000");
    assert_eq!(settings.api_token.as_deref(), Some("from-file"));
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "api_url = [").is_err());
}

#[test]
fn app_prefixed_env_vars_win_over_public_ones() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        lookup(&[
            ("NEXT_PUBLIC_API_URL", "http://public:5000"),
            ("APP__API_URL", "http://app:5000"),
            ("NEXT_PUBLIC_SITE_URL", "http://site:3000"),
            ("DASHBOARD_API_TOKEN", "  "),
        ]),
    );

    assert_eq!(settings.api_url, "http://app:5000");
    assert_eq!(settings.site_url, "http://site:3000");
    assert_eq!(settings.api_token, None);
}

#[test]
fn flags_override_everything() {
    let settings = Settings {
        api_token: Some("env-token".into()),
        ..Settings::default()
    }
    .with_overrides(Some("http://flag:1".into()), Some(" flag-token ".into()));

    assert_eq!(settings.api_url, "http://flag:1");
    assert_eq!(settings.api_token.as_deref(), Some("flag-token"));
}

#[test]
fn explicit_config_file_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("dashboard_missing_{suffix}.toml"));
    assert!(load_settings(Some(&missing)).is_err());
}

#[test]
fn explicit_config_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("dashboard_config_{suffix}.toml"));
    fs::write(&path, "site_url = \"https://sign.example.com\"\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("load");
    if env::var("NEXT_PUBLIC_SITE_URL").is_err() && env::var("APP__SITE_URL").is_err() {
        assert_eq!(settings.site_url, "https://sign.example.com");
    }

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn prepares_base_urls() {
    assert_eq!(
        prepare_base_url("  https://api.example.com/// ").expect("valid"),
        "https://api.example.com"
    );
    assert_eq!(
        prepare_base_url("http://localhost:5000/backend/").expect("valid"),
        "http://localhost:5000/backend"
    );
    assert!(prepare_base_url("").is_err());
    assert!(prepare_base_url("localhost:5000").is_err());
    assert!(prepare_base_url("ftp://files.example.com").is_err());
}
