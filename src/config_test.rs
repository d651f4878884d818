use std::collections::HashMap;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<ConsoleConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    ConsoleConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_when_nothing_is_set() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.state_dir, PathBuf::from(DEFAULT_STATE_DIR));
    assert_eq!(cfg.watchdog_lead(), Duration::from_secs(60));
    assert_eq!(
        cfg.http_timeouts(),
        HttpTimeouts { request: Duration::from_secs(30), connect: Duration::from_secs(10) }
    );
}

#[test]
fn parses_overrides_and_trims_trailing_slash() {
    let cfg = config_from(&[
        ("RENTDESK_API_URL", "https://billing.example.test/api/"),
        ("RENTDESK_STATE_DIR", "/var/lib/rentdesk"),
        ("RENTDESK_WATCHDOG_LEAD_SECS", "120"),
        ("RENTDESK_REQUEST_TIMEOUT_SECS", " 5 "),
        ("RENTDESK_CONNECT_TIMEOUT_SECS", "2"),
    ])
    .unwrap();
    assert_eq!(cfg.api_url, "https://billing.example.test/api");
    assert_eq!(cfg.state_dir, PathBuf::from("/var/lib/rentdesk"));
    assert_eq!(cfg.watchdog_lead_secs, 120);
    assert_eq!(cfg.request_timeout_secs, 5);
    assert_eq!(cfg.connect_timeout_secs, 2);
}

#[test]
fn blank_url_falls_back_to_default() {
    let cfg = config_from(&[("RENTDESK_API_URL", "  ")]).unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
}

#[test]
fn unparseable_number_is_an_error() {
    let err = config_from(&[("RENTDESK_WATCHDOG_LEAD_SECS", "a minute")]).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidNumber { var: "RENTDESK_WATCHDOG_LEAD_SECS", value: "a minute".to_string() }
    );
}

#[test]
fn negative_number_is_an_error() {
    assert!(config_from(&[("RENTDESK_CONNECT_TIMEOUT_SECS", "-1")]).is_err());
}

#[test]
fn cli_overrides_win_over_environment() {
    let cfg = config_from(&[("RENTDESK_API_URL", "http://env/api")])
        .unwrap()
        .with_overrides(Some("http://flag/api/".to_string()), Some(PathBuf::from("/tmp/state")));
    assert_eq!(cfg.api_url, "http://flag/api");
    assert_eq!(cfg.state_dir, PathBuf::from("/tmp/state"));
}

#[test]
fn absent_overrides_keep_environment() {
    let cfg = config_from(&[("RENTDESK_API_URL", "http://env/api")]).unwrap().with_overrides(None, None);
    assert_eq!(cfg.api_url, "http://env/api");
    assert_eq!(cfg.state_dir, PathBuf::from(DEFAULT_STATE_DIR));
}

#[test]
fn from_env_reads_process_environment() {
    unsafe { std::env::set_var("RENTDESK_CONNECT_TIMEOUT_SECS", "3") };
    let cfg = ConsoleConfig::from_env().unwrap();
    assert_eq!(cfg.connect_timeout_secs, 3);
    unsafe { std::env::remove_var("RENTDESK_CONNECT_TIMEOUT_SECS") };
}
