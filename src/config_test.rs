#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_lookup_gives_defaults() {
    let cfg = EngineConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, EngineConfig::default());
    assert_eq!(cfg.modifier, ModifierKey::Alt);
    assert_eq!(cfg.debounce(), Duration::from_millis(DEBOUNCE_MS));
    assert_eq!(cfg.confirmation(), Duration::from_millis(2000));
    assert_eq!(cfg.max_frame_depth, 10);
    assert_eq!(cfg.large_subtree_limit, 150);
    assert_eq!(cfg.cursor_size, 20.0);
}

#[test]
fn overrides_are_parsed() {
    let cfg = EngineConfig::from_lookup(lookup(&[
        ("POINTSHOOT_MODIFIER", "meta"),
        ("POINTSHOOT_DEBOUNCE_MS", " 16 "),
        ("POINTSHOOT_MAX_FRAME_DEPTH", "4"),
        ("POINTSHOOT_CURSOR_SIZE", "12.5"),
        ("POINTSHOOT_DOWNLOAD_TIMEOUT_SECS", "5"),
    ]))
    .unwrap();
    assert_eq!(cfg.modifier, ModifierKey::Meta);
    assert_eq!(cfg.debounce_ms, 16);
    assert_eq!(cfg.max_frame_depth, 4);
    assert_eq!(cfg.cursor_size, 12.5);
    assert_eq!(cfg.timeouts, DownloadTimeouts { request_secs: 5, connect_secs: CONNECT_TIMEOUT_SECS });
}

#[test]
fn unparseable_numbers_fall_back() {
    let cfg = EngineConfig::from_lookup(lookup(&[("POINTSHOOT_CONFIRMATION_MS", "soon")])).unwrap();
    assert_eq!(cfg.confirmation_ms, CONFIRMATION_MS);
}

#[test]
fn unknown_modifier_is_an_error() {
    let err = EngineConfig::from_lookup(lookup(&[("POINTSHOOT_MODIFIER", "hyper")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref var, .. } if var == "POINTSHOOT_MODIFIER"));
}

#[test]
fn from_env_without_overrides_matches_defaults() {
    // No test in this crate sets POINTSHOOT_* variables.
    let cfg = EngineConfig::from_env().unwrap();
    assert_eq!(cfg.large_subtree_limit, LARGE_SUBTREE_LIMIT);
}
