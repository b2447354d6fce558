// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use quickcmd::config::{load_and_validate, load_or_default, ConfigFile};
use quickcmd::errors::QuickCmdError;
use quickcmd::exec::{DEFAULT_NO_OUTPUT_NOTICE, MAX_TIMEOUT};
use quickcmd_test_utils::builders::ConfigFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = write_config(
        r#"
[exec]
timeout = "5s"
encoding = "gbk"
shell = "bash"
shell_args = ["-lc"]
no_output_notice = "(nothing)"

[catalog]
path = "cmds.json"

[session]
event_buffer = 16
cancel_superseded = true
strict_variables = true
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.timeout(), Duration::from_secs(5));
    assert_eq!(cfg.catalog_path().to_str(), Some("cmds.json"));

    let exec = cfg.exec_options();
    assert_eq!(exec.shell.program, "bash");
    assert_eq!(exec.shell.args, vec!["-lc"]);
    assert_eq!(exec.encoding.encoding().name(), "GBK");
    assert_eq!(exec.event_buffer, 16);
    assert_eq!(exec.no_output_notice, "(nothing)");

    let session = cfg.session_options();
    assert!(session.cancel_superseded);
    assert!(session.strict_variables);
}

#[test]
fn empty_file_means_defaults() {
    let file = write_config("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.timeout(), Duration::from_secs(30));
    assert_eq!(cfg.catalog_path().to_str(), Some("custom_commands.json"));
    assert_eq!(cfg.exec_options().no_output_notice, DEFAULT_NO_OUTPUT_NOTICE);
    assert!(!cfg.session_options().strict_variables);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_or_default(dir.path().join("QuickCmd.toml")).unwrap();
    assert_eq!(cfg.timeout(), Duration::from_secs(30));
}

#[test]
fn invalid_values_are_config_errors() {
    for contents in [
        "[exec]\ntimeout = \"0s\"",
        "[exec]\ntimeout = \"soon\"",
        "[exec]\ntimeout = \"18446744073709551615s\"",
        "[exec]\ntimeout = \"307445734561825861m\"",
        "[exec]\nshell_args = [\"-c\"]",
        "[catalog]\npath = \"  \"",
        "[session]\nevent_buffer = 0",
    ] {
        let file = write_config(contents);
        match load_and_validate(file.path()) {
            Err(QuickCmdError::ConfigError(_)) => {}
            other => panic!("expected ConfigError for {contents:?}, got {other:?}"),
        }
    }
}

#[test]
fn unusable_encodings_are_parse_errors() {
    for label in ["klingon", "utf-16le", "replacement"] {
        let file = write_config(&format!("[exec]\nencoding = \"{label}\""));
        assert!(
            matches!(load_and_validate(file.path()), Err(QuickCmdError::TomlError(_))),
            "{label} was accepted"
        );
    }
}

#[test]
fn timeout_override_is_bounded() {
    let cfg = ConfigFileBuilder::new().timeout("1m").build();
    assert_eq!(cfg.timeout(), Duration::from_secs(60));

    let cfg = cfg.with_timeout(Duration::from_millis(250)).unwrap();
    assert_eq!(cfg.exec_options().timeout, Duration::from_millis(250));

    assert!(ConfigFile::default().with_timeout(Duration::ZERO).is_err());
    assert!(ConfigFile::default().with_timeout(Duration::MAX).is_err());
    assert!(ConfigFile::default().with_timeout(MAX_TIMEOUT + Duration::from_secs(1)).is_err());
}
