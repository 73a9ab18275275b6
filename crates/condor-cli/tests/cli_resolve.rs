use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests/fixtures")
        .join(name)
}

#[allow(deprecated)]
fn condor_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("condor").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_resolve_prints_scopes() {
    let home = TempDir::new().unwrap();

    condor_cmd(&home)
        .arg("resolve")
        .arg(fixture("conditional-scenario.toml"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "[compile]\n  org.acme:ext-f\n  org.acme:ext-g\n  org.acme:ext-j\n  org.acme:ext-l\n  org.acme:ext-m\n[runtime]\n",
        ))
        .stdout(predicate::str::contains("  org.acme:ext-p\n[capabilities]\n"))
        .stdout(predicate::str::contains("acme.h -> Acme H (org.acme:ext-h)"));
}

#[test]
fn test_resolve_why_prints_activation_path() {
    let home = TempDir::new().unwrap();

    condor_cmd(&home)
        .arg("resolve")
        .arg(fixture("conditional-scenario.toml"))
        .args(["--why", "org.acme:ext-k"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.acme:ext-f (compile, root)"))
        .stdout(predicate::str::contains(
            "    org.acme:ext-h (runtime, enabled by org.acme:ext-g (conditions: org.acme:ext-i, org.acme:ext-j))",
        ))
        .stdout(predicate::str::contains(
            "      org.acme:ext-k (runtime, required by org.acme:ext-h)",
        ));
}

#[test]
fn test_resolve_why_inactive_module() {
    let home = TempDir::new().unwrap();

    condor_cmd(&home)
        .arg("resolve")
        .arg(fixture("conditional-scenario.toml"))
        .args(["--why", "org.acme:ext-zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.acme:ext-zzz is not active."));
}

#[test]
fn test_resolve_lists_exclusions() {
    let home = TempDir::new().unwrap();

    condor_cmd(&home)
        .arg("resolve")
        .arg(fixture("exclusions.toml"))
        .assert()
        .success()
        .stdout(
            "[compile]\n  org.acme:app\n  org.acme:jackson\n  org.acme:rest-reactive\n  org.acme:vertx-http\n\
             [runtime]\n  org.acme:jackson-databind\n  org.acme:rest-reactive-jackson\n\
             [excluded]\n  org.acme:jackson-legacy (by org.acme:rest-reactive-jackson)\n\
             \x20 org.acme:resteasy-common (by org.acme:rest-reactive)\n",
        );
}

#[test]
fn test_resolve_why_excluded_module() {
    let home = TempDir::new().unwrap();

    condor_cmd(&home)
        .arg("resolve")
        .arg(fixture("exclusions.toml"))
        .args(["--why", "org.acme:resteasy-common"])
        .assert()
        .success()
        .stdout("org.acme:resteasy-common is excluded by org.acme:rest-reactive.\n");
}

#[test]
fn test_resolve_capability_conflict_fails() {
    let home = TempDir::new().unwrap();

    condor_cmd(&home)
        .arg("resolve")
        .arg(fixture("capability-conflict.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Capability acme.rest is provided by both",
        ));
}

#[test]
fn test_resolve_duplicate_module_fails() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("dup.toml");
    fs::write(
        &file,
        r#"roots = ["org.acme:a"]

[[module]]
key = "org.acme:a"

[[module]]
key = "org.acme:a"
"#,
    )
    .unwrap();

    condor_cmd(&home)
        .arg("resolve")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Module org.acme:a is declared more than once",
        ));
}

#[test]
fn test_resolve_json_descriptor() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("app.json");
    fs::write(
        &file,
        r#"{
  "roots": ["org.acme:app"],
  "module": [
    { "key": "org.acme:app", "dependencies": ["org.acme:lib"] }
  ]
}"#,
    )
    .unwrap();

    condor_cmd(&home)
        .arg("resolve")
        .arg(&file)
        .assert()
        .success()
        .stdout("[compile]\n  org.acme:app\n  org.acme:lib\n");
}

#[test]
fn test_resolve_missing_file_fails() {
    let home = TempDir::new().unwrap();

    condor_cmd(&home)
        .args(["resolve", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
