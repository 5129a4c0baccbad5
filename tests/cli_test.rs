//! Binary behavior: usage errors, credential checks, and failure reporting

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command running in an empty scratch directory with no ambient config.
/// The per-user config directory also resolves inside the scratch directory.
fn bin(name: &str, cwd: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(name).unwrap();
    cmd.current_dir(cwd.path())
        .env("HOME", cwd.path())
        .env("XDG_CONFIG_HOME", cwd.path().join(".config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("DOCRAG_CONFIG")
        .env_remove("DOCRAG_EMBEDDING_MODEL")
        .env_remove("DOCRAG_LLM_MODEL")
        .env("RUST_LOG", "off");
    cmd
}

fn entries(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[test]
fn test_query_without_argument_is_usage_error() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-query", &cwd)
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));
    assert_eq!(entries(&cwd), 0);
}

#[test]
fn test_query_usage_error_precedes_credential_check() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-query", &cwd)
        .arg("   ")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"))
        .stderr(predicate::str::contains("OPENAI_API_KEY").not());
}

#[test]
fn test_query_extra_arguments_are_usage_error() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-query", &cwd)
        .args(["one", "two"])
        .assert()
        .code(1);
}

#[test]
fn test_query_help() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-query", &cwd)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--persist-dir"))
        .stdout(predicate::str::contains("--top-k"))
        .stdout(predicate::str::contains("--show-sources"));
}

#[test]
fn test_query_missing_credential_fails_before_loading_index() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-query", &cwd)
        .args(["What color is the sky?", "--persist-dir", "does-not-exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY is not set"))
        .stderr(predicate::str::contains("No index found").not());
}

#[test]
fn test_query_missing_index() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-query", &cwd)
        .env("OPENAI_API_KEY", "sk-test")
        .arg("What color is the sky?")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No index found"));
}

#[test]
fn test_query_credential_from_dotenv() {
    let cwd = tempfile::tempdir().unwrap();
    std::fs::write(cwd.path().join(".env"), "OPENAI_API_KEY=sk-from-dotenv\n").unwrap();
    // Gets past the credential check, then fails on the missing index
    bin("docrag-query", &cwd)
        .arg("What color is the sky?")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No index found"));
}

#[test]
fn test_index_missing_credential_fails_before_traversal() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-index", &cwd)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY is not set"))
        .stderr(predicate::str::contains("Input directory not found").not());
    assert_eq!(entries(&cwd), 0);
}

#[test]
fn test_index_missing_root() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-index", &cwd)
        .env("OPENAI_API_KEY", "sk-test")
        .args(["--quiet", "--docs", "nowhere"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input directory not found: nowhere"));
    assert!(!cwd.path().join("storage").exists());
}

#[test]
fn test_index_default_root_from_config() {
    let cwd = tempfile::tempdir().unwrap();
    std::fs::write(
        cwd.path().join("docrag.toml"),
        "[index]\nroots = [\"corpus\"]\npersist_dir = \"out\"\n",
    )
    .unwrap();
    bin("docrag-index", &cwd)
        .env("OPENAI_API_KEY", "sk-test")
        .arg("--quiet")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input directory not found: corpus"));
    assert!(!cwd.path().join("out").exists());
}

#[test]
fn test_index_empty_directory() {
    let cwd = tempfile::tempdir().unwrap();
    std::fs::create_dir(cwd.path().join("data")).unwrap();
    bin("docrag-index", &cwd)
        .env("OPENAI_API_KEY", "sk-test")
        .arg("--quiet")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No documents found to index"));
    assert!(!cwd.path().join("storage").exists());
}

#[test]
fn test_index_help() {
    let cwd = tempfile::tempdir().unwrap();
    bin("docrag-index", &cwd)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--docs"))
        .stdout(predicate::str::contains("--embedding-model"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_user_config_resolves_inside_scratch_home() {
    let cwd = tempfile::tempdir().unwrap();
    let user_config = cwd.path().join(".config").join("docrag");
    std::fs::create_dir_all(&user_config).unwrap();
    std::fs::write(
        user_config.join("config.toml"),
        "[index]\nroots = [\"from-user-config\"]\n",
    )
    .unwrap();

    bin("docrag-index", &cwd)
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input directory not found: from-user-config"));
}
