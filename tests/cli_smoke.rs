use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

const SNAPSHOT: &str = r#"{
  "meta": {
    "updated_at": "2024-06-15T23:00:00Z",
    "username": "octo",
    "generated_by": "GitHub Metrics Dashboard"
  },
  "summary": {
    "today": { "commits": 1, "additions": 10, "deletions": 2, "files_changed": 1 },
    "week": { "commits": 4, "additions": 90, "deletions": 12, "files_changed": 5 },
    "month": { "commits": 12, "additions": 340, "deletions": 55, "files_changed": 8 },
    "quarter": { "commits": 20, "additions": 900, "deletions": 100, "files_changed": 30 },
    "year": { "commits": 50, "additions": 4000, "deletions": 700, "files_changed": 80 }
  },
  "repos": {
    "octo/tool": {
      "name": "tool",
      "full_name": "octo/tool",
      "url": "https://github.com/octo/tool",
      "description": "A tool",
      "stars": 3,
      "forks": 1,
      "periods": {
        "today": { "commits": 1, "additions": 10, "deletions": 2, "files_changed": 1 },
        "week": { "commits": 4, "additions": 90, "deletions": 12, "files_changed": 5 },
        "month": { "commits": 12, "additions": 340, "deletions": 55, "files_changed": 8 },
        "quarter": { "commits": 20, "additions": 900, "deletions": 100, "files_changed": 30 },
        "year": { "commits": 50, "additions": 4000, "deletions": 700, "files_changed": 80 }
      }
    }
  },
  "daily": {
    "2024-06-14": { "commits": 2, "additions": 40, "deletions": 4 },
    "2024-06-15": { "commits": 1, "additions": 10, "deletions": 2 }
  },
  "languages": { "Python": 800, "JavaScript": 200 },
  "top_repos": [
    { "name": "octo/tool", "url": "https://github.com/octo/tool", "commits": 50, "additions": 4000, "deletions": 700 }
  ]
}"#;

fn bin(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("commit-pulse").unwrap();
    cmd.current_dir(dir)
        .env_remove("GH_TOKEN")
        .env_remove("GH_USERNAME")
        .env_remove("REPOS_TO_TRACK")
        .env_remove("FLAG_INCOMPLETE_REPOS");
    cmd
}

#[test]
fn render_writes_dashboard_and_summary() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data/metrics.json"), SNAPSHOT).unwrap();

    bin(dir.path()).arg("render").assert().success();

    let html = fs::read_to_string(dir.path().join("docs/index.html")).unwrap();
    assert!(html.contains("<h1>octo</h1>"));
    assert!(html.contains(r#"const allDates = ["2024-06-14","2024-06-15"];"#));
    assert!(html.contains(r#"<span class="lang-percent">80.0%</span>"#));

    let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
    assert!(readme.contains("| Month | 12 | +340 | -55 | 285 |"));
    assert!(readme.contains("| [tool](https://github.com/octo/tool) | 50 | +4.0K | -700 |"));
}

#[test]
fn render_honours_custom_paths() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("snap")).unwrap();
    fs::write(dir.path().join("snap/metrics.json"), SNAPSHOT).unwrap();

    bin(dir.path())
        .args(["--data-dir", "snap", "render", "--docs-dir", "site", "--readme", "SUMMARY.md"])
        .assert()
        .success();

    assert!(dir.path().join("site/index.html").exists());
    assert!(dir.path().join("SUMMARY.md").exists());
}

#[test]
fn render_fails_without_snapshot() {
    let dir = tempdir().unwrap();

    bin(dir.path()).arg("render").assert().failure();

    assert!(!dir.path().join("docs/index.html").exists());
}

#[test]
fn collect_exits_one_without_configuration() {
    let dir = tempdir().unwrap();

    bin(dir.path()).arg("collect").assert().code(1);

    assert!(!dir.path().join("data").exists());
}
