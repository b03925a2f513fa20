//! Build script for ispw-deploy
//! Stamps the commit and build time reported by `--version`

use chrono::Utc;
use std::process::Command;

/// Commit the action is built from. Builds on a runner get `GITHUB_SHA`;
/// local builds ask git.
fn commit_hash() -> Option<String> {
    if let Ok(sha) = std::env::var("GITHUB_SHA") {
        let sha = sha.trim();
        if !sha.is_empty() {
            return Some(sha.chars().take(7).collect());
        }
    }

    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    let git_hash = commit_hash().unwrap_or_else(|| "unknown".to_string());
    let build_time = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
