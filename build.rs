fn main() {
    println!("cargo:rerun-if-env-changed=TASKBOARD_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");

    // Release builds set TASKBOARD_VERSION; local builds fall back to the git hash.
    if let Ok(version) = std::env::var("TASKBOARD_VERSION") {
        println!("cargo:rustc-env=TASKBOARD_VERSION={version}");
        return;
    }

    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .unwrap_or_default()
        .trim()
        .to_string();

    let version = if hash.is_empty() {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        format!("{}-{hash}", env!("CARGO_PKG_VERSION"))
    };
    println!("cargo:rustc-env=TASKBOARD_VERSION={version}");
}
