//! `chartseal version`: build information.

use std::fmt::Write as _;

const UNKNOWN: &str = "unknown";

/// Build details; git commit and build date come from the build environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_date: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
}

impl VersionInfo {
    pub fn current(name: &'static str) -> Self {
        VersionInfo {
            name,
            version: env!("CARGO_PKG_VERSION"),
            git_commit: option_env!("CHARTSEAL_GIT_COMMIT").unwrap_or(UNKNOWN),
            build_date: option_env!("CHARTSEAL_BUILD_DATE").unwrap_or(UNKNOWN),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.name);
        let _ = writeln!(out, "---------");
        let _ = writeln!(out, "Version: {}", self.version);
        let _ = writeln!(out, "Git Commit: {}", self.git_commit);
        let _ = writeln!(out, "Build Date: {}", self.build_date);
        let _ = writeln!(out, "OS/Arch: {}/{}", self.os, self.arch);
        out
    }
}

pub fn cmd_version(name: &'static str) {
    print!("{}", VersionInfo::current(name).render());
}
