//! Adapter for the external `flatter` lattice reduction tool
//!
//! flatter reads a basis as `[[a b c]\n[d e f]]` on stdin (hex entries are
//! accepted) and prints the reduced basis one `[a b c]` row per line.
//! See <https://github.com/keeganryan/flatter>.

use crate::error::{LineqError, Result};
use crate::lattice::LatticeBasis;
use num_bigint::BigInt;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const TOOL: &str = "flatter";
const INSTALL_HINT: &str = "install it from https://github.com/keeganryan/flatter";

/// Options forwarded to the flatter binary; `None` keeps flatter's default
#[derive(Debug, Clone, Default)]
pub struct FlatterOptions {
    pub alpha: Option<f64>,
    /// Target root Hermite factor, roughly a BKZ block size
    pub rhf: Option<f64>,
    pub delta: Option<f64>,
}

impl FlatterOptions {
    fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(alpha) = self.alpha {
            args.extend(["-alpha".to_string(), alpha.to_string()]);
        }
        if let Some(rhf) = self.rhf {
            args.extend(["-rhf".to_string(), rhf.to_string()]);
        }
        if let Some(delta) = self.delta {
            args.extend(["-delta".to_string(), delta.to_string()]);
        }
        args
    }
}

/// Locate an executable `flatter` on `PATH`
pub fn find_flatter() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in(&path)
}

fn find_in(path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path)
        .map(|dir| dir.join(TOOL))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// [`find_flatter`], or `ReducerUnavailable`
pub fn require_flatter() -> Result<PathBuf> {
    find_flatter().ok_or(LineqError::ReducerUnavailable {
        tool: TOOL,
        hint: INSTALL_HINT,
    })
}

/// Reduce `basis` by piping it through flatter
pub fn flatter(basis: &LatticeBasis, options: &FlatterOptions) -> Result<LatticeBasis> {
    let binary = require_flatter()?;

    let input = format_hex(basis);
    let args = options.args();
    log::debug!("running {} {:?} on {}×{} basis", binary.display(), args, basis.n, basis.m);

    let mut child = Command::new(&binary)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(LineqError::ReducerFailed {
            tool: TOOL,
            message: format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    parse_rows(&String::from_utf8_lossy(&output.stdout))
}

/// `[[0x1 -0x2]\n[0x3 0x4]]`
fn format_hex(basis: &LatticeBasis) -> String {
    let rows: Vec<String> = basis
        .rows()
        .map(|row| {
            let entries: Vec<String> = row.iter().map(|x| format!("{:#x}", x)).collect();
            entries.join(" ")
        })
        .collect();
    format!("[[{}]]", rows.join("]\n["))
}

/// Parse flatter's decimal output, one bracketed row per line
fn parse_rows(output: &str) -> Result<LatticeBasis> {
    let mut rows = Vec::new();
    for line in output.lines() {
        let line = line.trim().trim_start_matches('[').trim_end_matches(']');
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<BigInt>().map_err(|e| LineqError::ReducerFailed {
                    tool: TOOL,
                    message: format!("cannot parse '{}': {}", token, e),
                })
            })
            .collect::<Result<Vec<BigInt>>>()?;
        rows.push(row);
    }
    LatticeBasis::new(rows).map_err(|e| LineqError::ReducerFailed {
        tool: TOOL,
        message: format!("malformed output: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hex() {
        let basis = LatticeBasis::from_rows(&[vec![31i64, -31], vec![0, 1]]).unwrap();
        assert_eq!(format_hex(&basis), "[[0x1f -0x1f]\n[0x0 0x1]]");
    }

    #[test]
    fn test_parse_rows() {
        let parsed = parse_rows("[[1 -2 3]\n[4 5 -6]\n]\n").unwrap();
        assert_eq!(parsed, LatticeBasis::from_rows(&[vec![1i64, -2, 3], vec![4, 5, -6]]).unwrap());

        assert!(matches!(
            parse_rows("[[1 x]]"),
            Err(LineqError::ReducerFailed { .. })
        ));
        assert!(parse_rows("[1 2]\n[3]").is_err());
    }

    #[test]
    fn test_options_to_args() {
        let options = FlatterOptions { alpha: None, rhf: Some(1.02), delta: Some(0.99) };
        assert_eq!(options.args(), vec!["-rhf", "1.02", "-delta", "0.99"]);
        assert!(FlatterOptions::default().args().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_lookup_skips_non_executable_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!("lineq-flatter-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let tool = dir.join(TOOL);
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        let path = std::env::join_paths([&dir]).unwrap();

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(find_in(&path), None);

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_in(&path), Some(tool));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        if find_flatter().is_some() {
            return;
        }
        let basis = LatticeBasis::from_rows(&[vec![1i64]]).unwrap();
        assert!(matches!(
            flatter(&basis, &FlatterOptions::default()),
            Err(LineqError::ReducerUnavailable { tool: "flatter", .. })
        ));
    }
}
