//! Invoking the external synteny tools.
//!
//! Every tool runs synchronously in the current directory; a non-zero exit
//! status is an error.

use anyhow::{anyhow, Context};
use cmd_lib::run_cmd;
use itertools::Itertools;
use std::path::{Path, PathBuf};

/// Default `-abc-tf` transform: scales `-log10(evalue)` by 0.4343 and caps at 200
pub const ABC_TF_DEFAULT: &str = "mul(0.4343), ceil(200)";

/// Fails with the list of paths that are not present.
pub fn require_files<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<()> {
    let missing: Vec<String> = paths
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| !p.is_file())
        .map(|p| p.display().to_string())
        .collect();

    if !missing.is_empty() {
        anyhow::bail!(
            "Required file(s) not found: {}. Please make sure they are in the same folder.",
            missing.join(", ")
        );
    }
    Ok(())
}

/// Resolves an executable.
///
/// An existing file at `name` is used as is, so a tool dropped into the working
/// directory wins. Otherwise `name` is searched in PATH.
pub fn locate(name: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(name);
    if path.is_file() {
        // a bare `mcl` would otherwise be looked up in PATH again when spawned
        return Ok(std::env::current_dir()?.join(path));
    }

    which::which(name).map_err(|_| {
        anyhow!(
            "{} not found in the current directory or PATH. Please install {} first.",
            name,
            name
        )
    })
}

/// One external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Shown in the progress log
    pub info: String,
    pub program: String,
    pub args: Vec<String>,
}

impl Step {
    /// ```
    /// use synpl::libs::runner::Step;
    /// let step = Step {
    ///     info: "Multiple alignment".to_string(),
    ///     program: "./mcscan".to_string(),
    ///     args: vec!["-a".to_string(), "at_vv".to_string()],
    /// };
    /// assert_eq!(step.command_line(), "./mcscan -a at_vv");
    /// ```
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(|s| s.as_str()))
            .join(" ")
    }
}

/// Markov clustering of `<prefix>.blast` into `<prefix>.mcl`
pub fn mcl_step(mcl: &Path, prefix: &str, abc_tf: &str) -> Step {
    Step {
        info: "MCL clustering".to_string(),
        program: mcl.display().to_string(),
        args: vec![
            format!("{}.blast", prefix),
            "--abc".to_string(),
            "--abc-neg-log".to_string(),
            "-abc-tf".to_string(),
            abc_tf.to_string(),
            "-o".to_string(),
            format!("{}.mcl", prefix),
        ],
    }
}

/// Multiple alignment over `<prefix>.*`; `extra` goes before the prefix
pub fn mcscan_step(mcscan: &Path, prefix: &str, extra: &[String]) -> Step {
    let mut args = extra.to_vec();
    args.push(prefix.to_string());

    Step {
        info: "Multiple alignment".to_string(),
        program: mcscan.display().to_string(),
        args,
    }
}

pub fn run(step: &Step) -> anyhow::Result<()> {
    log::info!("{}", step.command_line());
    log::info!("==> {}", step.info);

    let program = step.program.clone();
    let args = step.args.clone();
    run_cmd!(${program} $[args]).with_context(|| format!("{} failed", step.info))?;

    log::debug!("{} finished", step.info);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_require_files() {
        let dir = TempDir::new().unwrap();
        let blast = dir.path().join("at.blast");
        let gff = dir.path().join("at.gff");
        std::fs::write(&blast, "").unwrap();

        let err = require_files(&[&blast, &gff]).unwrap_err().to_string();
        assert!(err.contains("at.gff"));
        assert!(!err.contains("at.blast"));

        std::fs::write(&gff, "").unwrap();
        assert!(require_files(&[&blast, &gff]).is_ok());
    }

    #[test]
    fn test_locate() {
        let dir = TempDir::new().unwrap();
        let tool = dir.path().join("mcl");
        std::fs::write(&tool, "").unwrap();

        let found = locate(tool.to_str().unwrap()).unwrap();
        assert_eq!(found, tool);

        let err = locate("synpl-no-such-tool").unwrap_err().to_string();
        assert!(err.contains("synpl-no-such-tool not found"));
    }

    #[test]
    fn test_mcl_step() {
        let step = mcl_step(Path::new("./mcl"), "at_vv", ABC_TF_DEFAULT);
        assert_eq!(step.info, "MCL clustering");
        assert_eq!(
            step.args,
            vec![
                "at_vv.blast",
                "--abc",
                "--abc-neg-log",
                "-abc-tf",
                "mul(0.4343), ceil(200)",
                "-o",
                "at_vv.mcl"
            ]
        );
    }

    #[test]
    fn test_mcscan_step() {
        let extra = vec!["-a".to_string(), "-e".to_string(), "1e-5".to_string()];
        let step = mcscan_step(Path::new("/opt/bin/mcscan"), "at_vv", &extra);
        assert_eq!(step.command_line(), "/opt/bin/mcscan -a -e 1e-5 at_vv");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_failure() {
        let step = Step {
            info: "Always fails".to_string(),
            program: "false".to_string(),
            args: vec![],
        };
        let err = run(&step).unwrap_err().to_string();
        assert!(err.contains("Always fails failed"));
    }
}
