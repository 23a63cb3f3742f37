//! Output-vs-dependencies freshness check.

use std::path::{Path, PathBuf};

use crate::debug;

use super::get_mtime;

/// Check whether `output` is still fresh against its dependency list.
///
/// Fresh requires the output's mtime to be **strictly** newer than every
/// dependency's: equal timestamps count as stale, since coarse filesystem
/// clocks can hide an edit inside one tick. A missing output, a missing
/// dependency, or any unreadable mtime also counts as stale.
pub fn is_fresh(output: &Path, deps: &[PathBuf]) -> bool {
    let Some(output_time) = get_mtime(output) else {
        debug!("fresh"; "{}: output missing", output.display());
        return false;
    };

    for dep in deps {
        match get_mtime(dep) {
            Some(dep_time) if output_time > dep_time => {}
            Some(_) => {
                debug!("fresh"; "{}: dep {} is newer", output.display(), dep.display());
                return false;
            }
            None => {
                debug!("fresh"; "{}: dep {} unreadable", output.display(), dep.display());
                return false;
            }
        }
    }

    debug!("fresh"; "{}: fresh (checked {} deps)", output.display(), deps.len());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};

    fn set_mtime(path: &Path, time: SystemTime) {
        fs::OpenOptions::new()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        output: PathBuf,
        dep: PathBuf,
    }

    /// Output written now, dependency backdated one minute.
    fn fresh_fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("app.js");
        let dep = dir.path().join("app.bundle");
        fs::write(&output, "code").unwrap();
        fs::write(&dep, "source").unwrap();
        set_mtime(&dep, SystemTime::now() - Duration::from_secs(60));
        Fixture {
            _dir: dir,
            output,
            dep,
        }
    }

    #[test]
    fn newer_output_is_fresh() {
        let fx = fresh_fixture();
        assert!(is_fresh(&fx.output, &[fx.dep.clone()]));
    }

    #[test]
    fn missing_output_is_stale() {
        let fx = fresh_fixture();
        fs::remove_file(&fx.output).unwrap();
        assert!(!is_fresh(&fx.output, &[fx.dep.clone()]));
    }

    #[test]
    fn touched_dependency_is_stale() {
        let fx = fresh_fixture();
        set_mtime(&fx.dep, SystemTime::now() + Duration::from_secs(60));
        assert!(!is_fresh(&fx.output, &[fx.dep.clone()]));
    }

    #[test]
    fn equal_timestamps_are_stale() {
        let fx = fresh_fixture();
        let time = SystemTime::now();
        set_mtime(&fx.output, time);
        set_mtime(&fx.dep, time);
        assert!(!is_fresh(&fx.output, &[fx.dep.clone()]));
    }

    #[test]
    fn removed_dependency_is_stale() {
        let fx = fresh_fixture();
        fs::remove_file(&fx.dep).unwrap();
        assert!(!is_fresh(&fx.output, &[fx.dep.clone()]));
    }

    #[test]
    fn one_stale_dep_among_fresh_ones() {
        let fx = fresh_fixture();
        let other = fx.output.parent().unwrap().join("util.bundle");
        fs::write(&other, "x").unwrap();
        set_mtime(&other, SystemTime::now() + Duration::from_secs(60));

        assert!(!is_fresh(&fx.output, &[fx.dep.clone(), other]));
    }

    #[test]
    fn empty_dependency_list_only_needs_output() {
        let fx = fresh_fixture();
        assert!(is_fresh(&fx.output, &[]));
    }
}
