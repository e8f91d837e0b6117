//! Checks that the unit test tree mirrors the source tree

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    const SRC_DIR: &str = "src";
    const UNIT_DIR: &str = "tests/unit";

    // Entry points and module organization files don't require separate test files
    fn is_exempt(relative_path: &str) -> bool {
        relative_path == "main.rs" || relative_path == "lib.rs" || relative_path.ends_with("mod.rs")
    }

    fn collect_relative_paths(dir: &Path, base: &Path) -> Result<HashSet<String>, io::Error> {
        let mut paths = HashSet::new();

        if !dir.is_dir() {
            return Ok(paths);
        }

        for entry_result in fs::read_dir(dir)? {
            let path = entry_result?.path();
            let relative_path = path
                .strip_prefix(base)
                .map_err(io::Error::other)?
                .to_string_lossy()
                .replace('\\', "/");

            if path.is_dir() {
                paths.extend(collect_relative_paths(&path, base)?);
                paths.insert(relative_path);
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                paths.insert(relative_path);
            }
        }

        Ok(paths)
    }

    fn load_trees() -> (HashSet<String>, HashSet<String>) {
        let src_dir = Path::new(SRC_DIR);
        let unit_dir = Path::new(UNIT_DIR);

        let src_paths = collect_relative_paths(src_dir, src_dir).unwrap_or_else(|error| {
            assert!(src_dir.exists(), "Failed to read src directory: {error}");
            HashSet::new()
        });
        let unit_paths = collect_relative_paths(unit_dir, unit_dir).unwrap_or_default();

        (src_paths, unit_paths)
    }

    // Tests every source module has a unit test counterpart
    // Verified by deleting tests/unit/spatial/tiles.rs
    #[test]
    fn test_all_src_files_have_unit_tests() {
        let (src_paths, unit_paths) = load_trees();

        let mut missing: Vec<&String> = src_paths
            .iter()
            .filter(|path| !is_exempt(path) && !unit_paths.contains(*path))
            .collect();
        missing.sort();

        assert!(
            missing.is_empty(),
            "The following src files/directories are missing unit test counterparts:\n{}",
            missing
                .iter()
                .map(|path| format!("  - {SRC_DIR}/{path} -> {UNIT_DIR}/{path}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    // Tests no unit test file outlives its source module
    // Verified by adding an orphaned tests/unit/spatial/extra.rs
    #[test]
    fn test_all_unit_tests_have_src_counterparts() {
        let (src_paths, unit_paths) = load_trees();

        let mut orphaned: Vec<&String> = unit_paths
            .iter()
            .filter(|path| !path.ends_with("mod.rs") && !src_paths.contains(*path))
            .collect();
        orphaned.sort();

        assert!(
            orphaned.is_empty(),
            "The following unit test files/directories have no corresponding src files:\n{}",
            orphaned
                .iter()
                .map(|path| format!("  - {UNIT_DIR}/{path} -> {SRC_DIR}/{path} (missing)"))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    fn find_files_without_tests(dir: &Path, found: &mut Vec<String>) -> Result<(), io::Error> {
        for entry_result in fs::read_dir(dir)? {
            let path = entry_result?.path();

            if path.is_dir() {
                find_files_without_tests(&path, found)?;
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
                continue;
            }
            // Module organization files only declare submodules
            if path.file_name().and_then(|name| name.to_str()) == Some("mod.rs") {
                continue;
            }

            if !fs::read_to_string(&path)?.contains("#[test]") {
                found.push(format!("  - {}", path.display()));
            }
        }

        Ok(())
    }

    // Tests every test file contributes at least one test
    // Verified by emptying tests/unit/io/progress.rs
    #[test]
    fn test_all_test_files_contain_tests() {
        let tests_dir = Path::new("tests");
        let mut files_without_tests = Vec::new();

        if let Err(error) = find_files_without_tests(tests_dir, &mut files_without_tests) {
            assert!(
                tests_dir.exists(),
                "Failed to scan tests directory: {error}"
            );
        }

        files_without_tests.sort();
        assert!(
            files_without_tests.is_empty(),
            "The following test files don't contain any #[test] functions:\n{}",
            files_without_tests.join("\n")
        );
    }
}
