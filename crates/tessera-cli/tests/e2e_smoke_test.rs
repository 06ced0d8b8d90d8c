use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use tessera_cli::{Args, PlannerArg, run};

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .tsr files from a directory
fn collect_tsr_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("tsr")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn args_for(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        config: None,
        log_level: "off".to_string(),
        planner: None,
        pretty: false,
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path).expect("Failed to read output");
    serde_json::from_str(&content).expect("Output is not valid JSON")
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let demos = collect_tsr_files(demos_dir());
    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();

    for planner in [PlannerArg::Geometric, PlannerArg::Topological] {
        for demo_path in &demos {
            let output_path = temp_dir.path().join(format!(
                "{}_{planner:?}.json",
                demo_path.file_stem().unwrap().to_string_lossy()
            ));
            let args = Args {
                planner: Some(planner),
                ..args_for(demo_path, &output_path)
            };

            match run(&args) {
                Ok(()) => {
                    let json = read_json(&output_path);
                    assert!(json["nodes"].as_array().is_some_and(|nodes| !nodes.is_empty()));
                }
                Err(e) => failed.push((demo_path.clone(), planner, e)),
            }
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, planner, err) in &failed {
            eprintln!("  - {} ({planner:?}): {}", path.display(), err);
        }
        panic!("{} demo run(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_tsr_files(demos_dir().join("errors"));
    assert!(!error_demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join(format!(
            "error_{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        match run(&args_for(demo_path, &output_path)) {
            Ok(()) => unexpectedly_succeeded.push(demo_path.clone()),
            Err(err) => assert!(
                err.code().is_some_and(|code| code.starts_with('E')),
                "{} failed without a parse code: {err}",
                demo_path.display()
            ),
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_config_file_is_applied() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("pair.tsr");
    let config = temp_dir.path().join("config.toml");
    let output = temp_dir.path().join("pair.json");

    fs::write(&input, "(a) -> (b)\n").unwrap();
    fs::write(&config, "[route]\nplanner = \"topological\"\n\n[output]\npretty = true\n").unwrap();

    let args = Args {
        config: Some(config.to_string_lossy().to_string()),
        ..args_for(&input, &output)
    };
    run(&args).expect("run failed");

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("\n  \"size\""), "output should be indented");
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["links"].as_array().map(Vec::len), Some(1));
}

#[test]
fn e2e_missing_input_is_io_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let args = args_for(
        &temp_dir.path().join("missing.tsr"),
        &temp_dir.path().join("out.json"),
    );

    let err = run(&args).unwrap_err();
    assert!(matches!(err, tessera::TesseraError::Io(_)));
    assert!(err.code().is_none());
}
