//! Built-in commands driven end to end through the dispatcher

use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use gemtools::{Dispatcher, ExecContext, LocalEngine};

const READS: &str = "@r1\nACGTACGT\n+\nIIIIIIII\n@r2\nAC\n+\nII\n@r3\nACGTAC\n+\nIIIIII\n";

fn gemtools(args: &[&str]) -> (i32, String, String) {
    let dispatcher = Dispatcher::with_builtins(LocalEngine::new()).unwrap();
    let argv: Vec<String> = std::iter::once("gemtools")
        .chain(args.iter().copied())
        .map(String::from)
        .collect();
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let code = dispatcher
        .run(&argv, ExecContext::top_level(), &mut out, &mut err)
        .unwrap();
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn test_prepare_runs_filter_then_count() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("reads.fq");
    std::fs::write(&input, READS).unwrap();
    let input = path_str(&input);

    let (code, out, err) = gemtools(&["prepare", "--input", &input, "--min-length", "6"]);

    assert_eq!(code, 0, "stderr: {}", err);
    assert!(out.contains("2 job(s) completed"));

    let filtered = std::fs::read_to_string(format!("{}.filtered", input)).unwrap();
    assert_eq!(filtered, "@r1\nACGTACGT\n+\nIIIIIIII\n@r3\nACGTAC\n+\nIIIIII\n");
    let counts = std::fs::read_to_string(format!("{}.counts", input)).unwrap();
    assert_eq!(counts, "2\n");
}

#[test]
fn test_prepare_dry_run_lists_both_steps_without_writing() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("reads.fq");
    std::fs::write(&input, READS).unwrap();
    let input = path_str(&input);

    let (code, out, _) = gemtools(&["--dry", "prepare", "--input", &input]);

    assert_eq!(code, 0);
    assert!(out.contains("Jobs (2)"));
    assert!(out.contains("filter"));
    assert!(out.contains("count"));
    assert!(!Path::new(&format!("{}.filtered", input)).exists());
    assert!(!Path::new(&format!("{}.counts", input)).exists());
}

#[test]
fn test_filter_derives_output_name() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("reads.fa");
    std::fs::write(&input, ">a\nACGT\n>b\nA\n").unwrap();
    let input = path_str(&input);

    let (code, _, err) = gemtools(&["filter", "-i", &input, "-m", "2"]);

    assert_eq!(code, 0, "stderr: {}", err);
    let filtered = std::fs::read_to_string(format!("{}.filtered", input)).unwrap();
    assert_eq!(filtered, ">a\nACGT\n");
}

#[test]
fn test_filter_rejects_zero_min_length() {
    let (code, out, err) = gemtools(&["filter", "-i", "reads.fq", "-m", "0"]);

    assert_eq!(code, 1);
    assert!(err.contains("--min-length"));
    assert!(!out.contains("Running"));
}

#[test]
fn test_count_reports_missing_input_file() {
    let temp = TempDir::new().unwrap();
    let missing = path_str(&temp.path().join("missing.fq"));
    let output = path_str(&temp.path().join("counts.txt"));

    let (code, _, err) = gemtools(&["count", "--input", &missing, "--output", &output]);

    assert_eq!(code, 1);
    assert!(err.contains("Unable to open"));
}

#[test]
fn test_show_prints_pipeline_command_lines() {
    let (code, out, _) = gemtools(&["--show", "prepare", "--input", "reads.fq"]);

    assert_eq!(code, 0);
    assert!(out.contains("gemtools filter"));
    assert!(out.contains("gemtools count --input reads.fq.filtered --output reads.fq.counts"));
}
