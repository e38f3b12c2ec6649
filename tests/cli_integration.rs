/// Command-line tests driving the tracealign binary
use assert_cmd::Command;
use predicates::prelude::*;
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracealign::bio::abi::build_abif;

fn tracealign_cmd() -> Command {
    Command::cargo_bin("tracealign").unwrap()
}

const REPORT: &str = "\
Query= A

 Score = 150 bits (81)
 Expect = 1e-10
 Identities = 95/100, 95%
 Gaps = 2/100, 2%
 Strand = Plus/Plus
";

#[test]
fn test_help_lists_subcommands() {
    tracealign_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("parse"));
}

#[test]
fn test_config_prints_defaults() {
    tracealign_cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[remote]"))
        .stdout(predicate::str::contains("poll_interval_secs = 10"))
        .stdout(predicate::str::contains("trim_leading = 20"));
}

#[test]
fn test_config_writes_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tracealign.toml");

    tracealign_cmd()
        .arg("config")
        .arg("--output")
        .arg(&path)
        .assert()
        .success();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("initial_delay_secs = 30"));
}

#[test]
fn test_parse_writes_csv_summary() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("A_blast_results.txt");
    let csv = temp.path().join("summary.csv");
    fs::write(&report, REPORT).unwrap();

    tracealign_cmd()
        .arg("parse")
        .arg(&report)
        .arg("--output")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("1e-10"));

    let written = fs::read_to_string(&csv).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("Query File,Score,Expect,Identities,Gaps,Strand"));
    assert_eq!(
        lines.next(),
        Some("A_blast_results.txt,150,1e-10,95/100,2/100,Plus/Plus")
    );
}

#[test]
fn test_parse_missing_report_fails() {
    let temp = TempDir::new().unwrap();

    tracealign_cmd()
        .arg("parse")
        .arg(temp.path().join("absent.txt"))
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Failed to read report"));
}

#[test]
fn test_convert_trims_traces_to_fasta() {
    let temp = TempDir::new().unwrap();
    let traces = temp.path().join("traces");
    let out = temp.path().join("fasta");
    fs::create_dir_all(&traces).unwrap();

    let bases = b"NNNNNNNNNNNNNNNNNNNNACGTACGTAC";
    fs::write(traces.join("A.ab1"), build_abif(&[(b"PBAS", 2, &bases[..])])).unwrap();
    fs::write(traces.join("notes.txt"), "ignored").unwrap();

    tracealign_cmd()
        .arg("convert")
        .arg("--traces")
        .arg(&traces)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let fasta = fs::read_to_string(out.join("A.fasta")).unwrap();
    assert_eq!(fasta, ">A\nACGTACGTAC\n");
    assert!(!out.join("notes.fasta").exists());
}

#[test]
fn test_convert_without_traces_fails() {
    let temp = TempDir::new().unwrap();

    tracealign_cmd()
        .arg("convert")
        .arg("--traces")
        .arg(temp.path())
        .arg("--out")
        .arg(temp.path().join("fasta"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No readable .ab1 trace files"));
}

/// Scratch layout for `run --backend local` with stand-in BLAST+ executables
#[cfg(unix)]
struct LocalRun {
    temp: TempDir,
    config: PathBuf,
}

#[cfg(unix)]
impl LocalRun {
    /// `makeblastdb` exits with `db_status`; `blastn` writes `REPORT` for
    /// every query except B, for which it writes nothing.
    fn new(db_status: i32, extra_config: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let makeblastdb = write_script(
            root,
            "makeblastdb",
            &format!("#!/bin/sh\necho 'makeblastdb: bad input' >&2\nexit {}\n", db_status),
        );
        let blastn = write_script(
            root,
            "blastn",
            &format!(
                r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -query) query="$2" ;;
    -out) out="$2" ;;
  esac
  shift
done
case "$query" in
  */B.fasta) exit 0 ;;
esac
cat > "$out" <<'EOF'
{}EOF
"#,
                REPORT
            ),
        );

        let config = root.join("tracealign.toml");
        fs::write(
            &config,
            format!(
                "[local]\nmakeblastdb = \"{}\"\nblastn = \"{}\"\n{}",
                makeblastdb.display(),
                blastn.display(),
                extra_config
            ),
        )
        .unwrap();

        let traces = root.join("traces");
        fs::create_dir_all(&traces).unwrap();
        for id in ["A", "B"] {
            let bases = b"NNNNNNNNNNNNNNNNNNNNACGTACGTACGTACGT";
            fs::write(traces.join(format!("{}.ab1", id)), build_abif(&[(b"PBAS", 2, &bases[..])])).unwrap();
        }
        fs::write(root.join("reference.txt"), "ACGTACGTACGTACGTACGTACGTACGT\n").unwrap();

        Self { temp, config }
    }

    fn workspace(&self) -> PathBuf {
        self.temp.path().join("ws")
    }

    fn command(&self) -> Command {
        let root = self.temp.path();
        let mut cmd = tracealign_cmd();
        cmd.arg("run")
            .arg("--traces")
            .arg(root.join("traces"))
            .arg("--reference")
            .arg(root.join("reference.txt"))
            .arg("--backend")
            .arg("local")
            .arg("--workspace")
            .arg(self.workspace())
            .arg("--config")
            .arg(&self.config);
        cmd
    }
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
fn archive_entries(path: &Path) -> Vec<String> {
    let mut archive = tar::Archive::new(GzDecoder::new(fs::File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().display().to_string())
        .collect()
}

#[cfg(unix)]
#[test]
fn test_run_local_writes_reports_summary_and_archive() {
    let run = LocalRun::new(0, "");

    run.command()
        .assert()
        .success()
        .stderr(predicate::str::contains("No BLAST output found for B.fasta"));

    let results = run.workspace().join("BLAST_Results");
    assert!(run.workspace().join("FASTA_Files").join("A.fasta").exists());
    assert!(run.workspace().join("FASTA_Files").join("B.fasta").exists());
    assert!(run.workspace().join("reference.fasta").exists());

    let saved = fs::read_to_string(results.join("A_blast_results.txt")).unwrap();
    assert!(saved.contains("Score = 150 bits"));
    assert!(!results.join("B_blast_results.txt").exists());

    let summary = fs::read_to_string(results.join("BLAST_Summary.csv")).unwrap();
    assert_eq!(
        summary,
        "Query File,Score,Expect,Identities,Gaps,Strand\nA.fasta,150,1e-10,95/100,2/100,Plus/Plus\n"
    );

    assert_eq!(
        archive_entries(&results.join("BLAST_Reports.tar.gz")),
        vec!["A_blast_results.txt".to_string()]
    );
}

#[cfg(unix)]
#[test]
fn test_run_local_database_failure_exits_5() {
    let run = LocalRun::new(1, "");

    run.command()
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("BLAST database build failed"));

    assert!(!run
        .workspace()
        .join("BLAST_Results")
        .join("BLAST_Summary.csv")
        .exists());
}

#[cfg(unix)]
#[test]
fn test_run_explicit_archive_overrides_config() {
    let run = LocalRun::new(0, "\n[output]\narchive = false\n");
    let archive = run.temp.path().join("reports.tar.gz");

    run.command().arg("--archive").arg(&archive).assert().success();

    assert_eq!(archive_entries(&archive), vec!["A_blast_results.txt".to_string()]);
    assert!(!run
        .workspace()
        .join("BLAST_Results")
        .join("BLAST_Reports.tar.gz")
        .exists());
}

#[cfg(unix)]
#[test]
fn test_run_config_archive_off_writes_no_archive() {
    let run = LocalRun::new(0, "\n[output]\narchive = false\n");

    run.command().assert().success();

    let results = run.workspace().join("BLAST_Results");
    assert!(results.join("BLAST_Summary.csv").exists());
    assert!(!results.join("BLAST_Reports.tar.gz").exists());
}

#[test]
fn test_run_missing_reference_exits_3() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("traces")).unwrap();

    tracealign_cmd()
        .arg("run")
        .arg("--traces")
        .arg(temp.path().join("traces"))
        .arg("--reference")
        .arg(temp.path().join("absent.fasta"))
        .arg("--workspace")
        .arg(temp.path().join("ws"))
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Failed to read reference"));
}
