use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAMPLE: &str = "I am Sam. Sam I am. I do not like this Sam I am.\n";

/// run `generate` against a sample file, returning the table path
fn make_table(temp_dir: &tempfile::TempDir,sample: &str) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let in_path = temp_dir.path().join("sample.txt");
    std::fs::write(&in_path,sample)?;
    let table_path = temp_dir.path().join("sample.hfe");
    let mut cmd = Command::cargo_bin("hfenc")?;
    cmd.arg("generate")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&table_path)
        .arg("-n").arg("sample")
        .assert()
        .success();
    Ok(table_path)
}

#[test]
fn generate_compress_expand() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let table_path = make_table(&temp_dir,SAMPLE)?;

    let in_path = temp_dir.path().join("sample.txt");
    let cmp_path = temp_dir.path().join("sample.cmp");
    let out_path = temp_dir.path().join("sample.out");

    let mut cmd = Command::cargo_bin("hfenc")?;
    cmd.arg("compress")
        .arg("-e").arg(&table_path)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();

    let mut cmd = Command::cargo_bin("hfenc")?;
    cmd.arg("expand")
        .arg("-e").arg(&table_path)
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();

    match (std::fs::read(&in_path),std::fs::read(&out_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with original")
    }
    Ok(())
}

#[test]
fn compressed_is_smaller() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let sample = SAMPLE.repeat(20);
    let table_path = make_table(&temp_dir,&sample)?;
    let in_path = temp_dir.path().join("sample.txt");
    let cmp_path = temp_dir.path().join("sample.cmp");
    let mut cmd = Command::cargo_bin("hfenc")?;
    cmd.arg("compress")
        .arg("-e").arg(&table_path)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    let original = std::fs::metadata(&in_path)?.len();
    let compressed = std::fs::metadata(&cmp_path)?.len();
    assert!(compressed < original);
    Ok(())
}

#[test]
fn rejects_bad_table_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("sample.txt");
    std::fs::write(&in_path,SAMPLE)?;
    let table_path = temp_dir.path().join("junk.hfe");
    std::fs::write(&table_path,"this is not a code table")?;
    let cmp_path = temp_dir.path().join("sample.cmp");
    let mut cmd = Command::cargo_bin("hfenc")?;
    cmd.arg("compress")
        .arg("-e").arg(&table_path)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .failure()
        .code(6)
        .stderr(predicate::str::contains("format"));
    Ok(())
}

#[test]
fn rejects_missing_table_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("sample.txt");
    std::fs::write(&in_path,SAMPLE)?;
    let cmp_path = temp_dir.path().join("sample.cmp");
    let mut cmd = Command::cargo_bin("hfenc")?;
    cmd.arg("compress")
        .arg("-e").arg(temp_dir.path().join("no_such.hfe"))
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .failure()
        .code(8);
    Ok(())
}

#[test]
fn rejects_stream_without_footer() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let table_path = make_table(&temp_dir,SAMPLE)?;
    let short_path = temp_dir.path().join("short.cmp");
    std::fs::write(&short_path,[0x91u8])?;
    let out_path = temp_dir.path().join("short.out");
    let mut cmd = Command::cargo_bin("hfenc")?;
    cmd.arg("expand")
        .arg("-e").arg(&table_path)
        .arg("-i").arg(&short_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("malformed"));
    Ok(())
}
