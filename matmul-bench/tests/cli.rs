use std::process::Command;

fn bench() -> Command {
    Command::new(env!("CARGO_BIN_EXE_matmul-bench"))
}

#[test]
fn test_misaligned_dimension_exits_1() {
    let output = bench().args(["--m", "33"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("if M, K, N are greater than 32, they must be divisible by 32"),
        "{stderr}"
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_zero_count_exits_1() {
    let output = bench().args(["--samples", "0"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("samples must be at least 1"));
}

#[test]
fn test_list() {
    let output = bench().arg("--list").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 7);
    assert!(lines[0].starts_with("naive"));
    assert!(lines[6].contains("matmul_warp_tile"));
}

#[test]
fn test_list_validates_first() {
    let output = bench().args(["--m", "33", "--list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("must be divisible by 32")
    );
}
