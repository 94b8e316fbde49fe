use opencl_matmul::config::DeviceKind;
use opencl_matmul::matrix::GpuMatrixMultiplier;
use opencl_matmul::Config;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_binary(input: &str, env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_matrix_multiply"));
    command
        .env_remove("MATMUL_LOCAL_SIZE")
        .env_remove("MATMUL_VERIFY")
        .env_remove("MATMUL_OPENCL_LIBRARY")
        .env_remove("MATMUL_PLATFORM")
        .env("MATMUL_DEVICE", "all")
        .env("MATMUL_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env {
        command.env(key, value);
    }

    let mut child = command.spawn().expect("failed to spawn matrix_multiply");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for matrix_multiply")
}

fn device_available() -> bool {
    let config = Config {
        device: DeviceKind::All,
        ..Config::default()
    };
    match GpuMatrixMultiplier::new(&config) {
        Ok(_) => true,
        Err(err) => {
            eprintln!("skipping: no OpenCL device ({err:#})");
            false
        }
    }
}

fn assert_failed_without_result(output: &Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.lines().any(|line| line.starts_with("Error: ")), "stderr: {stderr}");
    assert!(!stdout.contains("Result Matrix C:"), "stdout: {stdout}");
    assert!(!stdout.contains("Execution time"), "stdout: {stdout}");
}

#[test]
fn missing_opencl_runtime_exits_with_error() {
    let output = run_binary(
        "2\n1 2 3 4\n5 6 7 8\n",
        &[("MATMUL_OPENCL_LIBRARY", "/nonexistent/libOpenCL.so.1")],
    );
    assert_failed_without_result(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("compatible OpenCL device"), "stderr: {stderr}");
}

#[test]
fn unknown_platform_index_exits_with_error() {
    let output = run_binary("1\n2\n3\n", &[("MATMUL_PLATFORM", "4096")]);
    assert_failed_without_result(&output);
}

#[test]
fn invalid_configuration_exits_with_error() {
    let output = run_binary("1\n2\n3\n", &[("MATMUL_DEVICE", "fpga")]);
    assert_failed_without_result(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MATMUL_DEVICE"), "stderr: {stderr}");
}

#[test]
fn truncated_input_exits_with_error() {
    let output = run_binary("2\n1 2 3 4\n5\n", &[]);
    assert_failed_without_result(&output);
}

#[test]
fn prints_prompts_product_and_time() {
    if !device_available() {
        return;
    }

    let output = run_binary("2\n1 2\n3 4\n5 6\n7 8\n", &[("MATMUL_VERIFY", "1")]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    assert!(stdout.starts_with("Enter the size of the matrices: "));
    assert!(stdout.contains("Enter elements for matrix A:\n"));
    assert!(stdout.contains("Enter elements for matrix B:\n"));

    let lines: Vec<&str> = stdout.lines().collect();
    let result = lines
        .iter()
        .position(|line| *line == "Result Matrix C:")
        .expect("result header");
    assert_eq!(lines[result + 1], "19 22");
    assert_eq!(lines[result + 2], "43 50");

    let time_line = lines[result + 3];
    let millis: f64 = time_line
        .strip_prefix("Execution time: ")
        .and_then(|rest| rest.strip_suffix(" ms"))
        .expect("execution time line")
        .parse()
        .expect("numeric execution time");
    assert!(millis.is_finite() && millis >= 0.0);
}

#[test]
fn failed_verification_prints_no_result() {
    if !device_available() {
        return;
    }

    // 1e8 + 1 - 1e8 теряет единицу в f32, а эталон на f64 её сохраняет
    let output = run_binary(
        "3\n1e8 1 -1e8 0 0 0 0 0 0\n1 1 1 1 1 1 1 1 1\n",
        &[("MATMUL_VERIFY", "1")],
    );
    assert_failed_without_result(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not match CPU reference"), "stderr: {stderr}");
}

#[test]
fn padded_launch_gives_same_result() {
    if !device_available() {
        return;
    }

    let output = run_binary(
        "3\n1 0 0 0 1 0 0 0 1\n1 2 3 4 5 6 7 8 9\n",
        &[("MATMUL_LOCAL_SIZE", "2")],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Result Matrix C:\n1 2 3\n4 5 6\n7 8 9\n"), "stdout: {stdout}");
}
