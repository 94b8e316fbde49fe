use opencl_matmul::config::DeviceKind;
use opencl_matmul::matrix::program::MatrixProgram;
use opencl_matmul::matrix::{
    compare_results, cpu_matrix_multiply, initialize_matrices, initialize_matrix,
    GpuMatrixMultiplier, MatrixType, SquareMatrix,
};
use opencl_matmul::opencl::{select_device, Context, OpenClApi};
use opencl_matmul::Config;
use std::rc::Rc;

const TOLERANCE: f32 = 1e-4;

fn config(local_size: Option<usize>) -> Config {
    Config {
        device: DeviceKind::All,
        local_size,
        ..Config::default()
    }
}

fn multiplier(local_size: Option<usize>) -> Option<GpuMatrixMultiplier> {
    match GpuMatrixMultiplier::new(&config(local_size)) {
        Ok(multiplier) => Some(multiplier),
        Err(err) => {
            eprintln!("skipping: no OpenCL device ({err:#})");
            None
        }
    }
}

#[test]
fn matches_cpu_reference_on_random_input() {
    let Some(gpu) = multiplier(None) else { return };

    for size in [1, 2, 7, 33] {
        let (a, b) = initialize_matrices(MatrixType::Random, size).unwrap();
        let product = gpu.multiply(&a, &b).unwrap();
        let expected = cpu_matrix_multiply(&a, &b).unwrap();

        let comparison = compare_results(&product.matrix, &expected, TOLERANCE);
        assert!(comparison.matches(), "size {size}: {comparison:?}");
        assert!(product.elapsed.as_secs_f64().is_finite());
    }
}

#[test]
fn identity_and_zero_properties() {
    let Some(gpu) = multiplier(None) else { return };

    let a = initialize_matrix(MatrixType::Random, 9).unwrap();
    let identity = SquareMatrix::identity(9).unwrap();
    let zeros = SquareMatrix::zeros(9).unwrap();

    let same = gpu.multiply(&a, &identity).unwrap().matrix;
    assert!(compare_results(&same, &a, TOLERANCE).matches());

    let zero = gpu.multiply(&a, &zeros).unwrap().matrix;
    assert!(zero.as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn scalar_and_example_products() {
    let Some(gpu) = multiplier(None) else { return };

    let a = SquareMatrix::new(1, vec![3.0]).unwrap();
    let b = SquareMatrix::new(1, vec![-2.0]).unwrap();
    assert_eq!(gpu.multiply(&a, &b).unwrap().matrix.as_slice(), &[-6.0]);

    let a = SquareMatrix::new(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let b = SquareMatrix::new(2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
    assert_eq!(
        gpu.multiply(&a, &b).unwrap().matrix.as_slice(),
        &[19.0, 22.0, 43.0, 50.0]
    );
}

#[test]
fn padded_geometry_ignores_out_of_range_work_items() {
    let Some(gpu) = multiplier(Some(4)) else { return };

    let (a, b) = initialize_matrices(MatrixType::OnesAndTwos, 5).unwrap();
    let product = gpu.multiply(&a, &b).unwrap();
    assert!(product.matrix.as_slice().iter().all(|&v| v == 10.0));
}

#[test]
fn mismatched_sizes_are_rejected_before_dispatch() {
    let Some(gpu) = multiplier(None) else { return };

    let a = SquareMatrix::zeros(2).unwrap();
    let b = SquareMatrix::zeros(3).unwrap();
    assert!(gpu.multiply(&a, &b).is_err());
}

#[test]
fn compile_errors_are_reported() {
    let Ok(api) = OpenClApi::load(None) else {
        eprintln!("skipping: no OpenCL runtime");
        return;
    };
    let api = Rc::new(api);
    let Ok(device) = select_device(&api, 0, DeviceKind::All) else {
        eprintln!("skipping: no OpenCL device");
        return;
    };

    let context = Context::create(&api, device.id).unwrap();
    let source = "__kernel void matrix_multiply(__global float* a) { this is not C }";
    let err = MatrixProgram::build_source(&context, device.id, source, "matrix_multiply")
        .err()
        .expect("build must fail");
    assert!(format!("{err:#}").contains("Failed to build program"));
}

#[test]
fn missing_runtime_is_a_setup_error() {
    let config = Config {
        opencl_library: Some("/nonexistent/libOpenCL.so".into()),
        ..Config::default()
    };
    let err = GpuMatrixMultiplier::new(&config).err().expect("setup must fail");
    assert!(format!("{err:#}").contains("Failed to find a compatible OpenCL device"));
}
