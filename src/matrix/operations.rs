//! Операции над матрицами на стороне хоста

use super::types::{MatrixType, SquareMatrix};
use anyhow::{bail, ensure, Result};
use rand::Rng;

/// Создаёт матрицу заданного типа; для `OnesAndTwos` первая матрица из 1
pub fn initialize_matrix(matrix_type: MatrixType, size: usize) -> Result<SquareMatrix> {
    Ok(initialize_matrices(matrix_type, size)?.0)
}

/// Инициализирует пару матриц заданного типа и размера
pub fn initialize_matrices(
    matrix_type: MatrixType,
    size: usize,
) -> Result<(SquareMatrix, SquareMatrix)> {
    let elements = super::types::element_count(size)?;
    let (a, b) = match matrix_type {
        MatrixType::Identity => {
            return Ok((SquareMatrix::identity(size)?, SquareMatrix::identity(size)?));
        }
        MatrixType::Zeros => (vec![0.0f32; elements], vec![0.0f32; elements]),
        MatrixType::OnesAndTwos => (vec![1.0f32; elements], vec![2.0f32; elements]),
        MatrixType::Random => {
            let mut rng = rand::thread_rng();
            let a: Vec<f32> = (0..elements).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let b: Vec<f32> = (0..elements).map(|_| rng.gen_range(-1.0..1.0)).collect();
            (a, b)
        }
    };
    Ok((SquareMatrix::new(size, a)?, SquareMatrix::new(size, b)?))
}

/// CPU реализация матричного умножения
///
/// Накопление в `f64`, чтобы результат служил эталоном для GPU.
pub fn cpu_matrix_multiply(a: &SquareMatrix, b: &SquareMatrix) -> Result<SquareMatrix> {
    ensure!(
        a.size() == b.size(),
        "matrix sizes differ: {} and {}",
        a.size(),
        b.size()
    );
    let size = a.size();
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut c = vec![0.0f32; size * size];

    for i in 0..size {
        for j in 0..size {
            let mut sum = 0.0f64;
            for k in 0..size {
                sum += a[i * size + k] as f64 * b[k * size + j] as f64;
            }
            c[i * size + j] = sum as f32;
        }
    }

    SquareMatrix::new(size, c)
}

/// Итог сравнения результатов GPU и CPU
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub mismatches: usize,
    pub max_abs_diff: f32,
}

impl Comparison {
    pub fn matches(&self) -> bool {
        self.mismatches == 0
    }
}

/// Сравнивает результаты GPU и CPU
///
/// Элемент совпадает, если `|gpu - cpu| <= tolerance * max(1, |cpu|)`.
pub fn compare_results(gpu: &SquareMatrix, cpu: &SquareMatrix, tolerance: f32) -> Comparison {
    let mut comparison = Comparison {
        mismatches: 0,
        max_abs_diff: 0.0,
    };
    if gpu.size() != cpu.size() {
        comparison.mismatches = gpu.as_slice().len().max(cpu.as_slice().len());
        comparison.max_abs_diff = f32::INFINITY;
        return comparison;
    }

    for (&g, &c) in gpu.as_slice().iter().zip(cpu.as_slice()) {
        let diff = (g - c).abs();
        if !(diff <= tolerance * c.abs().max(1.0)) {
            comparison.mismatches += 1;
        }
        if diff > comparison.max_abs_diff || diff.is_nan() {
            comparison.max_abs_diff = diff;
        }
    }

    comparison
}

/// Сверяет результат GPU с эталонным умножением на CPU
pub fn verify_product(
    a: &SquareMatrix,
    b: &SquareMatrix,
    gpu: &SquareMatrix,
    tolerance: f32,
) -> Result<Comparison> {
    let cpu = cpu_matrix_multiply(a, b)?;
    let comparison = compare_results(gpu, &cpu, tolerance);
    if !comparison.matches() {
        bail!(
            "GPU result does not match CPU reference: {} mismatched element(s), max difference {}",
            comparison.mismatches,
            comparison.max_abs_diff
        );
    }
    Ok(comparison)
}
