//! Модуль для работы с матрицами
//!
//! Предоставляет:
//! - Типы матриц
//! - Операции над матрицами на CPU
//! - GPU-реализацию: буферы, программа, запуск ядра

mod types;
pub mod buffers;
pub mod dispatch;
pub mod gpu;
pub mod kernels;
pub mod operations;
pub mod program;

pub use gpu::{GpuMatrixMultiplier, GpuProduct};
pub use kernels::{MATRIX_MULTIPLY_KERNEL, MATRIX_MULTIPLY_KERNEL_NAME};
pub use operations::{
    compare_results, cpu_matrix_multiply, initialize_matrices, initialize_matrix, verify_product,
    Comparison,
};
pub use types::{element_count, MatrixType, SquareMatrix};
