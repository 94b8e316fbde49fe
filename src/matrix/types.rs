//! Типы матриц и связанные структуры

use anyhow::{bail, Result};

/// Способ заполнения матриц для проверок
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatrixType {
    /// Единичная матрица
    Identity,
    /// Нулевая матрица
    Zeros,
    /// Матрицы заполненные 1 и 2
    OnesAndTwos,
    /// Случайно заполненные матрицы
    Random,
}

/// Квадратная матрица N×N в порядке строк
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    size: usize,
    data: Vec<f32>,
}

impl SquareMatrix {
    /// Оборачивает `data`, длина которой должна быть ровно `size²`
    pub fn new(size: usize, data: Vec<f32>) -> Result<Self> {
        if size == 0 {
            bail!("matrix size must be positive");
        }
        let expected = element_count(size)?;
        if data.len() != expected {
            bail!(
                "matrix of size {size}x{size} needs {expected} elements, got {}",
                data.len()
            );
        }
        Ok(Self { size, data })
    }

    pub fn zeros(size: usize) -> Result<Self> {
        Self::new(size, vec![0.0; element_count(size)?])
    }

    pub fn identity(size: usize) -> Result<Self> {
        let mut matrix = Self::zeros(size)?;
        for i in 0..size {
            matrix.data[i * size + i] = 1.0;
        }
        Ok(matrix)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, f32> {
        self.data.chunks(self.size)
    }
}

/// Число элементов N² с проверкой переполнения
pub fn element_count(size: usize) -> Result<usize> {
    match size.checked_mul(size) {
        Some(count) => Ok(count),
        None => bail!("matrix size {size} is too large"),
    }
}
