//! Ввод матриц из текстового потока и вывод результата

use crate::matrix::{element_count, SquareMatrix};
use anyhow::{anyhow, bail, Context, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::str::FromStr;
use std::time::Duration;

pub const SIZE_PROMPT: &str = "Enter the size of the matrices: ";
pub const MATRIX_A_PROMPT: &str = "Enter elements for matrix A:";
pub const MATRIX_B_PROMPT: &str = "Enter elements for matrix B:";

/// Верхняя граница предварительного резервирования при чтении матрицы
const MAX_PREALLOCATED_ELEMENTS: usize = 1 << 16;

/// Читает токены, разделённые пробельными символами, построчно
///
/// Строки подтягиваются по мере надобности, так что приглашение для B
/// выводится до того, как ввод для B прочитан.
pub struct TokenReader<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// Следующий токен или `None` в конце ввода
    pub fn next_token(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line).context("Failed to read input")? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }

    pub fn next_value<T>(&mut self, what: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let token = self
            .next_token()?
            .ok_or_else(|| anyhow!("unexpected end of input while reading {what}"))?;
        token
            .parse()
            .map_err(|err| anyhow!("invalid {what} '{token}': {err}"))
    }
}

/// Читает размер N (положительное целое)
pub fn read_size<R: BufRead>(tokens: &mut TokenReader<R>) -> Result<usize> {
    let size: u32 = tokens.next_value("matrix size")?;
    if size == 0 {
        bail!("matrix size must be a positive integer");
    }
    Ok(size as usize)
}

/// Читает N² элементов матрицы в порядке строк
pub fn read_matrix<R: BufRead>(
    tokens: &mut TokenReader<R>,
    size: usize,
    name: &str,
) -> Result<SquareMatrix> {
    let count = element_count(size)?;
    // N берётся из ввода, поэтому память растёт по мере чтения значений
    let mut data = Vec::with_capacity(count.min(MAX_PREALLOCATED_ELEMENTS));
    for index in 0..count {
        let what = format!("element {} of matrix {name}", index);
        data.push(tokens.next_value::<f32>(&what)?);
    }
    SquareMatrix::new(size, data)
}

/// Выводит приглашения и читает N, A и B
pub fn read_input<R: BufRead, W: Write>(
    tokens: &mut TokenReader<R>,
    out: &mut W,
) -> Result<(SquareMatrix, SquareMatrix)> {
    write!(out, "{SIZE_PROMPT}")?;
    out.flush()?;
    let size = read_size(tokens)?;

    writeln!(out, "{MATRIX_A_PROMPT}")?;
    out.flush()?;
    let a = read_matrix(tokens, size, "A")?;

    writeln!(out, "{MATRIX_B_PROMPT}")?;
    out.flush()?;
    let b = read_matrix(tokens, size, "B")?;

    log::debug!("Прочитаны матрицы {}x{}", size, size);
    Ok((a, b))
}

/// Выводит матрицу по строкам и время выполнения ядра в миллисекундах
pub fn write_result<W: Write>(out: &mut W, c: &SquareMatrix, elapsed: Duration) -> Result<()> {
    writeln!(out, "Result Matrix C:")?;
    for row in c.rows() {
        let line = row
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{line}")?;
    }
    writeln!(
        out,
        "Execution time: {} ms",
        crate::utils::as_millis_f64(elapsed)
    )?;
    out.flush()?;
    Ok(())
}
