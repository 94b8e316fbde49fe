//! Буферы устройства для A, B и C

use super::types::{element_count, SquareMatrix};
use crate::opencl::types::{CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY};
use crate::opencl::{CommandQueue, Context, Device, MemObject};
use anyhow::{bail, ensure, Context as _, Result};

/// Три буфера одного запуска: два входных только для чтения и выходной
pub struct MatrixBuffers {
    pub a: MemObject,
    pub b: MemObject,
    pub c: MemObject,
    size: usize,
}

impl MatrixBuffers {
    /// Выделяет буферы по N²×4 байт, проверив лимит устройства на один буфер
    pub fn allocate(context: &Context, device: &Device, size: usize) -> Result<Self> {
        let bytes = buffer_bytes(size)?;
        check_device_limit(bytes, device.max_mem_alloc_size)?;

        log::debug!("Создание буферов OpenCL: 3 x {} байт", bytes);
        let a = MemObject::create(context, CL_MEM_READ_ONLY, bytes)
            .context("Failed to allocate device buffer for matrix A")?;
        let b = MemObject::create(context, CL_MEM_READ_ONLY, bytes)
            .context("Failed to allocate device buffer for matrix B")?;
        let c = MemObject::create(context, CL_MEM_WRITE_ONLY, bytes)
            .context("Failed to allocate device buffer for matrix C")?;

        Ok(Self { a, b, c, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Блокирующая загрузка A и B на устройство
    pub fn upload(&self, queue: &CommandQueue, a: &SquareMatrix, b: &SquareMatrix) -> Result<()> {
        ensure!(
            a.size() == self.size && b.size() == self.size,
            "input matrices must be {0}x{0}",
            self.size
        );
        self.a
            .write_blocking(queue, a.as_slice())
            .context("Failed to upload matrix A")?;
        self.b
            .write_blocking(queue, b.as_slice())
            .context("Failed to upload matrix B")?;
        Ok(())
    }

    /// Блокирующее чтение C с устройства
    pub fn download(&self, queue: &CommandQueue) -> Result<SquareMatrix> {
        let mut c = vec![0.0f32; element_count(self.size)?];
        self.c
            .read_blocking(queue, &mut c)
            .context("Failed to read matrix C from device")?;
        SquareMatrix::new(self.size, c)
    }
}

/// Размер одного буфера в байтах: N²×sizeof(f32)
pub fn buffer_bytes(size: usize) -> Result<usize> {
    match element_count(size)?.checked_mul(std::mem::size_of::<f32>()) {
        Some(bytes) => Ok(bytes),
        None => bail!("matrix size {size} is too large"),
    }
}

fn check_device_limit(bytes: usize, max_alloc: u64) -> Result<()> {
    if bytes as u64 > max_alloc {
        bail!(
            "matrix buffer of {} bytes exceeds device allocation limit of {} bytes",
            bytes,
            max_alloc
        );
    }
    Ok(())
}
