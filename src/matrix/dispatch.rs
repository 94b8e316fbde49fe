//! Запуск ядра: аргументы, геометрия, ожидание и замер времени

use super::buffers::MatrixBuffers;
use crate::opencl::types::cl_uint;
use crate::opencl::{CommandQueue, Kernel};
use crate::utils::measure_time;
use anyhow::{bail, Context as _, Result};
use std::ptr;
use std::time::Duration;

/// Двумерная геометрия запуска
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGeometry {
    pub global: [usize; 2],
    pub local: Option<[usize; 2]>,
}

impl LaunchGeometry {
    /// Ровно N×N рабочих элементов; с `local_size` глобальный размер
    /// округляется вверх до кратного стороне группы
    pub fn for_size(size: usize, local_size: Option<usize>) -> Result<Self> {
        match local_size {
            None => Ok(Self {
                global: [size, size],
                local: None,
            }),
            Some(0) => bail!("work-group size must be positive"),
            Some(local) => {
                let padded = size.div_ceil(local).checked_mul(local).with_context(|| {
                    format!("launch size {size} overflows when padded to {local}")
                })?;
                Ok(Self {
                    global: [padded, padded],
                    local: Some([local, local]),
                })
            }
        }
    }
}

/// Устанавливает аргументы ядра в порядке A, B, C, N
pub fn bind_arguments(kernel: &Kernel, buffers: &MatrixBuffers) -> Result<()> {
    let size = cl_uint::try_from(buffers.size()).with_context(|| {
        format!("matrix size {} does not fit the kernel argument", buffers.size())
    })?;

    kernel.set_arg_buffer(0, &buffers.a).context("Failed to set kernel argument A")?;
    kernel.set_arg_buffer(1, &buffers.b).context("Failed to set kernel argument B")?;
    kernel.set_arg_buffer(2, &buffers.c).context("Failed to set kernel argument C")?;
    kernel.set_arg(3, &size).context("Failed to set kernel argument N")?;
    Ok(())
}

/// Ставит ядро в очередь и ждёт завершения
///
/// Возвращает время от постановки в очередь до завершения `clFinish`.
pub fn launch(
    queue: &CommandQueue,
    kernel: &Kernel,
    geometry: &LaunchGeometry,
) -> Result<Duration> {
    log::debug!(
        "Запуск ядра: глобальный размер {:?}, рабочая группа {:?}",
        geometry.global,
        geometry.local
    );

    let api = kernel.api();
    let local_ptr = geometry.local.as_ref().map_or(ptr::null(), |local| local.as_ptr());

    let (status, elapsed) = measure_time(|| -> Result<()> {
        cl_check!(
            api,
            clEnqueueNDRangeKernel(
                queue.raw(),
                kernel.raw(),
                2,
                ptr::null(),
                geometry.global.as_ptr(),
                local_ptr,
                0,
                ptr::null(),
                ptr::null_mut()
            )
        )
        .context("Failed to enqueue kernel")?;
        queue.finish().context("Failed to wait for kernel completion")
    });
    status?;

    log::info!("GPU вычисления завершены за {:?}", elapsed);
    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_geometry_without_local_size() {
        let geometry = LaunchGeometry::for_size(5, None).unwrap();
        assert_eq!(geometry.global, [5, 5]);
        assert_eq!(geometry.local, None);
    }

    #[test]
    fn padded_geometry_is_multiple_of_local_size() {
        let geometry = LaunchGeometry::for_size(17, Some(16)).unwrap();
        assert_eq!(geometry.global, [32, 32]);
        assert_eq!(geometry.local, Some([16, 16]));

        let exact = LaunchGeometry::for_size(32, Some(16)).unwrap();
        assert_eq!(exact.global, [32, 32]);
    }

    #[test]
    fn zero_local_size_is_rejected() {
        assert!(LaunchGeometry::for_size(4, Some(0)).is_err());
    }
}
