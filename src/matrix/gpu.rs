//! GPU-умножение квадратных матриц

use super::buffers::MatrixBuffers;
use super::dispatch::{bind_arguments, launch, LaunchGeometry};
use super::program::MatrixProgram;
use super::types::SquareMatrix;
use crate::config::Config;
use crate::opencl::{select_device, CommandQueue, Context, Device, OpenClApi};
use anyhow::{bail, ensure, Context as _, Result};
use std::rc::Rc;
use std::time::Duration;

/// Результат умножения на устройстве
#[derive(Debug, Clone)]
pub struct GpuProduct {
    pub matrix: SquareMatrix,
    /// Время от постановки ядра в очередь до его завершения
    pub elapsed: Duration,
}

/// Контекст, очередь и скомпилированное ядро для одного запуска
///
/// Порядок полей задаёт порядок освобождения: ядро и программа, затем
/// очередь, затем контекст.
pub struct GpuMatrixMultiplier {
    program: MatrixProgram,
    queue: CommandQueue,
    context: Context,
    device: Device,
    local_size: Option<usize>,
}

impl GpuMatrixMultiplier {
    /// Загружает OpenCL, выбирает устройство и компилирует ядро
    pub fn new(config: &Config) -> Result<Self> {
        let api = OpenClApi::load(config.opencl_library.as_deref())
            .context("Failed to find a compatible OpenCL device")?;
        Self::with_api(Rc::new(api), config)
    }

    pub fn with_api(api: Rc<OpenClApi>, config: &Config) -> Result<Self> {
        let device = select_device(&api, config.platform_index, config.device)
            .context("Failed to find a compatible OpenCL device")?;

        if let Some(local) = config.local_size {
            let items = local.checked_mul(local).unwrap_or(usize::MAX);
            if items > device.max_work_group_size {
                bail!(
                    "work-group {local}x{local} exceeds device limit of {} work items",
                    device.max_work_group_size
                );
            }
        }

        log::debug!("Создание контекста и очереди команд...");
        let context =
            Context::create(&api, device.id).context("Failed to create a compute context")?;
        let queue =
            CommandQueue::create(&context, device.id).context("Failed to create a command queue")?;
        let program = MatrixProgram::build(&context, device.id)?;

        Ok(Self {
            program,
            queue,
            context,
            device,
            local_size: config.local_size,
        })
    }

    /// Умножает A на B: загрузка, запуск, ожидание, чтение
    ///
    /// Буферы живут только в пределах вызова.
    pub fn multiply(&self, a: &SquareMatrix, b: &SquareMatrix) -> Result<GpuProduct> {
        ensure!(
            a.size() == b.size(),
            "matrix sizes differ: {} and {}",
            a.size(),
            b.size()
        );
        let size = a.size();

        let buffers = MatrixBuffers::allocate(&self.context, &self.device, size)?;
        buffers.upload(&self.queue, a, b)?;

        let kernel = self.program.kernel();
        bind_arguments(kernel, &buffers)?;
        let geometry = LaunchGeometry::for_size(size, self.local_size)?;
        let elapsed = launch(&self.queue, kernel, &geometry)?;

        let matrix = buffers.download(&self.queue)?;
        Ok(GpuProduct { matrix, elapsed })
    }
}
