//! Компиляция программы умножения для выбранного устройства

use super::kernels::{MATRIX_MULTIPLY_KERNEL, MATRIX_MULTIPLY_KERNEL_NAME};
use crate::opencl::types::*;
use crate::opencl::{Context, Kernel, Program};
use anyhow::{anyhow, Context as _, Result};
use std::ffi::c_void;
use std::ptr;

/// Скомпилированная программа и объект ядра
///
/// Поле `kernel` объявлено первым: ядро освобождается раньше программы.
pub struct MatrixProgram {
    kernel: Kernel,
    _program: Program,
}

impl MatrixProgram {
    /// Компилирует встроенное ядро; при ошибке в сообщение попадает лог сборки
    pub fn build(context: &Context, device: cl_device_id) -> Result<Self> {
        Self::build_source(context, device, MATRIX_MULTIPLY_KERNEL, MATRIX_MULTIPLY_KERNEL_NAME)
    }

    pub fn build_source(
        context: &Context,
        device: cl_device_id,
        source: &str,
        entry_point: &str,
    ) -> Result<Self> {
        log::debug!("Компиляция OpenCL программы...");
        let program = Program::with_source(context, source)
            .context("Failed to create program")?;

        let api = program.api();
        let status = cl_check!(
            api,
            clBuildProgram(
                program.raw(),
                1,
                &device,
                ptr::null(),
                None,
                ptr::null_mut()
            )
        );
        if let Err(err) = status {
            let build_log = build_log(&program, device)
                .unwrap_or_else(|log_err| format!("<build log unavailable: {log_err}>"));
            log::error!("Лог компиляции:\n{}", build_log);
            return Err(anyhow!("{err}\n{}", build_log.trim()).context("Failed to build program"));
        }

        let kernel = Kernel::create(&program, entry_point)
            .with_context(|| format!("Failed to create kernel '{entry_point}'"))?;
        log::debug!("Ядро {} создано", entry_point);

        Ok(Self {
            kernel,
            _program: program,
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

/// Получение лога ошибок компиляции
fn build_log(program: &Program, device: cl_device_id) -> Result<String> {
    let api = program.api();
    let mut log_size = 0usize;
    cl_check!(
        api,
        clGetProgramBuildInfo(
            program.raw(),
            device,
            CL_PROGRAM_BUILD_LOG,
            0,
            ptr::null_mut(),
            &mut log_size
        )
    )?;

    let mut bytes = vec![0u8; log_size];
    cl_check!(
        api,
        clGetProgramBuildInfo(
            program.raw(),
            device,
            CL_PROGRAM_BUILD_LOG,
            log_size,
            bytes.as_mut_ptr() as *mut c_void,
            ptr::null_mut()
        )
    )?;
    Ok(crate::opencl::utils::from_c_buffer(&bytes))
}
