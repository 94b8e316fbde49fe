//! Низкоуровневые привязки к OpenCL API
//!
//! Библиотека ICD загружается во время выполнения через `libloading`, поэтому
//! сборка не требует установленного OpenCL SDK. Отсутствие библиотеки
//! превращается в обычную ошибку поиска платформы.

use super::types::*;
use anyhow::{anyhow, Context, Result};
use libloading::Library;
use std::ffi::c_void;
use std::path::Path;

/// Callback уведомлений контекста (не используется, всегда `None`)
pub type ContextNotifyCallback =
    Option<unsafe extern "system" fn(*const i8, *const c_void, usize, *mut c_void)>;

/// Callback завершения сборки программы (не используется, всегда `None`)
pub type BuildNotifyCallback = Option<unsafe extern "system" fn(cl_program, *mut c_void)>;

#[cfg(target_os = "linux")]
const LIBRARY_CANDIDATES: &[&str] = &["libOpenCL.so.1", "libOpenCL.so"];
#[cfg(target_os = "windows")]
const LIBRARY_CANDIDATES: &[&str] = &["OpenCL.dll"];
#[cfg(target_os = "macos")]
const LIBRARY_CANDIDATES: &[&str] = &["/System/Library/Frameworks/OpenCL.framework/OpenCL"];
#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
const LIBRARY_CANDIDATES: &[&str] = &["libOpenCL.so"];

/// Таблица точек входа OpenCL, разрешённых из динамической библиотеки
#[allow(non_snake_case)]
pub struct OpenClApi {
    pub clGetPlatformIDs:
        unsafe extern "system" fn(cl_uint, *mut cl_platform_id, *mut cl_uint) -> cl_int,
    pub clGetPlatformInfo: unsafe extern "system" fn(
        cl_platform_id,
        cl_platform_info,
        usize,
        *mut c_void,
        *mut usize,
    ) -> cl_int,
    pub clGetDeviceIDs: unsafe extern "system" fn(
        cl_platform_id,
        cl_device_type,
        cl_uint,
        *mut cl_device_id,
        *mut cl_uint,
    ) -> cl_int,
    pub clGetDeviceInfo: unsafe extern "system" fn(
        cl_device_id,
        cl_device_info,
        usize,
        *mut c_void,
        *mut usize,
    ) -> cl_int,
    pub clCreateContext: unsafe extern "system" fn(
        *const cl_context_properties,
        cl_uint,
        *const cl_device_id,
        ContextNotifyCallback,
        *mut c_void,
        *mut cl_int,
    ) -> cl_context,
    pub clCreateCommandQueue: unsafe extern "system" fn(
        cl_context,
        cl_device_id,
        cl_command_queue_properties,
        *mut cl_int,
    ) -> cl_command_queue,
    pub clCreateProgramWithSource: unsafe extern "system" fn(
        cl_context,
        cl_uint,
        *const *const i8,
        *const usize,
        *mut cl_int,
    ) -> cl_program,
    pub clBuildProgram: unsafe extern "system" fn(
        cl_program,
        cl_uint,
        *const cl_device_id,
        *const i8,
        BuildNotifyCallback,
        *mut c_void,
    ) -> cl_int,
    pub clGetProgramBuildInfo: unsafe extern "system" fn(
        cl_program,
        cl_device_id,
        cl_program_build_info,
        usize,
        *mut c_void,
        *mut usize,
    ) -> cl_int,
    pub clCreateKernel:
        unsafe extern "system" fn(cl_program, *const i8, *mut cl_int) -> cl_kernel,
    pub clCreateBuffer: unsafe extern "system" fn(
        cl_context,
        cl_mem_flags,
        usize,
        *mut c_void,
        *mut cl_int,
    ) -> cl_mem,
    pub clSetKernelArg:
        unsafe extern "system" fn(cl_kernel, cl_uint, usize, *const c_void) -> cl_int,
    pub clEnqueueNDRangeKernel: unsafe extern "system" fn(
        cl_command_queue,
        cl_kernel,
        cl_uint,
        *const usize,
        *const usize,
        *const usize,
        cl_uint,
        *const cl_event,
        *mut cl_event,
    ) -> cl_int,
    pub clEnqueueReadBuffer: unsafe extern "system" fn(
        cl_command_queue,
        cl_mem,
        cl_bool,
        usize,
        usize,
        *mut c_void,
        cl_uint,
        *const cl_event,
        *mut cl_event,
    ) -> cl_int,
    pub clEnqueueWriteBuffer: unsafe extern "system" fn(
        cl_command_queue,
        cl_mem,
        cl_bool,
        usize,
        usize,
        *const c_void,
        cl_uint,
        *const cl_event,
        *mut cl_event,
    ) -> cl_int,
    pub clFinish: unsafe extern "system" fn(cl_command_queue) -> cl_int,
    pub clReleaseMemObject: unsafe extern "system" fn(cl_mem) -> cl_int,
    pub clReleaseKernel: unsafe extern "system" fn(cl_kernel) -> cl_int,
    pub clReleaseProgram: unsafe extern "system" fn(cl_program) -> cl_int,
    pub clReleaseCommandQueue: unsafe extern "system" fn(cl_command_queue) -> cl_int,
    pub clReleaseContext: unsafe extern "system" fn(cl_context) -> cl_int,
    // Указатели выше действительны, пока библиотека загружена
    _library: Library,
}

impl OpenClApi {
    /// Загружает библиотеку OpenCL: явный путь или стандартные имена для платформы
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let library = match explicit {
            Some(path) => unsafe { Library::new(path) }.with_context(|| {
                format!("Failed to load OpenCL library from {}", path.display())
            })?,
            None => load_default_library()?,
        };

        Ok(Self {
            clGetPlatformIDs: symbol(&library, b"clGetPlatformIDs\0")?,
            clGetPlatformInfo: symbol(&library, b"clGetPlatformInfo\0")?,
            clGetDeviceIDs: symbol(&library, b"clGetDeviceIDs\0")?,
            clGetDeviceInfo: symbol(&library, b"clGetDeviceInfo\0")?,
            clCreateContext: symbol(&library, b"clCreateContext\0")?,
            clCreateCommandQueue: symbol(&library, b"clCreateCommandQueue\0")?,
            clCreateProgramWithSource: symbol(&library, b"clCreateProgramWithSource\0")?,
            clBuildProgram: symbol(&library, b"clBuildProgram\0")?,
            clGetProgramBuildInfo: symbol(&library, b"clGetProgramBuildInfo\0")?,
            clCreateKernel: symbol(&library, b"clCreateKernel\0")?,
            clCreateBuffer: symbol(&library, b"clCreateBuffer\0")?,
            clSetKernelArg: symbol(&library, b"clSetKernelArg\0")?,
            clEnqueueNDRangeKernel: symbol(&library, b"clEnqueueNDRangeKernel\0")?,
            clEnqueueReadBuffer: symbol(&library, b"clEnqueueReadBuffer\0")?,
            clEnqueueWriteBuffer: symbol(&library, b"clEnqueueWriteBuffer\0")?,
            clFinish: symbol(&library, b"clFinish\0")?,
            clReleaseMemObject: symbol(&library, b"clReleaseMemObject\0")?,
            clReleaseKernel: symbol(&library, b"clReleaseKernel\0")?,
            clReleaseProgram: symbol(&library, b"clReleaseProgram\0")?,
            clReleaseCommandQueue: symbol(&library, b"clReleaseCommandQueue\0")?,
            clReleaseContext: symbol(&library, b"clReleaseContext\0")?,
            _library: library,
        })
    }
}

fn load_default_library() -> Result<Library> {
    for candidate in LIBRARY_CANDIDATES {
        // SAFETY: только загрузка ICD, инициализаторы библиотеки OpenCL безопасны
        if let Ok(library) = unsafe { Library::new(candidate) } {
            log::debug!("Загружена библиотека OpenCL: {}", candidate);
            return Ok(library);
        }
    }

    Err(anyhow!(
        "No OpenCL runtime found (tried {})",
        LIBRARY_CANDIDATES.join(", ")
    ))
}

fn symbol<T: Copy>(library: &Library, name: &'static [u8]) -> Result<T> {
    // SAFETY: тип T совпадает с сигнатурой функции из спецификации OpenCL 1.2
    let symbol = unsafe { library.get::<T>(name) }.map_err(|err| {
        anyhow!(
            "Failed to resolve OpenCL symbol {}: {err}",
            String::from_utf8_lossy(&name[..name.len() - 1])
        )
    })?;
    Ok(*symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_reported_with_path() {
        let path = Path::new("/nonexistent/libOpenCL-missing.so");
        let err = OpenClApi::load(Some(path)).err().expect("load must fail");
        assert!(err.to_string().contains("/nonexistent/libOpenCL-missing.so"));
    }
}
