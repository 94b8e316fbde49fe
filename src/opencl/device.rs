//! Поиск платформы и устройства OpenCL

use super::bindings::OpenClApi;
use super::types::*;
use super::utils::from_c_buffer;
use crate::config::DeviceKind;
use anyhow::{anyhow, bail, Context as _, Result};
use std::ffi::c_void;
use std::ptr;

impl DeviceKind {
    pub fn cl_type(self) -> cl_device_type {
        match self {
            DeviceKind::Gpu => CL_DEVICE_TYPE_GPU,
            DeviceKind::Cpu => CL_DEVICE_TYPE_CPU,
            DeviceKind::Accelerator => CL_DEVICE_TYPE_ACCELERATOR,
            DeviceKind::Default => CL_DEVICE_TYPE_DEFAULT,
            DeviceKind::All => CL_DEVICE_TYPE_ALL,
        }
    }
}

/// Выбранное устройство и его ограничения
#[derive(Debug, Clone)]
pub struct Device {
    pub id: cl_device_id,
    pub platform_name: String,
    pub name: String,
    pub max_mem_alloc_size: u64,
    pub global_mem_size: u64,
    pub max_work_group_size: usize,
}

/// Выбирает первое устройство нужного типа на платформе с индексом `platform_index`
pub fn select_device(api: &OpenClApi, platform_index: usize, kind: DeviceKind) -> Result<Device> {
    let platforms = platform_ids(api)?;
    log::debug!("Найдено платформ OpenCL: {}", platforms.len());

    let platform = *platforms.get(platform_index).ok_or_else(|| {
        anyhow!(
            "OpenCL platform index {} out of range ({} platform(s) available)",
            platform_index,
            platforms.len()
        )
    })?;
    let platform_name = platform_info_string(api, platform, CL_PLATFORM_NAME)?;
    let platform_version = platform_info_string(api, platform, CL_PLATFORM_VERSION)?;
    log::info!("Платформа: {} ({})", platform_name, platform_version);

    let mut device_id: cl_device_id = ptr::null_mut();
    let mut num_devices: cl_uint = 0;
    cl_check!(
        api,
        clGetDeviceIDs(platform, kind.cl_type(), 1, &mut device_id, &mut num_devices)
    )
    .with_context(|| format!("No {} device found on platform {}", kind, platform_name))?;
    if num_devices == 0 || device_id.is_null() {
        bail!("No {} device found on platform {}", kind, platform_name);
    }

    let max_mem_alloc_size =
        device_info_value::<cl_ulong>(api, device_id, CL_DEVICE_MAX_MEM_ALLOC_SIZE)?;
    let global_mem_size = device_info_value::<cl_ulong>(api, device_id, CL_DEVICE_GLOBAL_MEM_SIZE)?;
    let max_work_group_size =
        device_info_value::<usize>(api, device_id, CL_DEVICE_MAX_WORK_GROUP_SIZE)?;
    let device = Device {
        id: device_id,
        name: device_info_string(api, device_id, CL_DEVICE_NAME)?,
        max_mem_alloc_size,
        global_mem_size,
        max_work_group_size,
        platform_name,
    };

    log::info!("Устройство: {}", device.name);
    log::info!(
        "Глобальная память: {} МБ, максимальный буфер: {} МБ, рабочая группа: до {}",
        device.global_mem_size / (1024 * 1024),
        device.max_mem_alloc_size / (1024 * 1024),
        device.max_work_group_size
    );

    Ok(device)
}

fn platform_ids(api: &OpenClApi) -> Result<Vec<cl_platform_id>> {
    let mut count: cl_uint = 0;
    cl_check!(api, clGetPlatformIDs(0, ptr::null_mut(), &mut count))
        .context("No OpenCL platforms found")?;
    if count == 0 {
        bail!("No OpenCL platforms found");
    }

    let mut ids = vec![ptr::null_mut(); count as usize];
    cl_check!(api, clGetPlatformIDs(count, ids.as_mut_ptr(), ptr::null_mut()))?;
    Ok(ids)
}

fn platform_info_string(
    api: &OpenClApi,
    platform: cl_platform_id,
    param: cl_platform_info,
) -> Result<String> {
    let mut size = 0usize;
    cl_check!(api, clGetPlatformInfo(platform, param, 0, ptr::null_mut(), &mut size))?;
    let mut bytes = vec![0u8; size];
    cl_check!(
        api,
        clGetPlatformInfo(
            platform,
            param,
            size,
            bytes.as_mut_ptr() as *mut c_void,
            ptr::null_mut()
        )
    )?;
    Ok(from_c_buffer(&bytes))
}

fn device_info_string(
    api: &OpenClApi,
    device: cl_device_id,
    param: cl_device_info,
) -> Result<String> {
    let mut size = 0usize;
    cl_check!(api, clGetDeviceInfo(device, param, 0, ptr::null_mut(), &mut size))?;
    let mut bytes = vec![0u8; size];
    cl_check!(
        api,
        clGetDeviceInfo(
            device,
            param,
            size,
            bytes.as_mut_ptr() as *mut c_void,
            ptr::null_mut()
        )
    )?;
    Ok(from_c_buffer(&bytes))
}

fn device_info_value<T: Copy + Default>(
    api: &OpenClApi,
    device: cl_device_id,
    param: cl_device_info,
) -> Result<T> {
    let mut value = T::default();
    cl_check!(
        api,
        clGetDeviceInfo(
            device,
            param,
            std::mem::size_of::<T>(),
            &mut value as *mut T as *mut c_void,
            ptr::null_mut()
        )
    )?;
    Ok(value)
}
