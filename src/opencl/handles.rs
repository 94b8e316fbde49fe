//! Владеющие обёртки над объектами OpenCL
//!
//! Каждая обёртка освобождает свой объект ровно один раз в `Drop`, поэтому
//! ранний выход по ошибке не оставляет неосвобождённых ресурсов. Обёртки
//! хранят `Rc<OpenClApi>`: библиотека выгружается только после освобождения
//! последнего объекта. Сырые указатели делают типы `!Send` и `!Sync`.

use super::bindings::OpenClApi;
use super::types::*;
use std::rc::Rc;

macro_rules! cl_handle {
    ($(#[$meta:meta])* $name:ident, $raw:ty, $release:ident) => {
        $(#[$meta])*
        pub struct $name {
            api: Rc<OpenClApi>,
            raw: $raw,
        }

        impl $name {
            /// Принимает владение уже созданным объектом
            ///
            /// # Safety
            /// `raw` должен быть действительным объектом, полученным из `api`,
            /// и больше нигде не освобождаться.
            pub unsafe fn from_raw(api: Rc<OpenClApi>, raw: $raw) -> Self {
                Self { api, raw }
            }

            pub fn raw(&self) -> $raw {
                self.raw
            }

            pub fn api(&self) -> &Rc<OpenClApi> {
                &self.api
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                let code = unsafe { (self.api.$release)(self.raw) };
                if code != CL_SUCCESS {
                    log::warn!(
                        "{} failed: {}",
                        stringify!($release),
                        super::utils::error_name(code)
                    );
                } else {
                    log::trace!("{} освобождён", stringify!($name));
                }
            }
        }
    };
}

cl_handle!(
    /// Контекст OpenCL
    Context,
    cl_context,
    clReleaseContext
);
cl_handle!(
    /// Очередь команд
    CommandQueue,
    cl_command_queue,
    clReleaseCommandQueue
);
cl_handle!(
    /// Скомпилированная программа
    Program,
    cl_program,
    clReleaseProgram
);
cl_handle!(
    /// Объект ядра
    Kernel,
    cl_kernel,
    clReleaseKernel
);
cl_handle!(
    /// Буфер в памяти устройства
    MemObject,
    cl_mem,
    clReleaseMemObject
);

impl Context {
    /// Создаёт контекст для одного устройства
    pub fn create(api: &Rc<OpenClApi>, device: cl_device_id) -> anyhow::Result<Self> {
        let raw = cl_create!(
            api,
            clCreateContext(
                std::ptr::null(),
                1,
                &device,
                None,
                std::ptr::null_mut()
            )
        )?;
        Ok(unsafe { Self::from_raw(Rc::clone(api), raw) })
    }
}

impl CommandQueue {
    /// Создаёт упорядоченную очередь без профилирования
    pub fn create(context: &Context, device: cl_device_id) -> anyhow::Result<Self> {
        let api = context.api();
        let raw = cl_create!(api, clCreateCommandQueue(context.raw(), device, 0))?;
        Ok(unsafe { Self::from_raw(Rc::clone(api), raw) })
    }

    /// Блокирует поток до выполнения всех команд очереди
    pub fn finish(&self) -> anyhow::Result<()> {
        cl_check!(self.api, clFinish(self.raw))
    }
}

impl Program {
    /// Создаёт программу из исходного текста (без компиляции)
    pub fn with_source(context: &Context, source: &str) -> anyhow::Result<Self> {
        let api = context.api();
        let ptr = source.as_ptr() as *const i8;
        let len = source.len();
        let raw = cl_create!(api, clCreateProgramWithSource(context.raw(), 1, &ptr, &len))?;
        Ok(unsafe { Self::from_raw(Rc::clone(api), raw) })
    }
}

impl Kernel {
    /// Создаёт объект ядра по имени точки входа
    pub fn create(program: &Program, name: &str) -> anyhow::Result<Self> {
        let api = program.api();
        let c_name = super::utils::to_c_string(name);
        let raw = cl_create!(api, clCreateKernel(program.raw(), c_name.as_ptr()))?;
        Ok(unsafe { Self::from_raw(Rc::clone(api), raw) })
    }

    /// Устанавливает аргумент ядра по значению
    pub fn set_arg<T: Copy>(&self, index: cl_uint, value: &T) -> anyhow::Result<()> {
        cl_check!(
            self.api,
            clSetKernelArg(
                self.raw,
                index,
                std::mem::size_of::<T>(),
                value as *const T as *const std::ffi::c_void
            )
        )
    }

    /// Устанавливает буфер в качестве аргумента ядра
    pub fn set_arg_buffer(&self, index: cl_uint, buffer: &MemObject) -> anyhow::Result<()> {
        self.set_arg(index, &buffer.raw())
    }
}

impl MemObject {
    /// Выделяет буфер размером `bytes` без копирования данных хоста
    pub fn create(context: &Context, flags: cl_mem_flags, bytes: usize) -> anyhow::Result<Self> {
        let api = context.api();
        let raw = cl_create!(
            api,
            clCreateBuffer(context.raw(), flags, bytes, std::ptr::null_mut())
        )?;
        Ok(unsafe { Self::from_raw(Rc::clone(api), raw) })
    }

    /// Блокирующая запись данных хоста в начало буфера
    pub fn write_blocking(&self, queue: &CommandQueue, data: &[f32]) -> anyhow::Result<()> {
        cl_check!(
            self.api,
            clEnqueueWriteBuffer(
                queue.raw(),
                self.raw,
                CL_TRUE,
                0,
                std::mem::size_of_val(data),
                data.as_ptr() as *const std::ffi::c_void,
                0,
                std::ptr::null(),
                std::ptr::null_mut()
            )
        )
    }

    /// Блокирующее чтение начала буфера в память хоста
    pub fn read_blocking(&self, queue: &CommandQueue, out: &mut [f32]) -> anyhow::Result<()> {
        cl_check!(
            self.api,
            clEnqueueReadBuffer(
                queue.raw(),
                self.raw,
                CL_TRUE,
                0,
                std::mem::size_of_val(out),
                out.as_mut_ptr() as *mut std::ffi::c_void,
                0,
                std::ptr::null(),
                std::ptr::null_mut()
            )
        )
    }
}
