//! OpenCL-accelerated square matrix multiplication

// Реэкспортируем макросы на уровень крейта
#[macro_use]
mod macros {
    /// Макрос для обработки кодов возврата OpenCL
    ///
    /// `cl_check!(api, clFinish(queue))` вызывает функцию из таблицы `api`
    /// и возвращает `anyhow::Result<()>` с именем вызова в тексте ошибки.
    #[macro_export]
    macro_rules! cl_check {
        ($api:expr, $func:ident($($arg:expr),* $(,)?)) => {{
            let code = unsafe { ($api.$func)($($arg),*) };
            $crate::opencl::utils::check(code, stringify!($func))
        }};
    }

    /// Макрос для функций OpenCL, создающих объект
    ///
    /// Последний аргумент (`errcode_ret`) подставляется макросом.
    #[macro_export]
    macro_rules! cl_create {
        ($api:expr, $func:ident($($arg:expr),* $(,)?)) => {{
            let mut code: $crate::opencl::types::cl_int = $crate::opencl::types::CL_SUCCESS;
            let obj = unsafe { ($api.$func)($($arg,)* &mut code) };
            if code != $crate::opencl::types::CL_SUCCESS {
                Err($crate::opencl::utils::cl_error(code, stringify!($func)))
            } else if obj.is_null() {
                Err(anyhow::anyhow!(concat!(stringify!($func), " returned a null handle")))
            } else {
                Ok(obj)
            }
        }};
    }
}

pub mod config;
pub mod io;
pub mod logger;
pub mod matrix;
pub mod opencl;
pub mod utils;

// Реэкспорт основных типов для удобства
pub use config::Config;
pub use matrix::{MatrixType, SquareMatrix};
