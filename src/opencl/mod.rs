//! Модуль для работы с OpenCL
//!
//! Содержит низкоуровневые привязки и безопасные обертки для OpenCL

pub mod bindings;
pub mod device;
pub mod handles;
pub mod types;
pub mod utils;

pub use bindings::OpenClApi;
pub use device::{select_device, Device};
pub use handles::{CommandQueue, Context, Kernel, MemObject, Program};
