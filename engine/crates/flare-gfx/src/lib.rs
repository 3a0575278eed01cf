//! Vulkan 的薄封装层
//!
//! 每个 Vulkan 对象对应一个 owned 的 wrapper 类型，销毁绑定在 Drop 上；
//! 需要 device 才能销毁的对象持有 `Rc<GfxDevice>`，因此销毁顺序由所有权关系推导出来。

pub mod commands;
pub mod error;
pub mod foundation;
pub mod pipeline;
pub mod resources;
pub mod swapchain;

pub use ash;
pub use error::{GfxError, GfxResult};
