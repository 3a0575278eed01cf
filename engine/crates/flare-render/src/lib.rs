//! 渲染层：持有整条 Vulkan 对象链，驱动 acquire / submit / present 的帧循环

pub mod frame_counter;
pub mod frame_sync;
pub mod renderer;
pub mod settings;

pub use renderer::Renderer;
pub use settings::RenderConfig;
