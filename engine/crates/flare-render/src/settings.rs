use std::fmt::Display;
use std::ops::Deref;
use std::path::PathBuf;

use ash::vk;

/// 允许同时在 GPU 上 in flight 的帧数
pub const FRAMES_IN_FLIGHT: usize = 2;

/// Renderer 的启动配置
///
/// 所有字段在创建 Renderer 时一次性确定，运行期间不变。
pub struct RenderConfig {
    pub app_name: String,

    /// 窗口的初始尺寸，surface 不固定 extent 时作为 swapchain 的 fallback
    pub window_extent: vk::Extent2D,

    /// 是否开启 validation layer 和 debug messenger
    pub enable_validation: bool,

    pub vertex_shader_path: PathBuf,
    pub fragment_shader_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            app_name: "flare".to_string(),
            window_extent: vk::Extent2D {
                width: 800,
                height: 600,
            },
            enable_validation: cfg!(debug_assertions),
            vertex_shader_path: PathBuf::from("shaders/triangle.vert.spv"),
            fragment_shader_path: PathBuf::from("shaders/triangle.frag.spv"),
        }
    }
}

/// 标记某一帧使用的 in-flight slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLabel {
    A,
    B,
}
impl Deref for FrameLabel {
    type Target = usize;
    #[inline]
    fn deref(&self) -> &Self::Target {
        match self {
            Self::A => &Self::INDEX[0],
            Self::B => &Self::INDEX[1],
        }
    }
}
impl Display for FrameLabel {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}
impl FrameLabel {
    const INDEX: [usize; FRAMES_IN_FLIGHT] = [0, 1];

    #[inline]
    pub fn from_usize(idx: usize) -> Self {
        match idx {
            0 => Self::A,
            1 => Self::B,
            _ => panic!("Invalid frame index: {idx}"),
        }
    }
}
