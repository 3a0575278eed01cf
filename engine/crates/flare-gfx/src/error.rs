use ash::vk;
use thiserror::Error;

/// GFX 层的错误分类
///
/// 所有错误都是致命的：capability 不匹配不会因为重试而消失，
/// 上层应该在初始化入口处直接结束进程。
#[derive(Debug, Error)]
pub enum GfxError {
    /// 找不到 Vulkan runtime
    #[error("failed to load vulkan library: {0}")]
    EntryLoad(String),

    /// 启动配置无法满足，原因由调用方给出（validation layer 缺失、app name 非法等）
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// 没有任何 physical device 满足 queue/extension/swapchain 的要求
    #[error("no suitable physical device found")]
    NoSuitableDevice,

    /// 某个 create 调用被 device 拒绝
    #[error("failed to create {resource}: {result}")]
    ResourceCreation {
        resource: &'static str,
        result: vk::Result,
    },

    /// shader 字节码文件缺失或为空
    #[error("shader bytecode not found: {}", .0.display())]
    AssetLoad(std::path::PathBuf),

    /// memory type filter + property flags 的组合在当前 device 上无解
    #[error("no suitable memory type (filter {type_filter:#b}, flags {flags:?})")]
    NoSuitableMemoryType {
        type_filter: u32,
        flags: vk::MemoryPropertyFlags,
    },

    /// 帧循环中的某个 device 调用失败（wait / acquire / submit / present）
    #[error("vulkan call {call} failed: {result}")]
    DeviceCall {
        call: &'static str,
        result: vk::Result,
    },
}

impl GfxError {
    /// 便捷构造：把 vk::Result 归类为某个资源的创建失败
    #[inline]
    pub fn creation(resource: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::ResourceCreation { resource, result }
    }

    /// 便捷构造：帧循环中的 device 调用失败
    #[inline]
    pub fn device_call(call: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::DeviceCall { call, result }
    }
}

pub type GfxResult<T> = Result<T, GfxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_carries_caller_reason() {
        // Configuration 不预设失败原因，消息完整来自调用方
        let err = GfxError::Configuration("app name contains NUL byte: \"fl\\0are\"".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: app name contains NUL byte: \"fl\\0are\""
        );

        let err = GfxError::Configuration("validation layer VK_LAYER_KHRONOS_validation requested but not available".to_string());
        assert!(err.to_string().contains("VK_LAYER_KHRONOS_validation"));
    }

    #[test]
    fn test_asset_load_message_shows_path() {
        let err = GfxError::AssetLoad(std::path::PathBuf::from("shaders/triangle.vert.spv"));
        assert_eq!(err.to_string(), "shader bytecode not found: shaders/triangle.vert.spv");
    }

    #[test]
    fn test_creation_helper_tags_resource() {
        let err = GfxError::creation("swapchain")(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        assert!(matches!(
            err,
            GfxError::ResourceCreation {
                resource: "swapchain",
                result: vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            }
        ));
    }
}
