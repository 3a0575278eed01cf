use std::ffi::CStr;
use std::rc::Rc;

use ash::vk;

use crate::error::{GfxError, GfxResult};
use crate::foundation::instance::GfxInstance;

/// validation 消息的转发器
///
/// debug utils 是 instance extension，对应的函数指针在这里 resolve 一次；
/// extension 未启用时整个类型不会被创建，调用方以 `Option` 持有。
pub struct GfxDebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,

    _instance: Rc<GfxInstance>,
}

// new & init
impl GfxDebugMessenger {
    pub fn new(instance: Rc<GfxInstance>) -> GfxResult<Self> {
        let loader = ash::ext::debug_utils::Instance::new(instance.entry(), instance.handle());

        let create_info = Self::messenger_ci();
        let messenger = unsafe {
            loader
                .create_debug_utils_messenger(&create_info, None)
                .map_err(GfxError::creation("debug messenger"))?
        };

        Ok(Self {
            loader,
            messenger,
            _instance: instance,
        })
    }

    /// 用于创建 debug messenger 的结构体
    pub fn messenger_ci() -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
        vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(vk_debug_callback))
    }
}

impl Drop for GfxDebugMessenger {
    fn drop(&mut self) {
        log::info!("destroying debug messenger");
        unsafe {
            self.loader.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

/// debug messenger 的回调函数
///
/// # Safety
/// 由 Vulkan loader 调用，callback data 的生命周期只覆盖本次调用
unsafe extern "system" fn vk_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    let callback_data = unsafe { *p_callback_data };

    let msg = if callback_data.p_message.is_null() {
        std::borrow::Cow::from("")
    } else {
        unsafe { CStr::from_ptr(callback_data.p_message).to_string_lossy() }
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[{:?}] {}", message_type, msg);
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[{:?}] {}", message_type, msg);
        }
        _ => log::info!("[{:?}] {}", message_type, msg),
    };

    // 只有 layer developer 才需要返回 True
    vk::FALSE
}
