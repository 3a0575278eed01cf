use std::ffi::CStr;

use ash::vk;
use itertools::Itertools;

use crate::error::{GfxError, GfxResult};
use crate::foundation::debug_messenger::GfxDebugMessenger;

/// 开启 validation 时使用的 instance layer
pub const VALIDATION_LAYER_NAME: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Vulkan instance 封装
///
/// 持有 `ash::Entry`，保证 loader 的生命周期覆盖 instance。
pub struct GfxInstance {
    entry: ash::Entry,
    instance: ash::Instance,

    validation_enabled: bool,
}

// new & init
impl GfxInstance {
    /// 创建 instance
    ///
    /// instance extension 由 window system 决定（ash-window），
    /// 开启 validation 时额外加入 debug utils extension 和 validation layer。
    pub fn new(
        app_name: &CStr,
        display_handle: raw_window_handle::RawDisplayHandle,
        enable_validation: bool,
    ) -> GfxResult<Self> {
        let entry = unsafe { ash::Entry::load() }.map_err(|e| GfxError::EntryLoad(e.to_string()))?;

        if enable_validation && !Self::validation_layer_supported(&entry)? {
            return Err(GfxError::Configuration(format!(
                "validation layer {} requested but not available",
                VALIDATION_LAYER_NAME.to_string_lossy()
            )));
        }

        let app_info = vk::ApplicationInfo::default()
            .application_name(app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(c"flare")
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        let mut extensions = ash_window::enumerate_required_extensions(display_handle)
            .map_err(GfxError::creation("instance"))?
            .to_vec();
        if enable_validation {
            extensions.push(ash::ext::debug_utils::NAME.as_ptr());
        }
        let mut ext_str = String::new();
        for ext in &extensions {
            ext_str.push_str(&format!("\n\t{:?}", unsafe { CStr::from_ptr(*ext) }));
        }
        log::info!("instance exts: {}", ext_str);

        let layers = if enable_validation {
            vec![VALIDATION_LAYER_NAME.as_ptr()]
        } else {
            vec![]
        };

        // validation 开启时把 debug messenger 挂到 instance 的 create/destroy 过程上
        let mut debug_ci = GfxDebugMessenger::messenger_ci();
        let mut instance_ci = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);
        if enable_validation {
            instance_ci = instance_ci.push_next(&mut debug_ci);
        }

        let instance = unsafe {
            entry
                .create_instance(&instance_ci, None)
                .map_err(GfxError::creation("instance"))?
        };

        Ok(Self {
            entry,
            instance,
            validation_enabled: enable_validation,
        })
    }

    fn validation_layer_supported(entry: &ash::Entry) -> GfxResult<bool> {
        let layers = unsafe {
            entry
                .enumerate_instance_layer_properties()
                .map_err(GfxError::device_call("vkEnumerateInstanceLayerProperties"))?
        };
        let available = layers
            .iter()
            .map(|layer| unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) }.to_owned())
            .collect_vec();

        Ok(available.iter().any(|name| name.as_c_str() == VALIDATION_LAYER_NAME))
    }
}

// getters
impl GfxInstance {
    #[inline]
    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    #[inline]
    pub fn handle(&self) -> &ash::Instance {
        &self.instance
    }

    #[inline]
    pub fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }
}

impl Drop for GfxInstance {
    fn drop(&mut self) {
        log::info!("destroying instance");
        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}
