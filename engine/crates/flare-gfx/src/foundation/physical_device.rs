use std::collections::HashSet;
use std::ffi::CStr;

use ash::vk;
use itertools::Itertools;

use crate::error::{GfxError, GfxResult};
use crate::foundation::instance::GfxInstance;
use crate::swapchain::surface::GfxSurface;

/// device 必须支持的所有 extension
pub fn required_device_exts() -> Vec<&'static CStr> {
    vec![ash::khr::swapchain::NAME]
}

/// 一个 queue family 同时承担 graphics 和 present 时两个 index 相同
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }
}

/// 挑选 device 的依据，全部是提前查询好的普通数据
#[derive(Clone, Debug)]
pub struct DeviceSurvey {
    pub device_type: vk::PhysicalDeviceType,
    pub queue_families: QueueFamilyIndices,
    pub extensions_supported: bool,
    pub has_surface_formats: bool,
    pub has_present_modes: bool,
}

impl DeviceSurvey {
    /// 候选条件：queue index 齐全、extension 满足、surface 的 format 和 present mode 非空，
    /// 且 device type 必须是独显
    pub fn is_suitable(&self) -> bool {
        self.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
            && self.queue_families.is_complete()
            && self.extensions_supported
            && self.has_surface_formats
            && self.has_present_modes
    }
}

/// 选中的 physical device 以及挑选过程中缓存下来的信息
pub struct GfxPhysicalDevice {
    handle: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    memory_properties: vk::PhysicalDeviceMemoryProperties,
    queue_families: QueueFamilyIndices,
}

// new & init
impl GfxPhysicalDevice {
    /// 枚举所有 device，返回第一个合适的独显
    pub fn pick(instance: &GfxInstance, surface: &GfxSurface) -> GfxResult<Self> {
        let devices = unsafe {
            instance
                .handle()
                .enumerate_physical_devices()
                .map_err(GfxError::device_call("vkEnumeratePhysicalDevices"))?
        };
        if devices.is_empty() {
            return Err(GfxError::NoSuitableDevice);
        }
        log::info!("found {} devices with vulkan support", devices.len());

        for pdevice in &devices {
            let properties = unsafe { instance.handle().get_physical_device_properties(*pdevice) };
            let device_name = properties
                .device_name_as_c_str()
                .unwrap_or(c"<invalid utf8>")
                .to_string_lossy();
            log::info!(
                "    {} ({:?}, api {}.{}.{})",
                device_name,
                properties.device_type,
                vk::api_version_major(properties.api_version),
                vk::api_version_minor(properties.api_version),
                vk::api_version_patch(properties.api_version),
            );
        }

        devices
            .iter()
            .find_map(|pdevice| {
                let survey = Self::survey_device(instance, surface, *pdevice).ok()?;
                if !survey.is_suitable() {
                    return None;
                }

                let properties = unsafe { instance.handle().get_physical_device_properties(*pdevice) };
                let memory_properties =
                    unsafe { instance.handle().get_physical_device_memory_properties(*pdevice) };
                Some(Self {
                    handle: *pdevice,
                    properties,
                    memory_properties,
                    queue_families: survey.queue_families,
                })
            })
            .ok_or(GfxError::NoSuitableDevice)
    }

    /// 收集单个 device 的挑选依据
    fn survey_device(
        instance: &GfxInstance,
        surface: &GfxSurface,
        pdevice: vk::PhysicalDevice,
    ) -> GfxResult<DeviceSurvey> {
        let properties = unsafe { instance.handle().get_physical_device_properties(pdevice) };
        let queue_families = Self::find_queue_families(instance, surface, pdevice)?;
        let extensions_supported = Self::check_extension_support(instance, pdevice)?;

        // extension 不满足时 swapchain 查询无意义
        let (has_surface_formats, has_present_modes) = if extensions_supported {
            (
                !surface.get_formats(pdevice)?.is_empty(),
                !surface.get_present_modes(pdevice)?.is_empty(),
            )
        } else {
            (false, false)
        };

        Ok(DeviceSurvey {
            device_type: properties.device_type,
            queue_families,
            extensions_supported,
            has_surface_formats,
            has_present_modes,
        })
    }

    /// 找到第一个支持 graphics 的 family，以及第一个支持 present 的 family（可能是同一个）
    fn find_queue_families(
        instance: &GfxInstance,
        surface: &GfxSurface,
        pdevice: vk::PhysicalDevice,
    ) -> GfxResult<QueueFamilyIndices> {
        let family_props =
            unsafe { instance.handle().get_physical_device_queue_family_properties(pdevice) };

        let mut indices = QueueFamilyIndices::default();
        for (idx, props) in family_props.iter().enumerate() {
            let idx = idx as u32;
            if indices.graphics.is_none() && props.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                indices.graphics = Some(idx);
            }
            if indices.present.is_none() && surface.get_present_support(pdevice, idx)? {
                indices.present = Some(idx);
            }
            if indices.is_complete() {
                break;
            }
        }

        Ok(indices)
    }

    /// physical device 是否支持指定的所有扩展
    fn check_extension_support(instance: &GfxInstance, pdevice: vk::PhysicalDevice) -> GfxResult<bool> {
        let supported = unsafe {
            instance
                .handle()
                .enumerate_device_extension_properties(pdevice)
                .map_err(GfxError::device_call("vkEnumerateDeviceExtensionProperties"))?
        };
        let supported = supported
            .iter()
            .map(|ext| unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) }.to_owned())
            .collect_vec();

        let mut required: HashSet<_> = required_device_exts().into_iter().collect();
        for ext in &supported {
            required.remove(ext.as_c_str());
        }
        Ok(required.is_empty())
    }
}

// getters
impl GfxPhysicalDevice {
    #[inline]
    pub fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    #[inline]
    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    #[inline]
    pub fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.memory_properties
    }

    #[inline]
    pub fn queue_families(&self) -> QueueFamilyIndices {
        self.queue_families
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_survey(device_type: vk::PhysicalDeviceType) -> DeviceSurvey {
        DeviceSurvey {
            device_type,
            queue_families: QueueFamilyIndices {
                graphics: Some(0),
                present: Some(0),
            },
            extensions_supported: true,
            has_surface_formats: true,
            has_present_modes: true,
        }
    }

    #[test]
    fn test_discrete_gpu_with_full_support_is_suitable() {
        assert!(full_survey(vk::PhysicalDeviceType::DISCRETE_GPU).is_suitable());
    }

    #[test]
    fn test_integrated_gpu_is_rejected() {
        // 即使 capability 完整，非独显也不通过
        assert!(!full_survey(vk::PhysicalDeviceType::INTEGRATED_GPU).is_suitable());
    }

    #[test]
    fn test_discrete_gpu_without_swapchain_ext_is_rejected() {
        let survey = DeviceSurvey {
            extensions_supported: false,
            has_surface_formats: false,
            has_present_modes: false,
            ..full_survey(vk::PhysicalDeviceType::DISCRETE_GPU)
        };
        assert!(!survey.is_suitable());
    }

    #[test]
    fn test_missing_present_family_is_rejected() {
        let survey = DeviceSurvey {
            queue_families: QueueFamilyIndices {
                graphics: Some(0),
                present: None,
            },
            ..full_survey(vk::PhysicalDeviceType::DISCRETE_GPU)
        };
        assert!(!survey.is_suitable());
    }

    #[test]
    fn test_empty_format_list_is_rejected() {
        let survey = DeviceSurvey {
            has_surface_formats: false,
            ..full_survey(vk::PhysicalDeviceType::DISCRETE_GPU)
        };
        assert!(!survey.is_suitable());
    }
}
