use std::ffi::CStr;
use std::ops::Deref;
use std::rc::Rc;

use ash::vk;
use itertools::Itertools;

use crate::error::{GfxError, GfxResult};
use crate::foundation::instance::GfxInstance;
use crate::foundation::physical_device::{GfxPhysicalDevice, QueueFamilyIndices, required_device_exts};

/// Vulkan 逻辑设备封装
///
/// 包含核心设备 API、swapchain extension 的函数指针，以及 graphics/present 两个 queue
/// （同一个 family 时两个 queue 相同）。
pub struct GfxDevice {
    device: ash::Device,
    /// 交换链扩展 API
    swapchain_loader: ash::khr::swapchain::Device,

    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    queue_families: QueueFamilyIndices,

    _instance: Rc<GfxInstance>,
}

// new & init
impl GfxDevice {
    pub fn new(instance: Rc<GfxInstance>, physical_device: &GfxPhysicalDevice) -> GfxResult<Self> {
        let queue_families = physical_device.queue_families();
        // pick 通过之后两个 index 一定存在
        let graphics_family = queue_families.graphics.expect("physical device pick guarantees graphics family");
        let present_family = queue_families.present.expect("physical device pick guarantees present family");

        // graphics 和 present 可能是同一个 family，去重后每个 family 建一个 queue
        let unique_families: Vec<u32> = [graphics_family, present_family].into_iter().unique().collect();
        let queue_priorities = [1.0_f32];
        let queue_cis = unique_families
            .iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(*family)
                    .queue_priorities(&queue_priorities)
            })
            .collect_vec();

        let device_exts = required_device_exts().iter().map(|e| e.as_ptr()).collect_vec();
        let mut exts_str = String::new();
        for ext in &device_exts {
            exts_str.push_str(&format!("\n\t{:?}", unsafe { CStr::from_ptr(*ext) }));
        }
        log::info!("device exts: {}", exts_str);

        let features = vk::PhysicalDeviceFeatures::default();
        let device_ci = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_cis)
            .enabled_extension_names(&device_exts)
            .enabled_features(&features);

        let device = unsafe {
            instance
                .handle()
                .create_device(physical_device.handle(), &device_ci, None)
                .map_err(GfxError::creation("logical device"))?
        };

        let swapchain_loader = ash::khr::swapchain::Device::new(instance.handle(), &device);

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };

        Ok(Self {
            device,
            swapchain_loader,
            graphics_queue,
            present_queue,
            queue_families,
            _instance: instance,
        })
    }
}

// getters
impl GfxDevice {
    #[inline]
    pub fn swapchain_loader(&self) -> &ash::khr::swapchain::Device {
        &self.swapchain_loader
    }

    #[inline]
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    #[inline]
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    #[inline]
    pub fn queue_families(&self) -> QueueFamilyIndices {
        self.queue_families
    }
}

// tools
impl GfxDevice {
    /// 阻塞到 device 上所有 queue 都空闲，teardown 之前调用一次
    pub fn wait_idle(&self) -> GfxResult<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(GfxError::device_call("vkDeviceWaitIdle"))
        }
    }
}

impl Deref for GfxDevice {
    type Target = ash::Device;
    fn deref(&self) -> &Self::Target {
        &self.device
    }
}

impl Drop for GfxDevice {
    fn drop(&mut self) {
        log::info!("destroying device");
        unsafe {
            self.device.destroy_device(None);
        }
    }
}
