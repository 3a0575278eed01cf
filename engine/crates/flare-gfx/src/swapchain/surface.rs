use std::rc::Rc;

use ash::vk;

use crate::error::{GfxError, GfxResult};
use crate::foundation::instance::GfxInstance;

/// window surface 封装
///
/// surface 本身由 ash-window 根据平台 handle 创建，
/// 这里只负责针对它的 capability / format / present mode 查询。
pub struct GfxSurface {
    handle: vk::SurfaceKHR,
    loader: ash::khr::surface::Instance,

    _instance: Rc<GfxInstance>,
}

// new & init
impl GfxSurface {
    pub fn new(
        instance: Rc<GfxInstance>,
        display_handle: raw_window_handle::RawDisplayHandle,
        window_handle: raw_window_handle::RawWindowHandle,
    ) -> GfxResult<Self> {
        let loader = ash::khr::surface::Instance::new(instance.entry(), instance.handle());

        let handle = unsafe {
            ash_window::create_surface(instance.entry(), instance.handle(), display_handle, window_handle, None)
                .map_err(GfxError::creation("surface"))?
        };

        Ok(Self {
            handle,
            loader,
            _instance: instance,
        })
    }
}

// getters
impl GfxSurface {
    #[inline]
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    pub fn get_capabilities(&self, pdevice: vk::PhysicalDevice) -> GfxResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.loader
                .get_physical_device_surface_capabilities(pdevice, self.handle)
                .map_err(GfxError::device_call("vkGetPhysicalDeviceSurfaceCapabilitiesKHR"))
        }
    }

    pub fn get_formats(&self, pdevice: vk::PhysicalDevice) -> GfxResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.loader
                .get_physical_device_surface_formats(pdevice, self.handle)
                .map_err(GfxError::device_call("vkGetPhysicalDeviceSurfaceFormatsKHR"))
        }
    }

    pub fn get_present_modes(&self, pdevice: vk::PhysicalDevice) -> GfxResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.loader
                .get_physical_device_surface_present_modes(pdevice, self.handle)
                .map_err(GfxError::device_call("vkGetPhysicalDeviceSurfacePresentModesKHR"))
        }
    }

    pub fn get_present_support(&self, pdevice: vk::PhysicalDevice, queue_family: u32) -> GfxResult<bool> {
        unsafe {
            self.loader
                .get_physical_device_surface_support(pdevice, queue_family, self.handle)
                .map_err(GfxError::device_call("vkGetPhysicalDeviceSurfaceSupportKHR"))
        }
    }
}

impl Drop for GfxSurface {
    fn drop(&mut self) {
        log::info!("destroying surface");
        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
    }
}
