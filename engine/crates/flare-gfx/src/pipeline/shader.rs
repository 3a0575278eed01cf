use std::path::Path;
use std::rc::Rc;

use ash::vk;

use crate::error::{GfxError, GfxResult};
use crate::foundation::device::GfxDevice;

/// 从磁盘加载的 SPIR-V shader module
///
/// 只在 pipeline 创建期间存活，创建完成后立即 drop。
pub struct GfxShaderModule {
    handle: vk::ShaderModule,

    device: Rc<GfxDevice>,
}

// new & init
impl GfxShaderModule {
    pub fn new(device: Rc<GfxDevice>, path: &Path) -> GfxResult<Self> {
        let code = load_shader_code(path)?;

        let shader_ci = vk::ShaderModuleCreateInfo::default().code(&code);
        let handle = unsafe {
            device
                .create_shader_module(&shader_ci, None)
                .map_err(GfxError::creation("shader module"))?
        };

        Ok(Self { handle, device })
    }
}

// getters
impl GfxShaderModule {
    #[inline]
    pub fn handle(&self) -> vk::ShaderModule {
        self.handle
    }
}

impl Drop for GfxShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.handle, None);
        }
    }
}

/// 读取 shader 字节码并按 4 字节对齐解码
///
/// 文件缺失或内容为空都按资源缺失处理。
fn load_shader_code(path: &Path) -> GfxResult<Vec<u32>> {
    let bytes = std::fs::read(path).map_err(|_| GfxError::AssetLoad(path.to_path_buf()))?;
    if bytes.is_empty() {
        return Err(GfxError::AssetLoad(path.to_path_buf()));
    }

    ash::util::read_spv(&mut std::io::Cursor::new(&bytes)).map_err(|_| GfxError::AssetLoad(path.to_path_buf()))
}
