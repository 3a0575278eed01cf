use flare_gfx::resources::vertex::ColorVertex2D;
use flare_render::{RenderConfig, Renderer};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;
use winit::{
    application::ApplicationHandler,
    event::{StartCause, WindowEvent},
    event_loop::ActiveEventLoop,
    window::WindowId,
};

pub struct WinitApp {
    config: RenderConfig,
    vertices: Vec<ColorVertex2D>,

    renderer: Option<Renderer>,
    window: Option<Window>,
}
// 总的 main 函数
impl WinitApp {
    /// 整个程序的入口
    pub fn run(config: RenderConfig, vertices: Vec<ColorVertex2D>) {
        flare_crate_tools::init_log::init_log();

        let event_loop = winit::event_loop::EventLoop::new().unwrap();

        let mut app = Self {
            config,
            vertices,
            renderer: None,
            window: None,
        };

        event_loop.run_app(&mut app).unwrap();

        log::info!("end run.");

        app.destroy();
    }
}
// new & init
impl WinitApp {
    /// 在 window 创建之后调用，初始化 Renderer
    fn init_after_window(&mut self, event_loop: &ActiveEventLoop) {
        let window = Self::create_window(event_loop, &self.config);

        let display_handle = window.display_handle().unwrap().as_raw();
        let window_handle = window.window_handle().unwrap().as_raw();
        let renderer = Renderer::new(&self.config, display_handle, window_handle, &self.vertices)
            .expect("failed to init renderer");

        self.renderer = Some(renderer);
        self.window = Some(window);
    }

    fn create_window(event_loop: &ActiveEventLoop, config: &RenderConfig) -> Window {
        let window_attr = Window::default_attributes()
            .with_title(config.app_name.clone())
            .with_resizable(false)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                config.window_extent.width,
                config.window_extent.height,
            ));

        event_loop.create_window(window_attr).unwrap()
    }
}
// destroy
impl WinitApp {
    fn destroy(mut self) {
        if let Some(renderer) = self.renderer.take() {
            if let Err(e) = renderer.destroy() {
                log::error!("renderer teardown failed: {e}");
            }
        }
        self.window = None;
    }
}
// 各种 winit 的事件处理
impl ApplicationHandler for WinitApp {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, _cause: StartCause) {}

    // 建议在这里创建 window 和 Renderer
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        assert!(self.window.is_none(), "window should be None when resumed.");

        log::info!("winit event: resumed");

        self.init_after_window(event_loop);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Some(renderer) = self.renderer.as_mut() {
                    if let Err(e) = renderer.draw_frame() {
                        log::error!("draw frame failed: {e}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        log::warn!("winit event: suspended");
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("loop exiting");
    }
}
