use flare_gfx::resources::vertex::ColorVertex2D;
use flare_render::RenderConfig;
use flare_winit_app::app::WinitApp;

/// 交错排布的 position + color
const TRIANGLE_VERTICES: [ColorVertex2D; 3] = [
    ColorVertex2D {
        position: [0.0, -0.5],
        color: [1.0, 0.0, 0.0],
    },
    ColorVertex2D {
        position: [0.5, 0.5],
        color: [0.0, 0.0, 1.0],
    },
    ColorVertex2D {
        position: [-0.5, 0.5],
        color: [1.0, 0.0, 1.0],
    },
];

fn main() {
    WinitApp::run(RenderConfig::default(), TRIANGLE_VERTICES.to_vec());
}
