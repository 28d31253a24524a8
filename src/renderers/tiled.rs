// Copyright @yucwang 2021

use crate::core::integrator::Integrator;
use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector3f;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

pub use super::renderer::{RenderError, Renderer};

struct Block {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    pixels: Vec<Vector3f>,
}

/// Splits the frame into square blocks and shades them on all cores.
/// Pixels are independent, so blocks are handed out in any order.
pub struct TiledRenderer {
    integrator: Box<dyn Integrator>,
    block_size: usize,
    thread_count: usize,
    show_progress: bool,
}

impl TiledRenderer {
    pub fn new(integrator: Box<dyn Integrator>) -> Self {
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            integrator,
            block_size: 32,
            thread_count,
            show_progress: true,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_threads(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn shade_block(&self, scene: &Scene, x0: usize, y0: usize, x1: usize, y1: usize) -> Block {
        let mut pixels = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            for x in x0..x1 {
                pixels.push(self.integrator.shade_pixel(scene, x, y));
            }
        }
        Block { x0, y0, x1, y1, pixels }
    }
}

impl Renderer for TiledRenderer {
    fn render(&self, scene: &Scene) -> Result<Bitmap, RenderError> {
        scene.validate()?;

        let (width, height) = (scene.camera().width(), scene.camera().height());
        let block_size = self.block_size;
        let blocks_x = (width + block_size - 1) / block_size;
        let blocks_y = (height + block_size - 1) / block_size;
        let total_blocks = blocks_x * blocks_y;
        log::info!(
            "Rendering {}x{} with {} ({} blocks, {} threads, {} steps / {} light steps).",
            width, height, self.integrator.name(), total_blocks, self.thread_count,
            scene.params().step_count, scene.params().light_step_count
        );

        let progress = if self.show_progress {
            ProgressBar::new(total_blocks as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let start = Instant::now();
        let next_block = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<Block>();
        let mut output = Bitmap::new(width, height);

        thread::scope(|scope| {
            for _ in 0..self.thread_count.min(total_blocks.max(1)) {
                let tx = tx.clone();
                let next_block = &next_block;
                scope.spawn(move || loop {
                    let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                    if block_index >= total_blocks {
                        break;
                    }

                    let x0 = (block_index % blocks_x) * block_size;
                    let y0 = (block_index / blocks_x) * block_size;
                    let x1 = (x0 + block_size).min(width);
                    let y1 = (y0 + block_size).min(height);
                    if tx.send(self.shade_block(scene, x0, y0, x1, y1)).is_err() {
                        break;
                    }
                });
            }

            drop(tx);
            for block in rx.iter() {
                let block_width = block.x1 - block.x0;
                for y in block.y0..block.y1 {
                    for x in block.x0..block.x1 {
                        output[(x, y)] = block.pixels[(x - block.x0) + block_width * (y - block.y0)];
                    }
                }
                progress.inc(1);
            }
        });
        progress.finish_and_clear();

        log::info!("Rendered {} blocks in {:.2?}.", total_blocks, start.elapsed());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::Background;
    use crate::core::settings::{ConfigError, ScatteringParameters};
    use crate::emitters::directional::DirectionalLight;
    use crate::integrators::raymarching::RaymarchingIntegrator;
    use crate::math::aabb::AABB;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::volumes::const_volume::ConstantVolume;
    use std::sync::Arc;

    fn small_scene(width: usize, height: usize, background: Background, params: ScatteringParameters) -> Scene {
        let camera = PerspectiveCamera::new(
            Vector3f::new(0.0, 0.0, -4.0),
            Vector3f::zeros(),
            Vector3f::new(0.0, 1.0, 0.0),
            0.7,
            width,
            height,
        );
        Scene::new(
            Box::new(camera),
            DirectionalLight::default(),
            AABB::default(),
            params,
            Arc::new(ConstantVolume::new(0.8)),
            background,
        )
    }

    fn quick_params() -> ScatteringParameters {
        let mut params = ScatteringParameters::default();
        params.step_count = 16;
        params.light_step_count = 4;
        params
    }

    #[test]
    fn tiled_render_matches_direct_shading() {
        let scene = small_scene(13, 7, Background::Constant(Vector3f::new(0.0, 0.0, 1.0)), quick_params());
        let renderer = TiledRenderer::new(Box::new(RaymarchingIntegrator::new()))
            .with_block_size(4)
            .with_threads(3)
            .with_progress(false);
        let image = renderer.render(&scene).unwrap();
        assert_eq!((image.width(), image.height()), (13, 7));

        let integrator = RaymarchingIntegrator::new();
        for y in 0..7 {
            for x in 0..13 {
                assert_eq!(image[(x, y)], integrator.shade_pixel(&scene, x, y));
            }
        }
    }

    #[test]
    fn corners_outside_the_box_show_background() {
        let bg = Vector3f::new(0.3, 0.3, 0.3);
        let scene = small_scene(32, 32, Background::Constant(bg), quick_params());
        let renderer = TiledRenderer::new(Box::new(RaymarchingIntegrator::new())).with_progress(false);
        let image = renderer.render(&scene).unwrap();
        assert_eq!(image[(0, 0)], bg);
        assert_ne!(image[(16, 16)], bg);
    }

    #[test]
    fn invalid_scene_fails_before_rendering() {
        let mut params = quick_params();
        params.light_step_count = 0;
        let scene = small_scene(4, 4, Background::Constant(Vector3f::zeros()), params);
        let renderer = TiledRenderer::new(Box::new(RaymarchingIntegrator::new())).with_progress(false);
        assert_eq!(
            renderer.render(&scene).unwrap_err(),
            RenderError::Config(ConfigError::InvalidLightStepCount)
        );
    }
}
