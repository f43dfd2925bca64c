#[cfg(feature = "dx11")]
extern crate gfx_backend_dx11 as back;
#[cfg(feature = "dx12")]
extern crate gfx_backend_dx12 as back;
#[cfg(not(any(
    feature = "vulkan",
    feature = "dx11",
    feature = "dx12",
    feature = "metal",
    feature = "gl",
)))]
extern crate gfx_backend_empty as back;
#[cfg(feature = "gl")]
extern crate gfx_backend_gl as back;
#[cfg(feature = "metal")]
extern crate gfx_backend_metal as back;
#[cfg(feature = "vulkan")]
extern crate gfx_backend_vulkan as back;


mod renderer;
mod entities;
mod pipelines;
mod cameras;
mod error;
mod fps_calculator;
mod logging;

use error::RenderError;
use fps_calculator::FpsCalculator;
use logging::{init_logging, LoggingConfig};
use renderer::Renderer;

use std::time::Instant;

use gfx_hal as hal;
use hal::{
    prelude::*,
    window,
};


#[cfg_attr(rustfmt, rustfmt_skip)]
pub const DIMS: window::Extent2D = window::Extent2D { width: 960, height: 540 };
pub const TITLE: &str = "Cube";

fn main() {
    init_logging(LoggingConfig::default());

    #[cfg(not(any(
        feature = "vulkan",
        feature = "dx11",
        feature = "dx12",
        feature = "metal",
        feature = "gl",
    )))]
    log::warn!(
        "running with the empty backend, no graphical output is to be expected"
    );

    let event_loop = winit::event_loop::EventLoop::new();

    let window_builder = winit::window::WindowBuilder::new()
        .with_min_inner_size(winit::dpi::Size::Logical(winit::dpi::LogicalSize::new(
            64.0, 64.0,
        )))
        .with_inner_size(winit::dpi::Size::Physical(winit::dpi::PhysicalSize::new(
            DIMS.width,
            DIMS.height,
        )))
        .with_title(TITLE.to_string());

    let window = match window_builder.build(&event_loop) {
        Ok(window) => window,
        Err(e) => fatal(RenderError::DeviceUnavailable(format!("can't create window: {}", e))),
    };

    let mut renderer = match create_renderer(&window) {
        Ok(renderer) => renderer,
        Err(e) => fatal(e),
    };

    renderer.draw_initial();

    let mut fps_calculator = FpsCalculator::new();

    // It is important that the closure move captures the Renderer,
    // otherwise it will not be dropped when the event loop exits.
    event_loop.run(move |event, _, control_flow| {
        *control_flow = winit::event_loop::ControlFlow::Poll;

        match event {
            winit::event::Event::WindowEvent { event, .. } => {
                match event {
                    winit::event::WindowEvent::CloseRequested => {
                        *control_flow = winit::event_loop::ControlFlow::Exit
                    }

                    winit::event::WindowEvent::Resized(dims) => {
                        log::debug!("resized to {:?}", dims);
                        renderer.dimensions_set(window::Extent2D {
                            width: dims.width,
                            height: dims.height,
                        });
                        renderer.recreate_swapchain();
                    }

                    _ => {}
                }
            }
            winit::event::Event::RedrawEventsCleared => {
                renderer.render();
                if fps_calculator.count_one_frame(Instant::now()) {
                    log::info!("fps: {:.1}", fps_calculator.fps());
                }
            }
            _ => {}
        }
    });
}

/// Instance, surface and adapter for `window`, handed to the renderer's setup.
fn create_renderer(
    window: &winit::window::Window,
) -> Result<Renderer<back::Backend>, RenderError> {
    let instance = back::Instance::create(TITLE, 1).map_err(|_| {
        RenderError::DeviceUnavailable("graphics backend is not supported here".into())
    })?;

    let surface = unsafe { instance.create_surface(window) }
        .map_err(|e| RenderError::DeviceUnavailable(format!("can't create surface: {:?}", e)))?;

    let mut adapters = instance.enumerate_adapters();
    for adapter in &adapters {
        log::info!("{:?}", adapter.info);
    }
    if adapters.is_empty() {
        return Err(RenderError::DeviceUnavailable("no graphics adapter found".into()));
    }
    let adapter = adapters.remove(0);

    let size = window.inner_size();
    let dimensions = if size.width == 0 || size.height == 0 {
        DIMS
    } else {
        window::Extent2D {
            width: size.width,
            height: size.height,
        }
    };

    Renderer::new(instance, surface, adapter, dimensions)
}

fn fatal(error: RenderError) -> ! {
    log::error!("{}", error);
    std::process::exit(1);
}
