use crate::entities::Vertex;
use crate::error::RenderError;

use super::shaders::{self, ShaderStage};

use std::rc::Rc;

use gfx_hal as hal;

use hal::{
    format,
    image, pass,
    pass::Subpass,
    prelude::*,
    pso,
    pso::{
        ShaderStageFlags, VertexInputRate, InputAssemblerDesc,
        Primitive, PrimitiveAssemblerDesc
    },
};

use std::{
    iter,
    mem::{self, ManuallyDrop},
    ptr,
};

const ENTRY_NAME: &str = "main";

type Mat4 = [[f32; 4]; 4];

/// Where each matrix uniform lives once the pipeline layout is built.
///
/// `mWorld` changes every frame and goes through push constants; `mView` and
/// `mProj` are written once into the uniform buffer at set 0, binding 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlots {
    pub world_push_range: (u32, u32),
    pub camera_binding: u32,
    pub view_offset: u64,
    pub proj_offset: u64,
}

impl UniformSlots {
    pub const fn resolve() -> Self {
        let mat = mem::size_of::<Mat4>();
        Self {
            world_push_range: (0, mat as u32),
            camera_binding: 0,
            view_offset: 0,
            proj_offset: mat as u64,
        }
    }
}

/// Contents of the camera uniform buffer, matching the `Camera` block in the
/// vertex shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBlock {
    pub view: Mat4,
    pub proj: Mat4,
}

/// Whether back faces are discarded by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    Back,
    Disabled,
}

impl CullMode {
    fn face(self) -> pso::Face {
        match self {
            CullMode::Back => pso::Face::BACK,
            CullMode::Disabled => pso::Face::NONE,
        }
    }
}

/// Render pass, layout and the two graphics pipeline variants for the cube.
pub struct Pipeline<B: hal::Backend> {
    device: Rc<B::Device>,
    render_pass: ManuallyDrop<B::RenderPass>,
    pipeline_layout: ManuallyDrop<B::PipelineLayout>,
    culled: ManuallyDrop<B::GraphicsPipeline>,
    unculled: ManuallyDrop<B::GraphicsPipeline>,
    slots: UniformSlots,
}


impl<B: hal::Backend> Pipeline<B> {
    pub fn new(
        device: Rc<B::Device>,
        format: format::Format,
        depth_format: format::Format,
        set_layout: &B::DescriptorSetLayout,
    ) -> Result<Self, RenderError> {
        // Compile before touching the device so a bad shader leaves nothing behind.
        let vs_spirv = shaders::compile_stage(ShaderStage::Vertex, shaders::CUBE_VERTEX_SHADER)?;
        let fs_spirv = shaders::compile_stage(ShaderStage::Fragment, shaders::CUBE_FRAGMENT_SHADER)?;

        let slots = UniformSlots::resolve();
        let render_pass = create_render_pass::<B>(&device, format, depth_format)?;
        let pipeline_layout = match create_pipeline_layout::<B>(&device, set_layout, &slots) {
            Ok(layout) => layout,
            Err(e) => {
                unsafe { device.destroy_render_pass(render_pass) };
                return Err(e);
            }
        };

        let pipelines =
            create_pipelines::<B>(&device, &render_pass, &pipeline_layout, &vs_spirv, &fs_spirv);
        let (culled, unculled) = match pipelines {
            Ok(pair) => pair,
            Err(e) => {
                unsafe {
                    device.destroy_pipeline_layout(pipeline_layout);
                    device.destroy_render_pass(render_pass);
                }
                return Err(e);
            }
        };

        log::info!("cube pipelines linked");

        Ok(Self {
            device,
            render_pass: ManuallyDrop::new(render_pass),
            pipeline_layout: ManuallyDrop::new(pipeline_layout),
            culled: ManuallyDrop::new(culled),
            unculled: ManuallyDrop::new(unculled),
            slots,
        })
    }

    pub fn render_pass(&self) -> &B::RenderPass {
        &*self.render_pass
    }

    pub fn pipeline_layout(&self) -> &B::PipelineLayout {
        &*self.pipeline_layout
    }

    pub fn pipeline(&self, cull: CullMode) -> &B::GraphicsPipeline {
        match cull {
            CullMode::Back => &*self.culled,
            CullMode::Disabled => &*self.unculled,
        }
    }

    pub fn slots(&self) -> &UniformSlots {
        &self.slots
    }
}

impl<B> Drop for Pipeline<B> where B: hal::Backend {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            log::warn!("device did not go idle before pipeline teardown: {:?}", e);
        }

        unsafe {
            self.device
                .destroy_graphics_pipeline(ManuallyDrop::into_inner(ptr::read(&self.culled)));
            self.device
                .destroy_graphics_pipeline(ManuallyDrop::into_inner(ptr::read(&self.unculled)));

            self.device
                .destroy_pipeline_layout(ManuallyDrop::into_inner(ptr::read(
                    &self.pipeline_layout,
                )));

            self.device
                .destroy_render_pass(ManuallyDrop::into_inner(ptr::read(
                    &self.render_pass,
                )));
        }
    }
}

fn create_render_pass<B: hal::Backend>(
    device: &B::Device,
    format: format::Format,
    depth_format: format::Format,
) -> Result<B::RenderPass, RenderError> {
    let color = pass::Attachment {
        format: Some(format),
        samples: 1,
        ops: pass::AttachmentOps::new(
            pass::AttachmentLoadOp::Clear,
            pass::AttachmentStoreOp::Store,
        ),
        stencil_ops: pass::AttachmentOps::DONT_CARE,
        layouts: image::Layout::Undefined..image::Layout::Present,
    };

    let depth = pass::Attachment {
        format: Some(depth_format),
        samples: 1,
        ops: pass::AttachmentOps::new(
            pass::AttachmentLoadOp::Clear,
            pass::AttachmentStoreOp::DontCare,
        ),
        stencil_ops: pass::AttachmentOps::DONT_CARE,
        layouts: image::Layout::Undefined..image::Layout::DepthStencilAttachmentOptimal,
    };

    let subpass = pass::SubpassDesc {
        colors: &[(0, image::Layout::ColorAttachmentOptimal)],
        depth_stencil: Some(&(1, image::Layout::DepthStencilAttachmentOptimal)),
        inputs: &[],
        resolves: &[],
        preserves: &[],
    };

    unsafe {
        device.create_render_pass(
            vec![color, depth].into_iter(),
            iter::once(subpass),
            iter::empty(),
        )
    }
    .map_err(|e| RenderError::ProgramLink(format!("can't create render pass: {:?}", e)))
}

fn create_pipeline_layout<B: hal::Backend>(
    device: &B::Device,
    set_layout: &B::DescriptorSetLayout,
    slots: &UniformSlots,
) -> Result<B::PipelineLayout, RenderError> {
    let (start, end) = slots.world_push_range;

    unsafe {
        device.create_pipeline_layout(
            iter::once(set_layout),
            [(ShaderStageFlags::VERTEX, start..end)].into_iter(),
        )
    }
    .map_err(|e| RenderError::ProgramLink(format!("can't create pipeline layout: {:?}", e)))
}

fn create_shader_module<B: hal::Backend>(
    device: &B::Device,
    spirv: &[u32],
) -> Result<B::ShaderModule, RenderError> {
    unsafe { device.create_shader_module(spirv) }
        .map_err(|e| RenderError::ProgramLink(format!("can't create shader module: {:?}", e)))
}

/// Both results, or the first error after `release` has taken whichever one succeeded.
fn keep_pair<T>(
    first: Result<T, RenderError>,
    second: Result<T, RenderError>,
    mut release: impl FnMut(T),
) -> Result<(T, T), RenderError> {
    match (first, second) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Ok(a), Err(e)) => {
            release(a);
            Err(e)
        }
        (Err(e), Ok(b)) => {
            release(b);
            Err(e)
        }
        (Err(e), Err(_)) => Err(e),
    }
}

/// Culled and unculled pipelines. The shader modules only live for the duration of this call.
fn create_pipelines<B: hal::Backend>(
    device: &B::Device,
    render_pass: &B::RenderPass,
    pipeline_layout: &B::PipelineLayout,
    vs_spirv: &[u32],
    fs_spirv: &[u32],
) -> Result<(B::GraphicsPipeline, B::GraphicsPipeline), RenderError> {
    let (vs_module, fs_module) = keep_pair(
        create_shader_module::<B>(device, vs_spirv),
        create_shader_module::<B>(device, fs_spirv),
        |module| unsafe { device.destroy_shader_module(module) },
    )?;

    let culled = create_pipeline::<B>(
        device, render_pass, pipeline_layout, &vs_module, &fs_module, CullMode::Back,
    );
    let unculled = create_pipeline::<B>(
        device, render_pass, pipeline_layout, &vs_module, &fs_module, CullMode::Disabled,
    );

    unsafe {
        device.destroy_shader_module(vs_module);
        device.destroy_shader_module(fs_module);
    }

    keep_pair(culled, unculled, |pipeline| unsafe {
        device.destroy_graphics_pipeline(pipeline)
    })
}

/// Depth state shared by both pipelines: nearer fragments win, ties keep the earlier one.
fn depth_test() -> pso::DepthTest {
    pso::DepthTest {
        fun: pso::Comparison::Less,
        write: true,
    }
}

fn create_pipeline<B: hal::Backend>(
    device: &B::Device,
    render_pass: &B::RenderPass,
    pipeline_layout: &B::PipelineLayout,
    vs_module: &B::ShaderModule,
    fs_module: &B::ShaderModule,
    cull: CullMode,
) -> Result<B::GraphicsPipeline, RenderError> {
    let (vs_entry, fs_entry) = (
        pso::EntryPoint {
            entry: ENTRY_NAME,
            module: vs_module,
            specialization: pso::Specialization::default(),
        },
        pso::EntryPoint {
            entry: ENTRY_NAME,
            module: fs_module,
            specialization: pso::Specialization::default(),
        },
    );

    // One interleaved buffer: vertPosition at location 0, vertColor at location 1.
    let buffers = [pso::VertexBufferDesc {
        binding: 0,
        stride: mem::size_of::<Vertex>() as u32,
        rate: VertexInputRate::Vertex,
    }];

    let attributes = [
        pso::AttributeDesc {
            location: 0,
            binding: 0,
            element: pso::Element {
                format: format::Format::Rgb32Sfloat,
                offset: 0,
            },
        },
        pso::AttributeDesc {
            location: 1,
            binding: 0,
            element: pso::Element {
                format: format::Format::Rgb32Sfloat,
                offset: mem::size_of::<[f32; 3]>() as u32,
            },
        },
    ];

    let primitive_assembler = PrimitiveAssemblerDesc::Vertex {
        buffers: &buffers,
        attributes: &attributes,
        input_assembler: InputAssemblerDesc::new(Primitive::TriangleList),
        vertex: vs_entry,
        tessellation: None,
        geometry: None,
    };

    let subpass = Subpass {
        index: 0,
        main_pass: render_pass,
    };

    let mut pipeline_desc = pso::GraphicsPipelineDesc::new(
        primitive_assembler,
        pso::Rasterizer {
            cull_face: cull.face(),
            ..pso::Rasterizer::FILL
        },
        Some(fs_entry),
        pipeline_layout,
        subpass,
    );

    pipeline_desc.depth_stencil = pso::DepthStencilDesc {
        depth: Some(depth_test()),
        depth_bounds: false,
        stencil: None,
    };

    pipeline_desc.blender.targets.push(pso::ColorBlendDesc {
        mask: pso::ColorMask::ALL,
        blend: None,
    });

    unsafe { device.create_graphics_pipeline(&pipeline_desc, None) }.map_err(|e| {
        RenderError::ProgramLink(format!("{:?} pipeline: {:?}", cull, e))
    })
}
