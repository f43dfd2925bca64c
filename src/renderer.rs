
use crate::entities::{self, CubeMesh, Spin};
use crate::cameras::{self, Camera};
use crate::error::RenderError;
use crate::pipelines::{CameraBlock, CullMode, Pipeline};

extern crate nalgebra as na;

use std::rc::Rc;
use std::time::Instant;
use gfx_hal as hal;

use hal::{
    adapter::MemoryType,
    buffer, command, format,
    format::ChannelType,
    image, memory,
    pool,
    prelude::*,
    pso,
    pso::ShaderStageFlags,
    queue::QueueGroup,
    window,
};

use std::{
    borrow::Borrow,
    iter,
    mem::{self, ManuallyDrop},
    ptr,
};

pub const CLEAR_COLOR: [f32; 4] = [0.5, 0.4, 0.7, 1.0];
pub const DEPTH_FORMAT: format::Format = format::Format::D32Sfloat;

/// Maximum number of frames being recorded or executed at once.
pub const FRAMES_IN_FLIGHT: usize = 3;

pub struct Renderer<B: hal::Backend> {
    desc_pool: ManuallyDrop<B::DescriptorPool>,
    surface: ManuallyDrop<B::Surface>,
    format: hal::format::Format,
    dimensions: window::Extent2D,
    viewport: pso::Viewport,
    depth: ManuallyDrop<DepthBuffer<B>>,
    framebuffer: ManuallyDrop<B::Framebuffer>,
    pipeline: Pipeline<B>,
    desc_set: Option<B::DescriptorSet>,
    set_layout: ManuallyDrop<B::DescriptorSetLayout>,
    submission_complete_semaphores: Vec<B::Semaphore>,
    submission_complete_fences: Vec<B::Fence>,
    cmd_pools: Vec<B::CommandPool>,
    cmd_buffers: Vec<B::CommandBuffer>,
    cube: CubeMesh,
    spin: Spin,
    vertex_buffer: ManuallyDrop<B::Buffer>,
    index_buffer: ManuallyDrop<B::Buffer>,
    camera_buffer: ManuallyDrop<B::Buffer>,
    vertex_buffer_memory: ManuallyDrop<B::Memory>,
    index_buffer_memory: ManuallyDrop<B::Memory>,
    camera_buffer_memory: ManuallyDrop<B::Memory>,
    memory_types: Vec<MemoryType>,
    frames_in_flight: usize,
    frame: u64,
    // These members are dropped in the declaration order.
    device: Rc<B::Device>,
    adapter: hal::adapter::Adapter<B>,
    queue_group: QueueGroup<B>,
    instance: B::Instance,
}

impl<B> Renderer<B>
where
    B: hal::Backend,
{
    /// Runs the one-time setup and returns a session ready to draw.
    pub fn new(
        instance: B::Instance,
        mut surface: B::Surface,
        adapter: hal::adapter::Adapter<B>,
        dimensions: window::Extent2D,
    ) -> Result<Renderer<B>, RenderError> {
        let memory_types = adapter.physical_device.memory_properties().memory_types;

        // Build a new device and associated command queues
        let family = adapter
            .queue_families
            .iter()
            .find(|family| {
                surface.supports_queue_family(family) && family.queue_type().supports_graphics()
            })
            .ok_or_else(|| {
                RenderError::DeviceUnavailable("no queue family supports presentation".into())
            })?;

        let mut gpu = unsafe {
            adapter
                .physical_device
                .open(&[(family, &[1.0])], hal::Features::empty())
        }
        .map_err(|e| RenderError::DeviceUnavailable(format!("can't open device: {:?}", e)))?;

        let queue_group = gpu
            .queue_groups
            .pop()
            .ok_or_else(|| RenderError::DeviceUnavailable("device returned no queues".into()))?;

        // Logical device
        let device = Rc::new(gpu.device);

        // View and projection live in one uniform buffer at set 0, binding 0.
        let camera_descriptor = pso::DescriptorType::Buffer {
            ty: pso::BufferDescriptorType::Uniform,
            format: pso::BufferDescriptorFormat::Structured {
                dynamic_offset: false,
            },
        };
        let slots = crate::pipelines::UniformSlots::resolve();

        let set_layout = ManuallyDrop::new(
            unsafe {
                device.create_descriptor_set_layout(
                    iter::once(pso::DescriptorSetLayoutBinding {
                        binding: slots.camera_binding,
                        ty: camera_descriptor,
                        count: 1,
                        stage_flags: ShaderStageFlags::VERTEX,
                        immutable_samplers: false,
                    }),
                    iter::empty(),
                )
            }
            .map_err(|e| RenderError::Allocation(format!("descriptor set layout: {:?}", e)))?,
        );

        let mut desc_pool = ManuallyDrop::new(
            unsafe {
                device.create_descriptor_pool(
                    1, // sets
                    iter::once(pso::DescriptorRangeDesc {
                        ty: camera_descriptor,
                        count: 1,
                    }),
                    pso::DescriptorPoolCreateFlags::empty(),
                )
            }
            .map_err(|e| RenderError::Allocation(format!("descriptor pool: {:?}", e)))?,
        );
        let mut desc_set = unsafe { desc_pool.allocate_one(&set_layout) }
            .map_err(|e| RenderError::Allocation(format!("descriptor set: {:?}", e)))?;

        // Swapchain
        let caps = surface.capabilities(&adapter.physical_device);
        let formats = surface.supported_formats(&adapter.physical_device);
        log::info!("surface formats: {:?}", formats);
        // Unorm keeps vertex colors as written; an sRGB target would re-encode them.
        let format = formats.map_or(format::Format::Rgba8Unorm, |formats| {
            formats
                .iter()
                .find(|format| format.base_format().1 == ChannelType::Unorm)
                .copied()
                .unwrap_or(formats[0])
        });

        let swap_config = window::SwapchainConfig::from_caps(&caps, format, dimensions);
        let fat = swap_config.framebuffer_attachment();
        log::info!("{:?}", swap_config);
        let extent = swap_config.extent;
        unsafe { surface.configure_swapchain(&*device, swap_config) }.map_err(|e| {
            RenderError::DeviceUnavailable(format!("can't configure swapchain: {:?}", e))
        })?;

        // Shaders are compiled and linked before any geometry is uploaded.
        let pipeline = Pipeline::new(device.clone(), format, DEPTH_FORMAT, &*set_layout)?;

        let cube = entities::build_cube(entities::CUBE_SIDE_LENGTH, &entities::DEFAULT_PALETTE)?;

        log::debug!("memory types: {:?}", memory_types);
        let (vertex_buffer, vertex_buffer_memory) =
            create_buffer::<B, f32>(&device, &memory_types, buffer::Usage::VERTEX, &cube.interleaved())?;
        let (index_buffer, index_buffer_memory) =
            create_buffer::<B, _>(&device, &memory_types, buffer::Usage::INDEX, cube.indices())?;

        // View and projection are fixed for the whole session.
        let aspect = extent.width as f32 / extent.height.max(1) as f32;
        let camera = cameras::LookAtCamera::new(aspect);
        let camera_block = CameraBlock {
            view: camera.view().into(),
            proj: (cameras::clip_correction() * camera.projection()).into(),
        };
        let (camera_buffer, camera_buffer_memory) = create_buffer::<B, _>(
            &device,
            &memory_types,
            buffer::Usage::UNIFORM,
            &[camera_block],
        )?;

        unsafe {
            device.write_descriptor_set(pso::DescriptorSetWrite {
                set: &mut desc_set,
                binding: slots.camera_binding,
                array_offset: 0,
                descriptors: iter::once(pso::Descriptor::Buffer(
                    &*camera_buffer,
                    buffer::SubRange::WHOLE,
                )),
            });
        }

        let depth = DepthBuffer::<B>::new(&device, &memory_types, extent)?;
        let framebuffer = create_framebuffer::<B>(&device, pipeline.render_pass(), fat, extent)?;

        let frames_in_flight = FRAMES_IN_FLIGHT;

        // One command pool per frame slot; each is reset as a whole when its slot comes round.
        let mut submission_complete_semaphores = Vec::with_capacity(frames_in_flight);
        let mut submission_complete_fences = Vec::with_capacity(frames_in_flight);
        let mut cmd_pools = Vec::with_capacity(frames_in_flight);
        let mut cmd_buffers = Vec::with_capacity(frames_in_flight);

        for _ in 0..frames_in_flight {
            let mut cmd_pool = unsafe {
                device.create_command_pool(queue_group.family, pool::CommandPoolCreateFlags::empty())
            }
            .map_err(|e| RenderError::Allocation(format!("command pool: {:?}", e)))?;
            cmd_buffers.push(unsafe { cmd_pool.allocate_one(command::Level::Primary) });
            cmd_pools.push(cmd_pool);

            submission_complete_semaphores.push(
                device
                    .create_semaphore()
                    .map_err(|e| RenderError::Allocation(format!("semaphore: {:?}", e)))?,
            );
            submission_complete_fences.push(
                device
                    .create_fence(true)
                    .map_err(|e| RenderError::Allocation(format!("fence: {:?}", e)))?,
            );
        }

        // Rendering setup
        let viewport = pso::Viewport {
            rect: pso::Rect {
                x: 0,
                y: 0,
                w: extent.width as _,
                h: extent.height as _,
            },
            depth: 0.0..1.0,
        };

        log::info!(
            "render session running: {} vertices, {} indices, {}x{}, aspect {:.3}",
            cube.vertices().len(),
            cube.index_count(),
            extent.width,
            extent.height,
            camera.aspect()
        );

        Ok(Renderer {
            instance,
            device,
            queue_group,
            desc_pool,
            surface: ManuallyDrop::new(surface),
            adapter,
            format,
            dimensions,
            viewport,
            depth: ManuallyDrop::new(depth),
            framebuffer: ManuallyDrop::new(framebuffer),
            pipeline,
            desc_set: Some(desc_set),
            set_layout,
            submission_complete_semaphores,
            submission_complete_fences,
            cmd_pools,
            cmd_buffers,
            cube,
            spin: Spin::new(),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            vertex_buffer_memory,
            index_buffer_memory,
            camera_buffer_memory,
            memory_types,
            frames_in_flight,
            frame: 0,
        })
    }

    pub fn recreate_swapchain(&mut self) {
        if let Err(e) = self.try_recreate_swapchain() {
            log::warn!("swapchain recreation failed: {}", e);
        }
    }

    fn try_recreate_swapchain(&mut self) -> Result<(), RenderError> {
        if !has_area(self.dimensions) {
            log::debug!("surface has no area, keeping the current swapchain");
            return Ok(());
        }

        let caps = self.surface.capabilities(&self.adapter.physical_device);
        let swap_config = window::SwapchainConfig::from_caps(&caps, self.format, self.dimensions);
        log::debug!("{:?}", swap_config);

        let fat = swap_config.framebuffer_attachment();
        let extent = swap_config.extent;
        self.viewport.rect.w = extent.width as _;
        self.viewport.rect.h = extent.height as _;

        self.device
            .wait_idle()
            .map_err(|e| RenderError::Allocation(format!("wait idle: {:?}", e)))?;

        unsafe { self.surface.configure_swapchain(&*self.device, swap_config) }
            .map_err(|e| RenderError::DeviceUnavailable(format!("can't configure swapchain: {:?}", e)))?;

        let depth = DepthBuffer::<B>::new(&self.device, &self.memory_types, extent)?;
        let framebuffer =
            create_framebuffer::<B>(&self.device, self.pipeline.render_pass(), fat, extent)?;

        unsafe {
            self.device
                .destroy_framebuffer(ManuallyDrop::into_inner(ptr::read(&self.framebuffer)));
            ManuallyDrop::into_inner(ptr::read(&self.depth)).destroy(&self.device);
        }
        self.framebuffer = ManuallyDrop::new(framebuffer);
        self.depth = ManuallyDrop::new(depth);

        Ok(())
    }

    /// The draw issued once before the frame loop starts.
    pub fn draw_initial(&mut self) {
        let (world, cull) = initial_draw();
        self.draw(world, cull);
    }

    /// Per-frame step: spin the cube to its current angle and draw it.
    pub fn render(&mut self) {
        let (world, cull) = frame_draw(&self.spin, Instant::now());
        self.draw(world, cull);
    }

    fn draw(&mut self, world: na::Matrix4<f32>, cull: CullMode) {
        // A minimized window keeps its old swapchain; there is nothing to draw into.
        if !has_area(self.dimensions) {
            return;
        }

        // Index into the per-frame resource rings; distinct from the swapchain image index.
        let frame_idx = self.frame as usize % self.frames_in_flight;

        // The fence guards reuse of this slot's command pool. It is only reset once an
        // image is in hand, so a failed acquire leaves it signalled for the next attempt.
        if let Err(e) = unsafe {
            self.device
                .wait_for_fence(&self.submission_complete_fences[frame_idx], !0)
        } {
            log::warn!("frame {}: fence wait failed: {:?}", self.frame, e);
            return;
        }

        let surface_image = unsafe {
            match self.surface.acquire_image(!0) {
                Ok((image, _)) => image,
                Err(e) => {
                    log::warn!("frame {}: can't acquire swapchain image: {:?}", self.frame, e);
                    self.recreate_swapchain();
                    return;
                }
            }
        };

        unsafe {
            if let Err(e) = self
                .device
                .reset_fence(&mut self.submission_complete_fences[frame_idx])
            {
                log::warn!("frame {}: fence reset failed: {:?}", self.frame, e);
                return;
            }
            self.cmd_pools[frame_idx].reset(false);
        }

        let world: [[f32; 4]; 4] = world.into();
        let surface_view: &B::ImageView = surface_image.borrow();
        let cmd_buffer = &mut self.cmd_buffers[frame_idx];
        unsafe {
            cmd_buffer.begin_primary(command::CommandBufferFlags::ONE_TIME_SUBMIT);

            cmd_buffer.set_viewports(0, iter::once(self.viewport.clone()));
            cmd_buffer.set_scissors(0, iter::once(self.viewport.rect));
            cmd_buffer.bind_graphics_pipeline(self.pipeline.pipeline(cull));

            cmd_buffer.bind_vertex_buffers(
                0,
                iter::once((&*self.vertex_buffer, buffer::SubRange::WHOLE)),
            );

            cmd_buffer.bind_index_buffer(
                &*self.index_buffer,
                buffer::SubRange::WHOLE,
                hal::IndexType::U16,
            );

            cmd_buffer.bind_graphics_descriptor_sets(
                self.pipeline.pipeline_layout(),
                0,
                self.desc_set.as_ref().into_iter(),
                iter::empty(),
            );

            cmd_buffer.begin_render_pass(
                self.pipeline.render_pass(),
                &self.framebuffer,
                self.viewport.rect,
                vec![
                    command::RenderAttachmentInfo {
                        image_view: surface_view,
                        clear_value: command::ClearValue {
                            color: command::ClearColor {
                                float32: CLEAR_COLOR,
                            },
                        },
                    },
                    command::RenderAttachmentInfo {
                        image_view: &self.depth.view,
                        clear_value: command::ClearValue {
                            depth_stencil: command::ClearDepthStencil {
                                depth: 1.0,
                                stencil: 0,
                            },
                        },
                    },
                ]
                .into_iter(),
                command::SubpassContents::Inline,
            );

            // Only the world matrix changes between frames.
            cmd_buffer.push_graphics_constants(
                self.pipeline.pipeline_layout(),
                ShaderStageFlags::VERTEX,
                self.pipeline.slots().world_push_range.0,
                push_constant_words(&world),
            );

            cmd_buffer.draw_indexed(0..self.cube.index_count(), 0, 0..1);
            cmd_buffer.end_render_pass();
            cmd_buffer.finish();

            self.queue_group.queues[0].submit(
                iter::once(&*cmd_buffer),
                iter::empty(),
                iter::once(&self.submission_complete_semaphores[frame_idx]),
                Some(&mut self.submission_complete_fences[frame_idx]),
            );

            // present frame
            let result = self.queue_group.queues[0].present(
                &mut self.surface,
                surface_image,
                Some(&mut self.submission_complete_semaphores[frame_idx]),
            );

            if let Err(e) = result {
                log::warn!("frame {}: present failed: {:?}", self.frame, e);
                self.recreate_swapchain();
            }
        }

        self.frame += 1;
    }

    pub fn dimensions_set(&mut self, dimensions: window::Extent2D) {
        self.dimensions = dimensions;
    }
}

impl<B> Drop for Renderer<B>
where
    B: hal::Backend,
{
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            log::warn!("device did not go idle before teardown: {:?}", e);
        }
        unsafe {
            let _ = self.desc_set.take();
            self.device.destroy_descriptor_pool(ManuallyDrop::into_inner(ptr::read(&self.desc_pool)));
            self.device.destroy_descriptor_set_layout(ManuallyDrop::into_inner(ptr::read(&self.set_layout)));

            self.device.destroy_buffer(ManuallyDrop::into_inner(ptr::read(&self.vertex_buffer)));
            self.device.destroy_buffer(ManuallyDrop::into_inner(ptr::read(&self.index_buffer)));
            self.device.destroy_buffer(ManuallyDrop::into_inner(ptr::read(&self.camera_buffer)));

            for p in self.cmd_pools.drain(..) {
                self.device.destroy_command_pool(p);
            }

            for s in self.submission_complete_semaphores.drain(..) {
                self.device.destroy_semaphore(s);
            }

            for f in self.submission_complete_fences.drain(..) {
                self.device.destroy_fence(f);
            }

            self.device.destroy_framebuffer(ManuallyDrop::into_inner(ptr::read(&self.framebuffer)));
            ManuallyDrop::into_inner(ptr::read(&self.depth)).destroy(&self.device);

            self.surface.unconfigure_swapchain(&*self.device);

            self.device.free_memory(ManuallyDrop::into_inner(ptr::read(&self.vertex_buffer_memory)));
            self.device.free_memory(ManuallyDrop::into_inner(ptr::read(&self.index_buffer_memory)));
            self.device.free_memory(ManuallyDrop::into_inner(ptr::read(&self.camera_buffer_memory)));

            self.instance.destroy_surface(ManuallyDrop::into_inner(ptr::read(&self.surface)));
        }
        log::debug!("render session torn down after {} frames", self.frame);
    }
}

/// World matrix and culling for the draw issued before the frame loop: identity, back faces culled.
fn initial_draw() -> (na::Matrix4<f32>, CullMode) {
    (na::Matrix4::identity(), CullMode::Back)
}

/// World matrix and culling for a frame-loop draw at `now`: spun cube, no culling.
fn frame_draw(spin: &Spin, now: Instant) -> (na::Matrix4<f32>, CullMode) {
    (spin.transform(now), CullMode::Disabled)
}

fn has_area(extent: window::Extent2D) -> bool {
    extent.width != 0 && extent.height != 0
}

/// Depth attachment sized to the swapchain.
struct DepthBuffer<B: hal::Backend> {
    image: B::Image,
    memory: B::Memory,
    view: B::ImageView,
}

impl<B: hal::Backend> DepthBuffer<B> {
    fn new(
        device: &B::Device,
        memory_types: &[MemoryType],
        extent: window::Extent2D,
    ) -> Result<Self, RenderError> {
        let mut image = unsafe {
            device.create_image(
                image::Kind::D2(extent.width, extent.height, 1, 1),
                1,
                DEPTH_FORMAT,
                image::Tiling::Optimal,
                image::Usage::DEPTH_STENCIL_ATTACHMENT,
                memory::SparseFlags::empty(),
                image::ViewCapabilities::empty(),
            )
        }
        .map_err(|e| RenderError::Allocation(format!("depth image: {:?}", e)))?;

        let requirements = unsafe { device.get_image_requirements(&image) };
        let memory_type = find_memory_type(
            memory_types,
            requirements.type_mask,
            memory::Properties::DEVICE_LOCAL,
        )?;

        let memory = unsafe {
            let memory = device
                .allocate_memory(memory_type, requirements.size)
                .map_err(|e| RenderError::Allocation(format!("depth memory: {:?}", e)))?;
            device
                .bind_image_memory(&memory, 0, &mut image)
                .map_err(|e| RenderError::Allocation(format!("depth bind: {:?}", e)))?;
            memory
        };

        let view = unsafe {
            device.create_image_view(
                &image,
                image::ViewKind::D2,
                DEPTH_FORMAT,
                format::Swizzle::NO,
                image::Usage::DEPTH_STENCIL_ATTACHMENT,
                image::SubresourceRange {
                    aspects: format::Aspects::DEPTH,
                    level_start: 0,
                    level_count: None,
                    layer_start: 0,
                    layer_count: None,
                },
            )
        }
        .map_err(|e| RenderError::Allocation(format!("depth view: {:?}", e)))?;

        Ok(Self { image, memory, view })
    }

    fn framebuffer_attachment() -> image::FramebufferAttachment {
        image::FramebufferAttachment {
            usage: image::Usage::DEPTH_STENCIL_ATTACHMENT,
            view_caps: image::ViewCapabilities::empty(),
            format: DEPTH_FORMAT,
        }
    }

    unsafe fn destroy(self, device: &B::Device) {
        device.destroy_image_view(self.view);
        device.destroy_image(self.image);
        device.free_memory(self.memory);
    }
}

fn create_framebuffer<B: hal::Backend>(
    device: &B::Device,
    render_pass: &B::RenderPass,
    color: image::FramebufferAttachment,
    extent: window::Extent2D,
) -> Result<B::Framebuffer, RenderError> {
    unsafe {
        device.create_framebuffer(
            render_pass,
            vec![color, DepthBuffer::<B>::framebuffer_attachment()].into_iter(),
            extent.to_extent(),
        )
    }
    .map_err(|e| RenderError::Allocation(format!("framebuffer: {:?}", e)))
}

/// First memory type allowed by `type_mask` that has all of `properties`.
fn find_memory_type(
    memory_types: &[MemoryType],
    type_mask: u32,
    properties: memory::Properties,
) -> Result<hal::MemoryTypeId, RenderError> {
    memory_types
        .iter()
        .enumerate()
        .position(|(id, mem_type)| {
            // Bit `id` of the mask is set when memory type `id` may back the resource.
            type_mask & (1 << id) != 0 && mem_type.properties.contains(properties)
        })
        .map(hal::MemoryTypeId::from)
        .ok_or_else(|| {
            RenderError::Allocation(format!("no memory type with {:?} in mask {:#b}", properties, type_mask))
        })
}

unsafe fn push_constant_words<T>(push_constants: &T) -> &[u32] {
    let size_in_bytes = mem::size_of::<T>();
    let size_in_u32s = size_in_bytes / mem::size_of::<u32>();
    let start_ptr = push_constants as *const T as *const u32;
    std::slice::from_raw_parts(start_ptr, size_in_u32s)
}

/// Creates a host-visible buffer and copies `src` into it once.
fn create_buffer<B: hal::Backend, T: Copy>(
    device: &B::Device,
    memory_types: &[MemoryType],
    usage: buffer::Usage,
    src: &[T],
) -> Result<(ManuallyDrop<B::Buffer>, ManuallyDrop<B::Memory>), RenderError> {
    let buffer_stride = mem::size_of::<T>() as u64;
    let buffer_len = src.len() as u64 * buffer_stride;
    if buffer_len == 0 {
        return Err(RenderError::Allocation(format!("{:?} buffer would be empty", usage)));
    }

    let mut buffer = ManuallyDrop::new(
        unsafe { device.create_buffer(buffer_len, usage, memory::SparseFlags::empty()) }
            .map_err(|e| RenderError::Allocation(format!("{:?} buffer: {:?}", usage, e)))?,
    );

    let buffer_req = unsafe { device.get_buffer_requirements(&buffer) };

    let upload_type = find_memory_type(
        memory_types,
        buffer_req.type_mask,
        memory::Properties::CPU_VISIBLE,
    )?;

    let buffer_memory = unsafe {
        let mut buffer_memory = device
            .allocate_memory(upload_type, buffer_req.size)
            .map_err(|e| RenderError::Allocation(format!("{:?} memory: {:?}", usage, e)))?;
        device
            .bind_buffer_memory(&buffer_memory, 0, &mut buffer)
            .map_err(|e| RenderError::Allocation(format!("{:?} bind: {:?}", usage, e)))?;

        let mapping = device
            .map_memory(&mut buffer_memory, memory::Segment::ALL)
            .map_err(|e| RenderError::Allocation(format!("{:?} map: {:?}", usage, e)))?;

        ptr::copy_nonoverlapping(src.as_ptr() as *const u8, mapping, buffer_len as usize);
        device
            .flush_mapped_memory_ranges(iter::once((&buffer_memory, memory::Segment::ALL)))
            .map_err(|e| RenderError::Allocation(format!("{:?} flush: {:?}", usage, e)))?;
        device.unmap_memory(&mut buffer_memory);
        ManuallyDrop::new(buffer_memory)
    };

    log::debug!("uploaded {} bytes to {:?} buffer", buffer_len, usage);
    Ok((buffer, buffer_memory))
}

#[cfg(test)]
mod tests {
    use super::na;
    use super::*;

    #[test]
    fn push_constants_are_column_major_words() {
        let m = na::Matrix4::new_translation(&na::Vector3::new(1.0, 2.0, 3.0));
        let cols: [[f32; 4]; 4] = m.into();
        let words = unsafe { push_constant_words(&cols) };
        assert_eq!(words.len(), 16);
        // Translation is the last column.
        assert_eq!(words[12], 1.0f32.to_bits());
        assert_eq!(words[13], 2.0f32.to_bits());
        assert_eq!(words[14], 3.0f32.to_bits());
        assert_eq!(words[15], 1.0f32.to_bits());
    }

    fn mem_type(properties: memory::Properties) -> MemoryType {
        MemoryType {
            properties,
            heap_index: 0,
        }
    }

    #[test]
    fn memory_type_respects_mask_and_properties() {
        let types = vec![
            mem_type(memory::Properties::DEVICE_LOCAL),
            mem_type(memory::Properties::CPU_VISIBLE | memory::Properties::COHERENT),
            mem_type(memory::Properties::CPU_VISIBLE),
        ];
        let id = find_memory_type(&types, 0b111, memory::Properties::CPU_VISIBLE).unwrap();
        assert_eq!(id, hal::MemoryTypeId(1));
        let id = find_memory_type(&types, 0b100, memory::Properties::CPU_VISIBLE).unwrap();
        assert_eq!(id, hal::MemoryTypeId(2));
        assert!(matches!(
            find_memory_type(&types, 0b110, memory::Properties::DEVICE_LOCAL),
            Err(RenderError::Allocation(_))
        ));
    }

    #[test]
    fn culling_is_on_for_the_initial_draw_only() {
        let (world, cull) = initial_draw();
        assert_eq!(world, na::Matrix4::identity());
        assert_eq!(cull, CullMode::Back);

        let start = Instant::now();
        let spin = Spin::starting_at(start);
        for ms in [0u64, 16, 1_000, 8_000] {
            let now = start + std::time::Duration::from_millis(ms);
            let (world, cull) = frame_draw(&spin, now);
            assert_eq!(cull, CullMode::Disabled);
            assert_eq!(world, spin.transform(now));
        }
    }

    #[test]
    fn zero_sized_surfaces_have_no_area() {
        let extent = |width, height| window::Extent2D { width, height };
        assert!(has_area(extent(960, 540)));
        assert!(!has_area(extent(0, 540)));
        assert!(!has_area(extent(960, 0)));
        assert!(!has_area(extent(0, 0)));
    }

    #[test]
    fn clear_color_is_opaque() {
        assert_eq!(CLEAR_COLOR[3], 1.0);
    }
}
