//! Inverse FFT transformer: butterfly lookup texture plus ping-pong compute
//! passes over the evolved spectrum channels.

pub mod butterfly;
pub mod reference;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use butterfly::ButterflyTable;

/// Compute workgroup side length; dispatches cover the grid in 16x16 tiles
pub const WORKGROUP_SIZE: u32 = 16;

/// Per-pass uniform data
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FftPassParams {
    pass_index: u32,
    grid_size: u32,
    _pad0: u32,
    _pad1: u32,
}

/// GPU inverse-FFT over a set of packed complex-channel texture pairs.
///
/// Each channel is a ping-pong pair of Rgba32Float textures; the evolved
/// spectrum enters in slot 0 and, because 2 * log2(N) passes is always even,
/// the spatial-domain result lands back in slot 0. Butterfly stages may not
/// reorder: every pass reads the complete output of the previous one, so
/// each stage is recorded as its own compute pass and the driver inserts the
/// read-after-write barriers between them.
pub struct FftTransformer {
    grid_size: u32,
    passes: u32,
    row_pipeline: wgpu::ComputePipeline,
    col_pipeline: wgpu::ComputePipeline,
    /// bind_groups[channel][global_pass]
    bind_groups: Vec<Vec<wgpu::BindGroup>>,
}

impl FftTransformer {
    /// Build pipelines, the butterfly lookup texture, and one bind group per
    /// (channel, pass). `channel_views` are the ping-pong view pairs of each
    /// spectrum channel texture.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        grid_size: u32,
        channel_views: &[[&wgpu::TextureView; 2]],
    ) -> Self {
        let table = ButterflyTable::new(grid_size);
        let passes = table.passes;

        let butterfly_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("FFT Butterfly Texture"),
            size: wgpu::Extent3d {
                width: grid_size,
                height: passes,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &butterfly_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&table.data),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(grid_size * 16),
                rows_per_image: Some(passes),
            },
            wgpu::Extent3d {
                width: grid_size,
                height: passes,
                depth_or_array_layers: 1,
            },
        );
        let butterfly_view = butterfly_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("FFT Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba32Float,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("FFT Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("fft.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("FFT Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let row_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("FFT Row Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("fft_row"),
            compilation_options: Default::default(),
            cache: None,
        });
        let col_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("FFT Column Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("fft_col"),
            compilation_options: Default::default(),
            cache: None,
        });

        // One small uniform per pass-within-axis; row and column passes at
        // the same depth share it
        let pass_uniforms: Vec<wgpu::Buffer> = (0..passes)
            .map(|p| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("FFT Pass Uniform {}", p)),
                    contents: bytemuck::cast_slice(&[FftPassParams {
                        pass_index: p,
                        grid_size,
                        _pad0: 0,
                        _pad1: 0,
                    }]),
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            })
            .collect();

        let bind_groups = channel_views
            .iter()
            .enumerate()
            .map(|(channel, views)| {
                (0..passes * 2)
                    .map(|global_pass| {
                        let src = views[(global_pass % 2) as usize];
                        let dst = views[((global_pass + 1) % 2) as usize];
                        device.create_bind_group(&wgpu::BindGroupDescriptor {
                            label: Some(&format!(
                                "FFT Bind Group ch{} pass{}",
                                channel, global_pass
                            )),
                            layout: &bind_group_layout,
                            entries: &[
                                wgpu::BindGroupEntry {
                                    binding: 0,
                                    resource: wgpu::BindingResource::TextureView(&butterfly_view),
                                },
                                wgpu::BindGroupEntry {
                                    binding: 1,
                                    resource: wgpu::BindingResource::TextureView(src),
                                },
                                wgpu::BindGroupEntry {
                                    binding: 2,
                                    resource: wgpu::BindingResource::TextureView(dst),
                                },
                                wgpu::BindGroupEntry {
                                    binding: 3,
                                    resource: pass_uniforms[(global_pass % passes) as usize]
                                        .as_entire_binding(),
                                },
                            ],
                        })
                    })
                    .collect()
            })
            .collect();

        log::debug!(
            "fft transformer ready: {} passes per axis over {} channels",
            passes,
            channel_views.len()
        );

        Self {
            grid_size,
            passes,
            row_pipeline,
            col_pipeline,
            bind_groups,
        }
    }

    /// Record all 2 * log2(N) butterfly stages for every channel.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder) {
        let workgroups = self.grid_size.div_ceil(WORKGROUP_SIZE);
        for global_pass in 0..self.passes * 2 {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("FFT Butterfly Pass"),
                timestamp_writes: None,
            });
            if global_pass < self.passes {
                cpass.set_pipeline(&self.row_pipeline);
            } else {
                cpass.set_pipeline(&self.col_pipeline);
            }
            for channel_groups in &self.bind_groups {
                cpass.set_bind_group(0, &channel_groups[global_pass as usize], &[]);
                cpass.dispatch_workgroups(workgroups, workgroups, 1);
            }
        }
    }
}
