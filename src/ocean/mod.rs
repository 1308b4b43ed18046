//! Ocean simulation core: a fixed pipeline of GPU passes over persistent
//! frequency-domain textures.
//!
//! Per frame: evolve the initial spectrum to time t, inverse-FFT every
//! channel, merge into the surface textures. The initializer runs once per
//! wind epoch on the CPU. All GPU resources are owned here; the renderer
//! only ever receives read-only bind groups.

mod evolve;
mod merge;

use evolve::SpectrumEvaluator;
use merge::TextureMerger;

use crate::fft::FftTransformer;
use crate::params::{FoamParams, SpectrumModel, WindParameters};
use crate::spectrum::InitialSpectrum;

/// Evolved-spectrum channel textures: (height, disp-x), (disp-z, slope-x),
/// (slope-z, unused), two complex channels packed per texel
const SPECTRUM_CHANNELS: usize = 3;

/// Per-frame stage progression; stages must complete in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameStage {
    Idle,
    SpectrumEvaluated,
    Transformed,
}

/// One ping-pong pair of frequency/spatial grid textures.
///
/// Only the views are kept; the texture handles are not needed once the
/// bind groups referencing them exist.
struct ChannelTextures {
    views: [wgpu::TextureView; 2],
}

fn create_channel(device: &wgpu::Device, grid_size: u32, label: &str) -> ChannelTextures {
    let make = |slot: usize| {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("{} {}", label, slot)),
                size: wgpu::Extent3d {
                    width: grid_size,
                    height: grid_size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba32Float,
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::STORAGE_BINDING,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    };
    ChannelTextures {
        views: [make(0), make(1)],
    }
}

/// The simulation core. Owns every GPU resource of the pipeline and exposes
/// the merged surface textures as a read-only bind group.
pub struct OceanSystem {
    wind: WindParameters,
    model: SpectrumModel,
    foam: FoamParams,
    initial_texture: wgpu::Texture,
    evaluator: SpectrumEvaluator,
    transformer: FftTransformer,
    merger: TextureMerger,
    surface_layout: wgpu::BindGroupLayout,
    surface_bind_groups: Vec<wgpu::BindGroup>,
    frame_index: u64,
    stage: FrameStage,
}

impl OceanSystem {
    /// Validate parameters, generate and upload the initial spectrum, and
    /// build every pipeline of the frame loop. Fails before any GPU
    /// resource is created if the parameters are invalid; a failed
    /// allocation propagates out of wgpu as a device error and no partially
    /// initialized system is returned.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        wind: WindParameters,
        model: SpectrumModel,
        foam: FoamParams,
    ) -> Result<Self, String> {
        let spectrum = InitialSpectrum::generate(&wind, &model)?;
        let summary = spectrum.summary();
        log::info!(
            "initial spectrum: total energy {:.3e}, peak wavelength {:.1}m",
            summary.total_energy,
            summary.peak_wavelength_m
        );

        let n = wind.grid_size;
        let initial_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Initial Spectrum Texture"),
            size: wgpu::Extent3d {
                width: n,
                height: n,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        upload_spectrum(queue, &initial_texture, &spectrum);
        let initial_view = initial_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let channels: Vec<ChannelTextures> = ["Spectrum HD", "Spectrum DS", "Spectrum S"]
            .iter()
            .map(|label| create_channel(device, n, label))
            .collect();
        debug_assert_eq!(channels.len(), SPECTRUM_CHANNELS);

        let evaluator = SpectrumEvaluator::new(
            device,
            n,
            wind.domain_length_m,
            &initial_view,
            [
                &channels[0].views[0],
                &channels[1].views[0],
                &channels[2].views[0],
            ],
        );

        let channel_view_pairs: Vec<[&wgpu::TextureView; 2]> = channels
            .iter()
            .map(|c| [&c.views[0], &c.views[1]])
            .collect();
        let transformer = FftTransformer::new(device, queue, n, &channel_view_pairs);

        // Double-buffered merged output so the renderer always binds a
        // complete set while the current frame is still being written
        let displacement = [
            create_merged_texture(device, n, "Displacement Texture 0"),
            create_merged_texture(device, n, "Displacement Texture 1"),
        ];
        let normal = [
            create_merged_texture(device, n, "Normal Texture 0"),
            create_merged_texture(device, n, "Normal Texture 1"),
        ];
        let displacement_views = [
            displacement[0].create_view(&wgpu::TextureViewDescriptor::default()),
            displacement[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];
        let normal_views = [
            normal[0].create_view(&wgpu::TextureViewDescriptor::default()),
            normal[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];

        let merger = TextureMerger::new(
            device,
            n,
            [
                &channels[0].views[0],
                &channels[1].views[0],
                &channels[2].views[0],
            ],
            [&displacement_views[0], &displacement_views[1]],
            [&normal_views[0], &normal_views[1]],
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Surface Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let surface_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Surface Bind Group Layout"),
            entries: &[
                surface_texture_entry(0),
                surface_texture_entry(1),
                surface_texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let surface_bind_groups = (0..2)
            .map(|parity| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Surface Bind Group {}", parity)),
                    layout: &surface_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(
                                &displacement_views[parity],
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&normal_views[parity]),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(
                                merger.foam_view(parity),
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                })
            })
            .collect();

        log::info!(
            "ocean system ready: {}x{} grid over {:.0}m patch",
            n,
            n,
            wind.domain_length_m
        );

        Ok(Self {
            wind,
            model,
            foam,
            initial_texture,
            evaluator,
            transformer,
            merger,
            surface_layout,
            surface_bind_groups,
            frame_index: 0,
            stage: FrameStage::Idle,
        })
    }

    pub fn wind(&self) -> &WindParameters {
        &self.wind
    }

    /// Re-run the spectrum initializer with new wind parameters without
    /// rebuilding the pipelines. Grid size and patch length are baked into
    /// texture allocations and pass uniforms, so changing either requires
    /// constructing a new system.
    pub fn reconfigure(&mut self, queue: &wgpu::Queue, wind: WindParameters) -> Result<(), String> {
        if wind.grid_size != self.wind.grid_size {
            return Err(format!(
                "grid_size change ({} -> {}) requires a new OceanSystem",
                self.wind.grid_size, wind.grid_size
            ));
        }
        if wind.domain_length_m != self.wind.domain_length_m {
            return Err(format!(
                "domain_length change ({} -> {}) requires a new OceanSystem",
                self.wind.domain_length_m, wind.domain_length_m
            ));
        }
        let spectrum = InitialSpectrum::generate(&wind, &self.model)?;
        let summary = spectrum.summary();
        log::info!(
            "reconfigured spectrum: total energy {:.3e}, peak wavelength {:.1}m",
            summary.total_energy,
            summary.peak_wavelength_m
        );
        upload_spectrum(queue, &self.initial_texture, &spectrum);
        self.merger.reset_foam(queue);
        self.wind = wind;
        Ok(())
    }

    /// Record one full simulation frame: evaluate, transform, merge.
    ///
    /// Passes are recorded in strict dependency order on a single timeline;
    /// the queue's read-after-write barriers do the rest.
    pub fn simulate(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        time_s: f32,
        dt_s: f32,
    ) {
        self.evaluate_spectrum(encoder, queue, time_s);
        self.transform(encoder);
        self.merge(encoder, queue, dt_s);
    }

    fn evaluate_spectrum(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        time_s: f32,
    ) {
        debug_assert_eq!(self.stage, FrameStage::Idle);
        self.evaluator.record(encoder, queue, time_s);
        self.stage = FrameStage::SpectrumEvaluated;
    }

    fn transform(&mut self, encoder: &mut wgpu::CommandEncoder) {
        debug_assert_eq!(self.stage, FrameStage::SpectrumEvaluated);
        self.transformer.record(encoder);
        self.stage = FrameStage::Transformed;
    }

    fn merge(&mut self, encoder: &mut wgpu::CommandEncoder, queue: &wgpu::Queue, dt_s: f32) {
        debug_assert_eq!(self.stage, FrameStage::Transformed);
        let parity = (self.frame_index % 2) as usize;
        self.merger
            .record(encoder, queue, parity, &self.wind, &self.foam, dt_s);
        self.frame_index += 1;
        self.stage = FrameStage::Idle;
    }

    /// Layout for the renderer's surface-texture bindings
    pub fn surface_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.surface_layout
    }

    /// Surface textures of the last completed frame.
    ///
    /// One frame of latency by design: the set currently being written is
    /// never exposed, so the renderer always sees a consistent surface.
    pub fn surface_bind_group(&self) -> &wgpu::BindGroup {
        &self.surface_bind_groups[(self.frame_index % 2) as usize]
    }
}

fn upload_spectrum(queue: &wgpu::Queue, texture: &wgpu::Texture, spectrum: &InitialSpectrum) {
    let n = spectrum.grid_size;
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(&spectrum.data),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(n * 16),
            rows_per_image: Some(n),
        },
        wgpu::Extent3d {
            width: n,
            height: n,
            depth_or_array_layers: 1,
        },
    );
}

fn create_merged_texture(device: &wgpu::Device, grid_size: u32, label: &str) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: grid_size,
            height: grid_size,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba16Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::STORAGE_BINDING,
        view_formats: &[],
    })
}

fn surface_texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}
