//! GPU compute-shader backend.
//!
//! The device, queue and compute pipeline are created once; every call uploads the
//! positions, dispatches one invocation per particle, copies the result into a staging
//! buffer and blocks until the map completes. That blocking `poll` is the completion
//! barrier, so timings taken around [`AccelerationBackend::acceleration`] include the
//! read-back.
use bytemuck::{Pod, Zeroable};
use log::{debug, info};
use ndarray::{Array2, ArrayView2};
use wgpu::util::DeviceExt;

use super::{validate_input, warm_up_positions, AccelerationBackend, BackendKind, ForceLaw, Mass};
use crate::utils::{axis_means, NBodyError, GPU_WORKGROUP_SIZE};

/// Largest dispatch along one axis permitted by the default limits.
const MAX_WORKGROUPS: u32 = 65_535;

/// Uniform block of the shader (matches WGSL `Params`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct KernelParams {
    count: u32,
    softening: f32,
    _pad0: u32,
    _pad1: u32,
}

/// All-pairs kernel on the first high-performance adapter wgpu can find.
pub struct GpuKernel {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    adapter_name: String,
}

impl GpuKernel {
    /// Acquires an adapter and device and compiles the shader.
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` if no adapter or device can be obtained, which is the normal
    /// outcome on headless machines without a GPU driver.
    pub fn new() -> Result<Self, NBodyError> {
        pollster::block_on(Self::request())
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    async fn request() -> Result<Self, NBodyError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let adapter_name = adapter.get_info().name;
        info!("Using GPU adapter: {}", adapter_name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("N-body Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Acceleration Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/acceleration.wgsl").into()),
        });

        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Acceleration Bind Group Layout"),
            entries: &[
                storage(0, true),
                storage(1, true),
                storage(2, false),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Acceleration Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Acceleration Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });
        debug!("Acceleration pipeline compiled");

        Ok(Self { device, queue, pipeline, bind_group_layout, adapter_name })
    }
}

impl AccelerationBackend for GpuKernel {
    fn kind(&self) -> BackendKind {
        BackendKind::GpuKernel
    }

    fn acceleration(&self, positions: ArrayView2<f64>, law: &ForceLaw) -> Result<Array2<f64>, NBodyError> {
        let n = validate_input(&positions, law)?;
        if n == 0 {
            return Ok(Array2::zeros((0, 3)));
        }
        let count = u32::try_from(n)
            .map_err(|_| NBodyError::CalculationError(format!("{} particles exceed the u32 index range", n)))?;
        let workgroups = count.div_ceil(GPU_WORKGROUP_SIZE);
        if workgroups > MAX_WORKGROUPS {
            return Err(NBodyError::CalculationError(format!(
                "{} particles need {} workgroups, the limit is {}",
                n, workgroups, MAX_WORKGROUPS
            )));
        }

        // Forces are translation invariant; centring before narrowing keeps more f32 bits.
        let centroid = axis_means(&positions);
        let padded: Vec<[f32; 4]> = positions
            .rows()
            .into_iter()
            .map(|r| {
                [
                    (r[0] - centroid[0]) as f32,
                    (r[1] - centroid[1]) as f32,
                    (r[2] - centroid[2]) as f32,
                    0.0,
                ]
            })
            .collect();
        let weights: Vec<f32> = match &law.mass {
            Mass::Uniform(_) => vec![1.0; n],
            Mass::PerParticle(masses) => masses.iter().map(|&m| m as f32).collect(),
        };
        let params = KernelParams {
            count,
            softening: law.softening as f32,
            _pad0: 0,
            _pad1: 0,
        };

        let position_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Position Buffer"),
            contents: bytemuck::cast_slice(&padded),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let weight_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Weight Buffer"),
            contents: bytemuck::cast_slice(&weights),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let params_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Kernel Params Buffer"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let output_size = (n * std::mem::size_of::<[f32; 4]>()) as u64;
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Acceleration Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Acceleration Staging Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Acceleration Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: position_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: weight_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: output_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: params_buffer.as_entire_binding() },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Acceleration Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Acceleration Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &staging_buffer, 0, output_size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| NBodyError::Gpu(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| NBodyError::Gpu(e.to_string()))?
            .map_err(|e| NBodyError::Gpu(e.to_string()))?;

        let mut acceleration = {
            let data = slice.get_mapped_range();
            let values: &[f32] = bytemuck::cast_slice(&data);
            Array2::from_shape_fn((n, 3), |(i, axis)| values[i * 4 + axis] as f64)
        };
        staging_buffer.unmap();

        acceleration *= law.mass.scale();
        Ok(acceleration)
    }

    /// Runs one small dispatch so driver-side pipeline creation is not timed.
    fn warm_up(&self) -> Result<(), NBodyError> {
        let positions = warm_up_positions();
        self.acceleration(positions.view(), &ForceLaw::unit())?;
        debug!("gpu-kernel warmed up on {}", self.adapter_name);
        Ok(())
    }
}

fn unavailable(reason: String) -> NBodyError {
    NBodyError::BackendUnavailable {
        backend: BackendKind::GpuKernel.name(),
        reason,
    }
}
