//! Entry point for labkit: the shared loader shell of the lab variants.
//! Loads a model and its shader sources, reports what a renderer receives,
//! and optionally uploads the mesh to a headless GPU device.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use asset::{FlattenedBuffer, ShaderSource};
use corelib::{Attribute, ShaderStage};

const DEFAULT_MODEL: &str = "Models/monkey/monkey.obj";
const DEFAULT_VERTEX_SHADER: &str = "Shaders/vert.shader.glsl";
const DEFAULT_FRAGMENT_SHADER: &str = "Shaders/frag.shader.glsl";

struct Args {
    model: PathBuf,
    vertex_shader: PathBuf,
    fragment_shader: PathBuf,
    /// Extra stages given as `--shader=path`, typed by file name.
    shaders: Vec<PathBuf>,
    upload: bool,
}

fn parse_args() -> Args {
    // Accept: --model=path --vertex-shader=path --fragment-shader=path
    //         --shader=path (repeatable) --upload[=on|off]
    let mut args = Args {
        model: DEFAULT_MODEL.into(),
        vertex_shader: DEFAULT_VERTEX_SHADER.into(),
        fragment_shader: DEFAULT_FRAGMENT_SHADER.into(),
        shaders: Vec::new(),
        upload: false,
    };
    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--model=") {
            args.model = v.into();
        } else if let Some(v) = arg.strip_prefix("--vertex-shader=") {
            args.vertex_shader = v.into();
        } else if let Some(v) = arg.strip_prefix("--fragment-shader=") {
            args.fragment_shader = v.into();
        } else if let Some(v) = arg.strip_prefix("--shader=") {
            args.shaders.push(v.into());
        } else if arg == "--upload" {
            args.upload = true;
        } else if let Some(v) = arg.strip_prefix("--upload=") {
            args.upload = matches!(
                v.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        } else {
            log::warn!("Ignoring unknown argument '{}'", arg);
        }
    }
    args
}

/// Stage named by a dot-separated part of the file name, last part first:
/// `cube.vert`, `cube.cont` and `vert.shader.glsl` all resolve.
fn stage_from_path(path: &Path) -> Result<ShaderStage> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Shader path {} has no file name", path.display()))?;
    name.rsplit('.')
        .find_map(|part| part.parse::<ShaderStage>().ok())
        .with_context(|| format!("Cannot tell the shader stage of {}", path.display()))
}

/// Stage list to load: the vertex/fragment pair plus any `--shader` files.
/// A `--shader` of the vertex or fragment stage replaces the default path.
fn shader_plan(args: &Args) -> Result<Vec<(ShaderStage, PathBuf)>> {
    let mut plan = vec![
        (ShaderStage::Vertex, args.vertex_shader.clone()),
        (ShaderStage::Fragment, args.fragment_shader.clone()),
    ];
    let mut overridden = Vec::new();
    for path in &args.shaders {
        let stage = stage_from_path(path)?;
        if overridden.contains(&stage) {
            bail!("More than one {} shader given", stage);
        }
        overridden.push(stage);
        match plan.iter_mut().find(|(s, _)| *s == stage) {
            Some(entry) => entry.1 = path.clone(),
            None => plan.push((stage, path.clone())),
        }
    }
    plan.sort_by_key(|(stage, _)| *stage);
    Ok(plan)
}

fn report_layout(flattened: &FlattenedBuffer) {
    let layout = flattened.layout();
    log::info!(
        "Model: {} faces, {} vertices, {} floats",
        flattened.face_count(),
        layout.vertex_count,
        flattened.len()
    );
    for attribute in Attribute::BLOCK_ORDER {
        let range = layout.byte_range(attribute);
        log::info!(
            "  location {} {:<18} bytes {}..{}",
            attribute.location(),
            attribute.name(),
            range.start,
            range.end
        );
    }
}

fn upload_headless(flattened: &FlattenedBuffer) -> Result<()> {
    if flattened.is_empty() {
        log::warn!("Model has no faces; nothing to upload");
        return Ok(());
    }

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok_or_else(|| anyhow!("No suitable GPU adapter"))?;

    let (device, _queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("labkit device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: Default::default(),
        },
        None,
    ))
    .context("request_device failed")?;

    let mesh = renderer::upload_flattened(&device, "model VB", flattened)?;
    log::info!(
        "GPU buffer ready: {} vertices, {} bytes on {}",
        mesh.vertex_count(),
        mesh.buffer.size(),
        adapter.get_info().name
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    log::info!("Starting labkit. model={:?}, upload={}", args.model, args.upload);

    let mesh = asset::load_obj_from_path(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;
    let flattened = asset::flatten(&mesh)
        .with_context(|| format!("Failed to resolve faces of {}", args.model.display()))?;
    report_layout(&flattened);

    for (stage, path) in shader_plan(&args)? {
        let source = ShaderSource::load(stage, &path)
            .with_context(|| format!("Failed to load {} shader", stage))?;
        log::info!("{} shader: {} lines", stage, source.text.lines().count());
    }

    if args.upload {
        upload_headless(&flattened)?;
    }

    log::info!("Done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn args_with(shaders: &[&str]) -> Args {
        Args {
            model: DEFAULT_MODEL.into(),
            vertex_shader: DEFAULT_VERTEX_SHADER.into(),
            fragment_shader: DEFAULT_FRAGMENT_SHADER.into(),
            shaders: shaders.iter().map(PathBuf::from).collect(),
            upload: false,
        }
    }

    #[rstest]
    #[case("shaders/cube.vert", ShaderStage::Vertex)]
    #[case("shaders/cube.cont", ShaderStage::TessControl)]
    #[case("shaders/cube.eval", ShaderStage::TessEvaluation)]
    #[case("shaders/cube.geom", ShaderStage::Geometry)]
    #[case("shaders/cube.frag", ShaderStage::Fragment)]
    #[case("Shaders/vert.shader.glsl", ShaderStage::Vertex)]
    #[case("Shaders/frag.shader.glsl", ShaderStage::Fragment)]
    fn stage_comes_from_file_name(#[case] path: &str, #[case] expected: ShaderStage) {
        assert_eq!(stage_from_path(Path::new(path)).unwrap(), expected);
    }

    #[rstest]
    #[case("shaders/cube.glsl")]
    #[case("shaders/cube")]
    #[case("..")]
    fn unknown_stage_is_an_error(#[case] path: &str) {
        assert!(stage_from_path(Path::new(path)).is_err());
    }

    #[test]
    fn default_plan_is_vertex_then_fragment() {
        let plan = shader_plan(&args_with(&[])).unwrap();
        assert_eq!(
            plan,
            vec![
                (ShaderStage::Vertex, PathBuf::from(DEFAULT_VERTEX_SHADER)),
                (ShaderStage::Fragment, PathBuf::from(DEFAULT_FRAGMENT_SHADER)),
            ]
        );
    }

    #[test]
    fn extra_stages_are_ordered_by_pipeline_position() {
        let plan = shader_plan(&args_with(&[
            "shaders/cube.frag",
            "shaders/cube.eval",
            "shaders/cube.cont",
        ]))
        .unwrap();
        let stages: Vec<_> = plan.iter().map(|(stage, _)| *stage).collect();
        assert_eq!(
            stages,
            [
                ShaderStage::Vertex,
                ShaderStage::TessControl,
                ShaderStage::TessEvaluation,
                ShaderStage::Fragment,
            ]
        );
        assert_eq!(plan[3].1, PathBuf::from("shaders/cube.frag"));
    }

    #[test]
    fn repeated_stage_is_rejected() {
        assert!(shader_plan(&args_with(&["a.eval", "b.eval"])).is_err());
    }
}
