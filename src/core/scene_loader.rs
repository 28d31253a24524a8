// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::scene::{Background, Scene};
use crate::core::sensor::Sensor;
use crate::core::settings::{ConfigError, ScatteringParameters};
use crate::core::volume::DensityField;
use crate::emitters::directional::DirectionalLight;
use crate::integrators::composite::CompositeMode;
use crate::integrators::phase::PhaseFunction;
use crate::io::{read_bitmap, ImageIoError};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Matrix4f, Vector3f};
use crate::sensors::perspective::PerspectiveCamera;
use crate::sensors::view_projection::ViewProjectionCamera;
use crate::volumes::const_volume::ConstantVolume;
use crate::volumes::grid_volume::GridVolume;
use crate::volumes::noise_volume::{self, NoiseSettings};
use crate::volumes::{VolumeError, VolumeFilterMode};

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
    Volume(VolumeError),
    Image(ImageIoError),
    Config(ConfigError),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl From<VolumeError> for SceneLoadError {
    fn from(err: VolumeError) -> Self {
        SceneLoadError::Volume(err)
    }
}

impl From<ImageIoError> for SceneLoadError {
    fn from(err: ImageIoError) -> Self {
        SceneLoadError::Image(err)
    }
}

impl From<ConfigError> for SceneLoadError {
    fn from(err: ConfigError) -> Self {
        SceneLoadError::Config(err)
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(err) => write!(f, "failed to read scene: {}", err),
            SceneLoadError::Parse(msg) => write!(f, "failed to parse scene: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "scene is missing {}", field),
            SceneLoadError::Volume(err) => write!(f, "failed to load volume: {}", err),
            SceneLoadError::Image(err) => write!(f, "failed to load background: {}", err),
            SceneLoadError::Config(err) => write!(f, "invalid scene configuration: {}", err),
        }
    }
}

impl std::error::Error for SceneLoadError {}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneLoadError> {
    let path = path.as_ref();
    info!("Loading scene from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&xml, base_dir)
}

#[derive(Default)]
struct SensorState {
    sensor_type: Option<String>,
    fov_deg: Option<Float>,
    origin: Option<Vector3f>,
    target: Option<Vector3f>,
    up: Option<Vector3f>,
    view_proj: Option<Matrix4f>,
    position: Option<Vector3f>,
    width: Option<usize>,
    height: Option<usize>,
}

struct MediumState {
    params: ScatteringParameters,
    phase_name: Option<String>,
    bounds_min: Option<Vector3f>,
    bounds_max: Option<Vector3f>,
}

impl Default for MediumState {
    fn default() -> Self {
        Self {
            params: ScatteringParameters::default(),
            phase_name: None,
            bounds_min: None,
            bounds_max: None,
        }
    }
}

#[derive(Default)]
struct VolumeState {
    volume_type: Option<String>,
    filename: Option<String>,
    filter: Option<VolumeFilterMode>,
    value: Option<Float>,
    noise: NoiseSettings,
}

struct LoadedVolume {
    field: Arc<dyn DensityField>,
    file_bounds: Option<AABB>,
}

fn parse_scene(xml: &str, base_dir: &Path) -> Result<Scene, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();

    let mut in_sensor = false;
    let mut in_film = false;
    let mut in_transform = false;
    let mut in_emitter = false;
    let mut in_medium = false;
    let mut in_volume = false;
    let mut in_background = false;

    let mut sensor = SensorState::default();
    let mut medium = MediumState::default();
    let mut volume = VolumeState::default();

    let mut emitter_direction: Option<Vector3f> = None;
    let mut emitter_irradiance: Option<Vector3f> = None;
    let mut background_type: Option<String> = None;
    let mut background_color: Option<Vector3f> = None;
    let mut background_file: Option<String> = None;

    let mut camera: Option<Box<dyn Sensor>> = None;
    let mut light: Option<DirectionalLight> = None;
    let mut loaded_volume: Option<LoadedVolume> = None;
    let mut cloud: Option<(ScatteringParameters, AABB, Arc<dyn DensityField>)> = None;
    let mut background: Option<Background> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"default" => {
                        let (key, value) = read_property(&e, &defaults);
                        if let (Some(k), Some(v)) = (key, value) {
                            defaults.insert(k, v);
                        }
                    }
                    b"sensor" => {
                        in_sensor = true;
                        sensor = SensorState::default();
                        sensor.sensor_type = read_type(&e, &defaults);
                    }
                    b"film" => {
                        in_film = in_sensor;
                    }
                    b"transform" => {
                        if in_sensor {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"name" {
                                    let name = attr.unescape_value().unwrap_or_default();
                                    in_transform = name.as_ref() == "to_world";
                                }
                            }
                        }
                    }
                    b"lookat" => {
                        if in_sensor && in_transform {
                            for attr in e.attributes().flatten() {
                                let value = resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults);
                                match attr.key.as_ref() {
                                    b"origin" => sensor.origin = Some(parse_vec3(&value)?),
                                    b"target" => sensor.target = Some(parse_vec3(&value)?),
                                    b"up" => sensor.up = Some(parse_vec3(&value)?),
                                    _ => {}
                                }
                            }
                        }
                    }
                    b"matrix" => {
                        if in_sensor {
                            let (name, value) = read_property(&e, &defaults);
                            if let (Some(name), Some(value)) = (name, value) {
                                if name == "view_proj" {
                                    sensor.view_proj = Some(parse_matrix(&value)?);
                                }
                            }
                        }
                    }
                    b"emitter" => {
                        let emitter_type = read_type(&e, &defaults);
                        if emitter_type.as_deref() != Some("directional") {
                            return Err(SceneLoadError::Parse(format!(
                                "unsupported emitter: {}", emitter_type.unwrap_or_default())));
                        }
                        in_emitter = true;
                        emitter_direction = None;
                        emitter_irradiance = None;
                    }
                    b"medium" => {
                        let medium_type = read_type(&e, &defaults);
                        if medium_type.as_deref() != Some("cloud") {
                            return Err(SceneLoadError::Parse(format!(
                                "unsupported medium: {}", medium_type.unwrap_or_default())));
                        }
                        in_medium = true;
                        medium = MediumState::default();
                        loaded_volume = None;
                    }
                    b"volume" => {
                        if in_medium {
                            in_volume = true;
                            volume = VolumeState::default();
                            volume.volume_type = read_type(&e, &defaults);
                        }
                    }
                    b"background" => {
                        in_background = true;
                        background_type = read_type(&e, &defaults);
                        background_color = None;
                        background_file = None;
                    }
                    b"float" | b"integer" | b"string" | b"rgb" | b"vector" | b"boolean" => {
                        if let (Some(name), Some(value)) = read_property(&e, &defaults) {
                            if in_volume {
                                apply_volume_property(&mut volume, &name, &value)?;
                            } else if in_medium {
                                apply_medium_property(&mut medium, &name, &value)?;
                            } else if in_film {
                                match name.as_str() {
                                    "width" => sensor.width = Some(parse_usize(&value)?),
                                    "height" => sensor.height = Some(parse_usize(&value)?),
                                    _ => warn!("Ignoring film property: {}.", name),
                                }
                            } else if in_sensor {
                                match name.as_str() {
                                    "fov" => sensor.fov_deg = Some(parse_float(&value)?),
                                    "position" => sensor.position = Some(parse_vec3(&value)?),
                                    _ => warn!("Ignoring sensor property: {}.", name),
                                }
                            } else if in_emitter {
                                match name.as_str() {
                                    "direction" => emitter_direction = Some(parse_vec3(&value)?),
                                    "irradiance" => emitter_irradiance = Some(parse_color(&value)?),
                                    _ => warn!("Ignoring emitter property: {}.", name),
                                }
                            } else if in_background {
                                match name.as_str() {
                                    "color" => background_color = Some(parse_color(&value)?),
                                    "filename" => background_file = Some(value),
                                    _ => warn!("Ignoring background property: {}.", name),
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"sensor" => {
                        if in_sensor {
                            camera = Some(build_sensor(&sensor)?);
                        }
                        in_sensor = false;
                        in_film = false;
                        in_transform = false;
                    }
                    b"film" => {
                        in_film = false;
                    }
                    b"transform" => {
                        in_transform = false;
                    }
                    b"emitter" => {
                        if in_emitter {
                            let direction = emitter_direction
                                .ok_or(SceneLoadError::MissingField("emitter.direction"))?;
                            let irradiance = emitter_irradiance.unwrap_or_else(|| Vector3f::new(1.0, 1.0, 1.0));
                            light = Some(DirectionalLight::from_propagation(direction, irradiance)?);
                        }
                        in_emitter = false;
                    }
                    b"volume" => {
                        if in_volume {
                            loaded_volume = Some(build_volume(&volume, base_dir)?);
                        }
                        in_volume = false;
                    }
                    b"medium" => {
                        if in_medium {
                            let loaded = loaded_volume
                                .take()
                                .ok_or(SceneLoadError::MissingField("medium.volume"))?;
                            cloud = Some(build_cloud(&medium, loaded)?);
                        }
                        in_medium = false;
                    }
                    b"background" => {
                        if in_background {
                            background = Some(build_background(
                                background_type.as_deref(),
                                background_color,
                                background_file.as_deref(),
                                base_dir,
                            )?);
                        }
                        in_background = false;
                    }
                    _ => {}
                }
            }
            Err(e) => {
                return Err(SceneLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    let camera = camera.ok_or(SceneLoadError::MissingField("sensor"))?;
    let light = light.ok_or(SceneLoadError::MissingField("emitter"))?;
    let (params, bounds, field) = cloud.ok_or(SceneLoadError::MissingField("medium"))?;
    let background = background.unwrap_or(Background::Constant(Vector3f::zeros()));

    info!("Scene loaded: {}, {} primary steps, {} light steps.",
          camera.describe(), params.step_count, params.light_step_count);

    Ok(Scene::new(camera, light, bounds, params, field, background))
}

fn build_sensor(state: &SensorState) -> Result<Box<dyn Sensor>, SceneLoadError> {
    let width = state.width.ok_or(SceneLoadError::MissingField("film.width"))?;
    let height = state.height.ok_or(SceneLoadError::MissingField("film.height"))?;

    match state.sensor_type.as_deref() {
        Some("perspective") => {
            let fov_deg = state.fov_deg.ok_or(SceneLoadError::MissingField("sensor.fov"))?;
            let origin = state.origin.ok_or(SceneLoadError::MissingField("sensor.origin"))?;
            let target = state.target.ok_or(SceneLoadError::MissingField("sensor.target"))?;
            let up = state.up.unwrap_or_else(|| Vector3f::new(0.0, 1.0, 0.0));
            let fov_rad = fov_deg.to_radians();
            Ok(Box::new(PerspectiveCamera::new(origin, target, up, fov_rad, width, height)))
        }
        Some("matrix") => {
            let view_proj = state.view_proj.ok_or(SceneLoadError::MissingField("sensor.view_proj"))?;
            let position = state.position.ok_or(SceneLoadError::MissingField("sensor.position"))?;
            let camera = ViewProjectionCamera::new(view_proj, position, width, height)
                .ok_or_else(|| SceneLoadError::Parse("view_proj matrix is not invertible".to_string()))?;
            Ok(Box::new(camera))
        }
        other => Err(SceneLoadError::Parse(format!("unsupported sensor: {}", other.unwrap_or_default()))),
    }
}

fn build_volume(state: &VolumeState, base_dir: &Path) -> Result<LoadedVolume, SceneLoadError> {
    match state.volume_type.as_deref() {
        Some("gridvolume") => {
            let filename = state.filename.as_deref().ok_or(SceneLoadError::MissingField("volume.filename"))?;
            let mut grid = GridVolume::from_file(resolve_path(filename, base_dir))?;
            if let Some(filter) = state.filter {
                grid.set_filter_mode(filter);
            }
            let file_bounds = grid.file_bounds();
            Ok(LoadedVolume { field: Arc::new(grid), file_bounds })
        }
        Some("constant") => {
            let value = state.value.ok_or(SceneLoadError::MissingField("volume.value"))?;
            Ok(LoadedVolume { field: Arc::new(ConstantVolume::new(value)), file_bounds: None })
        }
        Some("noise") => {
            let mut grid = noise_volume::bake(&state.noise)?;
            if let Some(filter) = state.filter {
                grid.set_filter_mode(filter);
            }
            debug!("Baked noise volume, peak density {}.", grid.max_value());
            Ok(LoadedVolume { field: Arc::new(grid), file_bounds: None })
        }
        other => Err(SceneLoadError::Parse(format!("unsupported volume: {}", other.unwrap_or_default()))),
    }
}

fn build_cloud(state: &MediumState,
               loaded: LoadedVolume) -> Result<(ScatteringParameters, AABB, Arc<dyn DensityField>), SceneLoadError> {
    let mut params = state.params;
    if let Some(name) = state.phase_name.as_deref() {
        params.phase = params.phase.with_name(name)
            .ok_or_else(|| SceneLoadError::Parse(format!("unknown phase function: {}", name)))?;
    }

    let bounds = match (state.bounds_min, state.bounds_max, loaded.file_bounds) {
        (Some(min), Some(max), _) => AABB::new(min, max),
        (None, None, Some(file_bounds)) => file_bounds,
        (None, None, None) => {
            warn!("Medium has no bounds, using the default box.");
            AABB::default()
        }
        (Some(_), None, _) => return Err(SceneLoadError::MissingField("medium.bounds_max")),
        (None, Some(_), _) => return Err(SceneLoadError::MissingField("medium.bounds_min")),
    };
    debug!("Cloud bounds: {:?} .. {:?} (center {:?}), phase {}.",
           bounds.p_min, bounds.p_max, bounds.center(), params.phase.name());

    Ok((params, bounds, loaded.field))
}

fn build_background(background_type: Option<&str>,
                    color: Option<Vector3f>,
                    filename: Option<&str>,
                    base_dir: &Path) -> Result<Background, SceneLoadError> {
    match background_type {
        Some("rgb") => {
            let color = color.ok_or(SceneLoadError::MissingField("background.color"))?;
            Ok(Background::Constant(color))
        }
        Some("image") => {
            let filename = filename.ok_or(SceneLoadError::MissingField("background.filename"))?;
            Ok(Background::Image(read_bitmap(resolve_path(filename, base_dir))?))
        }
        other => Err(SceneLoadError::Parse(format!("unsupported background: {}", other.unwrap_or_default()))),
    }
}

fn apply_medium_property(state: &mut MediumState, name: &str, value: &str) -> Result<(), SceneLoadError> {
    let params = &mut state.params;
    match name {
        "bounds_min" => state.bounds_min = Some(parse_vec3(value)?),
        "bounds_max" => state.bounds_max = Some(parse_vec3(value)?),
        "steps" => params.step_count = parse_u32(value)?,
        "light_steps" => params.light_step_count = parse_u32(value)?,
        "scattering" => params.scattering = parse_float(value)?,
        "absorption" => params.absorption = parse_float(value)?,
        "light_absorption" => params.light_absorption = parse_float(value)?,
        "darkness_threshold" => params.darkness_threshold = parse_float(value)?,
        "ray_offset_strength" => params.ray_offset_strength = parse_float(value)?,
        "base_brightness" => params.base_brightness = parse_float(value)?,
        "phase_factor" => params.phase_factor = parse_float(value)?,
        "density_multiplier" => params.density_multiplier = parse_float(value)?,
        "phase" => state.phase_name = Some(value.to_string()),
        "g" | "g_forward" | "g_back" | "blend" => {
            let v = parse_float(value)?;
            params.phase = match (params.phase, name) {
                (PhaseFunction::DualLobe { g_back, blend, .. }, "g" | "g_forward") =>
                    PhaseFunction::DualLobe { g_forward: v, g_back, blend },
                (PhaseFunction::DualLobe { g_forward, blend, .. }, "g_back") =>
                    PhaseFunction::DualLobe { g_forward, g_back: v, blend },
                (PhaseFunction::DualLobe { g_forward, g_back, .. }, "blend") =>
                    PhaseFunction::DualLobe { g_forward, g_back, blend: v },
                (PhaseFunction::HenyeyGreenstein { .. }, "g" | "g_forward") =>
                    PhaseFunction::HenyeyGreenstein { g: v },
                (PhaseFunction::CornetteShanks { .. }, "g" | "g_forward") =>
                    PhaseFunction::CornetteShanks { g: v },
                (phase, _) => {
                    warn!("Ignoring {} for phase function {}.", name, phase.name());
                    phase
                }
            };
        }
        "composite" => {
            params.composite = CompositeMode::from_name(value)
                .ok_or_else(|| SceneLoadError::Parse(format!("unknown composite mode: {}", value)))?;
        }
        _ => warn!("Ignoring medium property: {}.", name),
    }
    Ok(())
}

fn apply_volume_property(state: &mut VolumeState, name: &str, value: &str) -> Result<(), SceneLoadError> {
    match name {
        "filename" => state.filename = Some(value.to_string()),
        "filter" => {
            state.filter = Some(VolumeFilterMode::from_name(value)
                .ok_or_else(|| SceneLoadError::Parse(format!("unknown filter: {}", value)))?);
        }
        "value" => state.value = Some(parse_float(value)?),
        "resolution" => state.noise.resolution = parse_usize(value)?,
        "seed" => state.noise.seed = parse_u32(value)?,
        "frequency" => state.noise.frequency = parse_float(value)?,
        "octaves" => state.noise.octaves = parse_u32(value)?,
        "threshold" => state.noise.threshold = parse_float(value)?,
        _ => warn!("Ignoring volume property: {}.", name),
    }
    Ok(())
}

fn read_type(e: &BytesStart<'_>, defaults: &HashMap<String, String>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"type")
        .map(|attr| resolve_value(&attr.unescape_value().unwrap_or_default(), defaults))
}

fn read_property(e: &BytesStart<'_>, defaults: &HashMap<String, String>) -> (Option<String>, Option<String>) {
    let mut name_attr: Option<String> = None;
    let mut value_attr: Option<String> = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"name" => name_attr = Some(attr.unescape_value().unwrap_or_default().to_string()),
            b"value" => value_attr = Some(resolve_value(&attr.unescape_value().unwrap_or_default(), defaults)),
            _ => {}
        }
    }
    (name_attr, value_attr)
}

fn resolve_path(filename: &str, base_dir: &Path) -> PathBuf {
    if Path::new(filename).is_absolute() {
        PathBuf::from(filename)
    } else {
        base_dir.join(filename)
    }
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, SceneLoadError> {
    value.trim().parse::<u32>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, SceneLoadError> {
    value.trim().parse::<usize>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

// A single number is a grey color.
fn parse_color(value: &str) -> Result<Vector3f, SceneLoadError> {
    if value.contains(',') {
        parse_vec3(value)
    } else {
        let v = parse_float(value)?;
        Ok(Vector3f::new(v, v, v))
    }
}

// Sixteen row-major values, separated by whitespace or commas.
fn parse_matrix(value: &str) -> Result<Matrix4f, SceneLoadError> {
    let values = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(parse_float)
        .collect::<Result<Vec<Float>, SceneLoadError>>()?;
    if values.len() != 16 {
        return Err(SceneLoadError::Parse(format!("matrix needs 16 values, found {}", values.len())));
    }
    Ok(Matrix4f::from_row_slice(&values))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
        <scene>
            <default name="steps" value="64"/>
            <sensor type="perspective">
                <float name="fov" value="40"/>
                <transform name="to_world">
                    <lookat origin="0, 0, -4" target="0, 0, 0" up="0, 1, 0"/>
                </transform>
                <film>
                    <integer name="width" value="16"/>
                    <integer name="height" value="8"/>
                </film>
            </sensor>
            <emitter type="directional">
                <vector name="direction" value="0, -1, 0"/>
                <rgb name="irradiance" value="1.0, 0.9, 0.8"/>
            </emitter>
            <medium type="cloud">
                <vector name="bounds_min" value="-1, -1, -1"/>
                <vector name="bounds_max" value="1, 1, 1"/>
                <integer name="steps" value="$steps"/>
                <integer name="light_steps" value="8"/>
                <float name="absorption" value="0.5"/>
                <float name="scattering" value="0.75"/>
                <string name="phase" value="hg"/>
                <float name="g" value="0.6"/>
                <string name="composite" value="coverage"/>
                <volume type="constant">
                    <float name="value" value="0.25"/>
                </volume>
            </medium>
            <background type="rgb">
                <rgb name="color" value="0.1, 0.2, 0.3"/>
            </background>
        </scene>
    "#;

    #[test]
    fn parses_full_scene() {
        let scene = parse_scene(SCENE, Path::new(".")).unwrap();

        assert_eq!(scene.camera().width(), 16);
        assert_eq!(scene.camera().height(), 8);
        assert!((scene.light().to_light() - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        assert!((scene.light().color() - Vector3f::new(1.0, 0.9, 0.8)).norm() < 1e-6);

        let params = scene.params();
        assert_eq!(params.step_count, 64);
        assert_eq!(params.light_step_count, 8);
        assert!((params.absorption - 0.5).abs() < 1e-6);
        assert!((params.scattering - 0.75).abs() < 1e-6);
        assert_eq!(params.phase, PhaseFunction::HenyeyGreenstein { g: 0.6 });
        assert_eq!(params.composite, CompositeMode::Coverage);
        // Untouched parameters keep their defaults.
        assert!((params.darkness_threshold - 0.16).abs() < 1e-6);

        assert!((scene.density_sampler().density(Vector3f::zeros()) - 0.25).abs() < 1e-6);
        assert!((scene.background().at(3, 3) - Vector3f::new(0.1, 0.2, 0.3)).norm() < 1e-6);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn matrix_sensor_and_default_background() {
        let xml = r#"
            <scene>
                <sensor type="matrix">
                    <matrix name="view_proj" value="1 0 0 0  0 1 0 0  0 0 1 0  0 0 0 1"/>
                    <vector name="position" value="0, 0, -5"/>
                    <film>
                        <integer name="width" value="4"/>
                        <integer name="height" value="4"/>
                    </film>
                </sensor>
                <emitter type="directional">
                    <vector name="direction" value="1, 0, 0"/>
                    <float name="irradiance" value="2"/>
                </emitter>
                <medium type="cloud">
                    <volume type="noise">
                        <integer name="resolution" value="8"/>
                    </volume>
                </medium>
            </scene>
        "#;
        let scene = parse_scene(xml, Path::new(".")).unwrap();

        assert_eq!(scene.camera().width(), 4);
        assert!((scene.light().color() - Vector3f::new(2.0, 2.0, 2.0)).norm() < 1e-6);
        assert_eq!(scene.background().at(0, 0), Vector3f::zeros());
        assert_eq!(*scene.bounds(), AABB::default());
    }

    #[test]
    fn missing_emitter_is_reported() {
        let xml = SCENE.replace("directional", "spot");
        match parse_scene(&xml, Path::new(".")) {
            Err(SceneLoadError::Parse(msg)) => assert!(msg.contains("spot")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        let start = SCENE.find("<emitter").unwrap();
        let end = SCENE.find("</emitter>").unwrap() + "</emitter>".len();
        let without = format!("{}{}", &SCENE[..start], &SCENE[end..]);
        match parse_scene(&without, Path::new(".")) {
            Err(SceneLoadError::MissingField(field)) => assert_eq!(field, "emitter"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn demo_scene_loads_and_validates() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join("cloud.xml");
        let scene = load_scene(&path).unwrap();
        assert_eq!(scene.camera().width(), 320);
        assert_eq!(scene.params().phase, PhaseFunction::DualLobe { g_forward: 0.83, g_back: 0.3, blend: 0.5 });
        assert!((scene.params().density_multiplier - 2.0).abs() < 1e-6);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn unknown_phase_name_fails() {
        let xml = SCENE.replace("value=\"hg\"", "value=\"mie\"");
        assert!(matches!(parse_scene(&xml, Path::new(".")), Err(SceneLoadError::Parse(_))));
    }

    #[test]
    fn loads_scene_from_file_with_relative_volume() {
        let mut dir = std::env::temp_dir();
        dir.push("nimbus_scene_loader_test");
        fs::create_dir_all(&dir).unwrap();

        // 1x1x1 single-channel VOL grid with bounds 0..2.
        let mut vol = Vec::new();
        vol.extend_from_slice(b"VOL");
        vol.push(3u8);
        vol.extend_from_slice(&1i32.to_le_bytes());
        for _ in 0..3 {
            vol.extend_from_slice(&1i32.to_le_bytes());
        }
        vol.extend_from_slice(&1i32.to_le_bytes());
        for v in &[0.0f32, 0.0, 0.0, 2.0, 2.0, 2.0] {
            vol.extend_from_slice(&v.to_le_bytes());
        }
        vol.extend_from_slice(&0.75f32.to_le_bytes());
        fs::write(dir.join("cloud.vol"), vol).unwrap();

        let xml = SCENE.replace(
            "<volume type=\"constant\">",
            "<volume type=\"gridvolume\"><string name=\"filename\" value=\"cloud.vol\"/>",
        ).replace("<vector name=\"bounds_min\" value=\"-1, -1, -1\"/>", "")
         .replace("<vector name=\"bounds_max\" value=\"1, 1, 1\"/>", "");
        let path = dir.join("scene.xml");
        fs::write(&path, xml).unwrap();

        let scene = load_scene(&path).unwrap();
        assert_eq!(*scene.bounds(), AABB::new(Vector3f::zeros(), Vector3f::new(2.0, 2.0, 2.0)));
        assert!((scene.density_sampler().density(Vector3f::new(1.0, 1.0, 1.0)) - 0.75).abs() < 1e-6);
    }
}
