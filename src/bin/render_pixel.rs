use nimbus::core::scene_loader::load_scene;
use nimbus::integrators::raymarching::RaymarchingIntegrator;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <x> <y>", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let x: usize = args[2].parse().unwrap_or(0);
    let y: usize = args[3].parse().unwrap_or(0);

    let scene = load_scene(scene_path)
        .unwrap_or_else(|e| panic!("failed to load scene: {}", e));
    if let Err(e) = scene.validate() {
        eprintln!("Invalid scene: {}", e);
        std::process::exit(2);
    }

    let (width, height) = (scene.camera().width(), scene.camera().height());
    if x >= width || y >= height {
        eprintln!("Pixel out of bounds: ({}, {}) for size {}x{}", x, y, width, height);
        std::process::exit(2);
    }

    let trace = RaymarchingIntegrator::new().trace(&scene, x, y);
    let o = trace.ray.origin();
    let d = trace.ray.dir();
    println!("pixel ({}, {})", x, y);
    println!("  ray origin ({:.4}, {:.4}, {:.4}) dir ({:.4}, {:.4}, {:.4})", o.x, o.y, o.z, d.x, d.y, d.z);
    println!("  box to {:.6} inside {:.6}", trace.hit.distance_to_volume, trace.hit.distance_inside_volume);
    println!("  start offset {:.6} phase {:.6}", trace.start_offset, trace.phase_value);
    println!(
        "  steps {}/{} energy {:.6} transmittance {:.6}",
        trace.result.steps, scene.params().step_count, trace.result.light_energy, trace.result.transmittance
    );
    println!(
        "  background R {:.6}, G {:.6}, B {:.6} -> R {:.6}, G {:.6}, B {:.6}",
        trace.background.x, trace.background.y, trace.background.z,
        trace.color.x, trace.color.y, trace.color.z
    );
}
