// Copyright 2020 TwoCookingMice

use nimbus::core::scene_loader::load_scene;
use nimbus::integrators::composite::CompositeMode;
use nimbus::integrators::raymarching::RaymarchingIntegrator;
use nimbus::io::write_bitmap;
use nimbus::renderers::renderer::Renderer;
use nimbus::renderers::tiled::TiledRenderer;

use console::style;
use std::env;
use std::str::FromStr;
use std::time::Instant;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <scene.xml> <output.exr|png> [--steps N] [--light-steps N] \
               [--phase NAME] [--composite additive|coverage] [--block N]", program);
    std::process::exit(1);
}

fn fail(message: String) -> ! {
    eprintln!("{} {}", style("error:").red().bold(), message);
    std::process::exit(2);
}

// Value following `flag`, rejected when absent or unparsable.
fn parse_flag<T: FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{} expects a value", flag))?;
    value.parse::<T>().map_err(|_| format!("invalid value for {}: {}", flag, value))
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage(&args[0]);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut steps_override: Option<u32> = None;
    let mut light_steps_override: Option<u32> = None;
    let mut phase_override: Option<String> = None;
    let mut composite_override: Option<CompositeMode> = None;
    let mut block_size: Option<usize> = None;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--steps" => {
                i += 1;
                steps_override = Some(parse_flag("--steps", args.get(i)).unwrap_or_else(|e| fail(e)));
            }
            "--light-steps" => {
                i += 1;
                light_steps_override = Some(parse_flag("--light-steps", args.get(i)).unwrap_or_else(|e| fail(e)));
            }
            "--phase" => {
                i += 1;
                phase_override = Some(parse_flag("--phase", args.get(i)).unwrap_or_else(|e| fail(e)));
            }
            "--composite" => {
                i += 1;
                let name: String = parse_flag("--composite", args.get(i)).unwrap_or_else(|e| fail(e));
                composite_override = Some(CompositeMode::from_name(&name)
                    .unwrap_or_else(|| fail(format!("invalid value for --composite: {}", name))));
            }
            "--block" => {
                i += 1;
                block_size = Some(parse_flag("--block", args.get(i)).unwrap_or_else(|e| fail(e)));
            }
            other => log::warn!("Ignoring unknown argument: {}.", other),
        }
        i += 1;
    }

    let mut scene = load_scene(input_path).unwrap_or_else(|e| fail(e.to_string()));

    {
        let params = scene.params_mut();
        if let Some(steps) = steps_override {
            params.step_count = steps;
        }
        if let Some(light_steps) = light_steps_override {
            params.light_step_count = light_steps;
        }
        if let Some(name) = phase_override.as_deref() {
            params.phase = params.phase.with_name(name)
                .unwrap_or_else(|| fail(format!("unknown phase function: {}", name)));
        }
        if let Some(mode) = composite_override {
            params.composite = mode;
        }
    }

    let mut renderer = TiledRenderer::new(Box::new(RaymarchingIntegrator::new()));
    if let Some(block_size) = block_size {
        renderer = renderer.with_block_size(block_size);
    }

    let start = Instant::now();
    let image = renderer.render(&scene).unwrap_or_else(|e| fail(e.to_string()));
    let elapsed = start.elapsed();

    write_bitmap(&image, output_path).unwrap_or_else(|e| fail(e.to_string()));

    let params = scene.params();
    println!("{} {}x{} in {:.2}s, {} steps, {} light steps, {} phase -> {}",
             style("Rendered").green().bold(),
             image.width(),
             image.height(),
             elapsed.as_secs_f64(),
             params.step_count,
             params.light_step_count,
             params.phase.name(),
             style(output_path).cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_values_must_parse() {
        let good = String::from("64");
        let bad = String::from("sixty");
        assert_eq!(parse_flag::<u32>("--steps", Some(&good)), Ok(64));
        assert_eq!(
            parse_flag::<u32>("--steps", Some(&bad)),
            Err(String::from("invalid value for --steps: sixty"))
        );
        assert_eq!(
            parse_flag::<usize>("--block", None),
            Err(String::from("--block expects a value"))
        );
        assert!(parse_flag::<u32>("--light-steps", Some(&String::from("-3"))).is_err());
    }
}
