use clap::{Parser, Subcommand};
use marker_pose::board::{PlaneConfig, PlaneModel};
use marker_pose::camera::CameraIntrinsics;
use marker_pose::io::{load_camera_intrinsics, object_from_json, object_to_json, save_camera_intrinsics};
use marker_pose::synthetic::{hsv_to_rgb, render_marker_frame};
use marker_pose::types::RvecTvec;
use marker_pose::MarkerError;
use nalgebra as na;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic frames showing a colored marker
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Plane configuration JSON
        #[arg(short, long)]
        plane_config: Option<String>,

        /// Calibration JSON
        #[arg(short, long)]
        camera: Option<String>,

        /// Number of frames to generate
        #[arg(short, long, default_value = "20")]
        num_frames: usize,

        /// Marker hue in degrees
        #[arg(long, default_value = "145")]
        hue: f32,

        /// Image width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "480")]
        height: u32,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

#[derive(Serialize)]
struct GroundTruth {
    frame: usize,
    pose: RvecTvec,
    corners: [[f32; 2]; 4],
}

fn main() -> Result<(), MarkerError> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            output,
            plane_config,
            camera,
            num_frames,
            hue,
            width,
            height,
            seed,
        } => {
            let plane_config: PlaneConfig = match plane_config {
                Some(path) => object_from_json(&path)?,
                None => PlaneConfig::default(),
            };
            let camera = match camera {
                Some(path) => load_camera_intrinsics(&path)?,
                None => CameraIntrinsics::default(),
            };
            generate_dataset(&output, &plane_config, &camera, num_frames, hue, width, height, seed)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn generate_dataset(
    output_dir: &str,
    plane_config: &PlaneConfig,
    camera: &CameraIntrinsics,
    num_frames: usize,
    hue: f32,
    width: u32,
    height: u32,
    seed: u64,
) -> Result<(), MarkerError> {
    use std::fs;

    let plane = PlaneModel::from_config(plane_config);
    fs::create_dir_all(output_dir)?;

    let marker_color = hsv_to_rgb(hue, 0.9, 0.9);
    let background = hsv_to_rgb(hue + 180.0, 0.2, 0.4);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut truth = Vec::new();

    let mut frame_idx = 0;
    let mut attempts = 0;
    while frame_idx < num_frames {
        attempts += 1;
        if attempts > num_frames * 100 {
            log::warn!("marker does not fit into {}x{}, stopping early", width, height);
            break;
        }
        // marker 6-12 units away, tilted a little, spun freely in plane
        let distance = rng.random_range(6.0..12.0);
        let rvec = na::Vector3::new(
            rng.random_range(-0.4..0.4),
            rng.random_range(-0.4..0.4),
            rng.random_range(-0.6..0.6),
        );
        let tvec = na::Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            distance,
        );
        let pose = RvecTvec::new(&rvec, &tvec);

        let Some((img, corners)) =
            render_marker_frame(width, height, background, marker_color, camera, &plane, &pose)
        else {
            continue;
        };
        let inside = corners.iter().all(|c| {
            c.x >= 0.0 && c.y >= 0.0 && c.x < width as f32 && c.y < height as f32
        });
        if !inside {
            continue;
        }

        img.save(Path::new(output_dir).join(format!("{:06}.png", frame_idx)))?;
        truth.push(GroundTruth {
            frame: frame_idx,
            pose,
            corners: corners.map(|c| [c.x, c.y]),
        });
        frame_idx += 1;
    }

    let dir = Path::new(output_dir);
    save_camera_intrinsics(&dir.join("camera.json").to_string_lossy(), camera)?;
    object_to_json(&dir.join("plane.json").to_string_lossy(), plane_config)?;
    object_to_json(&dir.join("ground_truth.json").to_string_lossy(), &truth)?;

    println!("Generated {} frames in {}", frame_idx, output_dir);
    Ok(())
}
