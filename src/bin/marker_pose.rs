use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use marker_pose::board::PlaneModel;
use marker_pose::camera::CameraIntrinsics;
use marker_pose::data_loader::{FrameSource, ImageFolderSource};
use marker_pose::dictionary::MarkerDictionary;
use marker_pose::exchange::{FrameResult, PoseSlot};
use marker_pose::fiducial::FiducialDetector;
use marker_pose::io::{
    DetectorConfig, FramePoseRecord, RunReport, load_camera_intrinsics, object_from_json,
    write_report,
};
use marker_pose::overlay::draw_detection;
use marker_pose::quad::QuadDetector;
use marker_pose::stats::HitRateStats;
use marker_pose::visualization::{log_detection, log_image_as_compressed, set_frame_time};
use marker_pose::{DetectorKind, MarkerDetector, MarkerError};

#[derive(Parser)]
#[command(version, about, author)]
struct ArPoseCli {
    /// path to image folder
    path: String,

    /// marker detector, overrides the config file
    #[arg(long, value_enum)]
    detector: Option<DetectorKind>,

    /// dictionary: ["aruco4x4_50", "t16h5", "t25h7", "t25h9", "t36h11", "t36h11b1"]
    #[arg(long, value_enum, default_value = "aruco4x4_50")]
    dictionary: MarkerDictionary,

    /// detector config json (threshold and plane settings)
    #[arg(long)]
    config: Option<String>,

    /// calibration json, defaults to the built-in webcam calibration
    #[arg(long)]
    camera: Option<String>,

    /// lower hue bound in degrees [0, 360]
    #[arg(long)]
    min_hue: Option<i32>,

    /// upper hue bound in degrees [0, 360]
    #[arg(long)]
    max_hue: Option<i32>,

    /// polygon simplification tolerance in pixels [0, 100]
    #[arg(long)]
    epsilon: Option<f64>,

    #[arg(long, default_value = "0")]
    start_idx: usize,

    #[arg(long, default_value = "1")]
    step: usize,

    /// pose report
    #[arg(short, long, default_value = "poses.json")]
    output: String,

    /// write frames with the overlay drawn into this folder
    #[arg(long)]
    overlay_dir: Option<String>,

    /// save a rerun recording (.rrd)
    #[arg(long)]
    rerun: Option<String>,

    /// detect on a worker thread and hand poses over through a single slot
    #[arg(long)]
    worker: bool,
}

fn make_detector(
    kind: DetectorKind,
    config: &DetectorConfig,
    dictionary: MarkerDictionary,
) -> Box<dyn MarkerDetector> {
    let plane = PlaneModel::from_config(&config.plane);
    match kind {
        DetectorKind::Quad => Box::new(QuadDetector::new(config.threshold, plane)),
        DetectorKind::Fiducial => Box::new(FiducialDetector::new(dictionary, plane)),
    }
}

fn progress_bar(len: Option<usize>) -> ProgressBar {
    let pb = ProgressBar::new(len.unwrap_or(0) as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        pb.set_style(style);
    }
    pb
}

fn run_sequential(
    cli: &ArPoseCli,
    config: &DetectorConfig,
    camera: &CameraIntrinsics,
    mut source: ImageFolderSource,
) -> Result<(Vec<FramePoseRecord>, Option<HitRateStats>), MarkerError> {
    let mut detector = make_detector(config.detector, config, cli.dictionary);
    let recording = match &cli.rerun {
        Some(path) => Some(
            rerun::RecordingStreamBuilder::new("marker_pose")
                .save(path)
                .map_err(|e| MarkerError::Rerun(e.to_string()))?,
        ),
        None => None,
    };
    if let Some(dir) = &cli.overlay_dir {
        std::fs::create_dir_all(dir)?;
    }

    let pb = progress_bar(source.remaining());
    let mut records = Vec::new();
    while let Some(mut frame) = source.next_frame() {
        let detection = detector.detect(&frame.image, camera);
        records.push(FramePoseRecord::new(frame.idx, frame.time_ns, detection.as_ref()));

        if let Some(recording) = &recording {
            set_frame_time(recording, frame.time_ns);
            log_image_as_compressed(recording, "cam0", &frame.image, image::ImageFormat::Png)?;
            log_detection(recording, "cam0", detection.as_ref(), camera)?;
        }
        if let Some(dir) = &cli.overlay_dir {
            if let Some(d) = &detection {
                draw_detection(&mut frame.image, d, camera);
            }
            let out = Path::new(dir).join(format!("{:06}.png", frame.idx));
            frame.image.save(out)?;
        }

        if let Some(stats) = detector.hit_rate() {
            pb.set_message(stats.to_string());
        }
        pb.inc(1);
    }
    pb.finish();
    Ok((records, detector.hit_rate()))
}

fn run_worker(
    cli: &ArPoseCli,
    config: &DetectorConfig,
    camera: &CameraIntrinsics,
    mut source: ImageFolderSource,
) -> (Vec<FramePoseRecord>, Option<HitRateStats>) {
    let slot = PoseSlot::new();
    let done = AtomicBool::new(false);
    let pb = progress_bar(source.remaining());

    std::thread::scope(|s| {
        let worker = s.spawn(|| {
            let mut detector = make_detector(config.detector, config, cli.dictionary);
            while let Some(frame) = source.next_frame() {
                let detection = detector.detect(&frame.image, camera);
                slot.publish(FrameResult {
                    frame_idx: frame.idx,
                    time_ns: frame.time_ns,
                    detection,
                });
            }
            done.store(true, Ordering::SeqCst);
            detector.hit_rate()
        });

        // render side: only ever looks at the newest pose
        let mut records = Vec::new();
        loop {
            let finished = done.load(Ordering::SeqCst);
            match slot.take() {
                Some(result) => {
                    records.push(FramePoseRecord::new(
                        result.frame_idx,
                        result.time_ns,
                        result.detection.as_ref(),
                    ));
                    pb.set_position(result.frame_idx as u64 + 1);
                }
                None if finished => break,
                None => std::thread::sleep(Duration::from_millis(1)),
            }
        }
        pb.finish();
        let stats = worker.join().unwrap_or_else(|_| {
            log::error!("detection worker panicked");
            None
        });
        (records, stats)
    })
}

fn main() -> Result<(), MarkerError> {
    env_logger::init();
    let cli = ArPoseCli::parse();

    let mut config: DetectorConfig = match &cli.config {
        Some(path) => object_from_json(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(kind) = cli.detector {
        config.detector = kind;
    }
    if let Some(v) = cli.min_hue {
        config.threshold.min_hue = v;
    }
    if let Some(v) = cli.max_hue {
        config.threshold.max_hue = v;
    }
    if let Some(v) = cli.epsilon {
        config.threshold.epsilon = v;
    }
    let camera = match &cli.camera {
        Some(path) => load_camera_intrinsics(path)?,
        None => CameraIntrinsics::default(),
    };
    log::info!("detector {:?}, {:?}", config.detector, config.threshold);

    let source = ImageFolderSource::open(&cli.path, cli.start_idx, cli.step)?;
    let now = Instant::now();
    let (records, hit_rate) = if cli.worker {
        if cli.overlay_dir.is_some() || cli.rerun.is_some() {
            log::warn!("overlay and rerun output are only produced without --worker");
        }
        run_worker(&cli, &config, &camera, source)
    } else {
        run_sequential(&cli, &config, &camera, source)?
    };
    let duration_sec = now.elapsed().as_secs_f64();

    let report = RunReport::new(config.detector, records, hit_rate);
    println!(
        "detected {}/{} frames in {:.3} sec",
        report.detected_frames, report.total_frames, duration_sec
    );
    if let Some(stats) = &report.hit_rate {
        println!("{}", stats);
    }
    write_report(&cli.output, &report)?;
    Ok(())
}
