use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marker_pose::board::PlaneModel;
use marker_pose::camera::CameraIntrinsics;
use marker_pose::pose::solve_plane_pose;
use marker_pose::quad::detect_quad;
use marker_pose::stats::HitRateStats;
use marker_pose::synthetic::{hsv_to_rgb, render_marker_frame};
use marker_pose::threshold::{ThresholdParams, hsv_mask};
use marker_pose::types::RvecTvec;
use nalgebra as na;

fn marker_frame() -> (image::RgbImage, [glam::Vec2; 4]) {
    let pose = RvecTvec::new(
        &na::Vector3::new(0.2, -0.1, 0.3),
        &na::Vector3::new(0.1, 0.2, 8.0),
    );
    render_marker_frame(
        640,
        480,
        hsv_to_rgb(20.0, 0.5, 0.6),
        hsv_to_rgb(145.0, 1.0, 1.0),
        &CameraIntrinsics::default(),
        &PlaneModel::default(),
        &pose,
    )
    .unwrap()
}

fn bench_hsv_mask(c: &mut Criterion) {
    let (frame, _) = marker_frame();
    let params = ThresholdParams::default();
    c.bench_function("hsv_mask_640x480", |b| {
        b.iter(|| hsv_mask(black_box(&frame), &params))
    });
}

fn bench_detect_quad(c: &mut Criterion) {
    let (frame, _) = marker_frame();
    let params = ThresholdParams::default();
    let camera = CameraIntrinsics::default();
    let plane = PlaneModel::default();
    let mut stats = HitRateStats::new();
    c.bench_function("detect_quad_640x480", |b| {
        b.iter(|| detect_quad(black_box(&frame), &params, &camera, &plane, &mut stats))
    });
}

fn bench_plane_pose(c: &mut Criterion) {
    let (_, corners) = marker_frame();
    let camera = CameraIntrinsics::default();
    let plane = PlaneModel::default();
    c.bench_function("solve_plane_pose", |b| {
        b.iter(|| solve_plane_pose(&plane, black_box(&corners), &camera))
    });
}

criterion_group!(benches, bench_hsv_mask, bench_detect_quad, bench_plane_pose);
criterion_main!(benches);
