//! Outer contour extraction from a binary mask.
//!
//! Foreground is 8-connected and background 4-connected. The external variant
//! only reports components that touch the background surrounding the image;
//! anything sitting inside a hole of another component is skipped there.

use std::collections::VecDeque;

use glam::IVec2;
use image::GrayImage;

use crate::geometry::{Rect, bounding_rect};

/// Neighbour offsets, counter-clockwise on screen starting east.
const DIRS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(1, -1),
    IVec2::new(0, -1),
    IVec2::new(-1, -1),
    IVec2::new(-1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];
const WEST: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<IVec2>,
}

impl Contour {
    pub fn bounding_rect(&self) -> Rect {
        bounding_rect(&self.points)
    }
}

struct Grid<'a> {
    mask: &'a GrayImage,
    width: i32,
    height: i32,
}

impl Grid<'_> {
    fn in_bounds(&self, p: IVec2) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    fn index(&self, p: IVec2) -> usize {
        p.y as usize * self.width as usize + p.x as usize
    }

    fn is_fg(&self, p: IVec2) -> bool {
        self.in_bounds(p) && self.mask.as_raw()[self.index(p)] != 0
    }
}

fn dir_index(step: IVec2) -> usize {
    DIRS.iter().position(|d| *d == step).unwrap_or(WEST)
}

/// Marks every background pixel 4-connected to the image border.
fn outside_background(grid: &Grid) -> Vec<bool> {
    let mut outside = vec![false; (grid.width * grid.height) as usize];
    let mut queue = VecDeque::new();
    let seed = |p: IVec2, outside: &mut [bool], queue: &mut VecDeque<IVec2>| {
        let idx = grid.index(p);
        if !grid.is_fg(p) && !outside[idx] {
            outside[idx] = true;
            queue.push_back(p);
        }
    };
    for x in 0..grid.width {
        seed(IVec2::new(x, 0), &mut outside, &mut queue);
        seed(IVec2::new(x, grid.height - 1), &mut outside, &mut queue);
    }
    for y in 0..grid.height {
        seed(IVec2::new(0, y), &mut outside, &mut queue);
        seed(IVec2::new(grid.width - 1, y), &mut outside, &mut queue);
    }
    while let Some(p) = queue.pop_front() {
        for d in DIRS.iter().step_by(2) {
            let q = p + *d;
            if grid.in_bounds(q) {
                seed(q, &mut outside, &mut queue);
            }
        }
    }
    outside
}

/// Suzuki-Abe outer border following from the first raster pixel of a
/// component.
fn trace_outer_border(grid: &Grid, start: IVec2) -> Vec<IVec2> {
    let first = (0..8)
        .map(|k| (WEST + 8 - k) % 8)
        .find(|&d| grid.is_fg(start + DIRS[d]));
    let Some(first) = first else {
        return vec![start];
    };
    let second = start + DIRS[first];

    let mut points = Vec::new();
    let mut prev = second;
    let mut cur = start;
    loop {
        let back = dir_index(prev - cur);
        let next = (1..=8)
            .map(|k| cur + DIRS[(back + k) % 8])
            .find(|q| grid.is_fg(*q))
            .unwrap_or(cur);
        points.push(cur);
        if next == start && cur == second {
            break;
        }
        prev = cur;
        cur = next;
    }
    points
}

/// Drops the interior points of straight runs, keeping only vertices where
/// the chain changes direction.
pub fn compress_chain(points: &[IVec2]) -> Vec<IVec2> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let compressed: Vec<IVec2> = (0..n)
        .filter(|&k| {
            let prev = points[(k + n - 1) % n];
            let next = points[(k + 1) % n];
            points[k] - prev != next - points[k]
        })
        .map(|k| points[k])
        .collect();
    if compressed.is_empty() {
        points[..1].to_vec()
    } else {
        compressed
    }
}

/// Finds the outermost contours of all foreground regions.
///
/// Contours are returned in raster order of their first pixel, each traced
/// counter-clockwise on screen and compressed to its direction changes.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    component_contours(mask, true)
}

/// Outer borders of every foreground component, including components that sit
/// inside a hole of another one. Same order and tracing as
/// [`find_external_contours`].
pub fn find_component_contours(mask: &GrayImage) -> Vec<Contour> {
    component_contours(mask, false)
}

fn component_contours(mask: &GrayImage, external_only: bool) -> Vec<Contour> {
    let grid = Grid {
        mask,
        width: mask.width() as i32,
        height: mask.height() as i32,
    };
    if grid.width == 0 || grid.height == 0 {
        return Vec::new();
    }

    let outside = if external_only {
        outside_background(&grid)
    } else {
        Vec::new()
    };
    let mut visited = vec![false; (grid.width * grid.height) as usize];
    let mut contours = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..grid.height {
        for x in 0..grid.width {
            let start = IVec2::new(x, y);
            let idx = grid.index(start);
            if visited[idx] || !grid.is_fg(start) {
                continue;
            }

            // flood the component and check whether it borders the outside
            let mut external = !external_only;
            visited[idx] = true;
            queue.push_back(start);
            while let Some(p) = queue.pop_front() {
                for (k, d) in DIRS.iter().enumerate() {
                    let q = p + *d;
                    if !grid.in_bounds(q) {
                        external |= k % 2 == 0;
                        continue;
                    }
                    let qi = grid.index(q);
                    if grid.is_fg(q) {
                        if !visited[qi] {
                            visited[qi] = true;
                            queue.push_back(q);
                        }
                    } else if external_only && k % 2 == 0 && outside[qi] {
                        external = true;
                    }
                }
            }

            if external {
                let border = trace_outer_border(&grid, start);
                contours.push(Contour {
                    points: compress_chain(&border),
                });
            }
        }
    }
    log::trace!("found {} contours", contours.len());
    contours
}

/// Picks the contour with the largest bounding-box area; the first one wins
/// ties.
pub fn largest_by_bounding_box(contours: &[Contour]) -> Option<&Contour> {
    let mut best: Option<(&Contour, i64)> = None;
    for c in contours {
        let area = c.bounding_rect().area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((c, area)),
        }
    }
    best.map(|(c, _)| c)
}
