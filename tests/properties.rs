// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate borderbrot;
extern crate num;
extern crate rand;

use borderbrot::border::{classify_rows, is_border_point};
use borderbrot::escape::is_inside;
use borderbrot::partition::{range_of, RowPartition, RowRange};
use borderbrot::{
    flood_fill, render, Communicator, Error, LocalCluster, Pixel, PlaneMapper, RenderConfig,
};
use num::Complex;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

fn cardioid_config() -> RenderConfig {
    RenderConfig {
        width: 64,
        height: 48,
        leftlower: Complex::new(-2.0, -1.2),
        rightupper: Complex::new(0.6, 1.2),
        iterations: 100,
        threads: 1,
        workers: 1,
    }
}

fn whole(plane: &PlaneMapper) -> RowRange {
    RowRange {
        offset: 0,
        count: plane.height(),
    }
}

// Breadth-first search from `starts` through cells accepted by `step`.
fn reachable<F>(plane: &PlaneMapper, starts: &[Pixel], step: F) -> HashSet<Pixel>
where
    F: Fn(&Pixel) -> bool,
{
    let mut seen: HashSet<Pixel> = starts.iter().cloned().collect();
    let mut queue: VecDeque<Pixel> = starts.iter().cloned().collect();
    while let Some(pixel) = queue.pop_front() {
        for neighbour in plane.neighbours(&pixel).iter().filter_map(|n| *n) {
            if !seen.contains(&neighbour) && step(&neighbour) {
                seen.insert(neighbour);
                queue.push_back(neighbour);
            }
        }
    }
    seen
}

fn marked(plane: &PlaneMapper, image: &[u8]) -> HashSet<Pixel> {
    (0..plane.height())
        .flat_map(|j| (0..plane.width()).map(move |i| Pixel(i, j)))
        .filter(|p| image[p.1 * plane.width() + p.0] == 255)
        .collect()
}

#[test]
fn border_points_are_inside_and_touch_the_outside() {
    let config = cardioid_config();
    let plane = config.plane().unwrap();
    let border = classify_rows(&plane, config.iterations, whole(&plane), 3).unwrap();
    assert!(!border.is_empty());
    for pixel in &border {
        assert!(is_inside(plane.pixel_to_point(pixel), config.iterations));
        let touches_outside = plane.neighbours(pixel).iter().any(|n| match *n {
            None => true,
            Some(ref n) => !is_inside(plane.pixel_to_point(n), config.iterations),
        });
        assert!(touches_outside, "{:?} is not on the border", pixel);
    }
}

#[test]
fn classifier_finds_every_border_point() {
    let config = cardioid_config();
    let plane = config.plane().unwrap();
    let border: HashSet<Pixel> = classify_rows(&plane, config.iterations, whole(&plane), 2)
        .unwrap()
        .into_iter()
        .collect();
    for j in 0..plane.height() {
        for i in 0..plane.width() {
            let pixel = Pixel(i, j);
            assert_eq!(
                border.contains(&pixel),
                is_border_point(&plane, &pixel, config.iterations)
            );
        }
    }
}

#[test]
fn every_marked_pixel_is_reachable_from_a_border_point() {
    let config = cardioid_config();
    let plane = config.plane().unwrap();
    let border = classify_rows(&plane, config.iterations, whole(&plane), 2).unwrap();
    let image = render(&RenderConfig {
        workers: 3,
        threads: 2,
        ..config
    })
    .unwrap();
    let inside = marked(&plane, &image);
    let seeds: Vec<Pixel> = border.iter().cloned().filter(|p| inside.contains(p)).collect();
    let through_marked = reachable(&plane, &seeds, |p| inside.contains(p));
    assert_eq!(through_marked, inside);
}

#[test]
fn fill_matches_a_sequential_search() {
    let config = cardioid_config();
    let plane = config.plane().unwrap();
    let border = classify_rows(&plane, config.iterations, whole(&plane), 1).unwrap();
    let mask = flood_fill(&border, &plane, config.iterations, 4).unwrap();
    let expected = reachable(&plane, &border, |p| {
        is_inside(plane.pixel_to_point(p), config.iterations)
    });
    assert_eq!(mask.count(), expected.len());
    for pixel in &expected {
        assert!(mask.get(pixel), "{:?} should be inside", pixel);
    }
}

#[test]
fn the_fill_reaches_past_the_border() {
    let config = cardioid_config();
    let plane = config.plane().unwrap();
    let image = render(&config).unwrap();
    // -0.25+0i, deep in the main cardioid.
    let centre = Pixel(43, 24);
    assert!(!is_border_point(&plane, &centre, config.iterations));
    assert_eq!(image[24 * 64 + 43], 255);
}

#[test]
fn partitions_can_be_recomputed_from_their_parameters() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let total = rng.gen_range(0, 2000);
        let parts = rng.gen_range(1, 64);
        let partition = RowPartition::new(total, parts).unwrap();
        let mut next = 0;
        for (rank, range) in partition.ranges().iter().enumerate() {
            assert_eq!(*range, range_of(total, parts, rank));
            assert_eq!(range.offset, next);
            next = range.end();
        }
        assert_eq!(next, total);
        let counts = partition.counts();
        let largest = *counts.iter().max().unwrap();
        let smallest = *counts.iter().min().unwrap();
        assert!(largest - smallest <= 1);
        assert_eq!(partition, RowPartition::new(total, parts).unwrap());
    }
}

#[test]
fn worker_and_thread_counts_do_not_change_the_image() {
    let config = cardioid_config();
    let single = render(&config).unwrap();
    for &(workers, threads) in &[(4, 1), (3, 2), (5, 3), (1, 4)] {
        let split = render(&RenderConfig {
            workers,
            threads,
            ..config
        })
        .unwrap();
        assert!(
            single == split,
            "{} workers with {} threads changed the image",
            workers,
            threads
        );
    }
}

#[test]
fn repeated_runs_are_identical() {
    let config = RenderConfig {
        workers: 4,
        threads: 3,
        ..cardioid_config()
    };
    let first = render(&config).unwrap();
    for _ in 0..3 {
        assert!(first == render(&config).unwrap());
    }
}

#[test]
fn small_fixture_fills_a_centre_that_is_not_a_border_point() {
    // Columns land on -1.05, -0.65, -0.25, 0.15 and 0.55, rows on -0.8,
    // -0.4, 0, 0.4 and 0.8.  The centre is -0.25+0i.
    let config = RenderConfig {
        width: 5,
        height: 5,
        leftlower: Complex::new(-1.05, -0.8),
        rightupper: Complex::new(0.95, 1.2),
        iterations: 50,
        threads: 2,
        workers: 2,
    };
    let plane = config.plane().unwrap();
    let centre = Pixel(2, 2);
    let border: HashSet<Pixel> = classify_rows(&plane, config.iterations, whole(&plane), 2)
        .unwrap()
        .into_iter()
        .collect();
    assert!(is_inside(plane.pixel_to_point(&centre), config.iterations));
    assert!(!is_border_point(&plane, &centre, config.iterations));
    assert!(!border.contains(&centre));
    for neighbour in plane.neighbours(&centre).iter().filter_map(|n| *n) {
        assert!(border.contains(&neighbour), "{:?} should be a border point", neighbour);
    }

    let image = render(&config).unwrap();
    assert_eq!(image[2 * 5 + 2], 255);
    let mut expected = border.clone();
    expected.insert(centre);
    assert_eq!(marked(&plane, &image), expected);
    assert_eq!(expected.len(), 8);
    for k in 0..5 {
        assert_eq!(image[k], 0, "bottom row");
        assert_eq!(image[4 * 5 + k], 0, "top row");
        assert_eq!(image[k * 5 + 4], 0, "right column");
    }
}

#[test]
fn a_viewport_outside_the_set_renders_black() {
    let config = RenderConfig {
        width: 16,
        height: 12,
        leftlower: Complex::new(3.0, 3.0),
        rightupper: Complex::new(4.0, 4.0),
        iterations: 50,
        threads: 2,
        workers: 3,
    };
    let plane = config.plane().unwrap();
    assert!(classify_rows(&plane, 50, whole(&plane), 2)
        .unwrap()
        .is_empty());
    let image = render(&config).unwrap();
    assert_eq!(image.len(), 16 * 12);
    assert!(image.iter().all(|&p| p == 0));
}

#[test]
fn a_failing_worker_stops_the_whole_group() {
    let config = cardioid_config();
    let out = LocalCluster::new(4).unwrap().run(|comm| {
        if comm.rank() == 3 {
            return Err(Error::Threads);
        }
        borderbrot::run_border_fill(&config, comm)
    });
    match out {
        Err(Error::Threads) => (),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("the run should have failed"),
    }
}
