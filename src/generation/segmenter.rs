//! # Grid Segmenter
//!
//! Recursive randomized binary space partitioning: the full grid rectangle
//! is split into smaller segments until nothing splittable remains or the
//! segment budget is hit. The output exactly tiles the grid; rooms are
//! later merged from these segments.

use crate::generation::{GenerationConfig, RandomSource};
use crate::utils::math::{GridPoint, Rect};
use crate::{DelveError, DelveResult};
use log::{debug, warn};

/// Below this side length a rectangle is never split along that axis.
pub const HARD_SPLIT_LIMIT: i32 = 6;

/// Splits the grid into segments; see [`GridSegmenter::segment`].
#[derive(Debug, Clone)]
pub struct GridSegmenter {
    segments: Vec<Rect>,
}

impl GridSegmenter {
    /// Partitions the configured grid area.
    ///
    /// Deterministic given the random source state. Fails with
    /// [`DelveError::CorruptGrid`] if the resulting segments do not tile
    /// the grid exactly.
    pub fn segment(config: &GenerationConfig, rng: &mut RandomSource) -> DelveResult<GridSegmenter> {
        let threshold = config.min_segment_length * 2;

        let mut splittables = vec![Rect::new(0, 0, config.columns, config.rows)];
        let mut segments: Vec<Rect> = Vec::new();

        while !splittables.is_empty() && splittables.len() + segments.len() < config.max_segments {
            let idx = rng.index(splittables.len());
            let rect = splittables.remove(idx);
            debug!("segmenter: considering splitting {}", rect);

            if rect.height < HARD_SPLIT_LIMIT {
                Self::split_axis(rect, Axis::Width, threshold, config, rng, &mut segments, &mut splittables);
            } else if rect.width < HARD_SPLIT_LIMIT {
                Self::split_axis(rect, Axis::Height, threshold, config, rng, &mut segments, &mut splittables);
            } else if rng.range(0, 2) == 0 {
                Self::split_axis(rect, Axis::Width, threshold, config, rng, &mut segments, &mut splittables);
            } else {
                Self::split_axis(rect, Axis::Height, threshold, config, rng, &mut segments, &mut splittables);
            }

            debug!(
                "segmenter: final segments: {}, splitting: {}",
                segments.len(),
                splittables.len()
            );
        }

        if !splittables.is_empty() {
            warn!(
                "segmenter: accepting {} oversized segments because the segment budget is spent",
                splittables.len()
            );
        }
        segments.append(&mut splittables);

        let segmenter = GridSegmenter { segments };
        segmenter.rasterize(config.rows, config.columns)?;
        Ok(segmenter)
    }

    /// The final non-overlapping segments, in acceptance order.
    pub fn segments(&self) -> &[Rect] {
        &self.segments
    }

    /// Rasterizes the segment index grid (1-based ids) for diagnostics,
    /// verifying the tiling invariant on the way: every cell must belong
    /// to exactly one segment.
    pub fn rasterize(&self, rows: i32, columns: i32) -> DelveResult<Vec<Vec<usize>>> {
        let mut grid = vec![vec![0usize; columns.max(0) as usize]; rows.max(0) as usize];

        for row in 0..rows {
            for col in 0..columns {
                let point = GridPoint::new(col, row);
                for (idx, segment) in self.segments.iter().enumerate() {
                    if segment.contains(point) {
                        if grid[row as usize][col as usize] != 0 {
                            return Err(DelveError::CorruptGrid(format!(
                                "segments {} and {} overlap at {}",
                                grid[row as usize][col as usize],
                                idx + 1,
                                point
                            )));
                        }
                        grid[row as usize][col as usize] = idx + 1;
                    }
                }

                if grid[row as usize][col as usize] == 0 {
                    return Err(DelveError::CorruptGrid(format!(
                        "cell {} is covered by no segment",
                        point
                    )));
                }
            }
        }

        Ok(grid)
    }

    fn split_size(length: i32, threshold: i32, config: &GenerationConfig, rng: &mut RandomSource) -> i32 {
        if length > threshold {
            rng.range(config.min_segment_length, length - config.min_segment_length)
        } else {
            length / 2
        }
    }

    fn split_axis(
        rect: Rect,
        axis: Axis,
        threshold: i32,
        config: &GenerationConfig,
        rng: &mut RandomSource,
        segments: &mut Vec<Rect>,
        splittables: &mut Vec<Rect>,
    ) {
        debug!("segmenter: split {} by {:?}", rect, axis);

        let halves = match axis {
            Axis::Width => {
                let split = rect.min.x + Self::split_size(rect.width, threshold, config, rng);
                [
                    Rect::from_min_max(rect.min, GridPoint::new(split, rect.max().y)),
                    Rect::from_min_max(GridPoint::new(split, rect.min.y), rect.max()),
                ]
            }
            Axis::Height => {
                let split = rect.min.y + Self::split_size(rect.height, threshold, config, rng);
                [
                    Rect::from_min_max(rect.min, GridPoint::new(rect.max().x, split)),
                    Rect::from_min_max(GridPoint::new(rect.min.x, split), rect.max()),
                ]
            }
        };

        for half in halves {
            // The axis just split along decides which dimension the
            // over-split roll inspects.
            let split_dim = match axis {
                Axis::Width => half.width,
                Axis::Height => half.height,
            };

            if rng.chance(config.under_split_probability) {
                debug!("segmenter: undersplitting {} ({:?}-split)", half, axis);
                segments.push(half);
            } else if half.width >= threshold || half.height >= threshold {
                splittables.push(half);
            } else if split_dim > HARD_SPLIT_LIMIT && rng.chance(config.over_split_probability) {
                splittables.push(half);
            } else {
                segments.push(half);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Width,
    Height,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config(columns: i32, rows: i32) -> GenerationConfig {
        let mut config = GenerationConfig::new(columns, rows, 2, 4);
        config.under_split_probability = 0.0;
        config.over_split_probability = 0.0;
        config
    }

    #[test]
    fn test_small_grid_forces_single_split() {
        // A 6x6 grid with min_segment_length 4 cannot subdivide beyond the
        // first cut: both halves fall below the splittability threshold.
        let mut config = quiet_config(6, 6);
        config.min_segment_length = 4;
        config.max_segments = 16;

        let mut rng = RandomSource::from_seed(1);
        let segmenter = GridSegmenter::segment(&config, &mut rng).unwrap();

        assert_eq!(segmenter.segments().len(), 2);
    }

    #[test]
    fn test_narrow_grid_splits_along_width() {
        // Height below the hard limit forces width splits only.
        let mut config = quiet_config(20, 4);
        config.max_segments = 8;

        let mut rng = RandomSource::from_seed(5);
        let segmenter = GridSegmenter::segment(&config, &mut rng).unwrap();

        for segment in segmenter.segments() {
            assert_eq!(segment.height, 4);
        }
    }

    #[test]
    fn test_segments_tile_grid_exactly() {
        let config = GenerationConfig::grid_size(30);
        let mut rng = RandomSource::from_seed(1234);
        let segmenter = GridSegmenter::segment(&config, &mut rng).unwrap();

        let total_area: i32 = segmenter.segments().iter().map(|s| s.area()).sum();
        assert_eq!(total_area, 30 * 30);

        // rasterize() re-checks exact coverage cell by cell.
        let grid = segmenter.rasterize(30, 30).unwrap();
        assert!(grid.iter().flatten().all(|&id| id > 0));
    }

    #[test]
    fn test_segment_budget_is_respected() {
        let mut config = quiet_config(40, 40);
        config.max_segments = 12;

        let mut rng = RandomSource::from_seed(77);
        let segmenter = GridSegmenter::segment(&config, &mut rng).unwrap();

        assert!(segmenter.segments().len() <= 13);
    }

    #[test]
    fn test_deterministic_given_seed() {
        let config = GenerationConfig::grid_size(24);

        let mut rng_a = RandomSource::from_seed(42);
        let mut rng_b = RandomSource::from_seed(42);
        let a = GridSegmenter::segment(&config, &mut rng_a).unwrap();
        let b = GridSegmenter::segment(&config, &mut rng_b).unwrap();

        assert_eq!(a.segments(), b.segments());
    }
}
