//! Ball candidate selection over a sliding history of contour observations.
//!
//! A single physical object frequently fragments into several contours
//! under noisy segmentation, so per-frame contours are merged back into
//! one blob per real object, filtered by expected ball size, and the ball
//! is picked as the candidate forming the most continuous trajectory
//! across the history window: its size stays roughly constant and its
//! motion is smooth, whereas noise appears and disappears incoherently.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::edges::canny;
use tracing::debug;

use crate::vision::history::SlidingWindow;
use crate::vision::rect::{Rect, center_distance_matrix};

/// Tuning knobs for candidate extraction and path selection.
#[derive(Debug, Clone)]
pub struct CandidateConfig {
    /// Calibrated expected ball blob area after morphological closing.
    pub expected_area: f32,
    /// Lower bound of the accepted area band, as a fraction of expected.
    pub min_area_ratio: f32,
    /// Upper bound of the accepted area band, as a fraction of expected.
    pub max_area_ratio: f32,
    /// The largest remaining candidate is discarded as the player when its
    /// area exceeds this multiple of the expected ball area.
    pub player_area_ratio: f32,
    /// Maximum horizontal gap between contour rects that still merge.
    pub join_distance: f32,
    /// Slack applied to vertical extents when testing merge adjacency.
    pub vertical_tolerance: f32,
    /// Number of observation layers in the history window.
    pub window_size: usize,
    /// Total path distances at or below this are rejected as non-moving.
    pub min_path_distance: f32,
    /// Upward jumps of the best path distance beyond this cutoff are
    /// treated as tracking glitches.
    pub distance_jump_cutoff: f32,
    /// Canny low threshold applied to the motion mask.
    pub canny_low: f32,
    /// Canny high threshold applied to the motion mask.
    pub canny_high: f32,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            expected_area: 750.0,
            min_area_ratio: 0.5,
            max_area_ratio: 3.0,
            player_area_ratio: 1.25,
            join_distance: 10.0,
            vertical_tolerance: 5.0,
            window_size: 9,
            min_path_distance: 2.0,
            distance_jump_cutoff: 100.0,
            canny_low: 50.0,
            canny_high: 100.0,
        }
    }
}

/// Per-candidate shortest-path bookkeeping, rebuilt every frame.
///
/// Candidates are addressed by (layer, index) into the history arena, never
/// by structural identity: distinct candidates may share coordinates.
#[derive(Debug, Clone, Copy)]
struct PathNode {
    /// Cumulative center distance of the best path ending here.
    distance: f32,
    /// Index of the predecessor in the previous layer.
    predecessor: Option<usize>,
    /// Number of edges on the path ending here.
    length: usize,
}

/// Tracks the ball across frames by shortest-path selection over noisy
/// contour candidates.
pub struct CandidateTracker {
    config: CandidateConfig,
    /// One candidate layer per observed frame, oldest first.
    history: SlidingWindow<Vec<Rect>>,
    /// Best path distance of the previous frame, for the jump guard.
    previous_best_distance: Option<f32>,
}

impl CandidateTracker {
    pub fn new(config: CandidateConfig) -> Self {
        let mut history = SlidingWindow::new(config.window_size);
        // Two dummy layers so the path search has a valid start before any
        // real observations arrive.
        history.push(vec![Rect::ZERO]);
        history.push(vec![Rect::ZERO]);
        Self {
            config,
            history,
            previous_best_distance: None,
        }
    }

    /// Select the rectangle most probably containing the ball.
    ///
    /// Falls back to the supplied `prediction` when no candidate survives
    /// filtering, when no full-length path exists, or when the best path
    /// distance jumps implausibly between frames.
    pub fn select_most_probable_candidate(&mut self, mask: &GrayImage, prediction: Rect) -> Rect {
        let contours = self.extract_contour_rects(mask);
        let merged = self.join_adjacent(contours);
        let mut candidates = self.filter_by_area(merged);

        if candidates.is_empty() {
            // Total occlusion, motion blur or the ball left the frame; the
            // prediction keeps the history free of empty layers.
            debug!("no viable ball candidate, substituting prediction");
            candidates.push(prediction);
        }
        self.history.push(candidates);

        match self.shortest_path_candidate() {
            None => {
                debug!("no full-length candidate path, substituting prediction");
                prediction
            }
            Some((candidate, distance)) => {
                if let Some(previous) = self.previous_best_distance
                    && distance - previous > self.config.distance_jump_cutoff
                {
                    // Unreliable detection; keep the remembered distance so
                    // one glitched frame cannot poison the next comparison.
                    debug!(distance, previous, "path distance jump, substituting prediction");
                    return prediction;
                }
                self.previous_best_distance = Some(distance);
                candidate
            }
        }
    }

    /// Edge-detect the mask and wrap each external contour in its bounding
    /// rectangle, sorted by x ascending.
    fn extract_contour_rects(&self, mask: &GrayImage) -> Vec<Rect> {
        let edges = canny(mask, self.config.canny_low, self.config.canny_high);
        let contours = find_contours::<i32>(&edges);

        let mut rects: Vec<Rect> = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && !c.points.is_empty())
            .map(|c| {
                let min_x = c.points.iter().map(|p| p.x).min().unwrap_or(0);
                let max_x = c.points.iter().map(|p| p.x).max().unwrap_or(0);
                let min_y = c.points.iter().map(|p| p.y).min().unwrap_or(0);
                let max_y = c.points.iter().map(|p| p.y).max().unwrap_or(0);
                Rect::new(
                    min_x as f32,
                    min_y as f32,
                    (max_x - min_x) as u32,
                    (max_y - min_y) as u32,
                )
            })
            .collect();
        rects.sort_by(|a, b| a.x.total_cmp(&b.x));
        rects
    }

    /// Merge horizontally adjacent rectangles whose vertical extents
    /// overlap, approximating one blob per real object.
    fn join_adjacent(&self, sorted_rects: Vec<Rect>) -> Vec<Rect> {
        let mut merged: Vec<Rect> = Vec::with_capacity(sorted_rects.len());
        let mut iter = sorted_rects.into_iter();
        let Some(mut current) = iter.next() else {
            return merged;
        };

        for rect in iter {
            let gap = rect.x - (current.x + current.width as f32);
            if gap < self.config.join_distance && self.vertical_overlap(&current, &rect) {
                current = current.union(&rect);
            } else {
                merged.push(current);
                current = rect;
            }
        }
        merged.push(current);
        merged
    }

    fn vertical_overlap(&self, a: &Rect, b: &Rect) -> bool {
        let tolerance = self.config.vertical_tolerance;
        b.y <= a.y + a.height as f32 + tolerance && b.y + b.height as f32 >= a.y - tolerance
    }

    /// Keep candidates whose area lies in the accepted band, then discard
    /// the largest survivor when it is too big to be the ball.
    fn filter_by_area(&self, mut rects: Vec<Rect>) -> Vec<Rect> {
        let min_area = self.config.expected_area * self.config.min_area_ratio;
        let max_area = self.config.expected_area * self.config.max_area_ratio;

        rects.sort_by_key(|r| r.area());
        rects.retain(|r| {
            let area = r.area() as f32;
            area >= min_area && area <= max_area
        });

        // Area-ratio-gated player discard: the player blob dwarfs the
        // expected ball area, the ball never does.
        if let Some(largest) = rects.last()
            && largest.area() as f32 > self.config.player_area_ratio * self.config.expected_area
        {
            rects.pop();
        }
        rects
    }

    /// Shortest path through every history layer, ending at the newest.
    ///
    /// Returns the newest-layer candidate with the minimal cumulative
    /// center distance among paths spanning the whole window, rejecting
    /// near-static paths as not-the-ball.
    fn shortest_path_candidate(&self) -> Option<(Rect, f32)> {
        let layers: Vec<&Vec<Rect>> = self.history.iter().collect();
        let full_length = layers.len() - 1;

        let mut nodes: Vec<Vec<PathNode>> = Vec::with_capacity(layers.len());
        nodes.push(
            layers[0]
                .iter()
                .map(|_| PathNode {
                    distance: 0.0,
                    predecessor: None,
                    length: 0,
                })
                .collect(),
        );

        for i in 1..layers.len() {
            let distances = center_distance_matrix(layers[i - 1], layers[i]);
            let layer_nodes = layers[i]
                .iter()
                .enumerate()
                .map(|(j, _)| {
                    let (best_prev, best_distance) = nodes[i - 1]
                        .iter()
                        .enumerate()
                        .map(|(k, prev)| (k, prev.distance + distances[[k, j]]))
                        .min_by(|a, b| a.1.total_cmp(&b.1))
                        .expect("history layers are never empty");
                    PathNode {
                        distance: best_distance,
                        predecessor: Some(best_prev),
                        length: nodes[i - 1][best_prev].length + 1,
                    }
                })
                .collect();
            nodes.push(layer_nodes);
        }

        nodes
            .last()?
            .iter()
            .enumerate()
            .filter(|(_, node)| node.length == full_length)
            // Near-static paths are noise or scene fixtures, not the ball.
            .filter(|(_, node)| node.distance > self.config.min_path_distance)
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
            .map(|(j, node)| (layers[full_length][j], node.distance))
    }
}
