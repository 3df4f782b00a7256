//! Shot-placement statistics over court-plane bounce locations.

use std::fmt::Write;

use crate::vision::rect::Rect;

/// Attributes bounces to target zones and accumulates per-zone counts.
///
/// Bounces landing in no zone go to an off-target bucket.
pub struct AccuracyStatistics {
    zones: Vec<Zone>,
    off_target: Vec<(f32, f32)>,
    total_shots: usize,
}

struct Zone {
    bounds: Rect,
    bounces: Vec<(f32, f32)>,
}

impl AccuracyStatistics {
    pub fn new(target_zones: Vec<Rect>) -> Self {
        Self {
            zones: target_zones
                .into_iter()
                .map(|bounds| Zone {
                    bounds,
                    bounces: Vec::new(),
                })
                .collect(),
            off_target: Vec::new(),
            total_shots: 0,
        }
    }

    /// Record a bounce at court-plane coordinates (x, y).
    ///
    /// The bounce is attributed to the first zone containing the point, in
    /// the order the zones were supplied.
    pub fn record_bounce(&mut self, x: f32, y: f32) {
        self.total_shots += 1;
        match self.zones.iter_mut().find(|z| z.bounds.contains(x, y)) {
            Some(zone) => zone.bounces.push((x, y)),
            None => self.off_target.push((x, y)),
        }
    }

    pub fn total_shots(&self) -> usize {
        self.total_shots
    }

    /// Bounce count per zone, in supply order.
    pub fn zone_counts(&self) -> Vec<usize> {
        self.zones.iter().map(|z| z.bounces.len()).collect()
    }

    pub fn off_target_count(&self) -> usize {
        self.off_target.len()
    }

    /// Recorded bounce locations for a zone, in landing order.
    pub fn zone_bounces(&self, index: usize) -> Option<&[(f32, f32)]> {
        self.zones.get(index).map(|z| z.bounces.as_slice())
    }

    /// Human-readable per-zone summary.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (i, zone) in self.zones.iter().enumerate() {
            let _ = writeln!(
                out,
                "Target zone {}: {} shots landed",
                i + 1,
                zone.bounces.len()
            );
        }
        let _ = writeln!(out, "Off target: {} shots", self.off_target.len());
        let _ = writeln!(out, "Total: {} shots", self.total_shots);
        out
    }
}
