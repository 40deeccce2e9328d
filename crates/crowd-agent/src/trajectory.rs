//! Micro-trajectory generation and replay.
//!
//! Two maneuvers are too specialized for the generic force model: aligning
//! with a shelf and pulling in close (`ReachedShelf`), and reversing away
//! from one before turning to the next destination (`BackUp`).  Both are
//! rehearsed up front into a timestamped pose list and replayed by
//! nearest-timestamp lookup — a direct state assignment, not integration —
//! so a missed tick degrades to the closest available sample instead of
//! erroring.

use crowd_core::{normalize_angle, shortest_angle_delta, SimConfig, SimTime, Vec2};

/// One rehearsed pose sample.  Immutable once generated.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimestampedPose {
    pub stamp: SimTime,
    pub position: Vec2,
    pub heading: f64,
}

/// An ordered, timestamped pose sequence for one canned maneuver.
#[derive(Clone, Debug, Default)]
pub struct MoveList {
    poses: Vec<TimestampedPose>,
}

impl MoveList {
    pub fn new(poses: Vec<TimestampedPose>) -> Self {
        Self { poses }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// The sample whose timestamp is closest to `now`, in absolute terms.
    ///
    /// `None` only for an empty list.
    // TODO: project `now` onto the start..end stamp range to find the index
    // directly instead of scanning; lists are a few hundred samples so the
    // scan has not shown up in profiles yet.
    pub fn sample_at(&self, now: SimTime) -> Option<&TimestampedPose> {
        self.poses.iter().min_by(|a, b| {
            let da = (now - a.stamp).abs();
            let db = (now - b.stamp).abs();
            da.total_cmp(&db)
        })
    }

    /// The maneuver is complete once `now` has passed the last sample's
    /// timestamp.  An empty list is trivially complete.
    pub fn completed(&self, now: SimTime) -> bool {
        match self.poses.last() {
            Some(last) => now > last.stamp,
            None => true,
        }
    }
}

// ── Rotation primitive ────────────────────────────────────────────────────────

/// One constant-rate rotation step from `current` toward `target`.
///
/// Both angles are normalized to `[0, 2π)`; the step of `angular_v * dt`
/// radians is taken in the sign of the shortest angular delta, so the turn
/// always goes the short way round and never flip-flops near the 0/2π
/// boundary.  If the remaining delta is within one step the target angle is
/// returned exactly — an already-aligned rotation never drifts.
pub fn rotate(current: f64, target: f64, dt: f64, angular_v: f64) -> f64 {
    let current = normalize_angle(current);
    let target = normalize_angle(target);
    let delta = shortest_angle_delta(current, target);
    let step = dt * angular_v;
    if delta.abs() <= step {
        return target;
    }
    normalize_angle(current + step.copysign(delta))
}

// ── Maneuver generation ───────────────────────────────────────────────────────

/// Rehearse the reached-shelf maneuver from the given start pose.
///
/// Phase 1 rotates toward `target_angle` at the configured angular rate
/// until within the angular tolerance; phase 2 translates forward along the
/// settled heading toward a point `maneuver_travel_distance` ahead, until
/// within the positional tolerance.  Every sample advances simulated time by
/// one `time_step`, and all stamps are offset `maneuver_lead_in` seconds
/// into the future from `now`.
pub fn reached_shelf_moves(
    start: Vec2,
    heading: f64,
    target_angle: f64,
    now: SimTime,
    cfg: &SimConfig,
) -> Vec<TimestampedPose> {
    let mut moves = Vec::new();
    let mut direction = normalize_angle(heading);
    let mut position = start;
    let mut stamp = now.offset(cfg.maneuver_lead_in);

    // rotate until within tolerance of the shelf angle
    while shortest_angle_delta(direction, target_angle).abs() > cfg.maneuver_angular_tolerance {
        moves.push(TimestampedPose { stamp, position, heading: direction });
        direction = rotate(direction, target_angle, cfg.time_step, cfg.maneuver_angular_rate);
        stamp = stamp.offset(cfg.time_step);
    }

    // pull in toward a point straight ahead
    let target_pos = position + Vec2::from_polar(direction, cfg.maneuver_travel_distance);
    translate_at_constant_rate(&mut moves, &mut position, &mut stamp, direction, direction, target_pos, cfg);

    moves
}

/// Rehearse the back-up maneuver: reverse `maneuver_travel_distance` metres
/// along `heading + π`, then rotate toward the bearing of
/// `destination` from the stopping point.
pub fn back_up_moves(
    start: Vec2,
    heading: f64,
    destination: Vec2,
    now: SimTime,
    cfg: &SimConfig,
) -> Vec<TimestampedPose> {
    let mut moves = Vec::new();
    let mut direction = normalize_angle(heading);
    let mut position = start;
    let mut stamp = now.offset(cfg.maneuver_lead_in);

    // reverse: translate along heading + π while still facing forward
    let travel_angle = direction + std::f64::consts::PI;
    let target_pos = position + Vec2::from_polar(travel_angle, cfg.maneuver_travel_distance);
    translate_at_constant_rate(&mut moves, &mut position, &mut stamp, direction, travel_angle, target_pos, cfg);

    // turn toward the next destination
    let target_angle = (destination - position).polar_angle();
    while shortest_angle_delta(direction, target_angle).abs() > cfg.maneuver_angular_tolerance {
        moves.push(TimestampedPose { stamp, position, heading: direction });
        direction = rotate(direction, target_angle, cfg.time_step, cfg.maneuver_angular_rate);
        stamp = stamp.offset(cfg.time_step);
    }

    moves
}

/// Shared constant-rate translation phase with the overshoot guard.
///
/// Appends samples facing `facing` while moving along `travel_angle` until
/// within the positional tolerance of `target_pos`.  If the remaining
/// distance ever exceeds the original distance plus the configured slack,
/// the maneuver is truncated at the current sample — this catches
/// unreachable targets in O(1) samples instead of looping forever.
fn translate_at_constant_rate(
    moves: &mut Vec<TimestampedPose>,
    position: &mut Vec2,
    stamp: &mut SimTime,
    facing: f64,
    travel_angle: f64,
    target_pos: Vec2,
    cfg: &SimConfig,
) {
    let original_distance = (target_pos - *position).length();
    loop {
        let remaining = (*position - target_pos).length();
        if remaining <= cfg.maneuver_position_tolerance {
            break;
        }
        if remaining > original_distance + cfg.maneuver_overshoot_slack {
            tracing::error!(
                remaining,
                original_distance,
                "maneuver overshot its target, truncating"
            );
            break;
        }
        moves.push(TimestampedPose {
            stamp: *stamp,
            position: *position,
            heading: facing,
        });
        *position += Vec2::from_polar(travel_angle, cfg.maneuver_linear_rate * cfg.time_step);
        *stamp = stamp.offset(cfg.time_step);
    }
}
