//! Head motions
//!
//! A motion is a fixed plan of eased servo moves starting and ending at the
//! home pose. Driving the servos is left to the avatar; this module only
//! knows the plan and where the head should be at a given moment.

use std::fmt;
use std::str::FromStr;

use crate::avatar::UnknownGesture;
use crate::time::Millis;

/// Home pan angle in degrees
pub const HOME_PAN: i32 = 82;
/// Home tilt angle in degrees
pub const HOME_TILT: i32 = 75;

const NOD_DOWN: i32 = 90;
const SHAKE_RIGHT: i32 = 60;
const SHAKE_LEFT: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Pan,
    Tilt,
}

/// Move one axis to `target_deg` over `duration_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyframe {
    pub axis: Axis,
    pub target_deg: i32,
    pub duration_ms: Millis,
}

const fn key(axis: Axis, target_deg: i32, duration_ms: Millis) -> Keyframe {
    Keyframe {
        axis,
        target_deg,
        duration_ms,
    }
}

const NOD: &[Keyframe] = &[key(Axis::Tilt, NOD_DOWN, 1000), key(Axis::Tilt, HOME_TILT, 1000)];

const SHAKE: &[Keyframe] = &[
    key(Axis::Pan, SHAKE_RIGHT, 500),
    key(Axis::Pan, SHAKE_LEFT, 1000),
    key(Axis::Pan, HOME_PAN, 500),
];

/// Head orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pose {
    pub pan: i32,
    pub tilt: i32,
}

impl Pose {
    pub const HOME: Pose = Pose {
        pan: HOME_PAN,
        tilt: HOME_TILT,
    };

    fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Pan => self.pan,
            Axis::Tilt => self.tilt,
        }
    }

    fn with_axis(mut self, axis: Axis, deg: i32) -> Self {
        match axis {
            Axis::Pan => self.pan = deg,
            Axis::Tilt => self.tilt = deg,
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Nod,
    Shake,
}

impl Motion {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nod" | "うなずき" => Some(Motion::Nod),
            "shake" | "首振り" => Some(Motion::Shake),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Motion::Nod => "nod",
            Motion::Shake => "shake",
        }
    }

    pub fn keyframes(self) -> &'static [Keyframe] {
        match self {
            Motion::Nod => NOD,
            Motion::Shake => SHAKE,
        }
    }

    pub fn duration_ms(self) -> Millis {
        self.keyframes().iter().map(|k| k.duration_ms).sum()
    }

    /// Where the head is `elapsed` ms after the motion started from home
    pub fn pose_at(self, elapsed: Millis) -> Pose {
        let mut pose = Pose::HOME;
        let mut offset = 0;
        for frame in self.keyframes() {
            let from = pose.axis(frame.axis);
            if elapsed < offset + frame.duration_ms {
                let deg = angle_at(from, frame.target_deg, elapsed - offset, frame.duration_ms);
                return pose.with_axis(frame.axis, deg);
            }
            pose = pose.with_axis(frame.axis, frame.target_deg.clamp(0, 180));
            offset += frame.duration_ms;
        }
        pose
    }
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Motion {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownGesture::Motion(s.to_string()))
    }
}

/// Cubic ease-in-out over `t` in 0.0..=1.0
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let f = 2.0 * t - 2.0;
        1.0 + f * f * f / 2.0
    }
}

/// Servo angle `elapsed` ms into an eased move from `from` to `to`
pub fn angle_at(from: i32, to: i32, elapsed: Millis, duration: Millis) -> i32 {
    let to = to.clamp(0, 180);
    if duration == 0 || elapsed >= duration {
        return to;
    }
    let progress = ease_cubic_in_out(elapsed as f32 / duration as f32);
    from + ((to - from) as f32 * progress) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Motion::from_name("nod"), Some(Motion::Nod));
        assert_eq!(Motion::from_name("うなずき"), Some(Motion::Nod));
        assert_eq!(Motion::from_name("首振り"), Some(Motion::Shake));
        assert_eq!(
            "wave".parse::<Motion>(),
            Err(UnknownGesture::Motion("wave".to_string()))
        );
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!(ease_cubic_in_out(0.25) < 0.25);
        assert!(ease_cubic_in_out(0.75) > 0.75);
    }

    #[test]
    fn test_angle_at() {
        assert_eq!(angle_at(75, 90, 0, 1000), 75);
        assert_eq!(angle_at(75, 90, 1000, 1000), 90);
        assert_eq!(angle_at(0, 100, 500, 1000), 50);
        assert_eq!(angle_at(10, 250, 5, 0), 180);
    }

    #[test]
    fn test_durations() {
        assert_eq!(Motion::Nod.duration_ms(), 2000);
        assert_eq!(Motion::Shake.duration_ms(), 2000);
    }

    #[test]
    fn test_nod_poses() {
        assert_eq!(Motion::Nod.pose_at(0), Pose::HOME);
        assert_eq!(Motion::Nod.pose_at(1000), Pose { pan: 82, tilt: 90 });
        assert_eq!(Motion::Nod.pose_at(2000), Pose::HOME);
        let mid = Motion::Nod.pose_at(500);
        assert_eq!(mid.pan, HOME_PAN);
        assert!(mid.tilt > HOME_TILT && mid.tilt < 90);
    }

    #[test]
    fn test_shake_poses() {
        assert_eq!(Motion::Shake.pose_at(500).pan, 60);
        assert_eq!(Motion::Shake.pose_at(1000).pan, 80);
        assert_eq!(Motion::Shake.pose_at(1500).pan, 100);
        assert_eq!(Motion::Shake.pose_at(5000), Pose::HOME);
    }
}
