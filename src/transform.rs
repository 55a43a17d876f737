//! Time-sampled object transforms.
//!
//! An instance's `object_to_world`/`world_to_object` transform is a list of
//! keyframes ordered by time; interpolation is per-channel linear
//! (translation, scale) with quaternion slerp for rotation.

use cgmath::{InnerSpace as _, Matrix3, Matrix4, Point3, Quaternion, Vector3, Vector4};

/// A single keyframe: time plus translation, rotation, and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f64,
    pub translation: Vector3<f64>,
    pub rotation: Quaternion<f64>,
    pub scale: Vector3<f64>,
}

impl Keyframe {
    pub fn identity(time: f64) -> Self {
        Self {
            time,
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    fn matrix(&self) -> Matrix4<f64> {
        let r: Matrix4<f64> = Matrix3::from(self.rotation).into();
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        Matrix4::from_translation(self.translation) * r * s
    }
}

/// A time-sampled transform: keyframes pushed in monotonically increasing
/// time order. At least one keyframe must be present before the transform
/// is queried; a freshly constructed `TimeTransform` has an implicit
/// identity keyframe at `t = 0`.
#[derive(Clone, Debug)]
pub struct TimeTransform {
    keyframes: Vec<Keyframe>,
    has_explicit_keyframe: bool,
}

impl Default for TimeTransform {
    fn default() -> Self {
        Self {
            keyframes: vec![Keyframe::identity(0.0)],
            has_explicit_keyframe: false,
        }
    }
}

impl TimeTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a keyframe. Keyframes must be pushed in non-decreasing time
    /// order.
    pub fn push_keyframe(&mut self, keyframe: Keyframe) {
        debug_assert!(
            self.keyframes.last().map_or(true, |k| keyframe.time >= k.time),
            "transform keyframes must be pushed in non-decreasing time order",
        );
        if !self.has_explicit_keyframe {
            // Drop the implicit identity-at-0 placeholder on first real push.
            self.keyframes.clear();
            self.has_explicit_keyframe = true;
        }
        self.keyframes.push(keyframe);
    }

    fn sample_keyframe(&self, time: f64) -> Keyframe {
        let kfs = &self.keyframes;
        if kfs.len() == 1 || time <= kfs[0].time {
            return kfs[0];
        }
        if time >= kfs[kfs.len() - 1].time {
            return kfs[kfs.len() - 1];
        }
        // Binary search for the bracketing pair.
        let idx = match kfs.binary_search_by(|k| k.time.partial_cmp(&time).unwrap()) {
            Ok(i) => return kfs[i],
            Err(i) => i,
        };
        let a = &kfs[idx - 1];
        let b = &kfs[idx];
        let span = b.time - a.time;
        let f = if span > 0.0 { (time - a.time) / span } else { 0.0 };
        Keyframe {
            time,
            translation: a.translation + (b.translation - a.translation) * f,
            rotation: a.rotation.nlerp(b.rotation, f),
            scale: a.scale + (b.scale - a.scale) * f,
        }
    }

    /// The times of every keyframe pushed so far (or `[0.0]` for an
    /// untouched, implicitly-identity transform). Used to sweep an
    /// instance's bounds over its full range of motion.
    pub fn sample_times(&self) -> Vec<f64> {
        self.keyframes.iter().map(|k| k.time).collect()
    }

    /// The `object_to_world` matrix at `time`.
    pub fn object_to_world(&self, time: f64) -> Matrix4<f64> {
        self.sample_keyframe(time).matrix()
    }

    /// The `world_to_object` matrix at `time` (the inverse of
    /// [`Self::object_to_world`]).
    pub fn world_to_object(&self, time: f64) -> Matrix4<f64> {
        self.object_to_world(time)
            .invert()
            .expect("instance transform must be invertible")
    }

    /// Transforms a world-space point into object space at `time`.
    pub fn transform_point_to_object(&self, time: f64, p: Point3<f64>) -> Point3<f64> {
        use cgmath::Transform as _;
        self.world_to_object(time).transform_point(p)
    }

    /// Transforms an object-space point into world space at `time`.
    pub fn transform_point_to_world(&self, time: f64, p: Point3<f64>) -> Point3<f64> {
        use cgmath::Transform as _;
        self.object_to_world(time).transform_point(p)
    }

    /// Transforms a world-space direction into object space (rotation only,
    /// not normalized by the caller).
    pub fn transform_dir_to_object(&self, time: f64, d: Vector3<f64>) -> Vector3<f64> {
        use cgmath::Transform as _;
        self.world_to_object(time).transform_vector(d)
    }

    /// Transforms an object-space normal into world space: the transpose of
    /// the inverse (here, of `world_to_object`, i.e. `object_to_world`
    /// transposed-inverse), renormalized.
    pub fn transform_normal_to_world(&self, time: f64, n: Vector3<f64>) -> Vector3<f64> {
        let w2o = self.world_to_object(time);
        let m: Matrix4<f64> = w2o;
        let v = Vector4::new(n.x, n.y, n.z, 0.0);
        let transformed = m.transpose() * v;
        Vector3::new(transformed.x, transformed.y, transformed.z).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Rad, Rotation3 as _};

    #[test]
    fn identity_transform_round_trips_points() {
        let t = TimeTransform::new();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point_to_world(0.0, p), p);
        assert_eq!(t.transform_point_to_object(0.0, p), p);
    }

    #[test]
    fn interpolates_translation_linearly() {
        let mut t = TimeTransform::new();
        t.push_keyframe(Keyframe {
            time: 0.0,
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        });
        t.push_keyframe(Keyframe {
            time: 1.0,
            translation: Vector3::new(10.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        });
        let p = t.transform_point_to_world(0.5, Point3::new(0.0, 0.0, 0.0));
        assert!((p.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_round_trip_object_world() {
        let mut t = TimeTransform::new();
        t.push_keyframe(Keyframe {
            time: 0.0,
            translation: Vector3::new(1.0, 2.0, 3.0),
            rotation: Quaternion::from_angle_z(Rad(std::f64::consts::FRAC_PI_4)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        });
        let p_obj = Point3::new(0.3, -0.2, 1.7);
        let p_world = t.transform_point_to_world(0.0, p_obj);
        let back = t.transform_point_to_object(0.0, p_world);
        assert!((back - p_obj).map(|c| c.abs()).x < 1e-9);
    }
}
