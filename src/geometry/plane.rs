use serde::{Deserialize, Serialize};

use crate::math::{Point2, Point3, Vector3};

/// Orientation of a sketch's working plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneOrientation {
    #[default]
    Xy,
    Xz,
    Yz,
}

/// The plane a sketch is drawn on.
///
/// Plane-local `(x, y)` map onto two world axes; `offset` is the position
/// along the remaining axis. Lifting is `origin + x * u_dir + y * v_dir`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkingPlane {
    pub orientation: PlaneOrientation,
    #[serde(default)]
    pub offset: f64,
}

impl WorkingPlane {
    #[must_use]
    pub fn new(orientation: PlaneOrientation, offset: f64) -> Self {
        Self {
            orientation,
            offset,
        }
    }

    /// World-space origin of the plane-local coordinate system.
    #[must_use]
    pub fn origin(&self) -> Point3 {
        Point3::origin() + self.normal() * self.offset
    }

    /// World direction of the plane-local x axis.
    #[must_use]
    pub fn u_dir(&self) -> Vector3 {
        match self.orientation {
            PlaneOrientation::Xy | PlaneOrientation::Xz => Vector3::x(),
            PlaneOrientation::Yz => Vector3::y(),
        }
    }

    /// World direction of the plane-local y axis.
    #[must_use]
    pub fn v_dir(&self) -> Vector3 {
        match self.orientation {
            PlaneOrientation::Xy => Vector3::y(),
            PlaneOrientation::Xz | PlaneOrientation::Yz => Vector3::z(),
        }
    }

    /// Plane normal, the world axis not spanned by the plane.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        match self.orientation {
            PlaneOrientation::Xy => Vector3::z(),
            PlaneOrientation::Xz => Vector3::y(),
            PlaneOrientation::Yz => Vector3::x(),
        }
    }

    /// Lifts a plane-local point into world space.
    #[must_use]
    pub fn to_3d(&self, p: &Point2) -> Point3 {
        self.origin() + self.u_dir() * p.x + self.v_dir() * p.y
    }

    /// Projects a world point onto the plane, discarding the normal component.
    #[must_use]
    pub fn to_2d(&self, p: &Point3) -> Point2 {
        let d = p - Point3::origin();
        Point2::new(d.dot(&self.u_dir()), d.dot(&self.v_dir()))
    }
}
