use std::fmt;

/// Volume axis. The volume frame is y-up, x-right, z towards the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The two in-plane axes of a slice taken along `self`, as (u, v).
    pub fn plane(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Named slice views as shown to a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceView {
    /// Looking down the Z axis (XY plane)
    Front,
    /// Looking down the Y axis (XZ plane)
    Top,
    /// Looking down the X axis (YZ plane)
    Side,
}

impl SliceView {
    pub fn axis(self) -> Axis {
        match self {
            SliceView::Front => Axis::Z,
            SliceView::Top => Axis::Y,
            SliceView::Side => Axis::X,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation2D {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation3D {
    Nearest,
    #[default]
    Trilinear,
}

/// How samples along a ray are reduced to a single intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compositing {
    #[default]
    MaximumIntensity,
    AlphaBlend,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Equalization {
    #[default]
    Linear,
    Histogram,
}
