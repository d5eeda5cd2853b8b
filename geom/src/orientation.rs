/// The eight standard placement orientations (LEF/DEF convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    R0,
    R90,
    R180,
    R270,
    MY,
    MX,
    MYR90,
    MXR90,
}

impl Orientation {
    pub fn is_mirrored(self) -> bool {
        matches!(
            self,
            Orientation::MY | Orientation::MX | Orientation::MYR90 | Orientation::MXR90
        )
    }

    /// `true` if this orientation swaps the effective width/height of whatever it's applied to.
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            Orientation::R90 | Orientation::R270 | Orientation::MYR90 | Orientation::MXR90
        )
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::R0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_r0() {
        assert_eq!(Orientation::default(), Orientation::R0);
    }

    #[test]
    fn mirrored_orientations() {
        assert!(Orientation::MY.is_mirrored());
        assert!(Orientation::MX.is_mirrored());
        assert!(Orientation::MYR90.is_mirrored());
        assert!(Orientation::MXR90.is_mirrored());
        assert!(!Orientation::R0.is_mirrored());
        assert!(!Orientation::R90.is_mirrored());
    }

    #[test]
    fn axis_swapping_orientations() {
        assert!(Orientation::R90.swaps_axes());
        assert!(Orientation::R270.swaps_axes());
        assert!(Orientation::MYR90.swaps_axes());
        assert!(Orientation::MXR90.swaps_axes());
        assert!(!Orientation::R0.swaps_axes());
        assert!(!Orientation::MY.swaps_axes());
    }
}
