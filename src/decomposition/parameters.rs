use super::DecompositionError;
use crate::math::Real;
use std::fmt;
use std::str::FromStr;

/// How the input mesh is repaired before being decomposed.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PreprocessMode {
    /// Repair the mesh only if it isn't a closed manifold.
    #[default]
    Auto,
    /// Always rebuild the mesh surface from its voxelization.
    On,
    /// Use the mesh as-is.
    Off,
}

/// The shape used to approximate each part while searching for cutting planes.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ApproximationMode {
    /// Approximate parts by their convex hulls.
    #[default]
    ConvexHull,
    /// Approximate parts by their axis-aligned bounding boxes.
    Box,
}

impl FromStr for PreprocessMode {
    type Err = DecompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(DecompositionError::invalid_parameter(
                "preprocess_mode",
                format!("unknown mode `{s}` (expected auto, on or off)"),
            )),
        }
    }
}

impl FromStr for ApproximationMode {
    type Err = DecompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ch" => Ok(Self::ConvexHull),
            "box" => Ok(Self::Box),
            _ => Err(DecompositionError::invalid_parameter(
                "approximation_mode",
                format!("unknown mode `{s}` (expected ch or box)"),
            )),
        }
    }
}

impl fmt::Display for PreprocessMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

impl fmt::Display for ApproximationMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConvexHull => write!(f, "ch"),
            Self::Box => write!(f, "box"),
        }
    }
}

/// Upper bounds on the memory-hungry parts of the computation.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResourceLimits {
    /// The maximum number of triangles of the input mesh.
    pub max_triangles: usize,
    /// The maximum number of cells of the voxel grid used for mesh repair.
    pub max_voxels: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_triangles: 10_000_000,
            max_voxels: 1 << 27,
        }
    }
}

/// Parameters of the approximate convex decomposition.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecompositionParameters {
    /// The concavity below which a part is considered convex enough, in `[0.01, 1]`.
    pub threshold: Real,
    /// The maximum number of convex parts, or `None` for no limit.
    pub max_convex_hulls: Option<usize>,
    /// How the input mesh is repaired.
    pub preprocess_mode: PreprocessMode,
    /// The voxel resolution used for mesh repair, in `[5, 1000]`.
    pub preprocess_resolution: u32,
    /// The number of surface samples used to evaluate concavities.
    pub resolution: usize,
    /// The number of candidate cutting planes per axis.
    pub mcts_nodes: usize,
    /// The number of Monte-Carlo tree search iterations per cut.
    pub mcts_iterations: usize,
    /// The maximum depth of the Monte-Carlo tree search.
    pub mcts_max_depth: usize,
    /// Search cutting planes in the principal-axis frame of the mesh.
    pub pca: bool,
    /// Merge parts whose union is still convex enough.
    pub merge: bool,
    /// Limit the vertex count of each output hull to `max_ch_vertex`.
    pub decimate: bool,
    /// The maximum number of vertices per hull when `decimate` is enabled.
    pub max_ch_vertex: usize,
    /// Thicken flat output hulls.
    pub extrude: bool,
    /// The thickness added to flat hulls when `extrude` is enabled.
    pub extrude_margin: Real,
    /// The shape used to approximate parts during the plane search.
    pub approximation_mode: ApproximationMode,
    /// The seed of every randomized step.
    pub seed: u64,
    /// The weight of the volume-based term of the concavity.
    pub rv_k: Real,
    /// Resource limits.
    pub limits: ResourceLimits,
}

impl Default for DecompositionParameters {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            max_convex_hulls: None,
            preprocess_mode: PreprocessMode::Auto,
            preprocess_resolution: 50,
            resolution: 2000,
            mcts_nodes: 20,
            mcts_iterations: 150,
            mcts_max_depth: 3,
            pca: false,
            merge: true,
            decimate: false,
            max_ch_vertex: 256,
            extrude: false,
            extrude_margin: 0.01,
            approximation_mode: ApproximationMode::ConvexHull,
            seed: 0,
            rv_k: 0.3,
            limits: ResourceLimits::default(),
        }
    }
}

impl DecompositionParameters {
    /// Checks that every parameter is within its valid range.
    pub fn validate(&self) -> Result<(), DecompositionError> {
        fn invalid(name: &'static str, reason: impl Into<String>) -> DecompositionError {
            DecompositionError::invalid_parameter(name, reason)
        }

        if !(self.threshold >= 0.01 && self.threshold <= 1.0) {
            return Err(invalid(
                "threshold",
                format!("{} is outside of [0.01, 1]", self.threshold),
            ));
        }

        if self.preprocess_resolution < 5 || self.preprocess_resolution > 1000 {
            return Err(invalid(
                "preprocess_resolution",
                format!("{} is outside of [5, 1000]", self.preprocess_resolution),
            ));
        }

        if self.max_convex_hulls == Some(0) {
            return Err(invalid("max_convex_hulls", "must be at least 1"));
        }

        let counts = [
            ("resolution", self.resolution),
            ("mcts_nodes", self.mcts_nodes),
            ("mcts_iterations", self.mcts_iterations),
            ("mcts_max_depth", self.mcts_max_depth),
        ];

        for (name, value) in counts {
            if value == 0 {
                return Err(invalid(name, "must be at least 1"));
            }
        }

        if self.max_ch_vertex < 4 {
            return Err(invalid(
                "max_ch_vertex",
                format!("{} is smaller than 4", self.max_ch_vertex),
            ));
        }

        if !(self.extrude_margin >= 0.0) || !self.extrude_margin.is_finite() {
            return Err(invalid(
                "extrude_margin",
                format!("{} is not a finite non-negative number", self.extrude_margin),
            ));
        }

        if !(self.rv_k >= 0.0) || !self.rv_k.is_finite() {
            return Err(invalid(
                "rv_k",
                format!("{} is not a finite non-negative number", self.rv_k),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_parameters_are_valid() {
        assert!(DecompositionParameters::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_parameters() {
        let params = DecompositionParameters {
            threshold: 0.001,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(DecompositionError::InvalidParameter { name: "threshold", .. })
        ));

        let params = DecompositionParameters {
            preprocess_resolution: 2000,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(DecompositionError::InvalidParameter { name: "preprocess_resolution", .. })
        ));

        let params = DecompositionParameters {
            max_convex_hulls: Some(0),
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(DecompositionError::InvalidParameter {
                name: "max_convex_hulls",
                reason: "must be at least 1".to_string(),
            })
        );

        let params = DecompositionParameters {
            mcts_iterations: 0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(DecompositionError::InvalidParameter {
                name: "mcts_iterations",
                reason: "must be at least 1".to_string(),
            })
        );
    }

    #[test]
    fn parse_modes() {
        assert_eq!("auto".parse::<PreprocessMode>(), Ok(PreprocessMode::Auto));
        assert_eq!("OFF".parse::<PreprocessMode>(), Ok(PreprocessMode::Off));
        assert_eq!("box".parse::<ApproximationMode>(), Ok(ApproximationMode::Box));
        assert_eq!("ch".parse::<ApproximationMode>(), Ok(ApproximationMode::ConvexHull));
        assert!("hull".parse::<ApproximationMode>().is_err());
    }
}
