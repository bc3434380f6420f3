use crate::shapes::cuboid;
use acd3d::decomposition::{
    ConvexDecomposition, DecompositionError, DecompositionParameters, Diagnostics,
};
use acd3d::na::Point3;
use acd3d::{parse_log_level, InvalidMeshError, TriMesh};
use log::LevelFilter;

#[test]
fn out_of_bounds_index() {
    let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
    assert_eq!(
        TriMesh::new(vertices, vec![[0, 1, 3]]),
        Err(InvalidMeshError::IndexOutOfBounds {
            triangle: 0,
            index: 3,
            num_vertices: 3,
        })
    );
}

#[test]
fn non_finite_coordinate() {
    let vertices = vec![
        Point3::origin(),
        Point3::new(f64::NAN, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    assert_eq!(
        TriMesh::new(vertices, vec![[0, 1, 2]]),
        Err(InvalidMeshError::NonFiniteCoordinate { vertex: 1 })
    );
}

#[test]
fn malformed_buffers() {
    assert_eq!(
        TriMesh::from_buffers(&[0.0; 7], &[0, 1, 2]),
        Err(InvalidMeshError::MalformedBuffer { len: 7 })
    );
    assert_eq!(
        TriMesh::from_buffers(&[0.0; 9], &[]),
        Err(InvalidMeshError::EmptyTriangles)
    );
}

#[test]
fn invalid_parameters_are_rejected() {
    let params = DecompositionParameters {
        threshold: 0.0,
        ..DecompositionParameters::default()
    };
    let result = ConvexDecomposition::new(params)
        .with_diagnostics(Diagnostics::silent())
        .decompose(&cuboid([0.0; 3], [1.0; 3]));

    assert!(matches!(
        result,
        Err(DecompositionError::InvalidParameter {
            name: "threshold",
            ..
        })
    ));
}

#[test]
fn log_levels() {
    assert_eq!(parse_log_level("off").unwrap(), LevelFilter::Off);
    assert_eq!(parse_log_level("DEBUG").unwrap(), LevelFilter::Debug);
    assert_eq!(parse_log_level("info").unwrap(), LevelFilter::Info);
    assert_eq!(parse_log_level("warning").unwrap(), LevelFilter::Warn);
    assert_eq!(parse_log_level("critical").unwrap(), LevelFilter::Error);
    assert!(matches!(
        parse_log_level("verbose"),
        Err(DecompositionError::InvalidParameter {
            name: "log_level",
            ..
        })
    ));
}
