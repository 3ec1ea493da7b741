use crate::geom::{
    CapOrientation, CubicBezier3, Point3, Polyline3, SphericalCapSurface, Surface, Tolerance,
    TrimmedSurface, TwoRailLoftOptions, loft_two_rails,
};

fn rim_rail(cap: &SphericalCapSurface) -> Polyline3 {
    let rim = cap.trim_loops().remove(0);
    Polyline3::new(rim.points, true).expect("rim should form a closed rail")
}

#[test]
fn loft_between_mirrored_cap_rims() {
    let dome = SphericalCapSurface::new(Point3::new(0.0, 0.0, 0.5), 1.0, 0.0, CapOrientation::Up)
        .expect("dome should construct");
    let bowl =
        SphericalCapSurface::new(Point3::new(0.0, 0.0, -0.5), 1.0, 0.0, CapOrientation::Down)
            .expect("bowl should construct");

    let rail_a = rim_rail(&dome);
    let rail_b = rim_rail(&bowl);

    // Straight vertical sections at the quarter points of the rim.
    let params = [0.0, 0.25, 0.5, 0.75];
    let sections: Vec<CubicBezier3> = params
        .iter()
        .map(|&t| {
            use crate::geom::Curve3;
            let top = rail_a.point_at(t);
            let bottom = rail_b.point_at(t);
            CubicBezier3::new(top, top.lerp(bottom, 0.25), top.lerp(bottom, 0.75), bottom)
        })
        .collect();

    let surface = loft_two_rails(
        &rail_a,
        &rail_b,
        &sections,
        &params,
        &TwoRailLoftOptions::default(),
        Tolerance::new(1e-3),
    )
    .expect("loft between mirrored rims should succeed");

    assert!(surface.is_valid());
    assert!(surface.is_u_periodic());

    // The belt between mirrored rims is symmetric about z = 0.
    for &(u, v) in &[(0.1, 0.2), (0.4, 0.5), (0.7, 0.9)] {
        let p = surface.point_at(u, v);
        let q = surface.point_at(u, 1.0 - v);
        assert!((p.z + q.z).abs() < 1e-6);
    }
}
