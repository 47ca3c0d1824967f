use super::*;

fn identity_cube_text(n: usize) -> String {
    let mut s = String::from("# generated\nTITLE \"Identity\"\nLUT_3D_SIZE ");
    s.push_str(&n.to_string());
    s.push('\n');
    let d = (n - 1) as f32;
    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                s.push_str(&format!("{} {} {}\n", r as f32 / d, g as f32 / d, b as f32 / d));
            }
        }
    }
    s
}

fn assert_close(a: [f32; 3], b: [f32; 3]) {
    for i in 0..3 {
        assert!((a[i] - b[i]).abs() < 1e-5, "{a:?} vs {b:?}");
    }
}

#[test]
fn parses_identity_cube_with_title() {
    let lut = Lut3d::parse_cube(&identity_cube_text(3)).unwrap();
    assert_eq!(lut.size(), 3);
    assert_eq!(lut.title(), Some("Identity"));
    assert_eq!(lut, Lut3d {
        title: Some("Identity".to_string()),
        ..Lut3d::identity(3)
    });
}

#[test]
fn identity_sampling_returns_input() {
    let lut = Lut3d::identity(17);
    for rgb in [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.25, 0.5, 0.75], [0.123, 0.987, 0.5]] {
        assert_close(lut.sample(rgb), rgb);
    }
}

#[test]
fn sampling_interpolates_between_grid_points() {
    // Size 2 grid that inverts red only.
    let mut table = Vec::new();
    for b in 0..2 {
        for g in 0..2 {
            for r in 0..2 {
                table.push([1.0 - r as f32, g as f32, b as f32]);
            }
        }
    }
    let lut = Lut3d::from_table(2, table).unwrap();
    assert_close(lut.sample([0.25, 0.5, 0.5]), [0.75, 0.5, 0.5]);
    assert_close(lut.sample([0.5, 0.1, 0.9]), [0.5, 0.1, 0.9]);
}

#[test]
fn out_of_domain_inputs_clamp_to_edges() {
    let lut = Lut3d::identity(4);
    assert_close(lut.sample([-1.0, 2.0, 0.5]), [0.0, 1.0, 0.5]);
}

#[test]
fn domain_is_respected() {
    let text = "LUT_3D_SIZE 2\nDOMAIN_MIN 0 0 0\nDOMAIN_MAX 2 2 2\n\
                0 0 0\n1 0 0\n0 1 0\n1 1 0\n0 0 1\n1 0 1\n0 1 1\n1 1 1\n";
    let lut = Lut3d::parse_cube(text).unwrap();
    assert_close(lut.sample([1.0, 1.0, 1.0]), [0.5, 0.5, 0.5]);
}

fn parse_err(text: &str) -> (Option<usize>, String) {
    match Lut3d::parse_cube(text).unwrap_err() {
        DarkroomError::LutParse { line, reason } => (line, reason),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_files_fail_descriptively() {
    let (line, reason) = parse_err("0 0 0\n");
    assert_eq!(line, Some(1));
    assert!(reason.contains("before LUT_3D_SIZE"));

    let (line, reason) = parse_err("");
    assert_eq!(line, None);
    assert!(reason.contains("missing LUT_3D_SIZE"));

    let (_, reason) = parse_err("LUT_3D_SIZE 2\n0 0 0\n");
    assert!(reason.contains("expected 8 table rows"));

    let (line, reason) = parse_err("LUT_3D_SIZE 2\n0 0 zero\n");
    assert_eq!(line, Some(2));
    assert!(reason.contains("not a number"));

    let (line, reason) = parse_err("LUT_3D_SIZE 2\n0 0\n");
    assert_eq!(line, Some(2));
    assert!(reason.contains("expected 3 values"));

    let (line, _) = parse_err("LUT_3D_SIZE 2\nLUT_3D_SIZE 2\n");
    assert_eq!(line, Some(2));

    let (_, reason) = parse_err("LUT_1D_SIZE 16\n");
    assert!(reason.contains("1D"));

    let (_, reason) = parse_err("LUT_3D_SIZE 1\n");
    assert!(reason.contains("within"));

    let (_, reason) = parse_err("LUT_3D_SIZE two\n");
    assert!(reason.contains("invalid LUT_3D_SIZE"));
}

#[test]
fn from_table_validates_length() {
    assert!(Lut3d::from_table(2, vec![[0.0; 3]; 7]).is_err());
    assert!(Lut3d::from_table(1, vec![[0.0; 3]; 1]).is_err());
    assert!(Lut3d::from_table(2, vec![[0.0; 3]; 8]).is_ok());
}
