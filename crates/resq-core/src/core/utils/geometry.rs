use nalgebra::Point3;

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm()
}

/// Torsion angle in degrees, in the half-open interval (-180, 180].
///
/// Sign convention: looking down the `p2`->`p3` bond, a positive angle is a
/// clockwise rotation of `p4` relative to `p1`.
pub fn torsion(p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>, p4: &Point3<f64>) -> f64 {
    let b1 = p2 - p1;
    let b2 = p3 - p2;
    let b3 = p4 - p3;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let m1 = n1.cross(&n2);

    let y = m1.dot(&b2.normalize());
    let x = n1.dot(&n2);
    y.atan2(x).to_degrees()
}
