use nalgebra::Point3;

#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub name: String,          // Atom name as given by the structure service (e.g., "CA", "OG1")
    pub position: Point3<f64>, // Orthogonal coordinates in Angstroms
    pub b_factor: f64,         // Isotropic B-factor in A^2
}

impl AtomRecord {
    pub fn new(name: &str, position: Point3<f64>, b_factor: f64) -> Self {
        Self {
            name: name.trim().to_string(),
            position,
            b_factor,
        }
    }
}
