use nalgebra::Point3;

/// A point in 3D space, in the same length unit as bubble radii.
pub type Location = Point3<f64>;

/// Identity payload carried alongside a bubble.
///
/// The geometry engine never reads these fields; they are cloned onto periodic images and
/// handed back to exporters unchanged so records can be traced to their source bubble.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BubbleLabel {
    /// The record name (e.g., "C", "BUB").
    pub name: String,
    /// The residue name used when the bubble is exported as an atom record.
    pub residue_name: String,
    /// Single-character chain identifier.
    pub chain_id: char,
    /// Residue sequence number.
    pub residue_seq: isize,
    /// Element symbol, empty when unassigned.
    pub element: String,
}

impl BubbleLabel {
    /// Creates a label with the default foam residue naming.
    pub fn new(name: &str, residue_seq: isize) -> Self {
        Self {
            name: name.to_string(),
            residue_name: "FOA".to_string(),
            chain_id: 'A',
            residue_seq,
            element: String::new(),
        }
    }
}

/// A sphere representing one unit of the simulated foam.
///
/// Bubbles are created by an external placement process and consumed here by value. The
/// `image_of` field distinguishes originals from the periodic images produced by
/// [`periodicize`](crate::core::geometry::periodic::periodicize).
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    /// Center of the sphere.
    pub location: Location,
    /// Sphere radius, strictly positive.
    pub radius: f64,
    /// Opaque identity payload.
    pub label: BubbleLabel,
    /// Index of the original bubble when this bubble is a periodic image.
    pub image_of: Option<usize>,
}

impl Bubble {
    /// Creates an original (non-image) bubble with a default label.
    ///
    /// # Arguments
    ///
    /// * `location` - Center of the sphere.
    /// * `radius` - Sphere radius.
    pub fn new(location: Location, radius: f64) -> Self {
        Self {
            location,
            radius,
            label: BubbleLabel::default(),
            image_of: None,
        }
    }

    pub fn with_label(mut self, label: BubbleLabel) -> Self {
        self.label = label;
        self
    }

    #[inline]
    pub fn is_image(&self) -> bool {
        self.image_of.is_some()
    }

    /// Volume of the sphere.
    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3)
    }

    /// Returns a copy of this bubble moved to `location` and marked as an image of `source`.
    pub(crate) fn image_at(&self, location: Location, source: usize) -> Self {
        Self {
            location,
            radius: self.radius,
            label: self.label.clone(),
            image_of: Some(source),
        }
    }
}

/// Sum of the sphere volumes of all bubbles.
pub fn total_volume(bubbles: &[Bubble]) -> f64 {
    bubbles.iter().map(Bubble::volume).sum()
}
