use crate::error::Error;

/// Axis-aligned rectangle in PDF user space (y grows upwards).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build from two opposite corners given in any order.
    pub fn from_corners(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Finite coordinates and min <= max on both axes.
    pub fn is_well_formed(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 <= self.x1
            && self.y0 <= self.y1
    }

    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let dx = (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0);
        let dy = (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0);
        dx * dy
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn check(self) -> Result<Rect, Error> {
        if self.is_well_formed() {
            Ok(self)
        } else {
            Err(Error::MalformedGeometry(format!(
                "rectangle [{} {} {} {}] is not well formed",
                self.x0, self.y0, self.x1, self.y1
            )))
        }
    }
}

/// Does most (>= 50%) of the atom's area fall inside the region?
/// Zero-area atoms never match.
pub fn overlaps_majority(atom: &Rect, region: &Rect) -> bool {
    debug_assert!(atom.is_well_formed() && region.is_well_formed());
    let atom_area = atom.area();
    if atom_area <= 0.0 {
        return false;
    }
    let overlap = atom.intersection_area(region);
    if overlap > 0.0 {
        log::trace!(
            "{:.1}-{:.1},{:.1}-{:.1} in {:.1}-{:.1},{:.1}-{:.1} {:.0}%",
            atom.x0,
            atom.x1,
            atom.y0,
            atom.y1,
            region.x0,
            region.x1,
            region.y0,
            region.y1,
            100.0 * overlap / atom_area
        );
    }
    overlap >= 0.5 * atom_area
}

/// Bounding box of a (possibly rotated) quadrilateral given as 4 x/y pairs.
pub fn normalize_quad(quad: &[f32; 8]) -> Rect {
    let xs = [quad[0], quad[2], quad[4], quad[6]];
    let ys = [quad[1], quad[3], quad[5], quad[7]];
    Rect {
        x0: xs.iter().copied().fold(f32::INFINITY, f32::min),
        y0: ys.iter().copied().fold(f32::INFINITY, f32::min),
        x1: xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        y1: ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
    }
}

/// Split a flat `/QuadPoints` list into one region per quadrilateral.
pub fn regions_from_quad_points(coords: &[f32]) -> Result<Vec<Rect>, Error> {
    if coords.len() % 8 != 0 {
        return Err(Error::MalformedGeometry(format!(
            "quad point list has {} coordinates, expected a multiple of 8",
            coords.len()
        )));
    }
    coords
        .chunks_exact(8)
        .map(|chunk| {
            if !chunk.iter().all(|v| v.is_finite()) {
                return Err(Error::MalformedGeometry(format!(
                    "quad point coordinates {chunk:?} are not finite"
                )));
            }
            let mut quad = [0.0f32; 8];
            quad.copy_from_slice(chunk);
            normalize_quad(&quad).check()
        })
        .collect()
}
