use serde::{Deserialize, Serialize};

/// Rotation state of a piece.
///
/// Represents one of four rotation states:
///
/// - `0`: 0° (spawn orientation)
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    /// Creates a rotation state, returning `None` outside `0..4`.
    #[must_use]
    pub const fn new(n: u8) -> Option<Self> {
        if n < 4 { Some(Self(n)) } else { None }
    }

    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_left(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in id order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Numeric id of the kind, as used to index per-kind tables.
    #[must_use]
    pub const fn id(self) -> usize {
        self as usize
    }

    /// Returns the trimmed footprint of the piece in the given rotation.
    #[must_use]
    pub const fn shape(self, rotation: PieceRotation) -> PieceShape {
        PIECE_SHAPES[self as usize][rotation.as_usize()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use zztris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use zztris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Footprint of a piece trimmed to its bounding box.
///
/// `rows[0]` is the bottom row of the box. Bit `x` of a row is the column
/// `x` columns right of the box's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    rows: [u32; 4],
    width: u8,
    height: u8,
}

impl PieceShape {
    #[must_use]
    pub const fn width(self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(self) -> usize {
        self.height as usize
    }

    /// Bit mask of box row `dy` (0 = bottom), or 0 outside the box.
    #[must_use]
    pub const fn row(self, dy: usize) -> u32 {
        if dy < 4 { self.rows[dy] } else { 0 }
    }
}

/// A piece within its 4×4 grid, one `u16` per row with row 0 at the top.
type PieceMask = [u16; 4];

/// Generates all 4 rotation states of a piece mask by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I, 2 for O)
/// * `mask` - Initial piece mask at 0° rotation
const fn mask_rotations(size: usize, mask: PieceMask) -> [PieceMask; 4] {
    let mut rotates = [mask; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_mask = [0; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if (rotates[i - 1][size - 1 - x] & (1 << y)) != 0 {
                    new_mask[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_mask;
        i += 1;
    }
    rotates
}

/// Trims a 4×4 grid mask to its bounding box and flips it bottom-first.
#[expect(clippy::cast_possible_truncation)]
const fn trim(mask: PieceMask) -> PieceShape {
    let mut min_x = 4;
    let mut max_x = 0;
    let mut min_y = 4;
    let mut max_y = 0;
    let mut y = 0;
    while y < 4 {
        let bits = mask[y];
        if bits != 0 {
            if y < min_y {
                min_y = y;
            }
            if y > max_y {
                max_y = y;
            }
            let lo = bits.trailing_zeros() as usize;
            let hi = 15 - bits.leading_zeros() as usize;
            if lo < min_x {
                min_x = lo;
            }
            if hi > max_x {
                max_x = hi;
            }
        }
        y += 1;
    }
    let height = max_y - min_y + 1;
    let mut rows = [0; 4];
    let mut i = 0;
    while i < height {
        rows[i] = (mask[max_y - i] >> min_x) as u32;
        i += 1;
    }
    PieceShape {
        rows,
        width: (max_x - min_x + 1) as u8,
        height: height as u8,
    }
}

const PIECE_MASKS: [[PieceMask; 4]; PieceKind::LEN] = {
    const fn m(bits: [bool; 4]) -> u16 {
        let mut mask = 0;
        let mut i = 0;
        while i < 4 {
            if bits[i] {
                mask |= 1 << i;
            }
            i += 1;
        }
        mask
    }

    const C: bool = true;
    const E: bool = false;
    const EEEE: u16 = m([E; 4]);

    [
        // I-piece
        mask_rotations(4, [EEEE, m([C, C, C, C]), EEEE, EEEE]),
        // O-piece
        mask_rotations(2, [m([C, C, E, E]), m([C, C, E, E]), EEEE, EEEE]),
        // S-piece
        mask_rotations(3, [m([E, C, C, E]), m([C, C, E, E]), EEEE, EEEE]),
        // Z-piece
        mask_rotations(3, [m([C, C, E, E]), m([E, C, C, E]), EEEE, EEEE]),
        // J-piece
        mask_rotations(3, [m([C, E, E, E]), m([C, C, C, E]), EEEE, EEEE]),
        // L-piece
        mask_rotations(3, [m([E, E, C, E]), m([C, C, C, E]), EEEE, EEEE]),
        // T-piece
        mask_rotations(3, [m([E, C, E, E]), m([C, C, C, E]), EEEE, EEEE]),
    ]
};

const PIECE_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = {
    let empty = PieceShape {
        rows: [0; 4],
        width: 0,
        height: 0,
    };
    let mut shapes = [[empty; 4]; PieceKind::LEN];
    let mut k = 0;
    while k < PieceKind::LEN {
        let mut r = 0;
        while r < 4 {
            shapes[k][r] = trim(PIECE_MASKS[k][r]);
            r += 1;
        }
        k += 1;
    }
    shapes
};

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(shape: PieceShape) -> u32 {
        (0..shape.height()).map(|dy| shape.row(dy).count_ones()).sum()
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceKind::ALL {
            for r in 0..4 {
                let shape = kind.shape(PieceRotation::new(r).unwrap());
                assert_eq!(cells(shape), 4, "{kind:?} rotation {r}");
                assert!(shape.width() >= 1 && shape.width() <= 4);
                assert!(shape.height() >= 1 && shape.height() <= 4);
                assert_ne!(shape.row(0), 0, "bottom row of {kind:?} must be occupied");
                assert_ne!(shape.row(shape.height() - 1), 0);
            }
        }
    }

    #[test]
    fn test_spawn_shapes() {
        let t = PieceKind::T.shape(PieceRotation::default());
        assert_eq!((t.width(), t.height()), (3, 2));
        assert_eq!(t.row(0), 0b111);
        assert_eq!(t.row(1), 0b010);

        let i = PieceKind::I.shape(PieceRotation::default());
        assert_eq!((i.width(), i.height()), (4, 1));
        assert_eq!(i.row(0), 0b1111);

        let s = PieceKind::S.shape(PieceRotation::default());
        assert_eq!(s.row(0), 0b011);
        assert_eq!(s.row(1), 0b110);
    }

    #[test]
    fn test_rotated_shapes() {
        let i = PieceKind::I.shape(PieceRotation::default().rotated_right());
        assert_eq!((i.width(), i.height()), (1, 4));

        // T pointing right: stem on the right side
        let t = PieceKind::T.shape(PieceRotation::default().rotated_right());
        assert_eq!((t.width(), t.height()), (2, 3));
        assert_eq!(t.row(0), 0b01);
        assert_eq!(t.row(1), 0b11);
        assert_eq!(t.row(2), 0b01);

        let o = PieceKind::O.shape(PieceRotation::default().rotated_left());
        assert_eq!((o.width(), o.height()), (2, 2));
    }

    #[test]
    fn test_rotation_wraps() {
        let r = PieceRotation::default();
        assert_eq!(r.rotated_left(), PieceRotation::new(3).unwrap());
        assert_eq!(r.rotated_right().rotated_right().rotated_right().rotated_right(), r);
        assert_eq!(PieceRotation::new(4), None);
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
        assert_eq!(PieceKind::from_char('t'), None);
    }
}
