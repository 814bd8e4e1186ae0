/// Single coordinate axis, used for the board side length and for positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

pub type Coord2 = (Coord, Coord);

/// `ndarray` index of a `(row, col)` position.
pub const fn nd_index((row, col): Coord2) -> [usize; 2] {
    [row as usize, col as usize]
}

/// Number of cells on a square board with the given side length.
pub const fn square(side: Coord) -> CellCount {
    let side = side as CellCount;
    side.saturating_mul(side)
}

/// In-bounds neighbours of `center` on a `size` x `size` board, diagonals included, in row-major order.
pub fn neighbors(center: Coord2, size: Coord) -> impl Iterator<Item = Coord2> {
    let (row, col) = center;
    let last = size.saturating_sub(1);
    let rows = row.saturating_sub(1)..=row.saturating_add(1).min(last);
    rows.flat_map(move |r| {
        (col.saturating_sub(1)..=col.saturating_add(1).min(last)).map(move |c| (r, c))
    })
    .filter(move |&pos| pos != center)
}
