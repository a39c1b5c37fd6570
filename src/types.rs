use web_time::SystemTime;

/// Single coordinate axis used for grid rows, columns, and card positions.
pub type Coord = u32;

/// Count type used for pair counts and total-card counts.
pub type CardCount = u64;

/// Two-dimensional position `(row, col)`.
pub type Pos = (Coord, Coord);

/// Milliseconds since the Unix epoch.
pub type Millis = u64;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Pos {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0 as usize, self.1 as usize]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CardCount {
    let a = a as CardCount;
    let b = b as CardCount;
    a.saturating_mul(b)
}

/// Current wall-clock time in epoch milliseconds.
///
/// Engine operations take an explicit `now_ms` argument instead of calling
/// this directly, so tests can drive the clock.
pub fn now_millis() -> Millis {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as Millis)
        .unwrap_or(0)
}
