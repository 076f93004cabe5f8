// Scoring used by the reference runs, a DNA-style +2/-1/-1 scheme
pub const MATCH_SCORE: i32 = 2;
pub const MISMATCH_SCORE: i32 = -1;
pub const GAP_ROW_PENALTY: i32 = -1;
pub const GAP_COL_PENALTY: i32 = -1;

/// Edge length of a square tile in the wavefront scheduler
pub const TILE_SIZE: usize = 4096;

/// Widest query accepted by the streaming pipeline
pub const MAX_WINDOW: usize = 1024;

/// Filler emitted on the gapped side of an alignment column
pub const GAP: u8 = b'-';
