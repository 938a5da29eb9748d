//! Fixed placement of instrument regions.
//!
//! Every region is 200×100 and sits on the same row, six eighths of the way
//! down the frame.  The horizontal centre is a whole number of eighths of
//! the frame width, chosen from `(count, index)`:
//!
//! | count | index → column (eighths) |
//! |---|---|
//! | 1 | 0→4 |
//! | 2 | 0→2, 1→6 |
//! | 3 | 0→2, 1→4, 2→6 |
//! | 4 | 0→1, 1→3, 2→5, 3→5 (`Legacy`) or 3→7 (`Symmetric`) |
//!
//! With four instruments the `Legacy` table stacks the last two regions on
//! column 5 and never uses column 7.  `Symmetric` spreads them evenly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rect::{Point, Rect, Size};

pub const MAX_INSTRUMENTS: usize = 4;
pub const COLUMN_DIVISIONS: u32 = 8;
pub const ROW_EIGHTHS: u32 = 6;
pub const REGION_SIZE: Size = Size::new(200, 100);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMapping {
    #[default]
    Legacy,
    Symmetric,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("cannot have more than {MAX} instruments (got {count})", MAX = MAX_INSTRUMENTS)]
    TooManyInstruments { count: usize },
    #[error("instrument index {index} out of range for {count} instruments")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Column of the region centre, in eighths of the frame width.
pub fn column_for(index: usize, count: usize, mapping: ColumnMapping) -> Result<u32, LayoutError> {
    if count > MAX_INSTRUMENTS {
        return Err(LayoutError::TooManyInstruments { count });
    }
    if index >= count {
        return Err(LayoutError::IndexOutOfRange { index, count });
    }

    let col = match (count, index) {
        (1, _) => 4,
        (2, 0) => 2,
        (2, _) => 6,
        (3, 0) => 2,
        (3, 1) => 4,
        (3, _) => 6,
        (_, 0) => 1,
        (_, 1) => 3,
        (_, 2) => 5,
        (_, _) => match mapping {
            ColumnMapping::Legacy    => 5,
            ColumnMapping::Symmetric => 7,
        },
    };
    Ok(col)
}

/// Region of instrument `index` out of `count` in a `frame_width`×`frame_height` frame.
pub fn assign_region(
    index:        usize,
    count:        usize,
    frame_width:  u32,
    frame_height: u32,
    mapping:      ColumnMapping,
) -> Result<Rect, LayoutError> {
    let col = column_for(index, count, mapping)?;
    let cx = frame_width as i64 * col as i64 / COLUMN_DIVISIONS as i64;
    let cy = frame_height as i64 * ROW_EIGHTHS as i64 / COLUMN_DIVISIONS as i64;
    Ok(Rect::centered(Point::new(cx as i32, cy as i32), REGION_SIZE))
}

/// Regions for all `count` instruments, in index order.
pub fn layout_all(
    count:        usize,
    frame_width:  u32,
    frame_height: u32,
    mapping:      ColumnMapping,
) -> Result<Vec<Rect>, LayoutError> {
    (0..count)
        .map(|i| assign_region(i, count, frame_width, frame_height, mapping))
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
