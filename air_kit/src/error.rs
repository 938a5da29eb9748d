use region_mask::LayoutError;
use thiserror::Error;

use crate::instrument::InstrumentKind;

#[derive(Debug, Error)]
pub enum KitError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("{0} has no screen region yet")]
    NotPlaced(InstrumentKind),
    #[error("{0} already has a screen region")]
    AlreadyPlaced(InstrumentKind),
    #[error("{kind} icon is {width}x{height}, expected {expected_w}x{expected_h}")]
    IconSize {
        kind:       InstrumentKind,
        width:      u32,
        height:     u32,
        expected_w: u32,
        expected_h: u32,
    },
}
