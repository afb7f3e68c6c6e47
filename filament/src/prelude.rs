//! An import prelude that re-exports commonly used items.

pub use crate::coords::{Boundary, Bounds, Coords, CrossSection, Curves, Point};
pub use crate::discretize::{discretize, TaperSections};
pub use crate::error::{Error, Result};
pub use crate::meander::MeanderLayoutParams;
pub use crate::ports::Port;
pub use crate::profile::{TaperKind, TaperSpec};
pub use crate::synthesize;
pub use crate::table::{ImpedanceTable, SweepFormat, TableFormat, XyFormat};
