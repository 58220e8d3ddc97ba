mod cut;
mod instance;
mod layout;
mod part;
mod part_instance;
mod placement;
mod result;
mod stock;

#[doc(inline)]
pub use cut::{CutDirection, CutLine};
#[doc(inline)]
pub use instance::Instance;
#[doc(inline)]
pub use layout::SheetLayout;
#[doc(inline)]
pub use part::{
    BoardRole, CustomLamination, EdgeBanding, Grain, LaminationLayer, LaminationType, PartSpec,
};
#[doc(inline)]
pub use part_instance::{PartInstance, expand_instances};
#[doc(inline)]
pub use placement::Placement;
#[doc(inline)]
pub use result::{Diagnostics, LayoutResult, LayoutStats, UnplacedPart, UnplacedReason};
#[doc(inline)]
pub use stock::{DEFAULT_KERF, StockSheetSpec};
