//! Domain models for the work package engine

pub mod deliverable;
pub mod view;
pub mod work_package;

pub use deliverable::{
    CanonicalField, DeliverableRow, FieldMapping, MappingValidation, RowError, TransformReport,
};
pub use view::{ItemProgress, ItemView, PhaseRef, PhaseView, WorkPackageView};
pub use work_package::{
    Collateral, CollateralStatus, Item, Phase, TimelineStatus, WorkPackage, WorkStatus,
};
