//! Data module: attribute storage, parameters and bulk transfer.

pub mod attributes;
pub mod parameters;
pub mod sub_range;

pub use attributes::{Attributes, TARGET_X, TARGET_Y};
pub use parameters::{OperationSettings, Parameters};
pub use sub_range::{
    get_labels, get_sub_range, get_sub_range_current, get_sub_range_target, set_sub_range,
    set_sub_range_current, set_sub_range_target,
};
