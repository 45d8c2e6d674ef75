//! Configuration tree codec.
//!
//! Converts the driver's native widget tree into [`ConfigNode`]s that
//! serialize to the shape hosts consume, and routes single-leaf writes from
//! [`GenericValue`]s back to the device.

pub mod codec;
pub mod node;
pub mod value;

pub use codec::{coerce_value, fetch_config_tree, set_config_value, walk_widget};
pub use node::{Children, ConfigNode, NodeKind};
pub use value::GenericValue;
