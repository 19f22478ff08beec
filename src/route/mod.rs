pub mod attributes;
pub mod context;

pub use attributes::{AttrValue, Attributes};
pub use context::RequestContext;
