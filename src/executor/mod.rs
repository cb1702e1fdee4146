mod dispatch;
mod targets;

pub use dispatch::{PreparedCall, prepare_call, query};
pub(crate) use dispatch::collect_rows;
pub use targets::QueryTarget;
