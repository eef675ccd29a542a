//! Application services for backlog ordering.

mod order;
mod request;

pub use order::{BacklogOrderError, BacklogOrderResult, BacklogOrderService};
pub use request::{
    BulkUpdateOrderRequest, CreateStoryRequest, GroupOrder, InvalidRequestReason, StoryOrderRow,
};
