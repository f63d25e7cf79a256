//! Model-order selection.

pub mod order_search;

pub use order_search::{
    select_order, BestParams, Criterion, OrderSearch, OrderSearchConfig, SearchSplit,
};
