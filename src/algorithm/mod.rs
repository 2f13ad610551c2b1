pub(crate) mod bulk_load;
pub(crate) mod insertion;
pub mod iterators;
pub(crate) mod nearest_neighbor;
pub(crate) mod removal;
pub mod selection_functions;
