//! Display ordering: pinned-important sorting, quadrants and manual moves.

pub mod reorder;
pub mod sort;

pub use reorder::{Direction, apply_reorder, find_reorder_target, swap_sort_order};
pub use sort::{
    QuadrantGroups, SortMode, clamp_quadrant, compare, group_by_quadrant, move_to_quadrant,
    normalize_sort_order, sort_with_pinned_important, sorted,
};
