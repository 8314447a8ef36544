pub mod descendants;
pub mod group;
pub mod strings;

pub use descendants::descendants_pruned;
pub use group::group_adjacent;
pub use strings::make_valid_xml;
