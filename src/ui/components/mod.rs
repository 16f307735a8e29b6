//! Reusable UI components.

mod autocomplete;
mod input;
mod tag_input;
mod tag_list;

pub use autocomplete::{Autocomplete, LookupRequest};
pub use input::StagedInput;
pub use tag_input::TagInput;
pub use tag_list::{TagListAction, TagListView};
