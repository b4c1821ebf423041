// ABOUTME: Tagging system for attaching free-text tags to arbitrary records
// ABOUTME: Provides the tag parser, storage layer, form fields and select widget

pub mod forms;
pub mod parser;
pub mod storage;
pub mod types;
pub mod widget;

// Re-export main types
pub use forms::{TagAdminForm, TagField, TagFieldMultiSelect};
pub use parser::{edit_string_for_tags, parse_tag_input};
pub use storage::TagStorage;
pub use types::{CountedTag, ObjectSource, Tag, TagCreateInput, TagFilter, TaggedObject};
pub use widget::{TagSelectWidget, WidgetMedia};
