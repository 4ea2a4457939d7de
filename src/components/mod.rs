pub mod scroll_view;

pub use scroll_view::ScrollView;
