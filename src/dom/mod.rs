pub mod recognizer;
pub mod view;

pub use view::{IntoContentElement, ScrollView};
