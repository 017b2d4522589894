pub mod editor;
pub mod viewer;

pub use editor::edit_handler;
pub use viewer::view_handler;
