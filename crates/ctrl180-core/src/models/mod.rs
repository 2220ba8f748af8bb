pub mod fields;
pub mod layout;
pub mod overlay;
pub mod template;
