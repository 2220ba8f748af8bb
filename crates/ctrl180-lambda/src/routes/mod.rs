pub mod fill_template;
pub mod health;
