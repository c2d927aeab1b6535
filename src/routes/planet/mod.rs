mod handler;
mod model;

pub use handler::{create_planet, delete_planet, get_planet, list_planets, update_planet};
