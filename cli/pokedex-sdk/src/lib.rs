pub mod models;

pub mod pokedex;

pub use pokedex_catalog as catalog;
