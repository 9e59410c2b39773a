pub mod genres;
pub mod poster_cache;
pub mod settings;
