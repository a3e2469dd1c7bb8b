pub mod portafolio;
