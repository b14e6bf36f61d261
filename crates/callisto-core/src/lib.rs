pub mod error;
pub mod consts;
pub mod image;
pub mod callback;
pub mod autocuts;
pub mod rgbmap;
pub mod viewport;
pub mod modes;
pub mod settings;
pub mod viewer;
