pub mod renderer;

pub use renderer::{Renderer, board_area};
