pub mod controller;
pub mod input;
pub mod shortcuts;
pub mod state;

pub use controller::{InteractionController, Marquee};
pub use input::{InputEvent, Modifiers};
pub use state::{EditorState, Interaction};
