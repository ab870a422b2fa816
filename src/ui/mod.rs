//! Dear ImGui integration and the on-screen text overlay.

pub mod manager;
pub mod overlay;

pub use manager::UiManager;
pub use overlay::Overlay;
