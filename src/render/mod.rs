pub mod overlay;
pub mod window;

pub use minifb::Key;
pub use overlay::SKELETON_CONNECTIONS;
pub use window::MeterWindow;
