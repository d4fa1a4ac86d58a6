pub mod commands;
pub mod shared_str;
pub mod theme;
pub mod types;

pub use commands::{OverlayId, RenderCommand};
pub use shared_str::SharedStr;
pub use theme::ThemeToken;
pub use types::{Color, Fill, Rect};
