pub mod angle;
pub mod circle;
pub mod macros;
pub mod point;
pub mod rect;

pub use circle::Circle;
pub use point::{Point, Size};
pub use rect::Rect;
