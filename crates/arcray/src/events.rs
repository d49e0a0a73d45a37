use crate::arc::gesture::PointerKind;
use uigeom::Point;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Frame,
    Pointer(PointerKind, Point),
    ConfigReload,
    Quit,
}
