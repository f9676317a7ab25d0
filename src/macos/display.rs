use crate::Rect;
use core_graphics::display::CGDisplay;
use log::debug;

pub fn main_screen_rect() -> Rect {
    let bounds = CGDisplay::main().bounds();
    let rect = Rect::new(
        bounds.origin.x,
        bounds.origin.y,
        bounds.size.width,
        bounds.size.height,
    );
    debug!("Main display bounds: {:?}", rect);
    rect
}
