use crate::error::DockError;
use crate::keystroke::{KeyEvent, Modifiers};
use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use log::debug;

fn event_flags(modifiers: Modifiers) -> CGEventFlags {
    let mut flags = CGEventFlags::empty();
    if modifiers.cmd {
        flags |= CGEventFlags::CGEventFlagCommand;
    }
    if modifiers.alt {
        flags |= CGEventFlags::CGEventFlagAlternate;
    }
    if modifiers.ctrl {
        flags |= CGEventFlags::CGEventFlagControl;
    }
    if modifiers.shift {
        flags |= CGEventFlags::CGEventFlagShift;
    }
    flags
}

pub fn post_key_event(event: KeyEvent) -> Result<(), DockError> {
    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|_| {
        DockError::UnknownAction("could not create keyboard event source".to_string())
    })?;
    let cg_event = CGEvent::new_keyboard_event(source, event.key_code, event.key_down)
        .map_err(|_| {
            DockError::UnknownAction(format!(
                "could not create key event for code {}",
                event.key_code
            ))
        })?;
    cg_event.set_flags(event_flags(event.modifiers));
    cg_event.post(CGEventTapLocation::HID);

    debug!(
        "Posted key {} ({}) with {:?}",
        event.key_code,
        if event.key_down { "down" } else { "up" },
        event.modifiers
    );
    Ok(())
}
