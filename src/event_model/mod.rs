pub mod display;
pub mod event;

pub use display::EventLine;
pub use event::{
    Category, KeyState, OutgoingEvent, PenButton, PenLocation, RawEvent, StylusButton,
    TabletState, Timestamp,
};
