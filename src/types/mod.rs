mod array;
pub mod atomic;
pub mod calendar;
pub mod duration;
mod function;
mod map;
mod sequence;

pub use array::XdmArray;
pub use atomic::{AtomicKind, AtomicValue};
pub use calendar::{Date, DateTime, Time, Timezone};
pub use duration::Duration;
pub use function::XdmFunction;
pub use map::XdmMap;
pub use sequence::{XdmItem, XdmValue};
