mod exceptions;
mod logging;

pub use exceptions::{handle_panic, render_exceptions};
pub use logging::{logging_middleware, REQUEST_ID_HEADER};
