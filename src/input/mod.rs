mod script;
mod touch;

pub use script::{run_script, ScriptError, ScriptResult, ScriptStep, TouchScript};
pub use touch::{TouchAction, TouchEvent};
