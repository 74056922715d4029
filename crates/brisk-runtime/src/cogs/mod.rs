//! Cogs
//!
//! Optional markers installed on top of the built-in set: the debug switch,
//! the phone mask and the text-input restrictions. A runtime built with
//! cogs disabled leaves these attributes alone.

pub mod debug;
pub mod phone_mask;
pub mod text_input;

use crate::{BindError, Runtime};

pub(crate) fn install(rt: &mut Runtime) -> Result<(), BindError> {
    let names = rt.markers().clone();
    rt.register_marker_fn(&names.debug, debug::bind)?;
    rt.register_marker_fn(&names.phone_mask, phone_mask::bind)?;
    rt.register_marker_fn(&names.no_paste, text_input::bind_no_paste)?;
    rt.register_marker_fn(&names.limit_text, text_input::bind_limit_text)?;
    rt.register_marker_fn(&names.only_allow_chars, text_input::bind_only_allow_chars)?;
    Ok(())
}
