use std::os::raw::c_void;

/// Opaque `mecab_t*` owned by one tokenize call.
pub(crate) type TaggerHandle = *mut c_void;
