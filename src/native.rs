use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::path::Path;
use std::ptr;
use std::sync::Mutex;

use crate::config::TaggerHandle;
use crate::constants::ENGINE_ARGS;
use crate::error::{MecabError, Result};

type FnMecabNew2 = unsafe extern "C" fn(*const c_char) -> TaggerHandle;
type FnMecabSparseTostr = unsafe extern "C" fn(TaggerHandle, *const c_char) -> *const c_char;
type FnMecabSparseTostr2 =
    unsafe extern "C" fn(TaggerHandle, *const c_char, usize) -> *const c_char;
type FnMecabDestroy = unsafe extern "C" fn(TaggerHandle);
type FnMecabStrerror = unsafe extern "C" fn(TaggerHandle) -> *const c_char;
type FnMecabVersion = unsafe extern "C" fn() -> *const c_char;

// mecab_new2 loads dictionaries; not assumed reentrant.
static MECAB_NEW_LOCK: Mutex<()> = Mutex::new(());

/// The calling contract the tokenizer needs from an analyzer engine.
///
/// Handles returned by [`Engine::create_handle`] are only ever used by the
/// call that created them and are always passed back to
/// [`Engine::destroy_handle`] exactly once.
pub(crate) trait Engine {
    /// Creates a tagger configured with the fixed default-mode arguments.
    fn create_handle(&self) -> Result<TaggerHandle>;

    /// Analyzes one line and returns a copy of the engine's output buffer.
    fn analyze(&self, handle: TaggerHandle, line: &[u8]) -> Result<Vec<u8>>;

    /// Releases a handle previously returned by `create_handle`.
    fn destroy_handle(&self, handle: TaggerHandle);

    /// Engine version string, when the engine exposes one.
    fn version(&self) -> Option<String> {
        None
    }
}

#[derive(Clone, Copy)]
pub(crate) struct MecabApi {
    pub(crate) mecab_new2: FnMecabNew2,
    pub(crate) mecab_sparse_tostr: FnMecabSparseTostr,
    pub(crate) mecab_destroy: FnMecabDestroy,
    pub(crate) mecab_sparse_tostr2: Option<FnMecabSparseTostr2>,
    pub(crate) mecab_strerror: Option<FnMecabStrerror>,
    pub(crate) mecab_version: Option<FnMecabVersion>,
}

impl MecabApi {
    pub(crate) unsafe fn load(library: &DynamicLibrary) -> Result<Self> {
        Ok(Self {
            mecab_new2: library.load_symbol("mecab_new2")?,
            mecab_sparse_tostr: library.load_symbol("mecab_sparse_tostr")?,
            mecab_destroy: library.load_symbol("mecab_destroy")?,
            mecab_sparse_tostr2: library.load_symbol_optional("mecab_sparse_tostr2")?,
            mecab_strerror: library.load_symbol_optional("mecab_strerror")?,
            mecab_version: library.load_symbol_optional("mecab_version")?,
        })
    }

    fn error_message(&self, handle: TaggerHandle, fallback: &str) -> String {
        let message = self
            .mecab_strerror
            .map(|strerror| cstr_to_string(unsafe { strerror(handle) }))
            .unwrap_or_default();
        let message = message.trim();
        if message.is_empty() {
            fallback.to_string()
        } else {
            message.to_string()
        }
    }
}

/// A loaded libmecab plus its resolved function table.
pub(crate) struct LoadedLibrary {
    _library: DynamicLibrary,
    pub(crate) api: MecabApi,
}

impl LoadedLibrary {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let library = DynamicLibrary::open(path)?;
        let api = unsafe { MecabApi::load(&library)? };
        Ok(Self {
            _library: library,
            api,
        })
    }
}

impl Engine for LoadedLibrary {
    fn create_handle(&self) -> Result<TaggerHandle> {
        let _guard = MECAB_NEW_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let handle = unsafe { (self.api.mecab_new2)(ENGINE_ARGS.as_ptr().cast()) };
        if handle.is_null() {
            return Err(MecabError::EngineHandle(
                self.api
                    .error_message(ptr::null_mut(), "mecab_new2 returned a null handle"),
            ));
        }
        Ok(handle)
    }

    fn analyze(&self, handle: TaggerHandle, line: &[u8]) -> Result<Vec<u8>> {
        let output = match self.api.mecab_sparse_tostr2 {
            Some(sparse_tostr2) => unsafe {
                sparse_tostr2(handle, line.as_ptr().cast(), line.len())
            },
            None => {
                let line_c = CString::new(line)?;
                unsafe { (self.api.mecab_sparse_tostr)(handle, line_c.as_ptr()) }
            }
        };
        if output.is_null() {
            return Err(MecabError::Analyze(
                self.api
                    .error_message(handle, "mecab_sparse_tostr returned a null pointer"),
            ));
        }
        // The buffer belongs to the tagger and is overwritten by the next call.
        Ok(unsafe { CStr::from_ptr(output) }.to_bytes().to_vec())
    }

    fn destroy_handle(&self, handle: TaggerHandle) {
        if handle.is_null() {
            return;
        }
        unsafe {
            (self.api.mecab_destroy)(handle);
        }
    }

    fn version(&self) -> Option<String> {
        let version = self.api.mecab_version?;
        let pointer = unsafe { version() };
        if pointer.is_null() {
            return None;
        }
        Some(cstr_to_string(pointer))
    }
}

#[derive(Debug)]
pub(crate) struct DynamicLibrary {
    handle: *mut c_void,
}

impl DynamicLibrary {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_string = path.as_ref().to_string_lossy().to_string();
        let path_c = CString::new(path_string.clone())?;
        let handle = unsafe { platform_open(path_c.as_ptr()) };
        if handle.is_null() {
            return Err(MecabError::LibraryLoad(format!(
                "{} ({})",
                path_string,
                platform_last_error()
            )));
        }
        Ok(Self { handle })
    }

    pub(crate) unsafe fn load_symbol<T: Copy>(&self, symbol_name: &str) -> Result<T> {
        let symbol_c = CString::new(symbol_name)?;
        let symbol_ptr = platform_symbol(self.handle, symbol_c.as_ptr());
        if symbol_ptr.is_null() {
            return Err(MecabError::SymbolLoad(format!(
                "{} ({})",
                symbol_name,
                platform_last_error()
            )));
        }
        Ok(std::mem::transmute_copy::<*mut c_void, T>(&symbol_ptr))
    }

    pub(crate) unsafe fn load_symbol_optional<T: Copy>(
        &self,
        symbol_name: &str,
    ) -> Result<Option<T>> {
        let symbol_c = CString::new(symbol_name)?;
        let symbol_ptr = platform_symbol(self.handle, symbol_c.as_ptr());
        if symbol_ptr.is_null() {
            return Ok(None);
        }
        Ok(Some(std::mem::transmute_copy::<*mut c_void, T>(
            &symbol_ptr,
        )))
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        unsafe {
            platform_close(self.handle);
        }
        self.handle = ptr::null_mut();
    }
}

pub(crate) fn cstr_to_string(pointer: *const c_char) -> String {
    if pointer.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(pointer) }
        .to_string_lossy()
        .to_string()
}

#[cfg(target_os = "windows")]
#[link(name = "kernel32")]
extern "system" {
    fn LoadLibraryA(lp_lib_file_name: *const c_char) -> *mut c_void;
    fn GetProcAddress(h_module: *mut c_void, lp_proc_name: *const c_char) -> *mut c_void;
    fn FreeLibrary(h_lib_module: *mut c_void) -> i32;
    fn GetLastError() -> u32;
}

#[cfg(target_os = "windows")]
unsafe fn platform_open(path: *const c_char) -> *mut c_void {
    LoadLibraryA(path)
}

#[cfg(target_os = "windows")]
unsafe fn platform_symbol(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    GetProcAddress(handle, symbol)
}

#[cfg(target_os = "windows")]
unsafe fn platform_close(handle: *mut c_void) {
    let _ = FreeLibrary(handle);
}

#[cfg(target_os = "windows")]
fn platform_last_error() -> String {
    format!("GetLastError={}", unsafe { GetLastError() })
}

#[cfg(target_os = "linux")]
#[link(name = "dl")]
extern "C" {
    fn dlopen(filename: *const c_char, flags: c_int) -> *mut c_void;
    fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
    fn dlclose(handle: *mut c_void) -> c_int;
    fn dlerror() -> *const c_char;
}

#[cfg(all(unix, not(target_os = "linux")))]
extern "C" {
    fn dlopen(filename: *const c_char, flags: c_int) -> *mut c_void;
    fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
    fn dlclose(handle: *mut c_void) -> c_int;
    fn dlerror() -> *const c_char;
}

#[cfg(unix)]
unsafe fn platform_open(path: *const c_char) -> *mut c_void {
    const RTLD_NOW: c_int = 2;
    const RTLD_LOCAL: c_int = 0;
    dlopen(path, RTLD_NOW | RTLD_LOCAL)
}

#[cfg(unix)]
unsafe fn platform_symbol(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    dlsym(handle, symbol)
}

#[cfg(unix)]
unsafe fn platform_close(handle: *mut c_void) {
    let _ = dlclose(handle);
}

#[cfg(unix)]
fn platform_last_error() -> String {
    let pointer = unsafe { dlerror() };
    if pointer.is_null() {
        "unknown error".to_string()
    } else {
        cstr_to_string(pointer)
    }
}
