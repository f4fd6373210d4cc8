use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::env;
use std::ffi::OsString;
use std::os::raw::c_void;
use std::sync::{Mutex, OnceLock};

use encoding_rs::Encoding;

use crate::config::TaggerHandle;
use crate::error::{MecabError, Result};
use crate::native::Engine;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn set_env_var(key: &str, value: &str) {
    #[allow(unused_unsafe)]
    unsafe {
        env::set_var(key, value);
    }
}

fn remove_env_var(key: &str) {
    #[allow(unused_unsafe)]
    unsafe {
        env::remove_var(key);
    }
}

fn restore_env_var(key: &str, value: Option<OsString>) {
    match value {
        Some(value) => {
            #[allow(unused_unsafe)]
            unsafe {
                env::set_var(key, value);
            }
        }
        None => remove_env_var(key),
    }
}

/// Runs a closure while holding a global environment lock and applying overrides.
pub(crate) fn with_env_vars<T>(overrides: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
    let _guard = env_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let backups: Vec<(&str, Option<OsString>)> = overrides
        .iter()
        .map(|(key, _)| (*key, env::var_os(key)))
        .collect();

    for (key, value) in overrides {
        match value {
            Some(value) => set_env_var(key, value),
            None => remove_env_var(key),
        }
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, value) in backups.into_iter().rev() {
        restore_env_var(key, value);
    }

    match result {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

/// IPADIC output for the inputs used throughout the tests.
pub(crate) const IPADIC_OUTPUTS: &[(&str, &str)] = &[
    (
        "すもももももももものうち",
        "すもも\t名詞,一般,*,*,*,*,すもも,スモモ,スモモ\n\
         も\t助詞,係助詞,*,*,*,*,も,モ,モ\n\
         もも\t名詞,一般,*,*,*,*,もも,モモ,モモ\n\
         も\t助詞,係助詞,*,*,*,*,も,モ,モ\n\
         もも\t名詞,一般,*,*,*,*,もも,モモ,モモ\n\
         の\t助詞,連体化,*,*,*,*,の,ノ,ノ\n\
         うち\t名詞,非自立,副詞可能,*,*,*,うち,ウチ,ウチ\n\
         EOS\n",
    ),
    (
        "2009年10月16日",
        "2009\t名詞,数,*,*,*,*,*\n\
         年\t名詞,接尾,助数詞,*,*,*,年,ネン,ネン\n\
         10\t名詞,数,*,*,*,*,*\n\
         月\t名詞,一般,*,*,*,*,月,ツキ,ツキ\n\
         16\t名詞,数,*,*,*,*,*\n\
         日\t名詞,接尾,助数詞,*,*,*,日,ニチ,ニチ\n\
         EOS\n",
    ),
    (
        "𠮷野屋",
        "𠮷\t記号,一般,*,*,*,*,*\n\
         野\t名詞,一般,*,*,*,*,野,ノ,ノ\n\
         屋\t名詞,接尾,一般,*,*,*,屋,ヤ,ヤ\n\
         EOS\n",
    ),
    ("한국어", "한국어\t記号,一般,*,*,*,*,*\nEOS\n"),
    (
        "マルチメディア放送（VHF-HIGH帯）「モバキャス」",
        "マルチメディア\t名詞,一般,*,*,*,*,マルチメディア,マルチメディア,マルチメディア\n\
         放送\t名詞,サ変接続,*,*,*,*,放送,ホウソウ,ホーソー\n\
         （\t記号,括弧開,*,*,*,*,（,（,（\n\
         VHF\t名詞,固有名詞,組織,*,*,*,*\n\
         -\t名詞,サ変接続,*,*,*,*,*\n\
         HIGH\t名詞,一般,*,*,*,*,*\n\
         帯\t名詞,接尾,一般,*,*,*,帯,タイ,タイ\n\
         ）\t記号,括弧閉,*,*,*,*,）,）,）\n\
         「\t記号,括弧開,*,*,*,*,「,「,「\n\
         モバキャス\t名詞,固有名詞,一般,*,*,*,*\n\
         」\t記号,括弧閉,*,*,*,*,」,」,」\n\
         EOS\n",
    ),
];

/// Scripted in-process engine that records every call.
///
/// Known inputs answer with [`IPADIC_OUTPUTS`]; anything else is split on
/// spaces into one noun per word. Handles are fake addresses that are never
/// dereferenced; using or destroying a dead one panics.
pub(crate) struct FakeEngine {
    encoding: &'static Encoding,
    scripts: HashMap<String, String>,
    fail_create: bool,
    fail_on: Option<String>,
    next_handle: Cell<usize>,
    live: RefCell<HashSet<usize>>,
    created: Cell<usize>,
    destroyed: Cell<usize>,
    analyzed: RefCell<Vec<String>>,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
            scripts: IPADIC_OUTPUTS
                .iter()
                .map(|(input, output)| (input.to_string(), output.to_string()))
                .collect(),
            fail_create: false,
            fail_on: None,
            next_handle: Cell::new(1),
            live: RefCell::new(HashSet::new()),
            created: Cell::new(0),
            destroyed: Cell::new(0),
            analyzed: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub(crate) fn with_script(mut self, input: &str, output: &str) -> Self {
        self.scripts.insert(input.to_string(), output.to_string());
        self
    }

    pub(crate) fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub(crate) fn failing_on(mut self, input: &str) -> Self {
        self.fail_on = Some(input.to_string());
        self
    }

    pub(crate) fn created(&self) -> usize {
        self.created.get()
    }

    pub(crate) fn destroyed(&self) -> usize {
        self.destroyed.get()
    }

    pub(crate) fn analyzed(&self) -> usize {
        self.analyzed.borrow().len()
    }

    pub(crate) fn analyzed_lines(&self) -> Vec<String> {
        self.analyzed.borrow().clone()
    }

    pub(crate) fn live_handles(&self) -> usize {
        self.live.borrow().len()
    }

    fn respond(&self, input: &str) -> String {
        if let Some(output) = self.scripts.get(input) {
            return output.clone();
        }
        let mut output = String::new();
        for word in input.split(' ').filter(|word| !word.is_empty()) {
            output.push_str(&format!("{word}\t名詞,一般,*,*,*,*,{word}\n"));
        }
        output.push_str("EOS\n");
        output
    }
}

impl Engine for FakeEngine {
    fn create_handle(&self) -> Result<TaggerHandle> {
        if self.fail_create {
            return Err(MecabError::EngineHandle("scripted failure".to_string()));
        }
        let id = self.next_handle.get();
        self.next_handle.set(id + 1);
        self.live.borrow_mut().insert(id);
        self.created.set(self.created.get() + 1);
        Ok(id as *mut c_void)
    }

    fn analyze(&self, handle: TaggerHandle, line: &[u8]) -> Result<Vec<u8>> {
        assert!(
            self.live.borrow().contains(&(handle as usize)),
            "analyze on a dead handle"
        );
        let (input, _) = self.encoding.decode_without_bom_handling(line);
        self.analyzed.borrow_mut().push(input.to_string());
        if self.fail_on.as_deref() == Some(&*input) {
            return Err(MecabError::Analyze("scripted failure".to_string()));
        }
        let output = self.respond(&input);
        let (bytes, _, _) = self.encoding.encode(&output);
        Ok(bytes.into_owned())
    }

    fn destroy_handle(&self, handle: TaggerHandle) {
        assert!(
            self.live.borrow_mut().remove(&(handle as usize)),
            "destroying a dead handle"
        );
        self.destroyed.set(self.destroyed.get() + 1);
    }

    fn version(&self) -> Option<String> {
        Some("fake-0.996".to_string())
    }
}

impl<E: Engine + ?Sized> Engine for std::rc::Rc<E> {
    fn create_handle(&self) -> Result<TaggerHandle> {
        (**self).create_handle()
    }

    fn analyze(&self, handle: TaggerHandle, line: &[u8]) -> Result<Vec<u8>> {
        (**self).analyze(handle, line)
    }

    fn destroy_handle(&self, handle: TaggerHandle) {
        (**self).destroy_handle(handle)
    }

    fn version(&self) -> Option<String> {
        (**self).version()
    }
}
