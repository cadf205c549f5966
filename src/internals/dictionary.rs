//////////////////////////////////////////////////////////////
/// Word Dictionary
///
/// Maps word names to bindings. A binding is one of four kinds:
/// a builtin (native code with access to the token cursor), a user
/// word (a definition string re-evaluated on each call), a foreign
/// function (host code that sees only the interpreter), or a variable
/// (a reference pushed on invocation).
///
/// The store is a byte-indexed trie with a 128-way fanout, so lookup
/// cost is the length of the name. Names are matched byte-exact;
/// bytes outside 7-bit ASCII never match anything.
///
use crate::kernel::Value;
use crate::runtime::{ForthError, ForthRuntime};
use crate::internals::tokenizer::Frame;
use std::fmt;

pub const ALPHABET_SIZE: usize = 128;

/// Native words receive the interpreter and the current token frame,
/// and may move the frame's cursor.
pub type BuiltinFn = fn(&mut ForthRuntime, &mut Frame) -> Result<(), ForthError>;

/// Foreign functions receive the interpreter only.
pub type FfiFn = fn(&mut ForthRuntime);

#[derive(Clone)]
pub enum Binding {
    Builtin(BuiltinFn),
    UserWord(String),
    Ffi(FfiFn),
    Variable(Value),
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Builtin(_) => write!(f, "Builtin"),
            Binding::UserWord(def) => write!(f, "UserWord({:?})", def),
            Binding::Ffi(_) => write!(f, "Ffi"),
            Binding::Variable(val) => write!(f, "Variable({:?})", val),
        }
    }
}

struct TrieNode {
    children: [Option<Box<TrieNode>>; ALPHABET_SIZE],
    binding: Option<Binding>,
}

impl TrieNode {
    fn new() -> TrieNode {
        const EMPTY: Option<Box<TrieNode>> = None;
        TrieNode {
            children: [EMPTY; ALPHABET_SIZE],
            binding: None,
        }
    }
}

pub struct Dictionary {
    root: Box<TrieNode>,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary {
            root: Box::new(TrieNode::new()),
        }
    }

    /// define installs a binding, replacing any existing one in place
    /// (the replaced binding's storage is dropped). Returns true when a
    /// binding was replaced.
    pub fn define(&mut self, name: &str, binding: Binding) -> bool {
        let mut node = &mut *self.root;
        for &byte in name.as_bytes() {
            let idx = byte as usize;
            if idx >= ALPHABET_SIZE {
                return false;
            }
            node = &mut **node.children[idx].get_or_insert_with(|| Box::new(TrieNode::new()));
        }
        let replaced = node.binding.is_some();
        node.binding = Some(binding);
        replaced
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        let mut node = &*self.root;
        for &byte in name.as_bytes() {
            let idx = byte as usize;
            if idx >= ALPHABET_SIZE {
                return None;
            }
            node = node.children[idx].as_deref()?;
        }
        node.binding.as_ref()
    }
}
