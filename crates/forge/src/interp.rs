//! The embedding facade.
//!
//! [`Interpreter`] wires the tokenizer, block resolver, and VM together
//! behind a small API: feed it source, inspect the stack, capture
//! output, register host words, and set resource limits. State persists
//! across `run()` calls, so one interpreter instance backs a whole REPL
//! session.

use crate::error::Result;
use crate::resolver;
use crate::token;
use crate::value::Value;
use crate::vm::{Vm, WordFn};

use std::rc::Rc;

/// A Forge interpreter with persistent stack, variables, and procedures.
///
/// # Example
///
/// ```
/// use forge::{Interpreter, Value};
///
/// let mut forge = Interpreter::new();
/// forge.run("1 2 add").unwrap();
/// assert_eq!(forge.top(), Some(&Value::Int(3)));
///
/// // State persists: definitions from one run are callable in the next.
/// forge.run("def double 2 mul end").unwrap();
/// forge.run("double").unwrap();
/// assert_eq!(forge.top(), Some(&Value::Int(6)));
/// ```
#[derive(Clone, Default)]
pub struct Interpreter {
    vm: Vm,
}

impl Interpreter {
    pub fn new() -> Self {
        Self { vm: Vm::new() }
    }

    /// Tokenize, resolve, and evaluate Forge source.
    ///
    /// On error the operand stack is left as the failing program left
    /// it, so a REPL user can inspect the damage.
    ///
    /// # Example
    ///
    /// ```
    /// use forge::{Interpreter, Value};
    ///
    /// let mut forge = Interpreter::new();
    /// forge.run(r#"1 2 gt if "G" else "S" end"#).unwrap();
    /// assert_eq!(forge.top(), Some(&Value::Str("S".to_string())));
    /// ```
    pub fn run(&mut self, source: &str) -> Result<()> {
        let (tokens, spans) = token::tokenize(source)?;
        let chunk = resolver::resolve(tokens, spans)?;
        self.vm.execute(chunk)
    }

    /// Run source and return the lines it printed together with a clone
    /// of the resulting top of stack.
    ///
    /// # Example
    ///
    /// ```
    /// use forge::Interpreter;
    ///
    /// let mut forge = Interpreter::new();
    /// let out = forge.run_capture("1 2 add print").unwrap();
    /// assert_eq!(out.printed, vec!["3"]);
    /// assert_eq!(out.top, None);
    /// ```
    pub fn run_capture(&mut self, source: &str) -> Result<Output> {
        self.vm.clear_output();
        self.run(source)?;
        Ok(Output {
            printed: self.vm.take_output(),
            top: self.top().cloned(),
        })
    }

    /// Set resource limits, enforced per `run()` call.
    ///
    /// # Example
    ///
    /// ```
    /// use forge::{Interpreter, Limits};
    ///
    /// let mut forge = Interpreter::new();
    /// forge.limit(Limits {
    ///     max_steps: Some(1_000),
    ///     max_call_depth: Some(32),
    /// });
    /// // An unbounded loop now fails instead of hanging.
    /// assert!(forge.run("1 while 1 end").is_err());
    /// ```
    pub fn limit(&mut self, limits: Limits) {
        self.vm.set_limits(limits.max_steps, limits.max_call_depth);
    }

    /// Register a host word callable from Forge code.
    ///
    /// The callback receives `arity` operands in push order and may push
    /// one result by returning `Some`.
    ///
    /// # Example
    ///
    /// ```
    /// use forge::{Interpreter, Value};
    ///
    /// let mut forge = Interpreter::new();
    /// forge.register_word("hypot2", 2, |args| {
    ///     let a = args[0].as_int().unwrap_or(0);
    ///     let b = args[1].as_int().unwrap_or(0);
    ///     Ok(Some(Value::Int(a * a + b * b)))
    /// });
    /// forge.run("3 4 hypot2").unwrap();
    /// assert_eq!(forge.top(), Some(&Value::Int(25)));
    /// ```
    pub fn register_word<F>(&mut self, name: impl Into<String>, arity: usize, f: F)
    where
        F: Fn(Vec<Value>) -> Result<Option<Value>> + 'static,
    {
        self.vm.register_word(name, arity, Rc::new(f) as WordFn);
    }

    /// Bind a variable in the interpreter's store.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vm.set_variable(name, value.into());
    }

    /// Read a variable from the interpreter's store.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vm.get_variable(name)
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        self.vm.stack()
    }

    pub fn stack_depth(&self) -> usize {
        self.vm.stack().len()
    }

    /// The current top of stack.
    pub fn top(&self) -> Option<&Value> {
        self.vm.stack().last()
    }

    pub fn clear_stack(&mut self) {
        self.vm.clear_stack();
    }

    /// Take and clear output captured from `print`.
    pub fn take_output(&mut self) -> Vec<String> {
        self.vm.take_output()
    }

    /// Write `print` output straight to stdout instead of capturing it.
    pub fn echo_output(&mut self, echo: bool) {
        self.vm.set_echo(echo);
    }

    /// Queue a line for the `input` word to consume before stdin.
    pub fn feed_input(&mut self, line: impl Into<String>) {
        self.vm.queue_input(line);
    }

    /// Forbid `input` from reading stdin (queued lines still work).
    pub fn close_input(&mut self) {
        self.vm.close_stdin();
    }

    /// Whether the last `run()` was stopped by the `exit` word.
    pub fn halted(&self) -> bool {
        self.vm.halted()
    }
}

/// Result of [`Interpreter::run_capture`].
#[derive(Debug, Clone)]
pub struct Output {
    /// Lines written by `print`, in order.
    pub printed: Vec<String>,
    /// The top of stack after the run, if the stack is nonempty.
    pub top: Option<Value>,
}

/// Resource limits for evaluation.
///
/// Both limits are optional; `None` means unlimited. Counters reset at
/// the start of each [`Interpreter::run`] call.
#[derive(Debug, Clone, Default)]
pub struct Limits {
    /// Maximum number of tokens executed per run.
    pub max_steps: Option<u64>,
    /// Maximum call-stack depth for procedure calls.
    pub max_call_depth: Option<usize>,
}
