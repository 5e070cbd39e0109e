//! Emission state: the output buffer, indentation, fresh-name counters,
//! and which prelude helpers a module's output turns out to need.

/// Options the caller controls: indentation string and whether to emit
/// source-span debug comments.
#[derive(Clone, Debug)]
pub struct EmitOptions {
    pub indent: String,
    pub emit_debug_info: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions { indent: "  ".to_string(), emit_debug_info: false }
    }
}

/// Which `await` realization applies to the innermost enclosing async
/// function: a plain async function yields the awaited value directly,
/// while an async generator routes it through `__await_value` so the
/// helper can tell a produced value apart from a suspended await.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AwaitMode {
    PlainAsync,
    AsyncGenerator,
}

/// Mutable state threaded through emission. Indentation and the output
/// buffer follow the same `write`/`writeln`/`indent`/`dedent` shape as the
/// teacher's own code generation context; the temp and loop-label counters
/// and the prelude-needed flags are specific to targeting Lua.
pub struct EmitContext<'a> {
    pub options: &'a EmitOptions,
    output: String,
    indent_level: usize,
    temp_counter: u32,
    loop_label_counter: u32,
    loop_labels: Vec<String>,
    await_modes: Vec<AwaitMode>,
    needs_await_value: bool,
    needs_async_generator: bool,
}

impl<'a> EmitContext<'a> {
    pub fn new(options: &'a EmitOptions) -> Self {
        EmitContext {
            options,
            output: String::with_capacity(1024),
            indent_level: 0,
            temp_counter: 0,
            loop_label_counter: 0,
            loop_labels: Vec::new(),
            await_modes: Vec::new(),
            needs_await_value: false,
            needs_async_generator: false,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.options.indent);
        }
    }

    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Writes one already-indented, newline-terminated line.
    pub fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.output.push('\n');
    }

    pub fn fresh_temp(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("__tmp{n}")
    }

    /// A fresh `continue_loop` label name, unique per enclosing loop so
    /// nested loops don't collide.
    pub fn fresh_loop_label(&mut self) -> String {
        let n = self.loop_label_counter;
        self.loop_label_counter += 1;
        format!("continue_loop_{n}")
    }

    pub fn push_loop_label(&mut self, label: String) {
        self.loop_labels.push(label);
    }

    pub fn pop_loop_label(&mut self) {
        self.loop_labels.pop();
    }

    pub fn current_loop_label(&self) -> Option<&str> {
        self.loop_labels.last().map(String::as_str)
    }

    pub fn push_await_mode(&mut self, mode: AwaitMode) {
        self.await_modes.push(mode);
    }

    pub fn pop_await_mode(&mut self) {
        self.await_modes.pop();
    }

    /// The `await` realization in effect for the innermost enclosing async
    /// function. Defaults to [`AwaitMode::PlainAsync`] if called outside one
    /// (shouldn't happen: `await` is only valid inside an async function).
    pub fn current_await_mode(&self) -> AwaitMode {
        self.await_modes.last().copied().unwrap_or(AwaitMode::PlainAsync)
    }

    pub fn mark_needs_await_value(&mut self) {
        self.needs_await_value = true;
    }

    pub fn mark_needs_async_generator(&mut self) {
        self.needs_async_generator = true;
        // The async-generator prelude builds on the plain await helper.
        self.needs_await_value = true;
    }

    pub fn needs_await_value(&self) -> bool {
        self.needs_await_value
    }

    pub fn needs_async_generator(&self) -> bool {
        self.needs_async_generator
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Runs `f` against a fresh, empty output buffer and returns whatever
    /// it wrote, restoring the prior buffer afterward. Used to capture a
    /// nested function body's emitted lines as a string so it can be
    /// spliced into an enclosing expression (e.g. a function expression
    /// passed as a call argument).
    pub fn capture<F>(&mut self, f: F) -> Result<String, luascript_diagnostic::CompileError>
    where
        F: FnOnce(&mut Self) -> Result<(), luascript_diagnostic::CompileError>,
    {
        let saved = std::mem::take(&mut self.output);
        let result = f(self);
        let captured = std::mem::replace(&mut self.output, saved);
        result?;
        Ok(captured)
    }
}
