//! The two runtime helpers the emitter injects on demand: `__await_value`, needed wherever an `AwaitExpression` is
//! realized, and `__async_generator`, needed wherever an async generator
//! is emitted (which itself relies on `__await_value`). Injected at most
//! once per module, at the top, and only when actually used — a module
//! with no `async`/`await` carries neither.

pub const AWAIT_VALUE_HELPER: &str = "\
local function __await_value(value)
  if type(value) == \"table\" and value.__is_promise then
    return coroutine.yield(value)
  end
  return value
end
";

pub const ASYNC_GENERATOR_HELPER: &str = "\
local function __async_generator(body)
  local co = coroutine.create(body)
  return {
    next = function(...)
      local ok, value = coroutine.resume(co, ...)
      if not ok then error(value) end
      return { value = value, done = coroutine.status(co) == \"dead\" }
    end,
    [\"return\"] = function(value)
      return { value = value, done = true }
    end,
    throw = function(err)
      error(err)
    end,
  }
end
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_are_syntactically_plausible_lua() {
        assert!(AWAIT_VALUE_HELPER.contains("local function __await_value"));
        assert!(ASYNC_GENERATOR_HELPER.contains("local function __async_generator"));
    }

    #[test]
    fn async_generator_iterator_exposes_next_return_and_throw() {
        assert!(ASYNC_GENERATOR_HELPER.contains("next = function"));
        assert!(ASYNC_GENERATOR_HELPER.contains("[\"return\"] = function"));
        assert!(ASYNC_GENERATOR_HELPER.contains("throw = function"));
    }
}
