use std::cell::RefCell;
use std::rc::Rc;

use super::{AssertionError, ExpectationError, ValueMismatch};

/// Decision an expectation handler returns for one mismatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Let the next handler (and finally the default raise) see the mismatch.
    PassToNext,
    /// Absorb the mismatch; the assertion returns `Ok`.
    Terminate,
}

pub trait ExpectationHandler {
    fn on_value_mismatch(&self, mismatch: &ValueMismatch) -> Flow;
}

impl<F> ExpectationHandler for F
where
    F: Fn(&ValueMismatch) -> Flow,
{
    fn on_value_mismatch(&self, mismatch: &ValueMismatch) -> Flow {
        self(mismatch)
    }
}

thread_local! {
    static HANDLERS: RefCell<Vec<Rc<dyn ExpectationHandler>>> = RefCell::new(Vec::new());
}

/// Pops the handlers pushed by one scope, on every exit path.
struct HandlerScope {
    depth: usize,
}

impl HandlerScope {
    fn push(handler: Rc<dyn ExpectationHandler>) -> Self {
        let depth = HANDLERS.with(|handlers| {
            let mut handlers = handlers.borrow_mut();
            let depth = handlers.len();
            handlers.push(handler);
            depth
        });
        Self { depth }
    }
}

impl Drop for HandlerScope {
    fn drop(&mut self) {
        HANDLERS.with(|handlers| handlers.borrow_mut().truncate(self.depth));
    }
}

/// Runs `code` with `handler` installed on the current thread's stack.
pub fn with_additional_handler<H, R>(handler: H, code: impl FnOnce() -> R) -> R
where
    H: ExpectationHandler + 'static,
{
    let _scope = HandlerScope::push(Rc::new(handler));
    code()
}

pub(super) fn on_value_mismatch(mismatch: &ValueMismatch) -> Result<(), ExpectationError> {
    // Snapshot so a handler may itself assert without re-borrowing the stack.
    let installed: Vec<Rc<dyn ExpectationHandler>> =
        HANDLERS.with(|handlers| handlers.borrow().clone());
    for handler in installed.iter().rev() {
        if handler.on_value_mismatch(mismatch) == Flow::Terminate {
            return Ok(());
        }
    }
    Err(ExpectationError::Mismatch(AssertionError::new(
        mismatch.message(),
    )))
}
