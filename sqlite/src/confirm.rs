//! Confirmation gate for destructive operations.
//!
//! Deletes and drops block on a [`Confirm`] decision unless the caller
//! passes `force`. Only an affirmative answer (`y`/`yes`, any case)
//! proceeds; anything else cancels the operation without an error.

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Source of yes/no decisions for destructive operations.
///
/// Any `Fn(&str) -> bool` closure is a decision provider, which keeps
/// automated callers and tests deterministic:
///
/// ```
/// use docstore_sqlite::Confirm;
///
/// let decline = |_prompt: &str| false;
/// assert!(!decline.confirm("Drop everything?").unwrap());
/// ```
pub trait Confirm {
    /// Presents `prompt` and returns `true` if the action may proceed.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(self(prompt))
    }
}

/// Asks on the terminal: the prompt goes to stderr, one line is read from
/// stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "⚠️  {prompt} (y/n): ")?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Answers every prompt with a fixed decision.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(self.0)
    }
}

/// Returns `true` for `y` or `yes`, ignoring case and surrounding
/// whitespace.
///
/// # Examples
///
/// ```
/// use docstore_sqlite::is_affirmative;
///
/// assert!(is_affirmative("Y\n"));
/// assert!(is_affirmative(" yes "));
/// assert!(!is_affirmative("yeah"));
/// assert!(!is_affirmative(""));
/// ```
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_is_affirmative_tokens() {
        for yes in ["y", "Y", "yes", "YES", "Yes\r\n"] {
            assert!(is_affirmative(yes), "{yes:?}");
        }
        for no in ["n", "no", "", "ye", "yes please", "1"] {
            assert!(!is_affirmative(no), "{no:?}");
        }
    }

    #[test]
    fn test_auto_confirm() {
        assert!(AutoConfirm(true).confirm("?").unwrap());
        assert!(!AutoConfirm(false).confirm("?").unwrap());
    }

    #[test]
    fn test_closure_receives_prompt() {
        let seen = RefCell::new(Vec::new());
        let gate = |prompt: &str| {
            seen.borrow_mut().push(prompt.to_string());
            true
        };
        assert!(gate.confirm("Delete 3 row(s)?").unwrap());
        assert_eq!(seen.into_inner(), ["Delete 3 row(s)?"]);
    }
}
