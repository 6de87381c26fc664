use std::fmt::Display;

/// Write a message to stderr.
///
/// Views are printed to stdout, status and errors go here.
fn print_message(v: impl Display) {
    #[cfg(test)]
    {
        let history = crate::utils::message::history::History::global();
        history.push_message(format!("{v}"));
    }

    eprintln!("{v}");
}

/// alias for [print_message]
pub(crate) fn plain(v: impl Display) {
    print_message(v);
}
pub(crate) fn error(v: impl Display) {
    print_message(std::format_args!("❌ ERROR: {v}"));
}
pub(crate) fn created(v: impl Display) {
    print_message(std::format_args!("✨ {v}"));
}
/// double width character, add an additional space for alignment
pub(crate) fn deleted(v: impl Display) {
    print_message(std::format_args!("🗑️  {v}"));
}
pub(crate) fn updated(v: impl Display) {
    print_message(std::format_args!("✅ {v}"));
}
/// double width character, add an additional space for alignment
pub(crate) fn warning(v: impl Display) {
    print_message(std::format_args!("⚠️  {v}"));
}

pub(crate) fn pokemon_caught(name: &str) {
    created(format!("Caught {name}, it is now in your box"));
}

pub(crate) fn entry_updated(id: &str) {
    updated(format!("Entry {id} updated"));
}

pub(crate) fn entry_released(id: &str, name: Option<&str>) {
    match name {
        Some(name) => deleted(format!("Released {name} (entry {id})")),
        None => deleted(format!("Entry {id} released")),
    }
}

/// Messages printed by the current thread, for assertions in tests.
///
/// Thread local so that tests running in parallel do not see each other's
/// messages. Messages printed from other threads are not captured.
#[cfg(test)]
pub mod history {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    thread_local! {
        static THREAD_HISTORY: Rc<RefCell<VecDeque<String>>> = {
            Rc::new(RefCell::new(VecDeque::new()))
        };
    }

    pub(crate) struct History {
        messages: Rc<RefCell<VecDeque<String>>>,
    }

    impl History {
        pub(crate) fn global() -> History {
            let messages = THREAD_HISTORY.with(|h| h.clone());
            History { messages }
        }

        /// Snapshot of the messages, oldest first.
        pub(crate) fn messages(&self) -> VecDeque<String> {
            self.messages.borrow().clone()
        }

        pub(crate) fn push_message(&self, message: String) {
            self.messages.borrow_mut().push_back(message);
        }

        pub(crate) fn clear(&self) {
            self.messages.borrow_mut().clear();
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::utils::message::{entry_released, error, plain, pokemon_caught};

        #[test]
        fn records_messages_in_order() {
            let history = History::global();
            history.clear();

            plain("1");
            error("2");
            assert_eq!(&history.messages(), &["1", "❌ ERROR: 2"]);

            history.clear();
            assert!(history.messages().is_empty());
        }

        #[test]
        fn collection_messages() {
            let history = History::global();
            history.clear();

            pokemon_caught("pikachu");
            entry_released("abc", Some("pikachu"));
            entry_released("abc", None);
            assert_eq!(&history.messages(), &[
                "✨ Caught pikachu, it is now in your box",
                "🗑️  Released pikachu (entry abc)",
                "🗑️  Entry abc released",
            ]);
        }
    }
}
