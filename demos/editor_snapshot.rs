//! Snapshot-based undo over cheap rope copies.
//!
//! An editor buffer keeps its history as whole-content snapshots: each
//! checkpoint is one refcount bump, mutations copy only the touched
//! path, and the dirty check is a root pointer comparison.
//!
//! Run with: `cargo run --example editor_snapshot`

use strand::Rope;

struct Buffer {
    content: Rope,
    history: Vec<Rope>,
}

impl Buffer {
    fn load(text: &str) -> Self {
        let content = Rope::from(text);
        Self {
            history: vec![content.clone()],
            content,
        }
    }

    /// Whether the content diverged from the last checkpoint.
    fn dirty(&self) -> bool {
        !self
            .content
            .ptr_eq(self.history.last().expect("history is never empty"))
    }

    fn checkpoint(&mut self) {
        self.history.push(self.content.clone());
    }

    fn undo(&mut self) {
        if !self.dirty() && self.history.len() > 1 {
            self.history.pop();
        }
        // Otherwise just drop the uncommitted edits.
        self.content = self.history.last().expect("history is never empty").clone();
    }
}

fn main() -> strand::Result<()> {
    let mut buffer = Buffer::load("fn main() {}\n");
    assert!(!buffer.dirty());

    buffer.content.insert(11, "\n    println!(\"hello\");\n")?;
    assert!(buffer.dirty());
    buffer.checkpoint();

    buffer.content.replace(26..31, "goodbye")?;
    println!("after edit:\n{}", buffer.content);

    buffer.undo();
    println!("after undo:\n{}", buffer.content);

    buffer.undo();
    assert_eq!(buffer.content, "fn main() {}\n");
    println!("back to the original:\n{}", buffer.content);

    Ok(())
}
