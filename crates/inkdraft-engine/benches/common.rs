// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use inkdraft_engine::{ContentState, Session};

#[allow(dead_code)]
pub fn generate_plain_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {i} with some prose to give the block realistic length."))
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(dead_code)]
pub fn generate_content(session: &Session, lines: usize) -> ContentState {
    ContentState::create_from_text(&generate_plain_text(lines), None, session)
}
