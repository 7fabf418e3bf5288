use std::env;

pub fn insta_snapshot<F: FnOnce()>(f: F) {
    let mut settings = insta::Settings::clone_current();
    let snapshot_path = env::current_dir().unwrap().join("./test/snapshots");
    settings.set_snapshot_path(snapshot_path);
    settings.bind(f);
}

/// Storage payload as written by a previous run: two threads, most recent
/// first.
pub fn stored_chats_fixture() -> &'static str {
    return r#"
[
  {
    "id": "5c1f2a9e-0b7d",
    "title": "Winter vitamins",
    "messages": [
      {
        "id": "a1b2c3d4-e5f6",
        "role": "user",
        "text": "Which vitamins should I take in winter?"
      },
      {
        "id": "f6e5d4c3-b2a1",
        "role": "assistant",
        "text": "Vitamin D is the usual one. Check with a doctor before starting any supplement."
      }
    ],
    "created_at": "2024-01-12T09:30:00+00:00"
  },
  {
    "id": "7d3e8b21-44aa",
    "title": "Running schedule",
    "messages": [],
    "created_at": "2024-01-10T18:05:00+00:00"
  }
]
"#
    .trim();
}

pub fn long_question_fixture() -> &'static str {
    return r#"
I have been feeling anxious before exams lately and I can't really focus on anything.
What are some quick things I can do to calm down and get back to studying?
"#
    .trim();
}
