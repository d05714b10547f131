#[cfg(test)]
mod __test__ {

  use crate::history::CommandHistory;

  #[test]
  fn test_navigation() {
    let mut history = CommandHistory::new(5);
    history.push("one");
    history.push("two");
    history.push("three");

    assert_eq!(history.previous(), Some("three"));
    assert_eq!(history.previous(), Some("two"));
    assert_eq!(history.next(), Some("three"));
    assert_eq!(history.next(), None);
    assert_eq!(history.next(), None);
    assert_eq!(history.previous(), Some("three"));
  }

  #[test]
  fn test_previous_stops_at_oldest() {
    let mut history = CommandHistory::new(5);
    history.push("only");

    assert_eq!(history.previous(), Some("only"));
    assert_eq!(history.previous(), Some("only"));
  }

  #[test]
  fn test_consecutive_duplicates_and_blanks_are_skipped() {
    let mut history = CommandHistory::new(5);
    history.push("help");
    history.push(" help ");
    history.push("   ");
    history.push("quit");
    history.push("help");

    assert_eq!(history.iter().collect::<Vec<_>>(), vec!["help", "quit", "help"]);
  }

  #[test]
  fn test_oldest_command_is_overwritten() {
    let mut history = CommandHistory::new(3);
    for command in ["a", "b", "c", "d"] {
      history.push(command);
    }

    assert_eq!(history.len(), 3);
    assert_eq!(history.capacity(), 3);
    assert_eq!(history.iter().collect::<Vec<_>>(), vec!["b", "c", "d"]);
  }

  #[test]
  fn test_push_resets_cursor() {
    let mut history = CommandHistory::new(5);
    history.push("a");
    history.push("b");
    history.previous();
    history.previous();

    history.push("c");
    assert_eq!(history.previous(), Some("c"));
  }

  #[test]
  fn test_empty_history() {
    let mut history = CommandHistory::new(2);
    assert!(history.is_empty());
    assert_eq!(history.previous(), None);
    assert_eq!(history.next(), None);
  }

  #[test]
  fn test_take_all_returns_commands_and_resets() {
    let mut history = CommandHistory::new(2);
    history.push("one");
    history.push("two");
    history.push("three");
    history.previous();

    assert_eq!(history.take_all(), vec!["two".to_string(), "three".to_string()]);
    assert!(history.is_empty());
    assert_eq!(history.previous(), None);
    assert_eq!(history.next(), None);

    history.push("four");
    assert_eq!(history.previous(), Some("four"));
  }
}
